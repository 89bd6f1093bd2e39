//! Report data normalization for the facilities-management console.
//!
//! Raw report payloads arrive in several historical shapes. This crate
//! classifies the report period, normalizes each section into canonical rows
//! or grids, formats values for display, and assembles the whole report.

pub mod collect;
pub mod config;
pub mod error;
pub mod format;
pub mod grid;
pub mod numeric;
pub mod payload;
pub mod period;
pub mod report;
pub mod rows;
pub mod section;
pub mod sections;
pub mod source;

pub use error::{ReportError, Result};
pub use period::{classify, DateRange, PeriodInfo, PeriodUnit};
pub use report::{build_report, ReportView};
pub use section::Section;
