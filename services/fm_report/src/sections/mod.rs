//! Per-section normalizers. Each turns one endpoint's payload, whatever shape
//! it arrived in, into rows ready for a chart or table.

pub mod adoption;
pub mod amc;
pub mod assets;
pub mod cards;
pub mod checklist;
pub mod consumables;
pub mod meeting;
pub mod parking;
pub mod tat;
pub mod visitor;

pub use adoption::{adoption_rows, AdoptionRow};
pub use amc::{amc_summary, expired_contracts, expiring_contracts, AmcContract, AmcSummary};
pub use assets::{
    center_metrics, company_overview, highest_maintenance, CompanyAssetOverview,
    HighestMaintenance, MaintenanceAsset,
};
pub use cards::{
    customer_experience_summary, device_stats, helpdesk_snapshot, inventory_overview, DeviceStats,
    SummaryCard,
};
pub use checklist::{checklist_progress, ChecklistRow, StatusCounts};
pub use consumables::{comparison_rows, ChartAxis};
pub use meeting::{center_rows, MeetingCenterRow, Trend};
pub use parking::parking_rows;
pub use tat::{resolution_rows, response_rows};
pub use visitor::visitor_rows;
