pub mod file;
pub mod http;
pub mod mock;
pub mod traits;

pub use file::FileSource;
pub use http::HttpSource;
pub use mock::MockSource;
pub use traits::ReportSource;
