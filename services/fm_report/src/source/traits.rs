use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::period::DateRange;
use crate::section::Section;

/// Where raw report payloads come from. Implementations return the decoded
/// body as-is; shape interpretation is left to the normalizers.
#[async_trait]
pub trait ReportSource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch(&self, section: Section, range: &DateRange) -> Result<Value>;
}
