use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ReportError;

const REPORTS_PATH: &str = "/api/pms/reports";

/// One report endpoint. Each is fetched independently and feeds one or more
/// report tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    HelpdeskManagementSnapshot,
    MeetingRoomDayPassPerformance,
    CenterWiseMeetingRoomUtilization,
    SiteWiseAdoptionRate,
    AssetOverview,
    TicketAgingClosureEfficiency,
    TicketPerformanceMetrics,
    CustomerExperienceFeedback,
    ResponseTatPerformanceQuarterly,
    ResolutionTatPerformanceQuarterly,
    DevicePlatformStatistics,
    ParkingDateSiteWise,
    VisitorTrendAnalysis,
    ConsumableInventoryComparison,
    CenterWiseConsumables,
    InventoryOverstockReport,
    SiteWiseChecklist,
    AmcContractSummary,
    HighestMaintenanceAssets,
}

impl Section {
    pub const ALL: [Section; 19] = [
        Section::HelpdeskManagementSnapshot,
        Section::MeetingRoomDayPassPerformance,
        Section::CenterWiseMeetingRoomUtilization,
        Section::SiteWiseAdoptionRate,
        Section::AssetOverview,
        Section::TicketAgingClosureEfficiency,
        Section::TicketPerformanceMetrics,
        Section::CustomerExperienceFeedback,
        Section::ResponseTatPerformanceQuarterly,
        Section::ResolutionTatPerformanceQuarterly,
        Section::DevicePlatformStatistics,
        Section::ParkingDateSiteWise,
        Section::VisitorTrendAnalysis,
        Section::ConsumableInventoryComparison,
        Section::CenterWiseConsumables,
        Section::InventoryOverstockReport,
        Section::SiteWiseChecklist,
        Section::AmcContractSummary,
        Section::HighestMaintenanceAssets,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::HelpdeskManagementSnapshot => "helpdesk_management_snapshot",
            Section::MeetingRoomDayPassPerformance => "meeting_room_day_pass_performance",
            Section::CenterWiseMeetingRoomUtilization => "center_wise_meeting_room_utilization",
            Section::SiteWiseAdoptionRate => "site_wise_adoption_rate",
            Section::AssetOverview => "asset_overview",
            Section::TicketAgingClosureEfficiency => "ticket_aging_closure_efficiency",
            Section::TicketPerformanceMetrics => "ticket_performance_metrics",
            Section::CustomerExperienceFeedback => "customer_experience_feedback",
            Section::ResponseTatPerformanceQuarterly => "response_tat_performance_quarterly",
            Section::ResolutionTatPerformanceQuarterly => "resolution_tat_performance_quarterly",
            Section::DevicePlatformStatistics => "device_platform_statistics",
            Section::ParkingDateSiteWise => "parking_date_site_wise",
            Section::VisitorTrendAnalysis => "visitor_trend_analysis",
            Section::ConsumableInventoryComparison => "consumable_inventory_comparison",
            Section::CenterWiseConsumables => "center_wise_consumables",
            Section::InventoryOverstockReport => "inventory_overstock_report",
            Section::SiteWiseChecklist => "site_wise_checklist",
            Section::AmcContractSummary => "amc_contract_summary",
            Section::HighestMaintenanceAssets => "highest_maintenance_assets",
        }
    }

    /// Request path without the query string, e.g. `/api/pms/reports/asset_overview`.
    pub fn endpoint(&self) -> String {
        format!("{}/{}", REPORTS_PATH, self.as_str())
    }

    /// Payload file name used by file-backed sources.
    pub fn file_name(&self) -> String {
        format!("{}.json", self.as_str())
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = ReportError;

    /// Accepts the endpoint name in any case, with `-` or `_` separators.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        Section::ALL
            .into_iter()
            .find(|section| section.as_str() == wanted)
            .ok_or_else(|| ReportError::UnknownSection(s.to_string()))
    }
}
