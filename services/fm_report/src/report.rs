//! Assembles every normalized section of one report run into a single
//! serializable view.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{json, Value};

use crate::collect::ReportBundle;
use crate::grid::{
    build_aging_closure_grid, build_consumables_grid, build_overdue_grid, build_overstock_grid,
    build_rating_grid, build_ticket_grid, build_utilization_grid, Grid,
};
use crate::period::{classify, DateRange, PeriodInfo};
use crate::rows::{max_metric, CanonicalRow};
use crate::section::Section;
use crate::sections::{
    adoption_rows, amc_summary, center_metrics, center_rows, checklist_progress, company_overview,
    comparison_rows, customer_experience_summary, device_stats, expired_contracts,
    expiring_contracts, helpdesk_snapshot, highest_maintenance, inventory_overview, parking_rows,
    tat, visitor, visitor_rows, AdoptionRow, AmcContract, AmcSummary, ChartAxis, ChecklistRow,
    CompanyAssetOverview, DeviceStats, HighestMaintenance, MeetingCenterRow, SummaryCard,
};

/// Two-series chart whose rows carry `Last` / `Current` metrics, labelled for
/// the classified period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonChart {
    pub title: String,
    pub last_label: String,
    pub current_label: String,
    pub rows: Vec<CanonicalRow>,
    pub axis_max: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ticks: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl ComparisonChart {
    fn new(title: &str, period: &PeriodInfo, rows: Vec<CanonicalRow>, axis_max: f64) -> Self {
        Self {
            title: format!("{} ({} Comparison)", title, period.period_label),
            last_label: period.last_label.clone(),
            current_label: period.current_label.clone(),
            rows,
            axis_max,
            ticks: Vec::new(),
            height: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedSection {
    pub section: Section,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AmcView {
    pub summary: Option<AmcSummary>,
    pub expiring: Vec<AmcContract>,
    pub expired: Vec<AmcContract>,
    /// Indexes into `expiring` whose renewal falls due within a month.
    pub renewal_due: Vec<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InventoryView {
    pub overview: Vec<SummaryCard>,
    pub overstock: Grid,
    pub consumables_by_center: Grid,
    pub consumption_comparison: ComparisonChart,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportView {
    pub period: PeriodInfo,
    pub date_range: String,
    pub failed_sections: Vec<FailedSection>,
    pub helpdesk_snapshot: Vec<SummaryCard>,
    pub meeting_centers: Vec<MeetingCenterRow>,
    pub meeting_room_utilization: Grid,
    pub adoption: Vec<AdoptionRow>,
    pub asset_overview: CompanyAssetOverview,
    pub asset_center_metrics: Vec<CanonicalRow>,
    pub ticket_aging_closure: Grid,
    pub ticket_performance: Grid,
    pub customer_experience: Vec<SummaryCard>,
    pub customer_rating: Grid,
    pub response_tat: ComparisonChart,
    pub resolution_tat: ComparisonChart,
    pub device_stats: DeviceStats,
    pub parking: Vec<CanonicalRow>,
    pub visitor_trend: ComparisonChart,
    pub inventory: InventoryView,
    pub checklist_progress: Vec<ChecklistRow>,
    pub overdue_checklists: Grid,
    pub amc: AmcView,
    pub highest_maintenance: HighestMaintenance,
}

/// Build the report view for `range`. Sections that are missing or failed in
/// `bundle` come out empty.
pub fn build_report(bundle: &ReportBundle, range: &DateRange) -> ReportView {
    build_report_on(bundle, range, chrono::Local::now().date_naive())
}

/// [`build_report`] with an explicit "today" for renewal highlighting.
pub fn build_report_on(bundle: &ReportBundle, range: &DateRange, today: NaiveDate) -> ReportView {
    let period = classify(range);
    let response = tat::response_rows(bundle.payload(Section::ResponseTatPerformanceQuarterly));
    let resolution = tat::resolution_rows(
        bundle.payload(Section::ResolutionTatPerformanceQuarterly),
        bundle.payload(Section::ResponseTatPerformanceQuarterly),
    );
    let response_max = tat::chart_max(&response);
    let resolution_max = tat::chart_max(&resolution);

    let visitors = visitor_rows(bundle.payload(Section::VisitorTrendAnalysis));
    let visitor_max = max_metric(&visitors, &[visitor::LAST, visitor::CURRENT]);
    let visitor_height = visitor::chart_height(visitors.len());
    let mut visitor_trend = ComparisonChart::new("Visitor Trend Analysis", &period, visitors, visitor_max);
    visitor_trend.height = Some(visitor_height);

    let comparison = comparison_rows(bundle.payload(Section::ConsumableInventoryComparison));
    let axis = ChartAxis::for_rows(&comparison);
    let mut consumption_comparison =
        ComparisonChart::new("Consumable Inventory Value", &period, comparison, axis.max);
    consumption_comparison.ticks = axis.ticks;

    let overstock_payload = bundle.payload(Section::InventoryOverstockReport);
    let inventory = InventoryView {
        overview: inventory_overview(overstock_payload),
        overstock: build_overstock_grid(overstock_payload),
        consumables_by_center: build_consumables_grid(bundle.payload(Section::CenterWiseConsumables)),
        consumption_comparison,
    };

    let amc_payload = bundle.payload(Section::AmcContractSummary);
    let expiring = expiring_contracts(amc_payload);
    let renewal_due = expiring
        .iter()
        .enumerate()
        .filter(|(_, c)| c.renewal_due(today))
        .map(|(i, _)| i)
        .collect();
    let amc = AmcView {
        summary: amc_summary(amc_payload),
        expired: expired_contracts(amc_payload),
        expiring,
        renewal_due,
    };

    let checklist_payload = bundle.payload(Section::SiteWiseChecklist);
    let feedback_payload = bundle.payload(Section::CustomerExperienceFeedback);
    let asset_payload = bundle.payload(Section::AssetOverview);

    let view = ReportView {
        date_range: range.label(),
        failed_sections: bundle
            .failures()
            .into_iter()
            .map(|(section, reason)| FailedSection {
                section,
                reason: reason.to_string(),
            })
            .collect(),
        helpdesk_snapshot: helpdesk_snapshot(bundle.payload(Section::HelpdeskManagementSnapshot)),
        meeting_centers: center_rows(bundle.payload(Section::MeetingRoomDayPassPerformance)),
        meeting_room_utilization: build_utilization_grid(
            bundle.payload(Section::CenterWiseMeetingRoomUtilization),
        ),
        adoption: adoption_rows(bundle.payload(Section::SiteWiseAdoptionRate)),
        asset_overview: company_overview(asset_payload),
        asset_center_metrics: center_metrics(asset_payload),
        ticket_aging_closure: build_aging_closure_grid(bundle.payload(Section::TicketAgingClosureEfficiency)),
        ticket_performance: build_ticket_grid(bundle.payload(Section::TicketPerformanceMetrics)),
        customer_experience: customer_experience_summary(feedback_payload),
        customer_rating: build_rating_grid(feedback_payload),
        response_tat: ComparisonChart::new("Response TAT Performance", &period, response, response_max),
        resolution_tat: ComparisonChart::new(
            "Resolution TAT Performance",
            &period,
            resolution,
            resolution_max,
        ),
        device_stats: device_stats(bundle.payload(Section::DevicePlatformStatistics)),
        parking: parking_rows(bundle.payload(Section::ParkingDateSiteWise)),
        visitor_trend,
        inventory,
        checklist_progress: checklist_progress(checklist_payload),
        overdue_checklists: build_overdue_grid(checklist_payload),
        amc,
        highest_maintenance: highest_maintenance(bundle.payload(Section::HighestMaintenanceAssets)),
        period,
    };
    tracing::info!(
        unit = %view.period.unit,
        failed = view.failed_sections.len(),
        "report assembled"
    );
    view
}

/// Normalized output of a single section, as the `normalize` command prints it.
pub fn normalize_section(section: Section, payload: &Value) -> Value {
    match section {
        Section::HelpdeskManagementSnapshot => json!(helpdesk_snapshot(payload)),
        Section::MeetingRoomDayPassPerformance => json!(center_rows(payload)),
        Section::CenterWiseMeetingRoomUtilization => json!(build_utilization_grid(payload)),
        Section::SiteWiseAdoptionRate => json!(adoption_rows(payload)),
        Section::AssetOverview => json!({
            "company_overview": company_overview(payload),
            "center_metrics": center_metrics(payload),
        }),
        Section::TicketAgingClosureEfficiency => json!(build_aging_closure_grid(payload)),
        Section::TicketPerformanceMetrics => json!(build_ticket_grid(payload)),
        Section::CustomerExperienceFeedback => json!({
            "summary": customer_experience_summary(payload),
            "rating": build_rating_grid(payload),
        }),
        Section::ResponseTatPerformanceQuarterly => json!(tat::response_rows(payload)),
        Section::ResolutionTatPerformanceQuarterly => {
            json!(tat::resolution_rows(payload, &Value::Null))
        }
        Section::DevicePlatformStatistics => json!(device_stats(payload)),
        Section::ParkingDateSiteWise => json!(parking_rows(payload)),
        Section::VisitorTrendAnalysis => json!(visitor_rows(payload)),
        Section::ConsumableInventoryComparison => {
            let rows = comparison_rows(payload);
            json!({"axis": ChartAxis::for_rows(&rows), "rows": rows})
        }
        Section::CenterWiseConsumables => json!(build_consumables_grid(payload)),
        Section::InventoryOverstockReport => json!({
            "overview": inventory_overview(payload),
            "overstock": build_overstock_grid(payload),
        }),
        Section::SiteWiseChecklist => json!({
            "progress": checklist_progress(payload),
            "overdue": build_overdue_grid(payload),
        }),
        Section::AmcContractSummary => json!({
            "summary": amc_summary(payload),
            "expiring": expiring_contracts(payload),
            "expired": expired_contracts(payload),
        }),
        Section::HighestMaintenanceAssets => json!(highest_maintenance(payload)),
    }
}
