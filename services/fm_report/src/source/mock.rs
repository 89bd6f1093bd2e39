use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::collections::HashSet;
use tokio::time::{sleep, Duration};

use super::traits::ReportSource;
use crate::error::{ReportError, Result};
use crate::numeric::site_key;
use crate::period::DateRange;
use crate::section::Section;

const SITE_NAMES: [&str; 6] = [
    "Andheri East",
    "Bandra Kurla Complex",
    "Lower Parel",
    "Powai",
    "Thane West",
    "Worli",
];

const TICKET_CATEGORIES: [&str; 4] = ["Electrical", "Plumbing", "Housekeeping", "Civil"];
const CONSUMABLES: [&str; 5] = ["Tissue Roll", "Hand Wash", "Floor Cleaner", "Garbage Bag", "Air Freshener"];
const OVERSTOCK_ITEMS: [&str; 4] = ["LED Tube", "Copier Paper", "Cleaning Cloth", "Toner"];
const UTILIZATION_RANGES: [&str; 5] = ["Less 30%", "30%-39%", "40%-49%", "50%-69%", "70%-100%"];

/// Synthetic report payloads for demos and tests. Each section draws from its
/// own seeded generator, so repeated fetches return identical bodies.
pub struct MockSource {
    name: String,
    seed: u64,
    sites: Vec<String>,
    failing: HashSet<Section>,
    delay: Option<Duration>,
}

impl MockSource {
    pub fn new(site_count: usize) -> Self {
        let sites = SITE_NAMES
            .iter()
            .cycle()
            .take(site_count.max(1))
            .enumerate()
            .map(|(i, name)| {
                if i < SITE_NAMES.len() {
                    name.to_string()
                } else {
                    format!("{} {}", name, i / SITE_NAMES.len() + 1)
                }
            })
            .collect();
        Self {
            name: "mock".to_string(),
            seed: 42,
            sites,
            failing: HashSet::new(),
            delay: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Make `section` answer with HTTP 503.
    pub fn failing(mut self, section: Section) -> Self {
        self.failing.insert(section);
        self
    }

    /// Sleep before answering every request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn sites(&self) -> &[String] {
        &self.sites
    }

    pub fn payload(&self, section: Section) -> Value {
        let mut rng = fastrand::Rng::with_seed(self.seed.wrapping_mul(31).wrapping_add(section as u64));
        let sites = &self.sites;
        match section {
            Section::HelpdeskManagementSnapshot => helpdesk_snapshot(&mut rng),
            Section::MeetingRoomDayPassPerformance => meeting_room(&mut rng, sites),
            Section::CenterWiseMeetingRoomUtilization => utilization(&mut rng, sites),
            Section::SiteWiseAdoptionRate => adoption(&mut rng, sites),
            Section::AssetOverview => asset_overview(&mut rng, sites),
            Section::TicketAgingClosureEfficiency => aging_closure(&mut rng, sites),
            Section::TicketPerformanceMetrics => ticket_metrics(&mut rng, sites),
            Section::CustomerExperienceFeedback => customer_experience(&mut rng, sites),
            Section::ResponseTatPerformanceQuarterly => tat(&mut rng, sites, "response_tat"),
            Section::ResolutionTatPerformanceQuarterly => tat(&mut rng, sites, "resolution_tat"),
            Section::DevicePlatformStatistics => device_stats(&mut rng),
            Section::ParkingDateSiteWise => parking(&mut rng, sites),
            Section::VisitorTrendAnalysis => visitors(&mut rng, sites),
            Section::ConsumableInventoryComparison => consumable_comparison(&mut rng, sites),
            Section::CenterWiseConsumables => center_consumables(&mut rng, sites),
            Section::InventoryOverstockReport => overstock(&mut rng, sites),
            Section::SiteWiseChecklist => checklist(&mut rng, sites),
            Section::AmcContractSummary => amc(&mut rng, sites),
            Section::HighestMaintenanceAssets => highest_maintenance(&mut rng, sites),
        }
    }
}

#[async_trait]
impl ReportSource for MockSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, section: Section, _range: &DateRange) -> Result<Value> {
        if let Some(delay) = self.delay {
            sleep(delay).await;
        }
        if self.failing.contains(&section) {
            return Err(ReportError::Status {
                section: section.to_string(),
                status: 503,
            });
        }
        Ok(self.payload(section))
    }
}

fn pct(rng: &mut fastrand::Rng) -> u32 {
    rng.u32(0..=100)
}

fn pct_text(rng: &mut fastrand::Rng) -> String {
    format!("{}%", pct(rng))
}

fn arrow(rng: &mut fastrand::Rng) -> &'static str {
    if rng.bool() {
        "↑"
    } else {
        "↓"
    }
}

fn helpdesk_snapshot(rng: &mut fastrand::Rng) -> Value {
    let total = rng.u32(200..2000);
    let closed = rng.u32(0..=total);
    let open = total - closed;
    let customer = rng.u32(0..=total);
    let share = |n: u32| ((n as f64 / total as f64) * 1000.0).round() / 10.0;
    json!({"data": {
        "snapshot": {
            "total_tickets": {"count": total, "percentage": 100},
            "closed_tickets": {"count": closed, "percentage": share(closed)},
            "open_tickets": {"count": open, "percentage": share(open)},
            "customer_tickets": {"count": customer},
            "fm_tickets": {"count": total - customer}
        },
        "average_customer_rating": {"rating": (rng.f64() * 40.0 + 10.0).round() / 10.0}
    }})
}

fn meeting_room(rng: &mut fastrand::Rng, sites: &[String]) -> Value {
    let rows: Vec<Value> = sites
        .iter()
        .map(|site| {
            json!({
                "site_name": site,
                "meeting_room": {
                    "utilization_rate": pct_text(rng),
                    "utilization_trend": arrow(rng),
                    "cancellation_rate": format!("{}%", rng.u32(0..25)),
                    "cancellation_trend": arrow(rng),
                    "revenue": rng.u32(5_000..500_000),
                    "revenue_trend": arrow(rng)
                }
            })
        })
        .collect();
    json!({"data": {"center_performance": {"data": rows}}})
}

fn utilization(rng: &mut fastrand::Rng, sites: &[String]) -> Value {
    let centers: Vec<Value> = sites
        .iter()
        .map(|site| {
            let rooms: Vec<Value> = (1..=rng.usize(2..6))
                .map(|n| json!({"room_name": format!("Room {}", n), "utilization_percentage": pct(rng)}))
                .collect();
            json!({"center_name": site, "rooms": rooms})
        })
        .collect();
    let ranges: Map<String, Value> = UTILIZATION_RANGES
        .iter()
        .map(|label| (label.to_string(), json!(rng.u32(0..10))))
        .collect();
    json!({"data": {"center_utilization_data": centers, "utilization_ranges": ranges}})
}

fn adoption(rng: &mut fastrand::Rng, sites: &[String]) -> Value {
    let rows: Vec<Value> = sites
        .iter()
        .map(|site| {
            json!({
                "site_name": site,
                "helpdesk": pct_text(rng),
                "assets": pct_text(rng),
                "checklist_tech": pct_text(rng),
                "checklist_nontech": pct_text(rng),
                "inventory": pct_text(rng),
                "meeting_room": pct_text(rng)
            })
        })
        .collect();
    json!({"data": {"adoption_rates": rows}})
}

fn asset_overview(rng: &mut fastrand::Rng, sites: &[String]) -> Value {
    let metrics: Vec<Value> = sites
        .iter()
        .map(|site| {
            json!({
                "site_name": site,
                "total_assets": rng.u32(50..600),
                "critical": {"breakdown": rng.u32(0..10), "average_day": rng.u32(0..15)},
                "non_critical": {"breakdown": rng.u32(0..25), "average_day": rng.u32(0..30)}
            })
        })
        .collect();
    json!({"data": {
        "company_asset_overview": {
            "total_available_asset": rng.u32(1_000..5_000),
            "asset_in_breakdown": rng.u32(0..80),
            "average_downtime_days": rng.u32(1..20)
        },
        "center_metrics": metrics
    }})
}

fn aging_closure(rng: &mut fastrand::Rng, sites: &[String]) -> Value {
    let centers: Vec<Value> = sites
        .iter()
        .map(|site| {
            json!({
                "center_name": site,
                "aging_buckets": {
                    "0-10_days": rng.u32(0..200),
                    "11-20_days": rng.u32(0..80),
                    "21-30_days": rng.u32(0..40),
                    "31-40_days": rng.u32(0..20),
                    "40+_days": rng.u32(0..10)
                },
                "total_closure_efficiency": pct_text(rng),
                "feedback_metrics": {
                    "response_count": rng.u32(0..300),
                    "response_percentage": (rng.f64() * 10_000.0).round() / 100.0
                }
            })
        })
        .collect();
    json!({"data": {"centers": centers}})
}

fn ticket_metrics(rng: &mut fastrand::Rng, sites: &[String]) -> Value {
    let metrics: Vec<Value> = TICKET_CATEGORIES
        .iter()
        .map(|category| {
            let per_site: Vec<Value> = sites
                .iter()
                .map(|site| {
                    json!({
                        "site_name": site,
                        "total_ticket_percentage": pct(rng),
                        "closed_ticket_percentage": pct(rng),
                        "aging_distribution": {
                            "0_10": rng.u32(0..50),
                            "11_20": rng.u32(0..30),
                            "21_30": rng.u32(0..20),
                            "31_40": rng.u32(0..10),
                            "40_plus": rng.u32(0..5)
                        }
                    })
                })
                .collect();
            json!({"category_name": category, "sites": per_site})
        })
        .collect();
    json!({"data": {"metrics": metrics}})
}

fn customer_experience(rng: &mut fastrand::Rng, sites: &[String]) -> Value {
    let bands = ["excellent", "good", "average", "bad", "poor"];
    let summary: Map<String, Value> = bands
        .iter()
        .map(|band| {
            let band_summary = json!({"count": rng.u32(0..300), "percentage": pct_text(rng)});
            (band.to_string(), band_summary)
        })
        .collect();
    let per_site: Vec<Value> = sites
        .iter()
        .map(|site| {
            let mut row = Map::new();
            row.insert("site_name".to_string(), json!(site));
            for band in bands {
                row.insert(band.to_string(), json!(format!("{}%", rng.u32(0..=20))));
            }
            row.insert("total_percentage".to_string(), json!("100%"));
            Value::Object(row)
        })
        .collect();
    json!({"data": {
        "overall_summary": summary,
        "site_performance": {"data": per_site}
    }})
}

fn tat(rng: &mut fastrand::Rng, sites: &[String], block: &str) -> Value {
    let rows: Vec<Value> = sites
        .iter()
        .map(|site| {
            json!({
                "center_name": site,
                "previous_period": {block: {"achieved_percentage": pct(rng)}},
                "current_period": {block: {"achieved_percentage": pct(rng)}}
            })
        })
        .collect();
    json!({"data": {"performance_data": rows}})
}

fn device_stats(rng: &mut fastrand::Rng) -> Value {
    let android = rng.u32(100..5_000);
    let ios = rng.u32(100..3_000);
    json!({"data": {
        "summary": {
            "total_active_users": android + ios,
            "platform_breakdown": {"android": android, "ios": ios}
        },
        "new_users": rng.u32(0..500)
    }})
}

fn parking(rng: &mut fastrand::Rng, sites: &[String]) -> Value {
    let details: Vec<Value> = sites
        .iter()
        .map(|site| {
            json!({
                "site_name": site,
                "free_parking_available": rng.u32(0..120),
                "paid_parking_available": rng.u32(0..80),
                "vacant_spaces": rng.u32(0..60)
            })
        })
        .collect();
    json!({"data": {"parking_management": {"site_wise_details": details}}})
}

fn visitors(rng: &mut fastrand::Rng, sites: &[String]) -> Value {
    let analysis: Vec<Value> = sites
        .iter()
        .map(|site| {
            json!({
                "site_name": site,
                "previous_period": {"total_visitors": rng.u32(100..3_000)},
                "current_period": {"total_visitors": rng.u32(100..3_000)}
            })
        })
        .collect();
    json!({"data": {"visitor_management": {"site_wise_analysis": analysis}}})
}

fn consumable_comparison(rng: &mut fastrand::Rng, sites: &[String]) -> Value {
    let rows: Vec<Value> = sites
        .iter()
        .map(|site| {
            json!({
                "site_name": site,
                "last_quarter": rng.u32(10_000..450_000),
                "current_quarter": rng.u32(10_000..450_000)
            })
        })
        .collect();
    json!({"data": {"consumable_inventory_comparison": rows}})
}

fn center_consumables(rng: &mut fastrand::Rng, sites: &[String]) -> Value {
    let rows: Vec<Value> = sites
        .iter()
        .map(|site| {
            let mut consumables = Map::new();
            for name in CONSUMABLES {
                // roughly one in five centres does not stock a given item
                if rng.u8(0..10) > 1 {
                    consumables.insert(name.to_string(), json!(rng.u32(500..40_000)));
                }
            }
            json!({"site_name": site, "consumables": consumables})
        })
        .collect();
    json!({"data": {"center_wise_consumables": rows}})
}

fn overstock(rng: &mut fastrand::Rng, sites: &[String]) -> Value {
    let matrix: Vec<Value> = OVERSTOCK_ITEMS
        .iter()
        .map(|item| {
            let mut row = Map::new();
            row.insert("item_name".to_string(), json!(item));
            for site in sites {
                if rng.bool() {
                    row.insert(
                        site_key(site),
                        json!({
                            "capital_book": format!("{}k", rng.u32(1..250)),
                            "current_stock": rng.u32(0..100)
                        }),
                    );
                }
            }
            Value::Object(row)
        })
        .collect();
    let spares = rng.u32(100_000..900_000);
    let consumables = rng.u32(100_000..900_000);
    json!({"data": {
        "overview_summary": {
            "over_stock_items": rng.u32(0..40),
            "under_stock_items": rng.u32(0..40),
            "total_value_of_inventory": spares + consumables,
            "capital_blocked_in_overstock": rng.u32(10_000..200_000),
            "total_value_of_spares": spares,
            "total_value_of_consumables": consumables
        },
        "inventory_overstock_report": {"sites": sites, "matrix_data": matrix}
    }})
}

fn status_bucket(rng: &mut fastrand::Rng) -> Value {
    json!({
        "not_completed": rng.u32(0..40),
        "in_progress": rng.u32(0..30),
        "delayed": rng.u32(0..20),
        "partial": rng.u32(0..10),
        "completed": rng.u32(0..200)
    })
}

fn checklist(rng: &mut fastrand::Rng, sites: &[String]) -> Value {
    let breakdown: Vec<Value> = sites
        .iter()
        .map(|site| {
            json!({
                "site_name": site,
                "current_quarter": status_bucket(rng),
                "last_quarter": status_bucket(rng)
            })
        })
        .collect();
    let categories = ["Fire Safety", "HVAC", "Lift", "Pantry"];
    let site_wise: Vec<Value> = sites
        .iter()
        .map(|site| {
            let entries: Vec<Value> = categories
                .iter()
                .map(|c| json!({"category": c, "overdue_percentage": rng.f64() * 100.0}))
                .collect();
            json!({"site_name": site, "categories": entries})
        })
        .collect();
    json!({"data": {
        "site_wise_breakdown": breakdown,
        "top_10_overdue_checklists": {"categories": categories, "site_wise": site_wise}
    }})
}

fn amc(rng: &mut fastrand::Rng, sites: &[String]) -> Value {
    let today = chrono::Utc::now().date_naive();
    let contracts: Vec<Value> = sites
        .iter()
        .enumerate()
        .map(|(i, site)| {
            let expired = i % 3 == 2;
            let end_offset = if expired {
                -(rng.i64(1..120))
            } else {
                rng.i64(5..90)
            };
            let end = today + chrono::Duration::days(end_offset);
            let start = end - chrono::Duration::days(365);
            json!({
                "site_name": site,
                "amc_name": format!("{} Maintenance", ["HVAC", "Lift", "DG Set"][i % 3]),
                "contract_start_date": start.format("%Y-%m-%d").to_string(),
                "contract_end_date": end.format("%Y-%m-%d").to_string(),
                "renewal_reminder": if end_offset <= 30 { "Within 1 month" } else { "3 months" },
                "projected_renewal_cost": rng.u32(50_000..500_000),
                "vendor_name": format!("Vendor {}", i + 1),
                "status": if expired { "Expired" } else { "Expiring Soon" }
            })
        })
        .collect();
    let expired = contracts
        .iter()
        .filter(|c| c["status"] == "Expired")
        .count();
    json!({"data": {
        "summary": {
            "active_amc_contracts": rng.u32(20..120),
            "contract_expiry_in_90_days": contracts.len() - expired,
            "contract_expired": expired
        },
        "contract_details": contracts
    }})
}

const ASSET_CATEGORIES: [&str; 4] = ["Chiller", "Lift", "DG Set", "AHU"];

fn highest_maintenance(rng: &mut fastrand::Rng, sites: &[String]) -> Value {
    let costs: Vec<u32> = (0..sites.len().min(5)).map(|_| rng.u32(10_000..300_000)).collect();
    let total: u32 = costs.iter().sum();
    let mut ranked: Vec<(usize, u32)> = costs.into_iter().enumerate().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    let assets: Vec<Value> = ranked
        .iter()
        .enumerate()
        .map(|(rank, (site_idx, cost))| {
            let category = ASSET_CATEGORIES[rank % ASSET_CATEGORIES.len()];
            json!({
                "rank": rank + 1,
                "asset_name_id": format!("AST-{:04}", rng.u32(1..9_999)),
                "asset_category": category,
                "site_name": sites[*site_idx],
                "total_maintenance_cost": cost,
                "maintenance_percent": ((*cost as f64 / total.max(1) as f64) * 10_000.0).round() / 100.0,
                "remark": "-"
            })
        })
        .collect();
    json!({"data": {
        "assets_with_highest_maintenance_spend": assets,
        "total_maintenance_cost": total,
        "total_maintenance_percent": 100
    }})
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{build_overstock_grid, build_utilization_grid};
    use crate::sections::{amc_summary, checklist_progress, parking_rows, visitor_rows};

    fn range() -> DateRange {
        DateRange::parse("2025-01-15", "2025-02-15")
    }

    #[test]
    fn test_site_names_extend_past_pool() {
        let mock = MockSource::new(8);
        assert_eq!(mock.sites().len(), 8);
        assert_eq!(mock.sites()[0], "Andheri East");
        assert_eq!(mock.sites()[6], "Andheri East 2");
        assert_eq!(MockSource::new(0).sites().len(), 1);
    }

    #[test]
    fn test_payloads_are_deterministic() {
        let a = MockSource::new(3).with_seed(7);
        let b = MockSource::new(3).with_seed(7);
        for section in Section::ALL {
            assert_eq!(a.payload(section), b.payload(section), "{section}");
        }
    }

    #[test]
    fn test_payloads_match_normalizer_shapes() {
        let mock = MockSource::new(4);
        assert_eq!(parking_rows(&mock.payload(Section::ParkingDateSiteWise)).len(), 4);
        assert_eq!(visitor_rows(&mock.payload(Section::VisitorTrendAnalysis)).len(), 4);
        assert_eq!(checklist_progress(&mock.payload(Section::SiteWiseChecklist)).len(), 4);
        assert!(amc_summary(&mock.payload(Section::AmcContractSummary)).is_some());

        let overstock = build_overstock_grid(&mock.payload(Section::InventoryOverstockReport));
        assert_eq!(overstock.col_labels.len(), 4);
        assert_eq!(overstock.row_labels.len(), OVERSTOCK_ITEMS.len());

        let utilization = build_utilization_grid(&mock.payload(Section::CenterWiseMeetingRoomUtilization));
        assert_eq!(utilization.col_labels, UTILIZATION_RANGES);
        assert_eq!(utilization.row_labels.len(), 4);
    }

    #[test]
    fn test_highest_maintenance_payload() {
        let mock = MockSource::new(6);
        let table =
            crate::sections::highest_maintenance(&mock.payload(Section::HighestMaintenanceAssets));
        assert_eq!(table.assets.len(), 5);
        assert_eq!(table.assets[0].rank, "1");
        assert_eq!(table.assets[0].asset_category, ASSET_CATEGORIES[0]);
        assert_eq!(table.assets[4].asset_category, ASSET_CATEGORIES[0]);
        assert_eq!(table.total_percent, 100.0);
        assert!(table
            .assets
            .windows(2)
            .all(|w| w[0].total_maintenance_cost >= w[1].total_maintenance_cost));
    }

    #[tokio::test]
    async fn test_failing_section() {
        let mock = MockSource::new(2).failing(Section::AssetOverview);
        assert!(matches!(
            mock.fetch(Section::AssetOverview, &range()).await,
            Err(ReportError::Status { status: 503, .. })
        ));
        assert!(mock.fetch(Section::SiteWiseChecklist, &range()).await.is_ok());
    }
}
