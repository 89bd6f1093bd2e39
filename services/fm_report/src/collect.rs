//! Fan-out of independent section fetches.
//!
//! Sections have no ordering dependency on each other. Each one ends up
//! `Ready` or `Failed`; a failure only blanks its own tables.

use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::ApiConfig;
use crate::error::ReportError;
use crate::period::DateRange;
use crate::section::Section;
use crate::source::ReportSource;

static NULL: Value = Value::Null;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum SectionState {
    Loading,
    Ready(Value),
    Failed(String),
}

/// Per-section fetch outcome for one report run.
#[derive(Debug, Clone, Default)]
pub struct ReportBundle {
    states: BTreeMap<Section, SectionState>,
}

impl ReportBundle {
    /// Every listed section starts out loading.
    pub fn pending(sections: &[Section]) -> Self {
        Self {
            states: sections.iter().map(|s| (*s, SectionState::Loading)).collect(),
        }
    }

    /// Bundle of already-available payloads, e.g. a single file on disk.
    pub fn from_payloads<I: IntoIterator<Item = (Section, Value)>>(payloads: I) -> Self {
        Self {
            states: payloads
                .into_iter()
                .map(|(s, v)| (s, SectionState::Ready(v)))
                .collect(),
        }
    }

    pub fn set(&mut self, section: Section, state: SectionState) {
        self.states.insert(section, state);
    }

    pub fn state(&self, section: Section) -> Option<&SectionState> {
        self.states.get(&section)
    }

    /// True while any section is still outstanding.
    pub fn is_loading(&self) -> bool {
        self.states.values().any(|s| matches!(s, SectionState::Loading))
    }

    /// Payload for `section`; `null` unless it is ready. Normalizers turn
    /// `null` into empty tables.
    pub fn payload(&self, section: Section) -> &Value {
        match self.states.get(&section) {
            Some(SectionState::Ready(value)) => value,
            _ => &NULL,
        }
    }

    pub fn failures(&self) -> Vec<(Section, &str)> {
        self.states
            .iter()
            .filter_map(|(section, state)| match state {
                SectionState::Failed(reason) => Some((*section, reason.as_str())),
                _ => None,
            })
            .collect()
    }

    pub fn ready_count(&self) -> usize {
        self.states
            .values()
            .filter(|s| matches!(s, SectionState::Ready(_)))
            .count()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct CollectOptions {
    pub concurrency: usize,
    pub timeout: Duration,
}

impl CollectOptions {
    pub fn from_api(api: &ApiConfig) -> Self {
        Self {
            concurrency: api.concurrency,
            timeout: Duration::from_secs(api.timeout_secs),
        }
    }
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            concurrency: 4,
            timeout: Duration::from_secs(30),
        }
    }
}

pub async fn collect(
    source: &dyn ReportSource,
    sections: &[Section],
    range: &DateRange,
    options: &CollectOptions,
) -> ReportBundle {
    collect_with_progress(source, sections, range, options, None).await
}

/// Fetch `sections` with at most `options.concurrency` requests in flight,
/// each bounded by `options.timeout`.
pub async fn collect_with_progress(
    source: &dyn ReportSource,
    sections: &[Section],
    range: &DateRange,
    options: &CollectOptions,
    progress: Option<&ProgressBar>,
) -> ReportBundle {
    let mut bundle = ReportBundle::pending(sections);
    let limit = options.timeout;
    info!(
        source = source.name(),
        sections = bundle.len(),
        concurrency = options.concurrency,
        range = %range,
        "collecting report sections"
    );

    let mut results = stream::iter(sections.iter().copied())
        .map(|section| async move {
            let outcome = match tokio::time::timeout(limit, source.fetch(section, range)).await {
                Ok(result) => result,
                Err(_) => Err(ReportError::Timeout {
                    section: section.to_string(),
                    secs: limit.as_secs(),
                }),
            };
            (section, outcome)
        })
        .buffer_unordered(options.concurrency.max(1));

    while let Some((section, outcome)) = results.next().await {
        match outcome {
            Ok(payload) => {
                debug!(%section, "section ready");
                bundle.set(section, SectionState::Ready(payload));
            }
            Err(e) => {
                warn!(%section, error = %e, "section fetch failed");
                bundle.set(section, SectionState::Failed(e.to_string()));
            }
        }
        if let Some(bar) = progress {
            bar.set_message(section.to_string());
            bar.inc(1);
        }
    }

    info!(
        ready = bundle.ready_count(),
        failed = bundle.failures().len(),
        "collection finished"
    );
    bundle
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MockSource;
    use serde_json::json;

    fn range() -> DateRange {
        DateRange::parse("2025-01-15", "2025-02-15")
    }

    #[test]
    fn test_pending_bundle_is_loading() {
        let mut bundle = ReportBundle::pending(&[Section::AssetOverview, Section::SiteWiseChecklist]);
        assert!(bundle.is_loading());
        assert!(bundle.payload(Section::AssetOverview).is_null());

        bundle.set(Section::AssetOverview, SectionState::Ready(json!({"data": {}})));
        assert!(bundle.is_loading());
        bundle.set(Section::SiteWiseChecklist, SectionState::Failed("boom".to_string()));
        assert!(!bundle.is_loading());
        assert_eq!(bundle.failures(), vec![(Section::SiteWiseChecklist, "boom")]);
        assert!(bundle.payload(Section::SiteWiseChecklist).is_null());
        assert_eq!(bundle.payload(Section::AssetOverview), &json!({"data": {}}));
    }

    #[tokio::test]
    async fn test_collect_all_sections() {
        let source = MockSource::new(3);
        let bundle = collect(&source, &Section::ALL, &range(), &CollectOptions::default()).await;
        assert!(!bundle.is_loading());
        assert_eq!(bundle.ready_count(), Section::ALL.len());
        assert!(bundle.failures().is_empty());
    }

    #[tokio::test]
    async fn test_failed_section_degrades() {
        let source = MockSource::new(2).failing(Section::AmcContractSummary);
        let sections = [Section::AmcContractSummary, Section::ParkingDateSiteWise];
        let bundle = collect(&source, &sections, &range(), &CollectOptions::default()).await;
        assert!(!bundle.is_loading());
        assert_eq!(bundle.ready_count(), 1);
        assert!(bundle.payload(Section::AmcContractSummary).is_null());
        let failures = bundle.failures();
        assert_eq!(failures.len(), 1);
        assert!(failures[0].1.contains("503"));
    }

    #[tokio::test]
    async fn test_timeout_marks_section_failed() {
        let source = MockSource::new(1).with_delay(Duration::from_millis(500));
        let options = CollectOptions {
            concurrency: 2,
            timeout: Duration::from_millis(20),
        };
        let bundle = collect(&source, &[Section::VisitorTrendAnalysis], &range(), &options).await;
        assert!(!bundle.is_loading());
        match bundle.state(Section::VisitorTrendAnalysis) {
            Some(SectionState::Failed(reason)) => assert!(reason.contains("timed out")),
            other => panic!("unexpected state {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_progress_bar_counts_sections() {
        let source = MockSource::new(1);
        let bar = ProgressBar::hidden();
        bar.set_length(3);
        let sections = [Section::AssetOverview, Section::DevicePlatformStatistics, Section::AssetOverview];
        let bundle =
            collect_with_progress(&source, &sections, &range(), &CollectOptions::default(), Some(&bar))
                .await;
        assert_eq!(bar.position(), 3);
        assert_eq!(bundle.len(), 2);
    }
}
