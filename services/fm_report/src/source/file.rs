use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::traits::ReportSource;
use crate::error::{ReportError, Result};
use crate::period::DateRange;
use crate::section::Section;

/// Serves captured payloads from a directory tree of `<section>.json` files.
/// The date range is ignored.
pub struct FileSource {
    root: PathBuf,
    files: HashMap<Section, PathBuf>,
}

impl FileSource {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref().to_path_buf();
        let mut files = HashMap::new();

        // Shallowest match wins when a section appears more than once
        for entry in walkdir::WalkDir::new(&root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().extension().map(|ext| ext == "json").unwrap_or(false))
        {
            let Some(stem) = entry.path().file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let Ok(section) = stem.parse::<Section>() else {
                tracing::debug!(path = ?entry.path(), "skipping payload file with unknown section");
                continue;
            };
            let depth = entry.depth();
            let replace = files
                .get(&section)
                .map(|(existing_depth, _)| depth < *existing_depth)
                .unwrap_or(true);
            if replace {
                files.insert(section, (depth, entry.path().to_path_buf()));
            }
        }

        let files: HashMap<Section, PathBuf> = files.into_iter().map(|(s, (_, p))| (s, p)).collect();
        tracing::info!(root = ?root, sections = files.len(), "discovered payload files");
        Self { root, files }
    }

    pub fn available(&self) -> Vec<Section> {
        let mut sections: Vec<Section> = self.files.keys().copied().collect();
        sections.sort();
        sections
    }
}

#[async_trait]
impl ReportSource for FileSource {
    fn name(&self) -> &str {
        "file"
    }

    async fn fetch(&self, section: Section, _range: &DateRange) -> Result<Value> {
        let path = self
            .files
            .get(&section)
            .ok_or_else(|| ReportError::MissingPayload {
                section: section.to_string(),
                path: self.root.join(section.file_name()),
            })?;
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ReportError::PayloadRead {
                path: path.clone(),
                source,
            })?;
        serde_json::from_str(&content).map_err(|source| ReportError::Decode {
            section: section.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn range() -> DateRange {
        DateRange::parse("2025-01-15", "2025-02-15")
    }

    #[tokio::test]
    async fn test_discovers_nested_payloads() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("captured/jan")).unwrap();
        std::fs::write(
            dir.path().join("asset_overview.json"),
            json!({"data": {"total_assets": 10}}).to_string(),
        )
        .unwrap();
        std::fs::write(
            dir.path().join("captured/jan/site_wise_checklist.json"),
            "[]",
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.json"), "{}").unwrap();
        std::fs::write(dir.path().join("asset_overview.txt"), "ignored").unwrap();

        let source = FileSource::new(dir.path());
        assert_eq!(
            source.available(),
            vec![Section::AssetOverview, Section::SiteWiseChecklist]
        );

        let payload = source.fetch(Section::AssetOverview, &range()).await.unwrap();
        assert_eq!(payload["data"]["total_assets"], 10);
        let list = source.fetch(Section::SiteWiseChecklist, &range()).await.unwrap();
        assert!(list.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_shallow_file_wins() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("old")).unwrap();
        std::fs::write(dir.path().join("old/asset_overview.json"), r#"{"v": 1}"#).unwrap();
        std::fs::write(dir.path().join("asset_overview.json"), r#"{"v": 2}"#).unwrap();

        let source = FileSource::new(dir.path());
        let payload = source.fetch(Section::AssetOverview, &range()).await.unwrap();
        assert_eq!(payload["v"], 2);
    }

    #[tokio::test]
    async fn test_missing_and_malformed_payloads() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("amc_contract_summary.json"), "{not json").unwrap();
        let source = FileSource::new(dir.path());

        assert!(matches!(
            source.fetch(Section::AssetOverview, &range()).await,
            Err(ReportError::MissingPayload { .. })
        ));
        assert!(matches!(
            source.fetch(Section::AmcContractSummary, &range()).await,
            Err(ReportError::Decode { .. })
        ));
    }
}
