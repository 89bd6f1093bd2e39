use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::period::DateRange;
use crate::section::Section;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_start_date")]
    pub start_date: String,
    #[serde(default = "default_end_date")]
    pub end_date: String,
    /// Endpoint names to fetch; all sections when absent.
    #[serde(default)]
    pub sections: Option<Vec<String>>,
    #[serde(default = "default_output")]
    pub output: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            start_date: default_start_date(),
            end_date: default_end_date(),
            sections: None,
            output: default_output(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config from {:?}", path.as_ref()))?;
        let config: Config = toml::from_str(&content)
            .context("Failed to parse config TOML")?;
        Ok(config)
    }
}

impl ReportConfig {
    pub fn date_range(&self) -> DateRange {
        DateRange::parse(&self.start_date, &self.end_date)
    }

    /// Configured sections, resolved. Unknown names are an error so a typo
    /// does not silently drop a table.
    pub fn selected_sections(&self) -> Result<Vec<Section>> {
        match &self.sections {
            None => Ok(Section::ALL.to_vec()),
            Some(names) => names
                .iter()
                .map(|name| {
                    name.parse::<Section>()
                        .with_context(|| format!("Invalid entry in report.sections: {}", name))
                })
                .collect(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_concurrency() -> usize {
    4
}

fn default_start_date() -> String {
    "2025-01-15".to_string()
}

fn default_end_date() -> String {
    "2025-02-15".to_string()
}

fn default_output() -> String {
    "report.json".to_string()
}
