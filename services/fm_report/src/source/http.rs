use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde_json::Value;
use std::time::Duration;
use url::Url;

use super::traits::ReportSource;
use crate::config::ApiConfig;
use crate::error::{ReportError, Result};
use crate::period::DateRange;
use crate::section::Section;

pub struct HttpSource {
    name: String,
    base_url: Url,
    token: Option<String>,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let base_url = parse_base_url(&config.base_url)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|source| ReportError::Http {
                section: "client".to_string(),
                source,
            })?;
        Ok(Self {
            name: base_url.host_str().unwrap_or("http").to_string(),
            base_url,
            token: config.token.clone().filter(|t| !t.is_empty()),
            client,
        })
    }

    /// Full request URL: endpoint path plus `start_date`/`end_date` query.
    pub fn request_url(&self, section: Section, range: &DateRange) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(&section.endpoint());
        url.query_pairs_mut()
            .append_pair("start_date", &range.start_raw)
            .append_pair("end_date", &range.end_raw);
        url
    }
}

/// Accepts a bare host (`fm-uat-api.lockated.com`) or a full URL.
fn parse_base_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    let (has_scheme, authority) = match trimmed.split_once("://") {
        Some((_, rest)) => (true, rest),
        None => (false, trimmed),
    };
    if authority.trim_matches('/').is_empty() {
        return Err(ReportError::InvalidBaseUrl(raw.to_string()));
    }
    let with_scheme = if has_scheme {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };
    let url = Url::parse(&with_scheme).map_err(|_| ReportError::InvalidBaseUrl(raw.to_string()))?;
    if url.host_str().map(str::is_empty).unwrap_or(true) {
        return Err(ReportError::InvalidBaseUrl(raw.to_string()));
    }
    Ok(url)
}

#[async_trait]
impl ReportSource for HttpSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, section: Section, range: &DateRange) -> Result<Value> {
        let url = self.request_url(section, range);
        tracing::debug!(%section, %url, "fetching report section");

        let mut request = self.client.get(url).header(ACCEPT, "application/json");
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        let response = request.send().await.map_err(|source| ReportError::Http {
            section: section.to_string(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReportError::Status {
                section: section.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|source| ReportError::Http {
            section: section.to_string(),
            source,
        })?;
        serde_json::from_slice(&body).map_err(|source| ReportError::Decode {
            section: section.to_string(),
            source,
        })
    }
}
