use std::time::Duration;

use async_trait::async_trait;
use citekit_core::config::MetadataConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, ScienceError};
use crate::http::RateLimitedClient;
use crate::identifiers::doi::parse_doi;
use crate::sources::MetadataSource;

pub struct CrossRefSource {
    client: RateLimitedClient,
    base_url: String,
}

impl CrossRefSource {
    pub fn from_config(config: &MetadataConfig) -> Result<Self> {
        Self::with_params(
            &config.base_url,
            Duration::from_millis(config.min_interval_ms),
            config.max_retries,
            config.polite_email.clone(),
        )
    }

    pub fn with_params(
        base_url: &str,
        min_interval: Duration,
        max_retries: u32,
        polite_email: Option<String>,
    ) -> Result<Self> {
        let version = env!("CARGO_PKG_VERSION");
        let user_agent = match &polite_email {
            Some(email) => format!("citekit/{version} (mailto:{email})"),
            None => format!("citekit/{version}"),
        };

        let client = RateLimitedClient::new(min_interval, max_retries, &user_agent)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn fetch_by_doi(&self, doi: &str) -> Result<Option<CrossRefWork>> {
        let url = format!("{}/works/{}", self.base_url, work_path(doi));
        let Some(val) = self.client.get_json::<Value>(&url).await? else {
            return Ok(None);
        };

        let message = &val["message"];
        if !message.is_object() {
            return Ok(None);
        }
        CrossRefWork::from_json(message).map(Some)
    }

    pub async fn query_bibliographic(&self, reference: &str) -> Result<Option<String>> {
        let url = format!(
            "{}/works?query.bibliographic={}&sort=relevance&order=desc&rows=1",
            self.base_url,
            urlencoding::encode(reference)
        );
        let Some(val) = self.client.get_json::<Value>(&url).await? else {
            return Ok(None);
        };

        let doi = val["message"]["items"]
            .as_array()
            .and_then(|items| items.first())
            .and_then(|item| item["DOI"].as_str())
            .and_then(|doi_str| parse_doi(doi_str).ok());
        Ok(doi)
    }
}

#[async_trait]
impl MetadataSource for CrossRefSource {
    fn name(&self) -> &str {
        "CrossRef"
    }

    async fn fetch_work(&self, doi: &str) -> Result<Option<CrossRefWork>> {
        self.fetch_by_doi(doi).await
    }

    async fn search_bibliographic(&self, query: &str) -> Result<Option<String>> {
        self.query_bibliographic(query).await
    }
}

/// The subset of a Crossref `work` record that citations need.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrossRefWork {
    pub doi: String,
    pub title: Vec<String>,
    pub author: Vec<CrossRefAuthor>,
    pub published_year: Option<i32>,
    pub container_title: Vec<String>,
    pub volume: Option<String>,
    pub issue: Option<String>,
    pub page: Option<String>,
    pub article_number: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrossRefAuthor {
    pub given: Option<String>,
    pub family: Option<String>,
    pub name: Option<String>,
}

impl CrossRefWork {
    pub fn from_json(v: &Value) -> Result<Self> {
        let doi = v["DOI"]
            .as_str()
            .ok_or_else(|| ScienceError::Parse("Missing DOI in CrossRef response".to_string()))?
            .to_string();

        let author = v["author"]
            .as_array()
            .map(|a| a.iter().map(CrossRefAuthor::from_json).collect())
            .unwrap_or_default();

        Ok(Self {
            doi,
            title: string_list(&v["title"]),
            author,
            published_year: parse_year(v),
            container_title: string_list(&v["container-title"]),
            volume: string_field(&v["volume"]),
            issue: string_field(&v["issue"]),
            page: string_field(&v["page"]),
            article_number: string_field(&v["article-number"]),
        })
    }
}

impl CrossRefAuthor {
    fn from_json(v: &Value) -> Self {
        Self {
            given: v["given"].as_str().map(|s| s.to_string()),
            family: v["family"].as_str().map(|s| s.to_string()),
            name: v["name"].as_str().map(|s| s.to_string()),
        }
    }
}

/// `prefix/suffix` with the suffix percent-encoded. SICI-style DOIs carry
/// `#`, `?`, `<`, `>` and `;`, which would otherwise end or split the path.
fn work_path(doi: &str) -> String {
    let doi = doi.trim();
    match doi.split_once('/') {
        Some((prefix, suffix)) => format!("{prefix}/{}", urlencoding::encode(suffix)),
        None => urlencoding::encode(doi).into_owned(),
    }
}

fn string_list(v: &Value) -> Vec<String> {
    v.as_array()
        .map(|a| a.iter().filter_map(|v| v.as_str()).map(|s| s.to_string()).collect())
        .unwrap_or_default()
}

/// Crossref sometimes sends numbers where strings are documented.
fn string_field(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_year(v: &Value) -> Option<i32> {
    // CrossRef date parts: "published": {"date-parts": [[2017, 6, 12]]}
    v["published"]["date-parts"][0][0]
        .as_i64()
        .or_else(|| v["published-print"]["date-parts"][0][0].as_i64())
        .or_else(|| v["published-online"]["date-parts"][0][0].as_i64())
        .or_else(|| v["issued"]["date-parts"][0][0].as_i64())
        .map(|n| n as i32)
}
