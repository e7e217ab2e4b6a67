//! Web search via the Serper API, used for "latest news" style questions.
//!
//! Results are cached per query for an hour. Failures are reported to the
//! caller as a short human-readable sentence rather than an error.

use std::time::Duration;

use reqwest::Client;
use serde_json::{json, Value};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::search::cache::TtlCache;

pub mod cache;
pub mod handlers;

const SERPER_URL: &str = "https://google.serper.dev/search";
const RESULT_COUNT: usize = 4;
const CACHE_CAPACITY: usize = 100;
const CACHE_TTL: Duration = Duration::from_secs(3600);

const NO_RESULTS: &str = "No recent updates found.";
const MISSING_ORGANIC: &str =
    "Sorry, I couldn't find anything about that. There may be an issue with the Serper API key.";
const UNREACHABLE: &str = "Unable to fetch updates at this time.";

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Status(u16),
}

pub struct SerperClient {
    http: Client,
    api_key: String,
    cache: Mutex<TtlCache<String>>,
}

impl SerperClient {
    pub fn new(api_key: String) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            http,
            api_key,
            cache: Mutex::new(TtlCache::new(CACHE_CAPACITY, CACHE_TTL)),
        })
    }

    /// Formatted top results for `query`, or a sentence explaining why there are none.
    pub async fn search(&self, query: &str) -> String {
        let key = format!("serper_{query}");
        if let Some(hit) = self.cache.lock().await.get(&key) {
            debug!("Serper cache hit for '{query}'");
            return hit;
        }

        match self.fetch(query).await {
            Ok(data) => {
                let formatted = format_results(&data);
                let mut cache = self.cache.lock().await;
                cache.insert(key, formatted.clone());
                debug!("Serper cache holds {} entries", cache.len());
                formatted
            }
            Err(SearchError::Status(status)) => {
                error!("Serper API error: {status}");
                format!("API error: {status}")
            }
            Err(e) => {
                error!("Error searching Serper: {e}");
                UNREACHABLE.to_string()
            }
        }
    }

    async fn fetch(&self, query: &str) -> Result<Value, SearchError> {
        let response = self
            .http
            .post(SERPER_URL)
            .header("X-API-KEY", &self.api_key)
            .json(&json!({ "q": query, "num": RESULT_COUNT }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status(status.as_u16()));
        }
        let data: Value = response.json().await?;
        info!("Serper returned results for '{query}'");
        Ok(data)
    }
}

fn format_results(data: &Value) -> String {
    let Some(organic) = data.get("organic") else {
        return MISSING_ORGANIC.to_string();
    };

    let blocks: Vec<String> = organic
        .as_array()
        .map(|results| {
            results
                .iter()
                .take(RESULT_COUNT)
                .filter_map(format_result)
                .collect()
        })
        .unwrap_or_default();

    if blocks.is_empty() {
        NO_RESULTS.to_string()
    } else {
        blocks.join("\n")
    }
}

fn format_result(result: &Value) -> Option<String> {
    let field = |name: &str| result.get(name).and_then(Value::as_str);
    Some(format!(
        "Title: {}\nLink: {}\nSnippet: {}\n\n-----------------",
        field("title")?,
        field("link")?,
        field("snippet")?
    ))
}
