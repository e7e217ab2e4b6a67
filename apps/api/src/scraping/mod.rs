//! Listing scrapers for Herkey and Naukri.
//!
//! Each site is fetched as static HTML and parsed with CSS selectors. Scraping
//! is best-effort: the chat pipeline treats any `ScrapeError` as "no listings"
//! and falls back to synthesised examples. There is no retry or backoff.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use scraper::{ElementRef, Html, Selector};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::storage::JsonFile;

pub mod herkey;
pub mod naukri;

/// Placeholder for any field the page did not provide.
pub const NOT_AVAILABLE: &str = "N/A";
/// Placeholder salary when a job card carries none.
pub const NOT_DISCLOSED: &str = "Not disclosed";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Network error fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Invalid selector '{0}'")]
    Selector(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobListing {
    pub title: String,
    pub company: String,
    /// Location and other card details.
    pub details: String,
    pub experience: String,
    pub skills: String,
    pub salary: String,
    pub apply_url: String,
}

impl JobListing {
    fn has_content(&self) -> bool {
        [
            &self.title,
            &self.company,
            &self.details,
            &self.experience,
            &self.skills,
            &self.salary,
            &self.apply_url,
        ]
        .iter()
        .any(|v| v.as_str() != NOT_AVAILABLE && v.as_str() != NOT_DISCLOSED)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventListing {
    pub title: String,
    pub date: String,
    pub location: String,
    pub description: String,
    pub url: String,
}

impl EventListing {
    fn has_content(&self) -> bool {
        [
            &self.title,
            &self.date,
            &self.location,
            &self.description,
            &self.url,
        ]
        .iter()
        .any(|v| v.as_str() != NOT_AVAILABLE)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MentorshipListing {
    pub title: String,
    pub mentor_name: String,
    pub description: String,
    pub url: String,
}

impl MentorshipListing {
    fn has_content(&self) -> bool {
        [&self.title, &self.mentor_name, &self.description, &self.url]
            .iter()
            .any(|v| v.as_str() != NOT_AVAILABLE)
    }
}

/// Listings plus the page they came from (used as a fallback link).
#[derive(Debug, Clone, PartialEq)]
pub struct Scraped<T> {
    pub items: Vec<T>,
    pub page_url: String,
}

impl<T> Scraped<T> {
    pub fn empty(page_url: impl Into<String>) -> Self {
        Self {
            items: Vec::new(),
            page_url: page_url.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobSource {
    Herkey,
    Naukri,
}

impl JobSource {
    pub fn page_url(&self) -> &'static str {
        match self {
            JobSource::Herkey => herkey::JOBS_URL,
            JobSource::Naukri => naukri::BASE_URL,
        }
    }
}

/// Where the chat pipeline gets its listings. `HtmlScraper` in production.
#[async_trait]
pub trait ListingProvider: Send + Sync {
    async fn jobs(&self, source: JobSource, query: &str) -> Result<Scraped<JobListing>, ScrapeError>;
    async fn events(&self, query: &str) -> Result<Scraped<EventListing>, ScrapeError>;
    async fn mentorships(&self, query: &str) -> Result<Scraped<MentorshipListing>, ScrapeError>;
}

/// Listing page locations. `Default` is the live sites.
#[derive(Debug, Clone)]
pub struct SiteUrls {
    pub herkey_jobs: String,
    pub herkey_events: String,
    pub herkey_mentorship: String,
    /// Naukri result pages hang off this root; must end with `/`.
    pub naukri_base: String,
}

impl Default for SiteUrls {
    fn default() -> Self {
        Self {
            herkey_jobs: herkey::JOBS_URL.to_string(),
            herkey_events: herkey::EVENTS_URL.to_string(),
            herkey_mentorship: herkey::MENTORSHIP_URL.to_string(),
            naukri_base: naukri::BASE_URL.to_string(),
        }
    }
}

/// Fetches listing pages over HTTP and parses them with CSS selectors.
#[derive(Clone)]
pub struct HtmlScraper {
    http: Client,
    urls: SiteUrls,
    snapshot_dir: Option<PathBuf>,
}

impl HtmlScraper {
    pub fn new(timeout: Duration, snapshot_dir: Option<PathBuf>) -> Result<Self, reqwest::Error> {
        Self::with_urls(timeout, snapshot_dir, SiteUrls::default())
    }

    pub fn with_urls(
        timeout: Duration,
        snapshot_dir: Option<PathBuf>,
        urls: SiteUrls,
    ) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            http,
            urls,
            snapshot_dir,
        })
    }

    async fn fetch_html(&self, url: &str, query: Option<&str>) -> Result<String, ScrapeError> {
        let mut request = self.http.get(url);
        if let Some(q) = query.filter(|q| !q.trim().is_empty()) {
            request = request.query(&[("keyword", q.trim())]);
        }

        let response = request.send().await.map_err(|source| ScrapeError::Network {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let html = response.text().await.map_err(|source| ScrapeError::Network {
            url: url.to_string(),
            source,
        })?;
        debug!("Fetched {} bytes from {}", html.len(), url);
        Ok(html)
    }

    /// Result pages in order, stopping at the first page without cards.
    /// A failure after the first page keeps what was already collected.
    async fn naukri_jobs(&self, query: &str) -> Result<Vec<JobListing>, ScrapeError> {
        let mut items = Vec::new();
        for url in naukri::search_urls(&self.urls.naukri_base, query) {
            let html = match self.fetch_html(&url, None).await {
                Ok(html) => html,
                Err(e) if !items.is_empty() => {
                    warn!("Stopping Naukri pagination: {e}");
                    break;
                }
                Err(e) => return Err(e),
            };
            let page = naukri::parse_jobs(&html, &url)?;
            if page.is_empty() {
                debug!("No job cards on {url}; stopping pagination");
                break;
            }
            items.extend(page);
        }
        Ok(items)
    }

    /// Writes the scraped items to `<snapshot_dir>/<name>` in the background.
    /// Failures only warn.
    fn snapshot<T>(&self, name: &'static str, items: &[T])
    where
        T: Clone + Serialize + DeserializeOwned + Send + 'static,
    {
        let Some(dir) = self.snapshot_dir.clone() else {
            return;
        };
        let items = items.to_vec();
        tokio::task::spawn_blocking(move || {
            let result = JsonFile::<Vec<T>>::open(dir.join(name)).and_then(|f| f.write(&items));
            if let Err(e) = result {
                warn!("Could not write scrape snapshot {name}: {e}");
            }
        });
    }
}

#[async_trait]
impl ListingProvider for HtmlScraper {
    async fn jobs(&self, source: JobSource, query: &str) -> Result<Scraped<JobListing>, ScrapeError> {
        let (items, page_url) = match source {
            JobSource::Herkey => {
                let url = &self.urls.herkey_jobs;
                let html = self.fetch_html(url, Some(query)).await?;
                (herkey::parse_jobs(&html, url)?, url.clone())
            }
            JobSource::Naukri => (self.naukri_jobs(query).await?, self.urls.naukri_base.clone()),
        };

        info!("Scraped {} job(s) from {:?}", items.len(), source);
        let snapshot = match source {
            JobSource::Herkey => "herkey_jobs.json",
            JobSource::Naukri => "naukri_jobs.json",
        };
        self.snapshot(snapshot, &items);

        Ok(Scraped { items, page_url })
    }

    async fn events(&self, query: &str) -> Result<Scraped<EventListing>, ScrapeError> {
        let url = &self.urls.herkey_events;
        let html = self.fetch_html(url, Some(query)).await?;
        let items = herkey::parse_events(&html, url)?;
        info!("Scraped {} event(s)", items.len());
        self.snapshot("herkey_events.json", &items);
        Ok(Scraped {
            items,
            page_url: url.clone(),
        })
    }

    async fn mentorships(&self, query: &str) -> Result<Scraped<MentorshipListing>, ScrapeError> {
        let url = &self.urls.herkey_mentorship;
        let html = self.fetch_html(url, Some(query)).await?;
        let items = herkey::parse_mentorships(&html, url)?;
        info!("Scraped {} mentorship listing(s)", items.len());
        self.snapshot("herkey_mentorship.json", &items);
        Ok(Scraped {
            items,
            page_url: url.clone(),
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Selector helpers shared by the site parsers
// ────────────────────────────────────────────────────────────────────────────

pub(crate) fn selector(css: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(css).map_err(|_| ScrapeError::Selector(css.to_string()))
}

/// Text of the first element under `scope` matching `sel`, whitespace-collapsed.
/// Missing or blank → `fallback`.
pub(crate) fn first_text(scope: ElementRef<'_>, sel: &Selector, fallback: &str) -> String {
    scope
        .select(sel)
        .next()
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

/// `href` of the first element matching `sel`, resolved against `page_url`.
pub(crate) fn first_href(scope: ElementRef<'_>, sel: &Selector, page_url: &str) -> String {
    scope
        .select(sel)
        .next()
        .and_then(|el| el.value().attr("href"))
        .and_then(|href| resolve_url(page_url, href))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

pub(crate) fn resolve_url(page_url: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with("javascript:") || href == "#" {
        return None;
    }
    Url::parse(page_url)
        .and_then(|base| base.join(href))
        .map(|u| u.to_string())
        .ok()
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parses `html` and maps each element matching `card_css` through `extract`.
pub(crate) fn extract_cards<T>(
    html: &str,
    card_css: &str,
    mut extract: impl FnMut(ElementRef<'_>) -> T,
) -> Result<Vec<T>, ScrapeError> {
    let document = Html::parse_document(html);
    let cards = selector(card_css)?;
    Ok(document.select(&cards).map(|card| extract(card)).collect())
}
