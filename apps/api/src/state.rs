use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::chat::pipeline::ChatPipeline;
use crate::config::Config;
use crate::llm_client::{self, LlmClient};
use crate::retrieval::embedding::{HashingEmbedder, DEFAULT_DIM};
use crate::retrieval::loader::load_documents;
use crate::retrieval::RetrievalStore;
use crate::scraping::HtmlScraper;
use crate::search::SerperClient;
use crate::storage::feedback_store::FeedbackStore;
use crate::storage::session_store::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ChatPipeline>,
    pub sessions: Arc<SessionStore>,
    pub feedback: Arc<FeedbackStore>,
    pub retriever: Arc<RetrievalStore>,
    /// `None` when no Serper API key is configured.
    pub search: Option<Arc<SerperClient>>,
}

impl AppState {
    pub fn from_config(config: &Config) -> Result<Self> {
        let llm = LlmClient::new(config.anthropic_api_key.clone())
            .context("Failed to build LLM client")?;
        info!("LLM client initialized (model: {})", llm_client::MODEL);

        let scraper = HtmlScraper::new(
            Duration::from_secs(config.scrape_timeout_secs),
            Some(config.data_dir.clone()),
        )
        .context("Failed to build scraper HTTP client")?;

        let sessions = Arc::new(SessionStore::open(
            &config.store_dir,
            config.session_timeout_minutes,
        )?);
        let feedback = Arc::new(FeedbackStore::open(&config.store_dir)?);
        info!("Session and feedback stores at {}", config.store_dir.display());

        // Retrieval is optional at startup: a missing data directory leaves it empty.
        let documents = load_documents(&config.data_dir).unwrap_or_else(|e| {
            warn!("Retrieval documents not loaded: {e}");
            Vec::new()
        });
        let embedder = HashingEmbedder::new(DEFAULT_DIM)?;
        let retriever = RetrievalStore::build(documents, Arc::new(embedder))
            .context("Failed to index retrieval documents")?;

        let search = match &config.serper_api_key {
            Some(key) => Some(Arc::new(
                SerperClient::new(key.clone()).context("Failed to build Serper client")?,
            )),
            None => {
                warn!("SERPER_API_KEY not set; /api/search is disabled");
                None
            }
        };

        let pipeline = ChatPipeline::new(
            Arc::new(llm),
            Arc::new(scraper),
            sessions.clone(),
            config.history_turns,
        );

        Ok(Self {
            pipeline: Arc::new(pipeline),
            sessions,
            feedback,
            retriever: Arc::new(retriever),
            search,
        })
    }
}
