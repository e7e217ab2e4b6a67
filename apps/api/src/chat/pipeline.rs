//! Chat pipeline: orchestrates one user message end to end.
//!
//! Flow: session context → bias check → intent classification →
//!       listing scrape (jobs / events / mentorship) → LLM reply → record turn.
//!
//! Scraping never fails a request: a scrape error is logged and the pipeline
//! answers from the mock-data prompt instead. LLM errors are fatal.

use std::sync::Arc;

use tracing::{info, warn};

use crate::chat::bias::{parse_bias_verdict, BiasVerdict};
use crate::chat::intent::{Intent, CLARIFY_REPLY};
use crate::chat::listings::{self, Listing};
use crate::chat::prompts::{
    fill, BIAS_PROMPT, EVENTS_FALLBACK_PROMPT, EVENTS_PROMPT, FAQ_PROMPT, GENERAL_PROMPT,
    INTENT_PROMPT, JOBS_FALLBACK_PROMPT, JOBS_PROMPT, MENTORSHIP_FALLBACK_PROMPT,
    MENTORSHIP_PROMPT,
};
use crate::errors::AppError;
use crate::llm_client::prompts::{ASHA_SYSTEM, STRICT_OUTPUT_SYSTEM};
use crate::llm_client::{ChatModel, LlmError};
use crate::models::chat::{ChatRequest, ChatResponse};
use crate::models::session::Turn;
use crate::scraping::{herkey, JobSource, ListingProvider, ScrapeError, Scraped};
use crate::storage::session_store::SessionStore;

/// The canned prompt behind the UI's "Job from naukri.com" button.
pub const NAUKRI_QUERY: &str = "show me current job from `naukri.com`";

/// Mentorship search ignores the user's wording.
const MENTORSHIP_QUERY: &str = "mentorship";

pub struct ChatPipeline {
    llm: Arc<dyn ChatModel>,
    listings: Arc<dyn ListingProvider>,
    sessions: Arc<SessionStore>,
    history_turns: usize,
}

impl ChatPipeline {
    pub fn new(
        llm: Arc<dyn ChatModel>,
        listings: Arc<dyn ListingProvider>,
        sessions: Arc<SessionStore>,
        history_turns: usize,
    ) -> Self {
        Self {
            llm,
            listings,
            sessions,
            history_turns,
        }
    }

    pub async fn process_message(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        request.validate()?;
        let query = request.query.trim();
        info!("Processing message for session {}", request.session_id);

        let context = self.load_context(&request.session_id).await;

        let reply = match self.check_bias(query).await?.rephrased_reply() {
            Some(rephrased) => {
                info!("Query flagged as biased; returning rephrased reply");
                rephrased
            }
            None => self.route(query, &context).await?,
        };

        Ok(self.finish(request, reply).await)
    }

    /// Naukri job listings for the request, skipping bias and intent checks.
    pub async fn process_naukri(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        request.validate()?;
        let query = request.query.trim();
        info!("Processing Naukri job request for session {}", request.session_id);

        let context = self.load_context(&request.session_id).await;
        let reply = self.answer_jobs(JobSource::Naukri, query, &context).await?;

        Ok(self.finish(request, reply).await)
    }

    async fn check_bias(&self, query: &str) -> Result<BiasVerdict, LlmError> {
        let raw = self
            .llm
            .complete(&fill(BIAS_PROMPT, &[("query", query)]), STRICT_OUTPUT_SYSTEM)
            .await?;
        Ok(parse_bias_verdict(&raw))
    }

    async fn route(&self, query: &str, context: &str) -> Result<String, LlmError> {
        let raw = self
            .llm
            .complete(&fill(INTENT_PROMPT, &[("query", query)]), STRICT_OUTPUT_SYSTEM)
            .await?;
        let intent = Intent::classify(&raw);
        info!("Classified intent: {:?} (raw: '{}')", intent, raw.trim());

        match intent {
            Intent::JobListing => {
                let source = if query.to_lowercase() == NAUKRI_QUERY {
                    JobSource::Naukri
                } else {
                    JobSource::Herkey
                };
                self.answer_jobs(source, query, context).await
            }
            Intent::Event => {
                let scraped = or_empty(
                    self.listings.events(query).await,
                    herkey::EVENTS_URL,
                    "event",
                );
                self.summarise(scraped, EVENTS_PROMPT, EVENTS_FALLBACK_PROMPT, query, context)
                    .await
            }
            Intent::Mentorship => {
                let scraped = or_empty(
                    self.listings.mentorships(MENTORSHIP_QUERY).await,
                    herkey::MENTORSHIP_URL,
                    "mentorship",
                );
                self.summarise(
                    scraped,
                    MENTORSHIP_PROMPT,
                    MENTORSHIP_FALLBACK_PROMPT,
                    query,
                    context,
                )
                .await
            }
            Intent::Faq => self.reply(FAQ_PROMPT, &[("query", query), ("context", context)]).await,
            Intent::General => {
                self.reply(GENERAL_PROMPT, &[("query", query), ("context", context)])
                    .await
            }
            Intent::Unrecognised => Ok(CLARIFY_REPLY.to_string()),
        }
    }

    async fn answer_jobs(
        &self,
        source: JobSource,
        query: &str,
        context: &str,
    ) -> Result<String, LlmError> {
        let scraped = or_empty(
            self.listings.jobs(source, query).await,
            source.page_url(),
            "job",
        );
        self.summarise(scraped, JOBS_PROMPT, JOBS_FALLBACK_PROMPT, query, context)
            .await
    }

    /// Presents scraped listings, or falls back to mock examples when none are usable.
    async fn summarise<T: Listing>(
        &self,
        scraped: Scraped<T>,
        template: &str,
        fallback: &str,
        query: &str,
        context: &str,
    ) -> Result<String, LlmError> {
        if !listings::is_valid(&scraped.items) {
            info!(
                "No usable listings among {} scraped; answering with examples",
                scraped.items.len()
            );
            return self
                .reply(fallback, &[("query", query), ("context", context)])
                .await;
        }

        let rendered = listings::render(&scraped.items);
        self.reply(
            template,
            &[
                ("query", query),
                ("context", context),
                ("listings", &rendered),
                ("url", &scraped.page_url),
            ],
        )
        .await
    }

    async fn reply(&self, template: &str, vars: &[(&str, &str)]) -> Result<String, LlmError> {
        let text = self.llm.complete(&fill(template, vars), ASHA_SYSTEM).await?;
        Ok(text.trim().to_string())
    }

    /// Recent turns rendered as a transcript. Storage trouble only costs context.
    async fn load_context(&self, session_id: &str) -> String {
        match self.sessions.recent_history(session_id, self.history_turns).await {
            Ok(turns) => render_history(&turns),
            Err(e) => {
                warn!("Could not load history for session {session_id}: {e}");
                String::new()
            }
        }
    }

    async fn finish(&self, request: &ChatRequest, reply: String) -> ChatResponse {
        let turn = Turn {
            query: request.query.trim().to_string(),
            response: reply.clone(),
        };
        if let Err(e) = self.sessions.append_turn(&request.session_id, turn).await {
            warn!("Could not record turn for session {}: {e}", request.session_id);
        }
        ChatResponse::new(reply, request.session_id.clone())
    }
}

fn or_empty<T>(result: Result<Scraped<T>, ScrapeError>, page_url: &str, kind: &str) -> Scraped<T> {
    result.unwrap_or_else(|e| {
        warn!("{kind} scrape failed: {e}");
        Scraped::empty(page_url)
    })
}

fn render_history(turns: &[Turn]) -> String {
    turns
        .iter()
        .map(|t| format!("User: {}\nAsha: {}", t.query, t.response))
        .collect::<Vec<_>>()
        .join("\n")
}
