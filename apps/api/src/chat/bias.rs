//! Gender-bias screening of incoming queries.
//!
//! The model is asked for a small JSON verdict. Anything unparseable is read
//! as "not biased" so a flaky classifier never blocks a legitimate question.

use serde::Deserialize;
use tracing::{debug, error, warn};

use crate::llm_client::strip_json_fences;

pub const DEFAULT_REPHRASE: &str =
    "I apologize, but I need to rephrase that in a more inclusive way.";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BiasVerdict {
    #[serde(default)]
    pub is_biased: bool,
    #[serde(default)]
    pub alternative_response: Option<String>,
}

impl BiasVerdict {
    /// The reply to send instead of routing the query, if it was flagged.
    pub fn rephrased_reply(&self) -> Option<String> {
        if !self.is_biased {
            return None;
        }
        let reply = self
            .alternative_response
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_REPHRASE);
        Some(reply.to_string())
    }
}

pub fn parse_bias_verdict(raw: &str) -> BiasVerdict {
    let content = strip_json_fences(raw);

    if content.is_empty() {
        warn!("Received empty content from bias check");
        return BiasVerdict::default();
    }

    match serde_json::from_str::<BiasVerdict>(content) {
        Ok(verdict) => {
            debug!("Bias verdict: {:?}", verdict);
            verdict
        }
        Err(first_err) => match embedded_object(content).map(serde_json::from_str::<BiasVerdict>) {
            Some(Ok(verdict)) => verdict,
            _ => {
                error!("Bias check JSON parse error. Content: '{content}'. Error: {first_err}");
                BiasVerdict::default()
            }
        },
    }
}

/// The outermost `{...}` span, for replies that wrap the JSON in prose.
fn embedded_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}
