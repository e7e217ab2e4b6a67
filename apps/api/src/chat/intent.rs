use serde::Serialize;

pub const CLARIFY_REPLY: &str = "I can help you with job listings, events, mentorship programs, \
and general questions. Could you please clarify what you're looking for?";

/// What the user is asking for, as labelled by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    JobListing,
    Event,
    Mentorship,
    Faq,
    /// The classifier's `unknown` label: answered as a general question.
    General,
    /// The classifier replied with something outside the label set.
    Unrecognised,
}

impl Intent {
    /// Maps the classifier's one-word reply to an intent.
    pub fn classify(raw: &str) -> Self {
        let label = raw
            .trim()
            .trim_matches(|c: char| matches!(c, '"' | '\'' | '`' | '.'))
            .trim()
            .to_lowercase();

        match label.as_str() {
            "job_listing" => Intent::JobListing,
            "event" => Intent::Event,
            "mentorship" => Intent::Mentorship,
            "faq" => Intent::Faq,
            "unknown" => Intent::General,
            _ => Intent::Unrecognised,
        }
    }
}
