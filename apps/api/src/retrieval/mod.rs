//! Top-1 document lookup over the JSON files in the data directory.
//!
//! Documents are embedded once at startup and kept in memory; a query embeds
//! the question and returns the single closest document verbatim.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::retrieval::embedding::{magnitude, EmbeddingError, EmbeddingProvider};

pub mod embedding;
pub mod handlers;
pub mod loader;

/// Returned when nothing relevant is found.
pub const NO_MATCH: &str = "none";

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Pretty-printed JSON of one record.
    pub content: String,
    /// File the record came from.
    pub source: String,
}

impl Document {
    fn from_json(value: &Value, source: &str) -> Self {
        Self {
            content: serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string()),
            source: source.to_string(),
        }
    }
}

pub struct RetrievalStore {
    documents: Vec<Document>,
    vectors: Vec<Vec<f32>>,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl RetrievalStore {
    pub fn build(
        documents: Vec<Document>,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self, EmbeddingError> {
        let texts: Vec<String> = documents.iter().map(|d| d.content.clone()).collect();
        let vectors = if texts.is_empty() {
            Vec::new()
        } else {
            embedder.embed(&texts)?
        };
        check_dims(&vectors, embedder.dim())?;

        info!("Retrieval store ready with {} document(s)", documents.len());
        Ok(Self {
            documents,
            vectors,
            embedder,
        })
    }

    /// Content of the most similar document, or `"none"`.
    pub fn query(&self, question: &str) -> String {
        match self.best_match(question) {
            Ok(Some(doc)) => {
                debug!("Best match for '{question}' from {}", doc.source);
                doc.content.clone()
            }
            Ok(None) => {
                debug!("No relevant documents found for question: {question}");
                NO_MATCH.to_string()
            }
            Err(e) => {
                warn!("Error querying retrieval store: {e}");
                NO_MATCH.to_string()
            }
        }
    }

    /// The highest-scoring document, earliest on ties. A document must score
    /// above zero to count.
    fn best_match(&self, question: &str) -> Result<Option<&Document>, EmbeddingError> {
        if self.documents.is_empty() {
            return Ok(None);
        }
        let query = self
            .embedder
            .embed(&[question.to_string()])?
            .into_iter()
            .next()
            .ok_or(EmbeddingError::InvalidDimension {
                expected: self.embedder.dim(),
                got: 0,
            })?;
        check_dims(std::slice::from_ref(&query), self.embedder.dim())?;

        let mut best: Option<(f32, &Document)> = None;
        for (doc, vector) in self.documents.iter().zip(&self.vectors) {
            let score = similarity(vector, &query);
            if score > best.map_or(0.0, |(top, _)| top) {
                best = Some((score, doc));
            }
        }
        Ok(best.map(|(_, doc)| doc))
    }
}

/// Cosine of the angle between two vectors. Zero-length or mismatched
/// vectors score 0.
fn similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let norms = magnitude(a) * magnitude(b);
    if norms == 0.0 {
        return 0.0;
    }
    a.iter().zip(b).map(|(x, y)| x * y).sum::<f32>() / norms
}

fn check_dims(vectors: &[Vec<f32>], expected: usize) -> Result<(), EmbeddingError> {
    match vectors.iter().find(|v| v.len() != expected) {
        Some(v) => Err(EmbeddingError::InvalidDimension {
            expected,
            got: v.len(),
        }),
        None => Ok(()),
    }
}
