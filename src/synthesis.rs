//! Answer synthesis from a question and retrieved context.
//!
//! [`AnswerSynthesizer`] is the narrow interface over a generative text
//! service; [`ChatSynthesizer`] implements it against a chat-style HTTP
//! endpoint that accepts role-tagged messages and returns a raw text body.
//!
//! Service failures surface as typed
//! [`QaError::SynthesisService`](crate::QaError::SynthesisService) errors so
//! callers can tell "the model said it doesn't know" (a valid answer string)
//! apart from "the service is down".

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, error};

use crate::error::{QaError, Result};

/// The fixed system instruction sent before the composed prompt.
pub const SYSTEM_INSTRUCTION: &str = "act as an expert question answering system";

/// Default request timeout for the synthesis service.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Compose the question-answering prompt from context and question.
///
/// The layout is fixed: the context block first, then a blank line, then
/// the grounding instruction and the question.
pub fn compose_prompt(question: &str, context: &[String]) -> String {
    let context_block = context.join("\n");
    format!(
        "Context information is below.\n\
         ---------------------\n\
         {context_block}\n\
         ---------------------\n\
         \n\
         Given the context information and not prior knowledge, answer the query.\n\
         Query: {question}\n\
         Answer:"
    )
}

/// A service that produces a natural-language answer from a question and
/// retrieved context units.
#[async_trait]
pub trait AnswerSynthesizer: Send + Sync {
    /// Synthesize an answer grounded in `context`.
    ///
    /// "I don't know" responses are valid answers, not errors.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::SynthesisService`](crate::QaError::SynthesisService)
    /// on network or service failure.
    async fn synthesize(&self, question: &str, context: &[String]) -> Result<String>;
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    messages: Vec<ChatMessage<'a>>,
}

/// An [`AnswerSynthesizer`] backed by a chat-style HTTP endpoint.
///
/// Sends two role-tagged messages — the `assistant` system instruction and
/// the `user` composed prompt — and returns the response body as the raw
/// answer text.
pub struct ChatSynthesizer {
    client: reqwest::Client,
    endpoint: String,
}

impl ChatSynthesizer {
    /// Create a new synthesizer posting to `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::SynthesisService`] if the endpoint is empty or
    /// the HTTP client cannot be constructed.
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        Self::with_timeout(endpoint, DEFAULT_TIMEOUT)
    }

    /// Create a new synthesizer with an explicit request timeout.
    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let endpoint = endpoint.into();
        if endpoint.is_empty() {
            return Err(QaError::SynthesisService {
                provider: "chat".into(),
                message: "endpoint must not be empty".into(),
            });
        }
        let client = reqwest::Client::builder().timeout(timeout).build().map_err(|e| {
            QaError::SynthesisService {
                provider: "chat".into(),
                message: format!("failed to build HTTP client: {e}"),
            }
        })?;
        Ok(Self { client, endpoint })
    }

    /// Create a new synthesizer from the `SYNTHESIS_ENDPOINT` environment
    /// variable.
    pub fn from_env() -> Result<Self> {
        let endpoint =
            std::env::var("SYNTHESIS_ENDPOINT").map_err(|_| QaError::SynthesisService {
                provider: "chat".into(),
                message: "SYNTHESIS_ENDPOINT environment variable not set".into(),
            })?;
        Self::new(endpoint)
    }
}

#[async_trait]
impl AnswerSynthesizer for ChatSynthesizer {
    async fn synthesize(&self, question: &str, context: &[String]) -> Result<String> {
        let prompt = compose_prompt(question, context);
        let request = ChatRequest {
            messages: vec![
                ChatMessage { role: "assistant", content: SYSTEM_INSTRUCTION },
                ChatMessage { role: "user", content: &prompt },
            ],
        };

        debug!(context_units = context.len(), "sending synthesis request");

        let response =
            self.client.post(&self.endpoint).json(&request).send().await.map_err(|e| {
                error!(error = %e, "synthesis request failed");
                QaError::SynthesisService {
                    provider: "chat".into(),
                    message: format!("request failed: {e}"),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(%status, "synthesis service error");
            return Err(QaError::SynthesisService {
                provider: "chat".into(),
                message: format!("service returned {status}: {body}"),
            });
        }

        response.text().await.map_err(|e| QaError::SynthesisService {
            provider: "chat".into(),
            message: format!("failed to read response body: {e}"),
        })
    }
}
