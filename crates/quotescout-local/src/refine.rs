//! Refinement boundary: hand the candidate block to a semantic refinement
//! service and normalize whatever comes back.
//!
//! The service is fallible by contract. A malformed or non-JSON response (or
//! a failed call) recovers locally: the selected sentences become the quotes
//! with a generic relevance string. Nothing on this path fails the request.

use quotescout_core::{
    parse_raw_quotes, Error, Quote, RefinementBackend, Result,
};
use serde::{Deserialize, Serialize};

/// Relevance string attached when the service did not provide one.
pub const FALLBACK_RELEVANCE: &str = "matched the topic by keyword and similarity scoring";

/// Quotes used when refinement is absent or unusable: the locally selected
/// sentences, in reading order.
pub fn fallback_quotes(selected: &[String]) -> Vec<Quote> {
    selected
        .iter()
        .map(|s| Quote {
            quote: s.clone(),
            relevance: FALLBACK_RELEVANCE.to_string(),
        })
        .collect()
}

/// Run refinement when a backend is present; fall back to the selected
/// sentences on any failure. Returns the quotes and whether they are refined.
pub async fn refine_or_fallback(
    backend: Option<&dyn RefinementBackend>,
    topic: &str,
    candidate_block: &str,
    ocr_hint: bool,
    selected: &[String],
) -> (Vec<Quote>, bool) {
    let Some(backend) = backend else {
        return (fallback_quotes(selected), false);
    };
    let raw = match backend.refine(topic, candidate_block, ocr_hint).await {
        Ok(raw) => raw,
        Err(_) => return (fallback_quotes(selected), false),
    };
    match parse_raw_quotes(&raw) {
        Some(parsed) if !parsed.is_empty() => {
            let quotes = parsed
                .into_iter()
                .map(|q| q.into_quote(FALLBACK_RELEVANCE))
                .collect();
            (quotes, true)
        }
        _ => (fallback_quotes(selected), false),
    }
}

fn env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// OpenAI-compatible chat-completions refinement client.
///
/// Opt-in: without `QUOTESCOUT_REFINER_BASE_URL` construction fails with
/// `NotConfigured` rather than quietly calling anywhere.
#[derive(Debug, Clone)]
pub struct HttpRefiner {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    timeout_ms: u64,
}

const DEFAULT_REFINE_TIMEOUT_MS: u64 = 30_000;

impl HttpRefiner {
    pub fn from_env(client: reqwest::Client) -> Result<Self> {
        let base_url = env("QUOTESCOUT_REFINER_BASE_URL")
            .ok_or_else(|| Error::NotConfigured("missing QUOTESCOUT_REFINER_BASE_URL".to_string()))?;
        let model = env("QUOTESCOUT_REFINER_MODEL")
            .ok_or_else(|| Error::NotConfigured("missing QUOTESCOUT_REFINER_MODEL".to_string()))?;
        Ok(Self {
            client,
            base_url,
            api_key: env("QUOTESCOUT_REFINER_API_KEY"),
            model,
            timeout_ms: DEFAULT_REFINE_TIMEOUT_MS,
        })
    }

    pub fn new(client: reqwest::Client, base_url: String, model: String) -> Self {
        Self {
            client,
            base_url,
            api_key: None,
            model,
            timeout_ms: DEFAULT_REFINE_TIMEOUT_MS,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint_chat_completions(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.base_url.trim_end_matches('/')
        )
    }

    fn user_prompt(topic: &str, candidate_block: &str, ocr_hint: bool) -> String {
        let ocr_note = if ocr_hint {
            "\nThe text came from OCR; tolerate recognition artifacts when matching quotes."
        } else {
            ""
        };
        format!(
            "Topic: {topic}\n\nCandidate sentences:\n{candidate_block}\n\n\
             Return a JSON array where each element is {{\"quote\": \"...\", \"relevance\": \"...\"}}. \
             Quotes must be verbatim sentences from the candidates, ordered most relevant first.{ocr_note}"
        )
    }
}

const SYSTEM_PROMPT: &str = "You select verbatim quotations relevant to a topic. \
Answer with only a JSON array; no prose before or after it.";

#[async_trait::async_trait]
impl RefinementBackend for HttpRefiner {
    fn name(&self) -> &'static str {
        "openai_compat"
    }

    async fn refine(&self, topic: &str, candidate_block: &str, ocr_hint: bool) -> Result<String> {
        let req = ChatCompletionsRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                Message {
                    role: "user".to_string(),
                    content: Self::user_prompt(topic, candidate_block, ocr_hint),
                },
            ],
            stream: Some(false),
        };

        let mut rb = self
            .client
            .post(self.endpoint_chat_completions())
            .timeout(std::time::Duration::from_millis(self.timeout_ms))
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        if let Some(k) = &self.api_key {
            rb = rb.header(reqwest::header::AUTHORIZATION, format!("Bearer {k}"));
        }

        let resp = rb
            .json(&req)
            .send()
            .await
            .map_err(|e| Error::Refinement(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Refinement(format!(
                "chat.completions HTTP {status}"
            )));
        }

        let parsed: ChatCompletionsResponse =
            resp.json().await.map_err(|e| Error::Refinement(e.to_string()))?;
        Ok(parsed
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .unwrap_or_default())
    }
}

#[derive(Debug, Clone, Serialize)]
struct ChatCompletionsRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatCompletionsResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct ChoiceMessage {
    content: String,
}
