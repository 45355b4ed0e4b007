// crates/mf-genai/src/openai.rs

//! Minimal OpenAI chat adapter. Only the script writer offers an OpenAI
//! provider, and only for JSON-object completions, so this stays small.

use serde::{Deserialize, Serialize};

use mf_core::{Error, Result};

use crate::client::Credential;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    credential: Credential,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(credential: Credential) -> Self {
        Self::with_base_url(credential, DEFAULT_OPENAI_BASE_URL)
    }

    pub fn with_base_url(credential: Credential, base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            credential,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// One chat completion forced into JSON-object mode; returns the raw
    /// message content for the caller to parse.
    pub async fn chat_json(&self, model: &str, system: &str, user: &str) -> Result<String> {
        let body = ChatRequest {
            model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        };

        let response = self
            .http
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(self.credential.expose())
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::NetworkFailure(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::NetworkFailure(e.to_string()))?;
        if !status.is_success() {
            return Err(classify_openai_error(status.as_u16(), &text));
        }

        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| Error::MalformedResponse(format!("Phản hồi không đúng định dạng: {e}")))?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| Error::MalformedResponse("Phản hồi không chứa lựa chọn nào.".into()))
    }
}

pub(crate) fn classify_openai_error(status: u16, body: &str) -> Error {
    let message = serde_json::from_str::<OpenAiErrorEnvelope>(body)
        .ok()
        .and_then(|e| e.error.message)
        .unwrap_or_else(|| format!("HTTP error! status: {status}"));

    if message.contains("Incorrect API key") || status == 401 {
        Error::InvalidCredential(message)
    } else if message.to_lowercase().contains("rate limit") || status == 429 {
        Error::QuotaExceeded(message)
    } else {
        Error::Unknown(message)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorEnvelope {
    #[serde(default)]
    error: OpenAiErrorDetail,
}

#[derive(Debug, Deserialize, Default)]
struct OpenAiErrorDetail {
    #[serde(default)]
    message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incorrect_key_classified() {
        let body = r#"{"error":{"message":"Incorrect API key provided: sk-..."}}"#;
        assert!(matches!(
            classify_openai_error(401, body),
            Error::InvalidCredential(_)
        ));
    }

    #[test]
    fn test_rate_limit_classified() {
        let body = r#"{"error":{"message":"Rate limit reached for gpt-4o"}}"#;
        assert!(matches!(
            classify_openai_error(429, body),
            Error::QuotaExceeded(_)
        ));
    }

    #[test]
    fn test_fallback_message_mentions_status() {
        match classify_openai_error(500, "not json") {
            Error::Unknown(msg) => assert!(msg.contains("500")),
            other => panic!("unexpected {other:?}"),
        }
    }
}
