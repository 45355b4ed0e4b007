// crates/mf-genai/src/client.rs

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use mf_core::models::GenModel;
use mf_core::{Error, Result};

use crate::schema::Schema;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// An API credential. Read-only shared configuration: it is attached to the
/// single outgoing request and never persisted or logged.
#[derive(Clone)]
pub struct Credential(String);

impl Credential {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub(crate) fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AspectRatio {
    Square,
    Landscape,
    Portrait,
}

impl AspectRatio {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Square => "1:1",
            Self::Landscape => "16:9",
            Self::Portrait => "9:16",
        }
    }
}

/// One piece of a user turn: plain text or an inline reference image.
#[derive(Debug, Clone)]
pub enum UserPart {
    Text(String),
    Image { bytes: Vec<u8>, mime: String },
}

/// Async client for the generative-language REST API.
#[derive(Debug, Clone)]
pub struct GenAiClient {
    http: reqwest::Client,
    credential: Credential,
    base_url: String,
}

impl GenAiClient {
    pub fn new(credential: Credential) -> Self {
        Self::with_base_url(credential, DEFAULT_BASE_URL)
    }

    /// Point the client at a different host (test servers).
    pub fn with_base_url(credential: Credential, base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            credential,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub(crate) fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Plain text generation.
    pub async fn generate_text(
        &self,
        model: GenModel,
        system_instruction: Option<&str>,
        prompt: &str,
    ) -> Result<String> {
        let body = GenerateContentRequest {
            system_instruction: system_instruction.map(Content::text),
            contents: vec![Content::text(prompt)],
            generation_config: None,
        };
        let response = self.generate_content(model, &body).await?;
        response
            .joined_text()
            .ok_or_else(|| Error::MalformedResponse("Phản hồi không chứa văn bản nào.".into()))
    }

    /// Schema-constrained JSON generation. Returns the parsed value; callers
    /// deserialize into their own types and downgrade mismatches to
    /// `MalformedResponse` rather than trusting field presence.
    pub async fn generate_structured(
        &self,
        model: GenModel,
        system_instruction: Option<&str>,
        parts: Vec<UserPart>,
        schema: Schema,
    ) -> Result<Value> {
        let body = GenerateContentRequest {
            system_instruction: system_instruction.map(Content::text),
            contents: vec![Content::from_parts(parts)],
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".into()),
                response_schema: Some(schema),
                ..GenerationConfig::default()
            }),
        };
        let response = self.generate_content(model, &body).await?;
        let text = response
            .joined_text()
            .ok_or_else(|| Error::MalformedResponse("Phản hồi không chứa văn bản nào.".into()))?;
        serde_json::from_str(text.trim()).map_err(|e| {
            Error::MalformedResponse(format!("Phản hồi JSON không hợp lệ ({e}): {text}"))
        })
    }

    pub(crate) async fn generate_content(
        &self,
        model: GenModel,
        body: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let value = self
            .post_json(
                &format!("/v1beta/models/{}:generateContent", model.id()),
                body,
            )
            .await?;
        serde_json::from_value(value)
            .map_err(|e| Error::MalformedResponse(format!("Phản hồi không đúng định dạng: {e}")))
    }

    pub(crate) async fn post_json(&self, path: &str, body: &impl Serialize) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "genai request");
        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", self.credential.expose())
            .json(body)
            .send()
            .await
            .map_err(|e| Error::NetworkFailure(e.to_string()))?;
        Self::read_json(response).await
    }

    pub(crate) async fn get_json(&self, path: &str) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .get(&url)
            .header("x-goog-api-key", self.credential.expose())
            .send()
            .await
            .map_err(|e| Error::NetworkFailure(e.to_string()))?;
        Self::read_json(response).await
    }

    pub(crate) async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| Error::NetworkFailure(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_http_error(status.as_u16(), &body));
        }
        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| Error::NetworkFailure(e.to_string()))
    }

    async fn read_json(response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::NetworkFailure(e.to_string()))?;
        if !status.is_success() {
            return Err(classify_http_error(status.as_u16(), &text));
        }
        serde_json::from_str(&text)
            .map_err(|e| Error::MalformedResponse(format!("Phản hồi không phải JSON hợp lệ: {e}")))
    }
}

/// Map a provider error response onto the domain taxonomy.
///
/// The envelope is `{"error": {"code", "status", "message"}}`; when it does
/// not parse, the raw body stands in for the message.
pub(crate) fn classify_http_error(status: u16, body: &str) -> Error {
    let envelope: Option<ErrorEnvelope> = serde_json::from_str(body).ok();
    let (api_status, message) = envelope
        .map(|e| (e.error.status, e.error.message))
        .unwrap_or_default();
    let message = message.unwrap_or_else(|| body.trim().to_string());
    let api_status = api_status.unwrap_or_default();

    if message.contains("API key not valid")
        || message.contains("API_KEY_INVALID")
        || message.contains("Requested entity was not found")
        || message.contains("accessible to billed users")
        || status == 401
        || status == 403
    {
        Error::InvalidCredential(message)
    } else if status == 429
        || api_status == "RESOURCE_EXHAUSTED"
        || message.to_lowercase().contains("quota")
    {
        Error::QuotaExceeded(message)
    } else if status == 503 || api_status == "UNAVAILABLE" {
        Error::ServiceUnavailable(message)
    } else {
        Error::Unknown(message)
    }
}

pub(crate) fn encode_base64(bytes: &[u8]) -> String {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

pub(crate) fn decode_base64(data: &str) -> Result<Vec<u8>> {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD
        .decode(data)
        .map_err(|e| Error::MalformedResponse(format!("Dữ liệu base64 không hợp lệ: {e}")))
}

#[derive(Debug, Deserialize, Default)]
struct ErrorEnvelope {
    #[serde(default)]
    error: ErrorDetail,
}

#[derive(Debug, Deserialize, Default)]
struct ErrorDetail {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

// ---- request/response plumbing shared by the endpoint modules ----

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
pub(crate) struct Content {
    pub parts: Vec<Part>,
}

impl Content {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            parts: vec![Part {
                text: Some(text.into()),
                inline_data: None,
            }],
        }
    }

    pub fn from_parts(parts: Vec<UserPart>) -> Self {
        Self {
            parts: parts
                .into_iter()
                .map(|p| match p {
                    UserPart::Text(text) => Part {
                        text: Some(text),
                        inline_data: None,
                    },
                    UserPart::Image { bytes, mime } => Part {
                        text: None,
                        inline_data: Some(InlineData {
                            mime_type: mime,
                            data: encode_base64(&bytes),
                        }),
                    },
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(rename = "inlineData", skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize)]
pub(crate) struct InlineData {
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    /// base64-encoded payload
    pub data: String,
}

#[derive(Debug, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<Schema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_modalities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speech_config: Option<crate::speech::SpeechConfig>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate's parts, if any.
    pub fn joined_text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let joined: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        (!joined.is_empty()).then_some(joined)
    }

    /// First inline binary payload across the first candidate's parts.
    pub fn first_inline_data(&self) -> Option<&InlineDataOut> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .iter()
            .find_map(|p| p.inline_data.as_ref())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<PartOut>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PartOut {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, rename = "inlineData")]
    pub inline_data: Option<InlineDataOut>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct InlineDataOut {
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    pub data: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_invalid_key() {
        let body = r#"{"error":{"code":400,"status":"INVALID_ARGUMENT","message":"API key not valid. Please pass a valid API key."}}"#;
        assert!(matches!(
            classify_http_error(400, body),
            Error::InvalidCredential(_)
        ));
    }

    #[test]
    fn test_classify_entity_not_found_as_credential() {
        let body = r#"{"error":{"code":404,"status":"NOT_FOUND","message":"Requested entity was not found."}}"#;
        assert!(matches!(
            classify_http_error(404, body),
            Error::InvalidCredential(_)
        ));
    }

    #[test]
    fn test_classify_quota() {
        let body = r#"{"error":{"code":429,"status":"RESOURCE_EXHAUSTED","message":"You exceeded your current quota."}}"#;
        assert!(matches!(
            classify_http_error(429, body),
            Error::QuotaExceeded(_)
        ));
    }

    #[test]
    fn test_classify_overloaded() {
        let body = r#"{"error":{"code":503,"status":"UNAVAILABLE","message":"The model is overloaded."}}"#;
        assert!(matches!(
            classify_http_error(503, body),
            Error::ServiceUnavailable(_)
        ));
    }

    #[test]
    fn test_classify_unparseable_body_falls_through() {
        let err = classify_http_error(500, "<html>oops</html>");
        match err {
            Error::Unknown(msg) => assert_eq!(msg, "<html>oops</html>"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_request_serialization_shape() {
        let body = GenerateContentRequest {
            system_instruction: Some(Content::text("be terse")),
            contents: vec![Content::from_parts(vec![
                UserPart::Text("hello".into()),
                UserPart::Image {
                    bytes: vec![1, 2, 3],
                    mime: "image/jpeg".into(),
                },
            ])],
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".into()),
                ..GenerationConfig::default()
            }),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "be terse");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(
            json["contents"][0]["parts"][1]["inlineData"]["mimeType"],
            "image/jpeg"
        );
        assert_eq!(json["generationConfig"]["responseMimeType"], "application/json");
        assert!(json["generationConfig"].get("responseSchema").is_none());
    }

    #[test]
    fn test_joined_text_concatenates_parts() {
        let raw = r#"{"candidates":[{"content":{"parts":[{"text":"Hello "},{"text":"world"}]}}]}"#;
        let response: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.joined_text().unwrap(), "Hello world");
    }

    #[test]
    fn test_empty_candidates_yield_none() {
        let response: GenerateContentResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert!(response.joined_text().is_none());
        assert!(response.first_inline_data().is_none());
    }

    #[test]
    fn test_credential_debug_redacted() {
        let cred = Credential::new("super-secret");
        assert_eq!(format!("{cred:?}"), "Credential(***)");
    }
}
