//! Video generation: submit a long-running job, poll its operation, download
//! the finished asset.

use serde::{Deserialize, Serialize};

use mf_core::models::GenModel;
use mf_core::{Error, Result};

use crate::client::{classify_http_error, encode_base64, AspectRatio, GenAiClient};

#[derive(Debug, Clone)]
pub struct VideoGenerationRequest {
    pub model: GenModel,
    /// Optional for image-to-video, required for text-to-video.
    pub prompt: String,
    /// Reference image bytes + MIME type for image-to-video.
    pub image: Option<(Vec<u8>, String)>,
    pub aspect_ratio: AspectRatio,
    pub resolution: String,
    pub sample_count: u32,
}

/// Opaque reference to a provider-side asynchronous job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationHandle {
    pub name: String,
}

/// A snapshot of a long-running operation's state.
#[derive(Debug, Clone)]
pub struct VideoOperation {
    pub done: bool,
    pub uri: Option<String>,
}

impl GenAiClient {
    /// Submit a generation job; the returned handle must be polled until the
    /// provider reports completion.
    pub async fn generate_video(&self, req: VideoGenerationRequest) -> Result<OperationHandle> {
        let body = PredictLongRunningRequest {
            instances: vec![VideoInstance {
                prompt: req.prompt,
                image: req.image.map(|(bytes, mime_type)| ImageBytes {
                    bytes_base64_encoded: encode_base64(&bytes),
                    mime_type,
                }),
            }],
            parameters: VideoParameters {
                aspect_ratio: req.aspect_ratio.as_str(),
                resolution: req.resolution,
                sample_count: req.sample_count,
            },
        };
        let value = self
            .post_json(
                &format!("/v1beta/models/{}:predictLongRunning", req.model.id()),
                &body,
            )
            .await?;
        let submitted: OperationName = serde_json::from_value(value).map_err(|e| {
            Error::MalformedResponse(format!("Phản hồi không chứa operation hợp lệ: {e}"))
        })?;
        Ok(OperationHandle {
            name: submitted.name,
        })
    }

    /// One poll of the operation's current state. A terminal provider error
    /// inside the operation is classified like an HTTP error.
    pub async fn get_video_operation(&self, handle: &OperationHandle) -> Result<VideoOperation> {
        let value = self.get_json(&format!("/v1beta/{}", handle.name)).await?;
        let raw: RawOperation = serde_json::from_value(value).map_err(|e| {
            Error::MalformedResponse(format!("Phản hồi operation không đúng định dạng: {e}"))
        })?;

        if let Some(op_error) = raw.error {
            let body = serde_json::json!({ "error": op_error }).to_string();
            return Err(classify_http_error(op_error_status(&body), &body));
        }

        let uri = raw.response.as_ref().and_then(|r| r.first_uri());
        Ok(VideoOperation {
            done: raw.done,
            uri,
        })
    }

    /// Fetch the generated asset. Download links require the credential as a
    /// `key` query parameter.
    pub async fn download_file(&self, uri: &str) -> Result<Vec<u8>> {
        let separator = if uri.contains('?') { '&' } else { '?' };
        let url = format!("{uri}{separator}key={}", self.credential().expose());
        self.get_bytes(&url).await
    }
}

fn op_error_status(body: &str) -> u16 {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["code"].as_u64())
        .unwrap_or(500) as u16
}

#[derive(Debug, Serialize)]
struct PredictLongRunningRequest {
    instances: Vec<VideoInstance>,
    parameters: VideoParameters,
}

#[derive(Debug, Serialize)]
struct VideoInstance {
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<ImageBytes>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageBytes {
    bytes_base64_encoded: String,
    mime_type: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VideoParameters {
    aspect_ratio: &'static str,
    resolution: String,
    sample_count: u32,
}

#[derive(Debug, Deserialize)]
struct OperationName {
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawOperation {
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<serde_json::Value>,
    #[serde(default)]
    response: Option<OperationResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OperationResponse {
    #[serde(default)]
    generate_video_response: Option<GenerateVideoResponse>,
}

impl OperationResponse {
    fn first_uri(&self) -> Option<String> {
        self.generate_video_response
            .as_ref()?
            .generated_samples
            .first()?
            .video
            .as_ref()
            .map(|v| v.uri.clone())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateVideoResponse {
    #[serde(default)]
    generated_samples: Vec<GeneratedSample>,
}

#[derive(Debug, Deserialize)]
struct GeneratedSample {
    #[serde(default)]
    video: Option<VideoRef>,
}

#[derive(Debug, Deserialize)]
struct VideoRef {
    uri: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_operation_parses() {
        let raw: RawOperation =
            serde_json::from_str(r#"{"name":"models/veo/operations/abc","done":false}"#).unwrap();
        assert!(!raw.done);
        assert!(raw.response.is_none());
    }

    #[test]
    fn test_finished_operation_exposes_uri() {
        let raw: RawOperation = serde_json::from_str(
            r#"{
                "name": "models/veo/operations/abc",
                "done": true,
                "response": {
                    "generateVideoResponse": {
                        "generatedSamples": [
                            {"video": {"uri": "https://files.example/video.mp4?alt=media"}}
                        ]
                    }
                }
            }"#,
        )
        .unwrap();
        assert!(raw.done);
        assert_eq!(
            raw.response.unwrap().first_uri().as_deref(),
            Some("https://files.example/video.mp4?alt=media")
        );
    }

    #[test]
    fn test_done_without_samples_has_no_uri() {
        let raw: RawOperation = serde_json::from_str(
            r#"{"done": true, "response": {"generateVideoResponse": {"generatedSamples": []}}}"#,
        )
        .unwrap();
        assert!(raw.response.unwrap().first_uri().is_none());
    }

    #[test]
    fn test_instance_serialization_with_image() {
        let body = PredictLongRunningRequest {
            instances: vec![VideoInstance {
                prompt: "a storm".into(),
                image: Some(ImageBytes {
                    bytes_base64_encoded: encode_base64(&[9, 9]),
                    mime_type: "image/jpeg".into(),
                }),
            }],
            parameters: VideoParameters {
                aspect_ratio: AspectRatio::Landscape.as_str(),
                resolution: "720p".into(),
                sample_count: 1,
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["instances"][0]["prompt"], "a storm");
        assert_eq!(json["instances"][0]["image"]["mimeType"], "image/jpeg");
        assert_eq!(json["parameters"]["aspectRatio"], "16:9");
        assert_eq!(json["parameters"]["resolution"], "720p");
    }
}
