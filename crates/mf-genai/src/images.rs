//! Image generation (Imagen `:predict`) and image editing/compositing
//! (image-capable Gemini models over `:generateContent`).

use serde::{Deserialize, Serialize};

use mf_core::models::GenModel;
use mf_core::{Error, Result};

use crate::client::{
    decode_base64, AspectRatio, Content, GenAiClient, GenerateContentRequest, GenerationConfig,
    UserPart,
};

/// A decoded inline image payload.
#[derive(Debug, Clone)]
pub struct InlineImage {
    pub bytes: Vec<u8>,
    pub mime: String,
}

#[derive(Debug, Clone)]
pub struct ImageGenerationRequest {
    pub model: GenModel,
    pub prompt: String,
    pub count: u32,
    pub aspect_ratio: AspectRatio,
}

#[derive(Debug, Clone)]
pub struct ImageEditRequest {
    pub model: GenModel,
    /// Text instructions plus any reference images, in order.
    pub parts: Vec<UserPart>,
}

impl GenAiClient {
    /// Text-to-image over the `:predict` endpoint. Returns one inline image
    /// per requested sample.
    pub async fn generate_images(&self, req: ImageGenerationRequest) -> Result<Vec<InlineImage>> {
        let body = PredictRequest {
            instances: vec![PredictInstance { prompt: req.prompt }],
            parameters: PredictParameters {
                sample_count: req.count,
                aspect_ratio: req.aspect_ratio.as_str(),
                output_mime_type: "image/png",
            },
        };
        let value = self
            .post_json(&format!("/v1beta/models/{}:predict", req.model.id()), &body)
            .await?;
        let response: PredictResponse = serde_json::from_value(value)
            .map_err(|e| Error::MalformedResponse(format!("Phản hồi không đúng định dạng: {e}")))?;

        if response.predictions.is_empty() {
            return Err(Error::MalformedResponse(
                "Tạo ảnh thành công, nhưng không có dữ liệu ảnh trả về.".into(),
            ));
        }

        response
            .predictions
            .into_iter()
            .map(|p| {
                let data = p.bytes_base64_encoded.ok_or_else(|| {
                    Error::MalformedResponse(
                        "Tạo ảnh thành công, nhưng không có dữ liệu ảnh trả về.".into(),
                    )
                })?;
                Ok(InlineImage {
                    bytes: decode_base64(&data)?,
                    mime: p.mime_type.unwrap_or_else(|| "image/png".into()),
                })
            })
            .collect()
    }

    /// Image editing/compositing: reference images plus instructions in, a
    /// single generated image out.
    pub async fn edit_image(&self, req: ImageEditRequest) -> Result<InlineImage> {
        let body = GenerateContentRequest {
            system_instruction: None,
            contents: vec![Content::from_parts(req.parts)],
            generation_config: Some(GenerationConfig {
                response_modalities: Some(vec!["IMAGE".into()]),
                ..GenerationConfig::default()
            }),
        };
        let response = self.generate_content(req.model, &body).await?;
        let inline = response.first_inline_data().ok_or_else(|| {
            Error::MalformedResponse("Không nhận được dữ liệu ảnh hợp lệ từ API.".into())
        })?;
        Ok(InlineImage {
            bytes: decode_base64(&inline.data)?,
            mime: inline.mime_type.clone(),
        })
    }
}

#[derive(Debug, Serialize)]
struct PredictRequest {
    instances: Vec<PredictInstance>,
    parameters: PredictParameters,
}

#[derive(Debug, Serialize)]
struct PredictInstance {
    prompt: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PredictParameters {
    sample_count: u32,
    aspect_ratio: &'static str,
    output_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    #[serde(default)]
    bytes_base64_encoded: Option<String>,
    #[serde(default)]
    mime_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predict_parameters_serialization() {
        let body = PredictRequest {
            instances: vec![PredictInstance {
                prompt: "a cat".into(),
            }],
            parameters: PredictParameters {
                sample_count: 2,
                aspect_ratio: AspectRatio::Portrait.as_str(),
                output_mime_type: "image/png",
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["instances"][0]["prompt"], "a cat");
        assert_eq!(json["parameters"]["sampleCount"], 2);
        assert_eq!(json["parameters"]["aspectRatio"], "9:16");
        assert_eq!(json["parameters"]["outputMimeType"], "image/png");
    }

    #[test]
    fn test_prediction_parsing() {
        let raw = r#"{"predictions":[{"bytesBase64Encoded":"AQID","mimeType":"image/png"}]}"#;
        let parsed: PredictResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.predictions.len(), 1);
        assert_eq!(
            decode_base64(parsed.predictions[0].bytes_base64_encoded.as_deref().unwrap()).unwrap(),
            vec![1, 2, 3]
        );
    }
}
