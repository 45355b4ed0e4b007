//! Speech synthesis. The provider returns inline base64 raw PCM (24 kHz,
//! mono, 16-bit); WAV framing happens downstream in `mf_core::wav`.

use serde::Serialize;

use mf_core::models::GenModel;
use mf_core::{Error, Result};

use crate::client::{
    decode_base64, Content, GenAiClient, GenerateContentRequest, GenerationConfig,
};

#[derive(Debug, Clone)]
pub struct SpeechRequest {
    pub model: GenModel,
    /// Full prompt including the embedded style directive, e.g.
    /// `Đọc với giọng kể chuyện ma: "..."`.
    pub text: String,
    /// Prebuilt voice name (see `mf_core::models::TTS_VOICES`).
    pub voice: String,
}

impl GenAiClient {
    /// Synthesize speech and return the raw PCM payload.
    pub async fn synthesize_speech(&self, req: SpeechRequest) -> Result<Vec<u8>> {
        let body = GenerateContentRequest {
            system_instruction: None,
            contents: vec![Content::text(req.text)],
            generation_config: Some(GenerationConfig {
                response_modalities: Some(vec!["AUDIO".into()]),
                speech_config: Some(SpeechConfig {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig {
                            voice_name: req.voice,
                        },
                    },
                }),
                ..GenerationConfig::default()
            }),
        };
        let response = self.generate_content(req.model, &body).await?;
        let inline = response.first_inline_data().ok_or_else(|| {
            Error::MalformedResponse("Không nhận được dữ liệu âm thanh từ API.".into())
        })?;
        decode_base64(&inline.data)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SpeechConfig {
    voice_config: VoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceConfig {
    prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PrebuiltVoiceConfig {
    voice_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speech_config_serialization() {
        let config = GenerationConfig {
            response_modalities: Some(vec!["AUDIO".into()]),
            speech_config: Some(SpeechConfig {
                voice_config: VoiceConfig {
                    prebuilt_voice_config: PrebuiltVoiceConfig {
                        voice_name: "Kore".into(),
                    },
                },
            }),
            ..GenerationConfig::default()
        };
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["responseModalities"][0], "AUDIO");
        assert_eq!(
            json["speechConfig"]["voiceConfig"]["prebuiltVoiceConfig"]["voiceName"],
            "Kore"
        );
    }
}
