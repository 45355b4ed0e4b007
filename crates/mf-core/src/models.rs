/// Unified catalog of the generative models the tools call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenModel {
    Gemini25Flash,
    Gemini25Pro,
    Gemini25FlashImage,
    Imagen4,
    Veo31FastPreview,
    Gemini25FlashTts,
}

impl GenModel {
    /// Model ID for API communication
    pub fn id(&self) -> &str {
        match self {
            Self::Gemini25Flash => "gemini-2.5-flash",
            Self::Gemini25Pro => "gemini-2.5-pro",
            Self::Gemini25FlashImage => "gemini-2.5-flash-image",
            Self::Imagen4 => "imagen-4.0-generate-001",
            Self::Veo31FastPreview => "veo-3.1-fast-generate-preview",
            Self::Gemini25FlashTts => "gemini-2.5-flash-preview-tts",
        }
    }

    /// Model name for display in UI
    pub fn name(&self) -> &str {
        match self {
            Self::Gemini25Flash => "Gemini 2.5 Flash",
            Self::Gemini25Pro => "Gemini 2.5 Pro",
            Self::Gemini25FlashImage => "Gemini 2.5 Flash Image",
            Self::Imagen4 => "Imagen 4",
            Self::Veo31FastPreview => "Veo 3.1 Fast (Preview)",
            Self::Gemini25FlashTts => "Gemini 2.5 Flash TTS",
        }
    }

    /// What the model produces
    pub fn modality(&self) -> Modality {
        match self {
            Self::Gemini25Flash | Self::Gemini25Pro => Modality::Text,
            Self::Gemini25FlashImage | Self::Imagen4 => Modality::Image,
            Self::Veo31FastPreview => Modality::Video,
            Self::Gemini25FlashTts => Modality::Audio,
        }
    }

    /// All available models
    pub fn all() -> [GenModel; 6] {
        [
            Self::Gemini25Flash,
            Self::Gemini25Pro,
            Self::Gemini25FlashImage,
            Self::Imagen4,
            Self::Veo31FastPreview,
            Self::Gemini25FlashTts,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modality {
    Text,
    Image,
    Video,
    Audio,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceGender {
    Female,
    Male,
}

/// Prebuilt speech-synthesis voices offered by the story teller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtsVoice {
    pub name: &'static str,
    pub gender: VoiceGender,
    /// Display description shown in the voice picker.
    pub description: &'static str,
}

pub const TTS_VOICES: &[TtsVoice] = &[
    TtsVoice { name: "Kore", gender: VoiceGender::Female, description: "Thân thiện/Ấm áp (Giọng trung)" },
    TtsVoice { name: "Lyra", gender: VoiceGender::Female, description: "Kể chuyện/Ấm áp (Giọng trung)" },
    TtsVoice { name: "Sol", gender: VoiceGender::Female, description: "Tươi sáng/Năng động (Giọng trung)" },
    TtsVoice { name: "Zephyr", gender: VoiceGender::Female, description: "Nhẹ nhàng/Thanh lịch (Giọng cao)" },
    TtsVoice { name: "Puck", gender: VoiceGender::Male, description: "Vui vẻ/Lạc quan (Giọng trung)" },
    TtsVoice { name: "Orion", gender: VoiceGender::Male, description: "Bình tĩnh/Trấn an (Giọng trung)" },
    TtsVoice { name: "Arcturus", gender: VoiceGender::Male, description: "Rõ ràng/Quyền uy (Giọng trầm)" },
    TtsVoice { name: "Charon", gender: VoiceGender::Male, description: "Lạnh lùng/Bí ẩn (Giọng trầm)" },
    TtsVoice { name: "Fenrir", gender: VoiceGender::Male, description: "Hùng tráng/Sử thi (Giọng trầm)" },
    TtsVoice { name: "Abyssal", gender: VoiceGender::Male, description: "Oai nghiêm/Sâu lắng (Giọng rất trầm)" },
];

/// Look a voice up by its provider name.
pub fn voice_by_name(name: &str) -> Option<&'static TtsVoice> {
    TTS_VOICES.iter().find(|v| v.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_ids() {
        assert_eq!(GenModel::Gemini25Flash.id(), "gemini-2.5-flash");
        assert_eq!(GenModel::Imagen4.id(), "imagen-4.0-generate-001");
        assert_eq!(GenModel::Veo31FastPreview.id(), "veo-3.1-fast-generate-preview");
    }

    #[test]
    fn test_modalities() {
        assert_eq!(GenModel::Imagen4.modality(), Modality::Image);
        assert_eq!(GenModel::Veo31FastPreview.modality(), Modality::Video);
        assert_eq!(GenModel::Gemini25FlashTts.modality(), Modality::Audio);
    }

    #[test]
    fn test_all_models() {
        assert_eq!(GenModel::all().len(), 6);
    }

    #[test]
    fn test_voice_lookup() {
        assert_eq!(voice_by_name("Kore").unwrap().gender, VoiceGender::Female);
        assert_eq!(voice_by_name("Fenrir").unwrap().gender, VoiceGender::Male);
        assert!(voice_by_name("Nessie").is_none());
    }
}
