//! Metadata translation: one title + description into several target
//! languages in a single structured call.

use serde::{Deserialize, Serialize};

use mf_core::models::GenModel;
use mf_core::{Error, Result};
use mf_genai::{GenAiClient, Schema, UserPart};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    /// Short display name shown on the picker buttons (Vietnamese).
    pub name: &'static str,
    /// Full name passed to the model.
    pub full_name: &'static str,
}

pub const LANGUAGES: &[Language] = &[
    Language { name: "Hoa Kỳ", full_name: "English (United States)" },
    Language { name: "Đức", full_name: "German" },
    Language { name: "Hàn Quốc", full_name: "Korean" },
    Language { name: "Nhật Bản", full_name: "Japanese" },
    Language { name: "Trung Quốc", full_name: "Chinese (Simplified)" },
    Language { name: "Pháp", full_name: "French" },
    Language { name: "Nga", full_name: "Russian" },
    Language { name: "Tây Ban Nha", full_name: "Spanish" },
    Language { name: "Ấn Độ", full_name: "Hindi" },
    Language { name: "Việt Nam", full_name: "Vietnamese" },
];

#[derive(Debug, Clone)]
pub struct TranslationRequest {
    /// Title and description, separated by a newline.
    pub source_text: String,
    /// Display names of the selected targets.
    pub target_languages: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Translation {
    /// Full name of the language of this translation.
    pub language: String,
    pub title: String,
    pub description: String,
}

const TRANSLATE_SYSTEM_INSTRUCTION: &str = "You are an expert multilingual translator \
    specializing in YouTube video metadata. Your task is to accurately translate a video's \
    title and description into multiple languages. Ensure the tone is natural and engaging for \
    each target audience. The source text will contain a title and a description, separated by \
    a newline. You must translate both parts for each language.";

/// Resolve the selected display names to the full names the model sees.
pub fn resolve_targets(selected: &[String]) -> Vec<&'static str> {
    selected
        .iter()
        .filter_map(|name| {
            LANGUAGES
                .iter()
                .find(|lang| lang.name == name)
                .map(|lang| lang.full_name)
        })
        .collect()
}

pub fn build_user_prompt(source_text: &str, targets: &[&str]) -> String {
    format!(
        "Translate the following YouTube video title and description into these languages: \
         {}.\n\nSource Text:\n\"\"\"\n{}\n\"\"\"",
        targets.join(", "),
        source_text,
    )
}

pub fn response_schema() -> Schema {
    Schema::array(Schema::object([
        (
            "language",
            Schema::string().describe(
                "The full name of the language of this translation (e.g., \"German\", \
                 \"Korean\").",
            ),
        ),
        ("title", Schema::string().describe("The translated title.")),
        (
            "description",
            Schema::string().describe("The translated description."),
        ),
    ]))
}

pub async fn translate_metadata(
    client: &GenAiClient,
    req: &TranslationRequest,
) -> Result<Vec<Translation>> {
    let targets = resolve_targets(&req.target_languages);
    if req.source_text.trim().is_empty() || targets.is_empty() {
        return Err(Error::Unknown(
            "Vui lòng nhập văn bản và chọn ít nhất một ngôn ngữ.".into(),
        ));
    }

    let value = client
        .generate_structured(
            GenModel::Gemini25Flash,
            Some(TRANSLATE_SYSTEM_INSTRUCTION),
            vec![UserPart::Text(build_user_prompt(&req.source_text, &targets))],
            response_schema(),
        )
        .await?;
    serde_json::from_value(value).map_err(|e| {
        Error::MalformedResponse(format!("Bản dịch trả về không đúng cấu trúc: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_targets_maps_display_names() {
        let targets = resolve_targets(&["Hoa Kỳ".to_string(), "Hàn Quốc".to_string()]);
        assert_eq!(targets, vec!["English (United States)", "Korean"]);
    }

    #[test]
    fn test_resolve_targets_drops_unknown_names() {
        let targets = resolve_targets(&["Atlantis".to_string(), "Đức".to_string()]);
        assert_eq!(targets, vec!["German"]);
    }

    #[test]
    fn test_user_prompt_quotes_source() {
        let prompt = build_user_prompt("Tiêu đề\nMô tả", &["German", "French"]);
        assert!(prompt.contains("into these languages: German, French"));
        assert!(prompt.contains("\"\"\"\nTiêu đề\nMô tả\n\"\"\""));
    }

    #[test]
    fn test_language_catalog_size() {
        assert_eq!(LANGUAGES.len(), 10);
    }
}
