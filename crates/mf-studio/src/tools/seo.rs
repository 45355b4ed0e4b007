//! SEO bundle generation: titles, description, hashtags and keywords for a
//! video topic.

use serde::{Deserialize, Serialize};

use mf_core::models::GenModel;
use mf_core::{Error, Result};
use mf_genai::{GenAiClient, Schema, UserPart};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputLanguage {
    Vietnamese,
    English,
}

impl OutputLanguage {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Vietnamese => "vietnamese",
            Self::English => "english",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SeoRequest {
    pub topic: String,
    /// Optional, passed along for context only.
    pub video_url: String,
    pub language: OutputLanguage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeoBundle {
    pub titles: Vec<String>,
    pub description: String,
    pub hashtags: Vec<String>,
    pub keywords: Vec<String>,
}

const SEO_SYSTEM_INSTRUCTION: &str = "You are an AI assistant specialized in YouTube SEO. Your \
    task is to generate highly optimized content for a YouTube video based on the user's topic. \
    You must provide a variety of engaging titles, a structured description, and relevant \
    hashtags and keywords.";

pub fn build_user_prompt(req: &SeoRequest) -> String {
    let url = if req.video_url.trim().is_empty() {
        "Not provided"
    } else {
        &req.video_url
    };
    format!(
        "\nVideo Topic/Primary Keyword: \"{}\"\nVideo URL (for context, optional): \"{}\"\n\
         Language for output: {}\n\nPlease generate the following SEO content:\n\
         1.  **Titles**: 5 creative, click-worthy, and SEO-friendly titles.\n\
         2.  **Description**: A well-structured video description. Include a hook at the \
         beginning, a summary of the video content, and a call to action at the end. Use \
         paragraphs and bullet points for readability.\n\
         3.  **Hashtags**: 15 relevant hashtags, including a mix of broad and niche tags.\n\
         4.  **Keywords**: A list of 20 SEO keywords that are highly relevant to the video topic.",
        req.topic,
        url,
        req.language.as_str(),
    )
}

pub fn response_schema() -> Schema {
    Schema::object([
        (
            "titles",
            Schema::array(Schema::string())
                .describe("An array of 5 SEO-optimized video titles."),
        ),
        (
            "description",
            Schema::string().describe(
                "A well-structured video description with a hook, summary, and call to action.",
            ),
        ),
        (
            "hashtags",
            Schema::array(Schema::string())
                .describe("An array of 15 relevant hashtags, each starting with '#'."),
        ),
        (
            "keywords",
            Schema::array(Schema::string())
                .describe("An array of 20 relevant SEO keywords."),
        ),
    ])
}

pub async fn generate_seo(client: &GenAiClient, req: &SeoRequest) -> Result<SeoBundle> {
    if req.topic.trim().is_empty() {
        return Err(Error::Unknown(
            "Vui lòng nhập chủ đề hoặc từ khóa chính cho video.".into(),
        ));
    }
    let value = client
        .generate_structured(
            GenModel::Gemini25Flash,
            Some(SEO_SYSTEM_INSTRUCTION),
            vec![UserPart::Text(build_user_prompt(req))],
            response_schema(),
        )
        .await?;
    serde_json::from_value(value).map_err(|e| {
        Error::MalformedResponse(format!("Nội dung SEO trả về không đúng cấu trúc: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_prompt_includes_topic_and_language() {
        let req = SeoRequest {
            topic: "làm video AI".into(),
            video_url: String::new(),
            language: OutputLanguage::Vietnamese,
        };
        let prompt = build_user_prompt(&req);
        assert!(prompt.contains("\"làm video AI\""));
        assert!(prompt.contains("Language for output: vietnamese"));
        assert!(prompt.contains("\"Not provided\""));
    }

    #[test]
    fn test_user_prompt_passes_url_through() {
        let req = SeoRequest {
            topic: "topic".into(),
            video_url: "https://www.youtube.com/watch?v=abc".into(),
            language: OutputLanguage::English,
        };
        assert!(build_user_prompt(&req).contains("watch?v=abc"));
    }

    #[test]
    fn test_bundle_deserializes() {
        let raw = r##"{
            "titles": ["t1","t2"],
            "description": "mô tả",
            "hashtags": ["#ai"],
            "keywords": ["video ai"]
        }"##;
        let bundle: SeoBundle = serde_json::from_str(raw).unwrap();
        assert_eq!(bundle.titles.len(), 2);
        assert_eq!(bundle.description, "mô tả");
    }
}
