//! Story teller: a narrated-story pipeline in two steps: write the script,
//! then synthesize a style-directed reading of it and frame the raw PCM into
//! a playable WAV.

use mf_core::artifact::Artifact;
use mf_core::models::GenModel;
use mf_core::naming::sanitize_file_name;
use mf_core::wav::{wrap_pcm, TTS_SPEC};
use mf_core::{Error, Result};
use mf_genai::speech::SpeechRequest;
use mf_genai::GenAiClient;

pub const DEFAULT_STYLE_INSTRUCTIONS: &str =
    "Đọc với giọng kể chuyện ma, chậm rãi, nhấn nhá và đầy bí ẩn.";

/// Story topics offered by the picker: (value passed to the model, label).
pub const STORY_TOPICS: &[(&str, &str)] = &[
    ("kinh dị, ma ám, rùng rợn", "Truyện ma kinh dị"),
    ("vụ án, điều tra, tội phạm", "Vụ án có thật"),
    ("tâm lý, tình cảm, lãng mạn", "Tâm lý tình cảm"),
    ("khoa học, viễn tưởng, tương lai", "Khoa học viễn tưởng"),
    ("lịch sử, hùng tráng, dân tộc", "Lịch sử hùng tráng"),
    ("khám phá, bí ẩn, phiêu lưu", "Khám phá bí ẩn"),
    ("truyền thuyết, dân gian, cổ tích", "Truyền thuyết dân gian"),
    ("phát triển bản thân, bài học, triết lý", "Phát triển bản thân"),
    ("bình luận game, phân tích, hướng dẫn", "Bình luận game"),
    ("review phim, phân tích, tóm tắt", "Review phim"),
];

#[derive(Debug, Clone)]
pub struct StoryRequest {
    pub title: String,
    pub topic: String,
    /// Desired script length in characters, free text from the form.
    pub char_count: String,
    pub idea: String,
}

#[derive(Debug, Clone)]
pub struct NarrationRequest {
    pub title: String,
    pub script: String,
    pub style_instructions: String,
    /// Prebuilt voice name (see `mf_core::models::TTS_VOICES`).
    pub voice: String,
}

pub fn build_script_prompt(req: &StoryRequest) -> String {
    format!(
        "\nHãy viết một kịch bản kể chuyện hoàn chỉnh dựa trên các thông tin sau:\n\
         - **Chủ đề:** {}\n\
         - **Tiêu đề gợi ý:** {}\n\
         - **Ý tưởng chính:** {}\n\
         - **Yêu cầu:** Kịch bản phải có độ dài khoảng {} ký tự, văn phong phù hợp để kể \
         chuyện, có mở đầu, cao trào và kết thúc rõ ràng.",
        req.topic,
        if req.title.trim().is_empty() {
            "Không có"
        } else {
            &req.title
        },
        req.idea,
        req.char_count,
    )
}

/// Style directive embedded ahead of the quoted script, which is how the
/// speech model takes delivery instructions.
pub fn build_tts_prompt(style_instructions: &str, script: &str) -> String {
    format!("{style_instructions}: \"{script}\"")
}

pub async fn generate_story_script(client: &GenAiClient, req: &StoryRequest) -> Result<String> {
    client
        .generate_text(GenModel::Gemini25Flash, None, &build_script_prompt(req))
        .await
}

/// Synthesize the narration and return it as a playable WAV artifact.
pub async fn generate_narration(client: &GenAiClient, req: &NarrationRequest) -> Result<Artifact> {
    if req.script.trim().is_empty() {
        return Err(Error::Unknown(
            "Vui lòng tạo kịch bản trước khi tạo âm thanh.".into(),
        ));
    }

    let pcm = client
        .synthesize_speech(SpeechRequest {
            model: GenModel::Gemini25FlashTts,
            text: build_tts_prompt(&req.style_instructions, &req.script),
            voice: req.voice.clone(),
        })
        .await?;

    let wav = wrap_pcm(&pcm, TTS_SPEC);
    Ok(Artifact::new(
        format!("{}.wav", artifact_stem(&req.title, "audio")),
        "audio/wav",
        wav,
    ))
}

/// The script as a downloadable text file.
pub fn script_artifact(title: &str, script: &str) -> Artifact {
    Artifact::new(
        format!("{}.txt", artifact_stem(title, "kich-ban")),
        "text/plain",
        script.as_bytes().to_vec(),
    )
}

fn artifact_stem(title: &str, fallback: &str) -> String {
    if title.trim().is_empty() {
        fallback.to_string()
    } else {
        sanitize_file_name(title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_prompt_fills_defaults() {
        let req = StoryRequest {
            title: String::new(),
            topic: "kinh dị, ma ám, rùng rợn".into(),
            char_count: "1500".into(),
            idea: "ngôi nhà bỏ hoang".into(),
        };
        let prompt = build_script_prompt(&req);
        assert!(prompt.contains("**Chủ đề:** kinh dị, ma ám, rùng rợn"));
        assert!(prompt.contains("**Tiêu đề gợi ý:** Không có"));
        assert!(prompt.contains("khoảng 1500 ký tự"));
    }

    #[test]
    fn test_tts_prompt_embeds_style_directive() {
        let prompt = build_tts_prompt(DEFAULT_STYLE_INSTRUCTIONS, "Ngày xưa...");
        assert!(prompt.starts_with(DEFAULT_STYLE_INSTRUCTIONS));
        assert!(prompt.ends_with(": \"Ngày xưa...\"") || prompt.contains("\"Ngày xưa...\""));
    }

    #[test]
    fn test_script_artifact_names() {
        assert_eq!(
            script_artifact("Ngôi nhà ma ám", "...").file_name,
            "Ngôi_nhà_ma_ám.txt"
        );
        assert_eq!(script_artifact("  ", "...").file_name, "kich-ban.txt");
    }

    #[test]
    fn test_topic_catalog() {
        assert_eq!(STORY_TOPICS.len(), 10);
        assert!(STORY_TOPICS.iter().any(|(_, label)| *label == "Review phim"));
    }
}
