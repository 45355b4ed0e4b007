//! Thumbnail generation for the three post formats. Works in two modes:
//! editing an uploaded base image, or generating from scratch, each with
//! its own prompt template. Variations are independent single calls, so the
//! batch runs in parallel.

use mf_core::artifact::Artifact;
use mf_core::models::GenModel;
use mf_core::{BatchToken, Error, Result, TaskBatch, TaskStatus};
use mf_genai::images::ImageEditRequest;
use mf_genai::{GenAiClient, UserPart};

use crate::board::SharedBoard;
use crate::events::EventSink;
use crate::orchestrator::BatchRunner;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Youtube,
    Tiktok,
    Facebook,
}

impl Platform {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Youtube => "YouTube",
            Self::Tiktok => "TikTok",
            Self::Facebook => "Facebook",
        }
    }

    pub fn ratio_text(&self) -> &'static str {
        match self {
            Self::Youtube => "16:9 (landscape)",
            Self::Tiktok => "9:16 (portrait)",
            Self::Facebook => "1:1 (square)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationMode {
    Precise,
    Creative,
}

impl GenerationMode {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Precise => "precise",
            Self::Creative => "creative",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ThumbnailRequest {
    pub platform: Platform,
    /// Base image bytes + MIME type; switches the tool into edit mode.
    pub base_image: Option<(Vec<u8>, String)>,
    pub count: u32,
    pub mode: GenerationMode,
    pub show_text: bool,
    pub text_content: String,
    pub creative_suggestion: String,
}

/// Prompt for reworking an uploaded base image.
pub fn build_edit_prompt(req: &ThumbnailRequest) -> String {
    let details = req.platform;
    let text_instruction = if req.show_text {
        format!(
            "Add the text \"{}\" to the image. It must be prominent, bold, and easy to read \
             against the background. Place it strategically for maximum impact.",
            req.text_content
        )
    } else {
        "Do not add any text.".to_string()
    };
    format!(
        "Using the provided base image, create {} thumbnail variations for a {} post.\n\
         Modifications Requested:\n\
         1. Text Integration: {}\n\
         2. Style & Enhancements: Apply a {} style. {}. You can enhance colors, add graphical \
         elements, or change the mood, but the main subject of the original image should remain \
         recognizable.\n\
         3. Final Output: The final image must be a professional-looking thumbnail with a {} \
         aspect ratio. You may need to crop or extend the original image to fit this ratio.",
        req.count,
        details.name(),
        text_instruction,
        req.mode.as_str(),
        req.creative_suggestion,
        details.ratio_text(),
    )
}

/// Prompt for generating a thumbnail with no base image.
pub fn build_generate_prompt(req: &ThumbnailRequest) -> String {
    let details = req.platform;
    let text_instruction = if req.show_text {
        format!(
            "The thumbnail MUST prominently feature the text: \"{}\". Use a bold, highly \
             readable font. The text should be the main focal point.",
            req.text_content
        )
    } else {
        "The thumbnail should NOT contain any text.".to_string()
    };
    format!(
        "Create {} thumbnail variations for a {} post.\n\
         Core Subject/Idea: A thumbnail about \"{}\".\n\
         Creative Style: {}. {}\n\
         CRITICAL REQUIREMENTS:\n\
         1. Aspect Ratio: The final image must be {}.\n\
         2. Text Integration: {}\n\
         3. Visuals: Create a compelling, high-quality image that visually represents the core \
         subject. It should be vibrant and eye-catching.",
        req.count,
        details.name(),
        req.text_content,
        req.mode.as_str(),
        req.creative_suggestion,
        details.ratio_text(),
        text_instruction,
    )
}

pub async fn run_thumbnail_batch(
    client: &GenAiClient,
    board: &SharedBoard<Artifact>,
    events: EventSink,
    req: &ThumbnailRequest,
) -> Result<BatchToken> {
    if req.text_content.trim().is_empty() {
        return Err(Error::Unknown(
            "Vui lòng nhập nội dung chữ cho thumbnail.".into(),
        ));
    }

    let prompt = if req.base_image.is_some() {
        build_edit_prompt(req)
    } else {
        build_generate_prompt(req)
    };

    // Per-task labels mirror the result cards; the real prompt is shared.
    let labels: Vec<String> = (1..=req.count)
        .map(|i| format!("Variation {i} of: {}", req.text_content))
        .collect();
    let (runner, seeds) = BatchRunner::begin_with_batch(
        board.clone(),
        events,
        TaskBatch::from_prompts(&labels, 1),
    );

    runner
        .run_parallel(seeds, |handle, seed| {
            let prompt = prompt.clone();
            async move {
                handle.progress(TaskStatus::Generating, "Đang tạo thumbnail...");
                let mut parts = Vec::new();
                if let Some((bytes, mime)) = &req.base_image {
                    parts.push(UserPart::Image {
                        bytes: bytes.clone(),
                        mime: mime.clone(),
                    });
                }
                parts.push(UserPart::Text(prompt));

                let image = client
                    .edit_image(ImageEditRequest {
                        model: GenModel::Gemini25FlashImage,
                        parts,
                    })
                    .await?;
                Ok(Artifact::new(
                    format!("thumbnail_{}.png", seed.id),
                    image.mime,
                    image.bytes,
                ))
            }
        })
        .await;

    Ok(runner.token())
}
