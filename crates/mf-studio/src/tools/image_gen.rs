//! Bulk image generation: one prompt per line, a fixed number of copies per
//! prompt, every task an independent single call, so the whole batch fans
//! out in parallel.

use mf_core::artifact::Artifact;
use mf_core::models::GenModel;
use mf_core::naming::file_stem_from;
use mf_core::{BatchToken, Error, Result, TaskId, TaskStatus};
use mf_genai::images::ImageGenerationRequest;
use mf_genai::{AspectRatio, GenAiClient};

use crate::board::SharedBoard;
use crate::events::EventSink;
use crate::orchestrator::BatchRunner;
use crate::tools::split_prompts;

#[derive(Debug, Clone)]
pub struct ImageBatchRequest {
    /// Textarea contents; one prompt per non-empty line.
    pub prompts_text: String,
    /// 1-4 in the form, but any positive count works.
    pub copies_per_prompt: u32,
    pub aspect_ratio: AspectRatio,
}

pub fn artifact_name(prompt: &str, id: TaskId) -> String {
    format!("gemini_image_{}_{id}.png", file_stem_from(prompt, 20))
}

/// Run the whole batch to terminal states. Results land on the board keyed
/// by task id; the returned token identifies this generation.
pub async fn run_image_batch(
    client: &GenAiClient,
    board: &SharedBoard<Artifact>,
    events: EventSink,
    req: &ImageBatchRequest,
) -> Result<BatchToken> {
    let prompts = split_prompts(&req.prompts_text);
    if prompts.is_empty() {
        return Err(Error::Unknown("Vui lòng nhập ít nhất một câu lệnh.".into()));
    }

    let (runner, seeds) =
        BatchRunner::begin(board.clone(), events, &prompts, req.copies_per_prompt);
    tracing::info!(tasks = seeds.len(), "starting image batch");

    runner
        .run_parallel(seeds, |handle, seed| async move {
            handle.progress(
                TaskStatus::Generating,
                format!("Bắt đầu với prompt: \"{}\"", seed.prompt),
            );
            let images = client
                .generate_images(ImageGenerationRequest {
                    model: GenModel::Imagen4,
                    prompt: seed.prompt.clone(),
                    count: 1,
                    aspect_ratio: req.aspect_ratio,
                })
                .await?;
            let image = images.into_iter().next().ok_or_else(|| {
                Error::MalformedResponse(
                    "Tạo ảnh thành công, nhưng không có dữ liệu ảnh trả về.".into(),
                )
            })?;
            Ok(Artifact::new(
                artifact_name(&seed.prompt, seed.id),
                image.mime,
                image.bytes,
            ))
        })
        .await;

    Ok(runner.token())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_name_strips_unsafe_characters() {
        let id = TaskId::new();
        let name = artifact_name("a cat: with/hat?", id);
        assert!(name.starts_with("gemini_image_a_cat__with_hat_"));
        assert!(name.ends_with(".png"));
        assert!(name.contains(&id.to_string()));
    }

    #[test]
    fn test_artifact_name_truncates_long_prompts() {
        let id = TaskId::new();
        let name = artifact_name(&"x".repeat(200), id);
        // 20 chars of stem plus prefix, id and extension.
        assert!(name.len() < 80);
    }
}
