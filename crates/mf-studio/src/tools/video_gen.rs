//! Video generation. Each task is a multi-step job (submit, poll the
//! long-running operation, download the asset) and the model is
//! rate-sensitive, so the batch runs strictly sequentially: task N+1 does
//! not start until task N reaches a terminal state.

use mf_core::artifact::Artifact;
use mf_core::models::GenModel;
use mf_core::{BatchToken, Error, Result, TaskStatus};
use mf_genai::video::VideoGenerationRequest;
use mf_genai::{AspectRatio, GenAiClient, VideoPoller};

use crate::board::SharedBoard;
use crate::events::EventSink;
use crate::orchestrator::BatchRunner;
use crate::session::CredentialGate;
use crate::tools::split_prompts;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoMode {
    TextToVideo,
    ImageToVideo,
}

#[derive(Debug, Clone)]
pub struct VideoBatchRequest {
    pub mode: VideoMode,
    /// One prompt per non-empty line; optional in image-to-video mode.
    pub prompts_text: String,
    /// Reference image bytes + MIME type, required for image-to-video.
    pub image: Option<(Vec<u8>, String)>,
    pub copies_per_prompt: u32,
    /// Landscape or portrait; the model does not offer square output.
    pub aspect_ratio: AspectRatio,
}

/// Drive the whole batch to terminal states.
///
/// A mid-flight credential rejection resets `gate` so the embedder prompts
/// for a new key before the next run.
pub async fn run_video_batch(
    client: &GenAiClient,
    poller: &VideoPoller,
    gate: &CredentialGate,
    board: &SharedBoard<Artifact>,
    events: EventSink,
    req: &VideoBatchRequest,
) -> Result<BatchToken> {
    let prompt_list = split_prompts(&req.prompts_text);
    match req.mode {
        VideoMode::TextToVideo if prompt_list.is_empty() => {
            return Err(Error::Unknown("Vui lòng nhập ít nhất một câu lệnh.".into()));
        }
        VideoMode::ImageToVideo if req.image.is_none() => {
            return Err(Error::Unknown("Vui lòng tải lên một ảnh.".into()));
        }
        _ => {}
    }

    // Image-to-video runs once with an empty prompt when none was given.
    let effective_prompts = if req.mode == VideoMode::ImageToVideo && prompt_list.is_empty() {
        vec![String::new()]
    } else {
        prompt_list
    };

    let (runner, seeds) = BatchRunner::begin(
        board.clone(),
        events,
        &effective_prompts,
        req.copies_per_prompt,
    );
    tracing::info!(tasks = seeds.len(), "starting video batch");

    runner
        .run_sequential(seeds, |handle, seed| async move {
            let outcome = async {
                handle.progress(TaskStatus::Generating, "Đang khởi tạo...");
                let operation = client
                    .generate_video(VideoGenerationRequest {
                        model: GenModel::Veo31FastPreview,
                        prompt: seed.prompt.clone(),
                        image: req.image.clone(),
                        aspect_ratio: req.aspect_ratio,
                        resolution: "720p".into(),
                        sample_count: 1,
                    })
                    .await?;

                let uri = poller
                    .wait_for_video(client, &operation, |message| {
                        handle.progress(TaskStatus::Polling, message)
                    })
                    .await?;

                handle.progress(TaskStatus::Polling, "Đang tải video đã tạo...");
                let bytes = client.download_file(&uri).await?;
                Ok(Artifact::new(
                    format!("gemini_video_{}.mp4", seed.id),
                    "video/mp4",
                    bytes,
                ))
            }
            .await;

            if let Err(Error::InvalidCredential(_)) = &outcome {
                gate.reset();
            }
            outcome
        })
        .await;

    Ok(runner.token())
}
