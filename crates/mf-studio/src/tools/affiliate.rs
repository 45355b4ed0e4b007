//! Affiliate short-video assets: composite a person and a product into a
//! promotional image, watermark it, then derive a voiceover line and
//! camera-ready animation prompts from the composite.
//!
//! Each result is a multi-step chain of dependent calls, so the batch runs
//! sequentially; the task index doubles as the variation seed.

use serde::{Deserialize, Serialize};

use mf_core::artifact::Artifact;
use mf_core::models::GenModel;
use mf_core::watermark::apply_watermark;
use mf_core::{BatchToken, Error, Result, TaskBatch, TaskStatus};
use mf_genai::images::ImageEditRequest;
use mf_genai::{AspectRatio, GenAiClient, Schema, UserPart};

use crate::board::SharedBoard;
use crate::events::EventSink;
use crate::orchestrator::BatchRunner;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AffiliatePlatform {
    Tiktok,
    Facebook,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AffiliateMode {
    /// Handheld product presented by the person.
    Product,
    /// The person wears the fashion item.
    Fashion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceChoice {
    Female,
    Male,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    South,
    North,
}

#[derive(Debug, Clone)]
pub struct AffiliateRequest {
    /// Face/model reference image: bytes + MIME type.
    pub model_image: (Vec<u8>, String),
    /// Product or fashion-item reference image: bytes + MIME type.
    pub product_image: (Vec<u8>, String),
    pub platform: AffiliatePlatform,
    pub mode: AffiliateMode,
    pub aspect_ratio: AspectRatio,
    pub voice: VoiceChoice,
    pub region: Region,
    /// 1-10 results.
    pub count: u32,
    pub outfit_suggestion: String,
    pub background_suggestion: String,
    pub product_info: String,
    pub product_suggestion: String,
}

/// One 8-second clip's worth of video direction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationPrompt {
    pub scene_description: String,
    pub character_action: String,
    pub camera_movement: String,
    pub lighting: String,
    pub facial_expression: String,
    pub video_duration: String,
    pub audio_description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptSet {
    /// Vietnamese voiceover line.
    pub description: String,
    /// 1 prompt for TikTok, 2 continuous prompts for Facebook.
    pub animation_prompts: Vec<AnimationPrompt>,
}

#[derive(Debug, Clone)]
pub struct AffiliateResult {
    pub image: Artifact,
    pub prompt_set: PromptSet,
}

fn dimensions_text(aspect_ratio: AspectRatio) -> &'static str {
    match aspect_ratio {
        AspectRatio::Portrait => "1080x1920 pixels",
        _ => "1920x1080 pixels",
    }
}

/// The compositing prompt for one variation. `seed` only drives variety.
pub fn build_image_prompt(req: &AffiliateRequest, seed: usize) -> String {
    let dimensions = dimensions_text(req.aspect_ratio);
    let ratio = req.aspect_ratio.as_str();

    let background_prompt = if req.background_suggestion.is_empty() {
        format!(
            "- **Setting**: The background must be a dynamic and interesting setting. CRITICAL: \
             For this specific generation (seed {seed}), create a COMPLETELY UNIQUE background. \
             Do not repeat locations from other generations. Explore diverse settings like a \
             rooftop lounge at dusk, a bustling European street market, a minimalist art \
             gallery, a tranquil Japanese garden, or inside a futuristic vehicle. AVOID simple \
             studio backdrops."
        )
    } else {
        format!(
            "- **Background Suggestion**: The setting should be inspired by this suggestion: \
             \"{}\".",
            req.background_suggestion
        )
    };

    match req.mode {
        AffiliateMode::Fashion => {
            let complementary_outfit = if req.outfit_suggestion.is_empty() {
                format!(
                    "- **Complementary Outfit**: Style the rest of the outfit to be fashionable \
                     and contextually appropriate, complementing the main fashion item. \
                     CRITICAL: For this specific generation (seed {seed}), invent a COMPLETELY \
                     UNIQUE complementary outfit. Be creative with accessories, shoes, and \
                     other items."
                )
            } else {
                format!(
                    "- **Complementary Outfit**: Style the rest of the outfit to complement the \
                     main fashion item, inspired by this suggestion: \"{}\".",
                    req.outfit_suggestion
                )
            };
            format!(
                "THE ABSOLUTE MOST IMPORTANT, CRITICAL, NON-NEGOTIABLE RULE: The final image's \
                 dimensions MUST BE EXACTLY {dimensions}. This corresponds to a {ratio} aspect \
                 ratio. You MUST NOT fail on this. This rule overrides all other instructions.\n\n\
                 Create a single, high-resolution (1080p quality), photorealistic promotional \
                 image for a fashion item.\n\
                 - **Person**: The person from the first image must be featured. Their facial \
                 features, body type, and appearance must be preserved exactly.\n\
                 - **Fashion Item**: The person MUST be wearing the fashion item (e.g., shirt, \
                 pants, dress) from the second image. The item's design, color, texture, and \
                 shape MUST be preserved with 100% fidelity and fitted naturally onto the \
                 person. IT IS CRITICAL THAT YOU DO NOT ALTER THE ORIGINAL ITEM IN ANY WAY.\n\
                 {complementary_outfit}\n{background_prompt}\n\
                 - **Style**: The style should be high-end and polished, suitable for a fashion \
                 lookbook or advertisement.\n\
                 - **Composition**: The shot MUST be a full-body or three-quarters shot of the \
                 model to showcase the entire outfit in context.\n\
                 - **Variation**: The seed value {seed} is provided to ensure this image is \
                 unique. Your highest priority for variation is to ensure the background and \
                 complementary outfit parts are completely different from any other generated \
                 image. Also vary the pose, lighting, and camera angle.\n\
                 - **Final Reminder**: The output dimensions MUST be EXACTLY {dimensions}. No \
                 exceptions."
            )
        }
        AffiliateMode::Product => {
            let outfit = if req.outfit_suggestion.is_empty() {
                format!(
                    "- **Outfit**: The person must be wearing a stylish and contextually \
                     appropriate outfit. CRITICAL: For this specific generation (seed {seed}), \
                     invent a COMPLETELY UNIQUE outfit. Do not repeat styles from other \
                     generations. Be creative with different clothing items (e.g., blazer and \
                     jeans, summer dress, sportswear, elegant gown)."
                )
            } else {
                format!(
                    "- **Outfit Suggestion**: The person should be wearing an outfit inspired \
                     by this suggestion: \"{}\".",
                    req.outfit_suggestion
                )
            };
            format!(
                "THE ABSOLUTE MOST IMPORTANT, CRITICAL, NON-NEGOTIABLE RULE: The final image's \
                 dimensions MUST BE EXACTLY {dimensions}. This corresponds to a {ratio} aspect \
                 ratio. You MUST NOT fail on this. This rule overrides all other instructions.\n\n\
                 Create a single, high-resolution (1080p quality), photorealistic promotional \
                 image.\n\
                 - **Person**: The person from the first image must be featured. Their facial \
                 features and appearance must be preserved exactly.\n\
                 - **Product**: The product from the second image must be featured. The \
                 product's appearance, branding, color, and shape MUST be preserved with 100% \
                 fidelity. IT IS CRITICAL THAT YOU DO NOT ALTER THE ORIGINAL PRODUCT IN ANY \
                 WAY.\n\
                 - **REALISTIC SCALING (CRITICAL)**: The product's size MUST be realistic and \
                 proportional to the person. It should look natural, as it would in real life. \
                 DO NOT enlarge the product for emphasis. For example, a lipstick should not be \
                 the size of a water bottle. This realism is more important than making the \
                 product highly visible.\n\
                 - **Interaction**: The person should be interacting with or presenting the \
                 product in a natural, engaging way.\n\
                 {outfit}\n{background_prompt}\n\
                 - **Style**: The style should be high-end and polished, suitable for a \
                 professional advertisement.\n\
                 - **Composition**: The shot MUST be a full-body shot of the model to showcase \
                 the entire outfit and product in context.\n\
                 - **Variation**: The seed value {seed} is provided to ensure this image is \
                 unique. Your highest priority for variation is to ensure the outfit and \
                 background are completely different from any other generated image, as per the \
                 instructions above. Also vary the pose, lighting, and camera angle.\n\
                 - **Final Reminder**: The output dimensions MUST be EXACTLY {dimensions}. No \
                 exceptions."
            )
        }
    }
}

/// The instruction for the voiceover + animation-prompt call that follows
/// the composite.
pub fn build_prompt_set_instruction(req: &AffiliateRequest, seed: usize) -> String {
    let voice_description = match req.voice {
        VoiceChoice::Male => "a male",
        VoiceChoice::Female => "a female",
    };
    let region_description = match req.region {
        Region::South => "Southern Vietnamese",
        Region::North => "Northern Vietnamese",
    };
    let product_info_context = if req.product_info.is_empty() {
        "Analyze the product image to understand its key features and create an appealing, \
         UNIQUE description."
            .to_string()
    } else {
        format!(
            "Critically, you MUST use the following user-provided \"Product Information\" as \
             the primary inspiration for the description: \"{}\". For this specific generation \
             (seed {seed}), you MUST create a UNIQUE and CREATIVE variation that has NOT been \
             generated before. Focus on a different feature or angle.",
            req.product_info
        )
    };
    let product_suggestion_context = if req.product_suggestion.is_empty() {
        String::new()
    } else {
        format!(
            "In addition, take this \"Product Suggestion\" into account to guide the tone and \
             focus: \"{}\".",
            req.product_suggestion
        )
    };
    let context_item = match req.mode {
        AffiliateMode::Fashion => "fashion item",
        AffiliateMode::Product => "product",
    };

    let base_animation_instruction = "\
    - The JSON object must contain the following keys: \"sceneDescription\", \
      \"characterAction\", \"cameraMovement\", \"lighting\", \"facialExpression\", \
      \"videoDuration\", and \"audioDescription\".\n\
    - \"cameraMovement\" MUST be a unique, dynamic, and creative camera movement. DO NOT use \
      static shots or repeat previous camera movements. Use cinematic terms like 'smooth \
      panning shot', 'dolly zoom in', 'orbital shot around the character', 'handheld follow \
      shot', 'crane shot revealing the scene'.\n\
    - All other fields must be filled with creative, detailed descriptions in English based on \
      the generated image.";

    let (platform_name, description_length, animation_task) = match req.platform {
        AffiliatePlatform::Tiktok => (
            "TikTok",
            "between 15 and 25 words. This is a strict limit for an 8-second voiceover.",
            format!(
                "2.  **animationPrompts**: Create an array containing ONE detailed video prompt \
                 object for an 8-second TikTok video in an \"Outfit Showcase\" style. The style \
                 should be trendy, fast-paced, and engaging, suitable for TikTok.\n\
                 {base_animation_instruction}\n\
                 - \"videoDuration\" must be exactly \"8 seconds\".\n\
                 - \"audioDescription\" must describe BOTH the voiceover and suitable background \
                 music. It should state that the person speaks the Vietnamese \"description\" \
                 you created, performed by {voice_description} with a {region_description} \
                 accent, and be accompanied by a fitting, subtle background music track that \
                 enhances the video's mood (e.g., 'upbeat lo-fi hip hop', 'elegant classical \
                 music', 'cinematic ambient track')."
            ),
        ),
        AffiliatePlatform::Facebook => (
            "Facebook",
            "between 25 and 40 words. It should be slightly more descriptive and persuasive.",
            format!(
                "2.  **animationPrompts**: Create an array of TWO detailed video prompt objects \
                 for a continuous 16-second Facebook Reels video. The style should be polished \
                 and informative, suitable for Facebook feed or Reels. A clear call-to-action \
                 is encouraged.\n\
                 - **Continuity is CRITICAL**: The second prompt object MUST be a direct and \
                 seamless continuation of the first one. The camera movement, character action, \
                 and scene must flow perfectly from the end of part 1 to the beginning of part \
                 2.\n\
                 {base_animation_instruction}\n\
                 - \"videoDuration\" for EACH of the two objects must be exactly \"8 seconds\".\n\
                 - \"audioDescription\" for the first part must describe BOTH the voiceover and \
                 suitable background music, stating it's performed by {voice_description} with \
                 a {region_description} accent.\n\
                 - \"audioDescription\" for the second part should simply state: \"Continue \
                 background music from Part 1.\""
            ),
        ),
    };

    format!(
        "Based on the unique qualities of the provided {context_item} image, the generated \
         promotional image, and the user's product info, perform two tasks and return the \
         result as a single JSON object with keys \"description\" and \"animationPrompts\". \
         This content is for the {platform_name} platform.\n\n\
         IMPORTANT for seed {seed}: Your response must be COMPLETELY UNIQUE and DIFFERENT from \
         any previous attempts. Create a fresh, new idea for both the description and the \
         animation prompts.\n\n\
         1.  **description**: Write a concise promotional description in Vietnamese. The length \
         MUST be {description_length} CRITICAL RULE: The description MUST include commas (,) \
         and periods (.) to create natural pauses for the voiceover. {product_info_context} \
         {product_suggestion_context}\n\n{animation_task}"
    )
}

pub fn prompt_set_schema(platform: AffiliatePlatform) -> Schema {
    let animation_prompt = Schema::object([
        (
            "sceneDescription",
            Schema::string().describe("Description of the scene and background."),
        ),
        (
            "characterAction",
            Schema::string().describe("Detailed movement of the character."),
        ),
        (
            "cameraMovement",
            Schema::string().describe("How the camera moves. MUST be dynamic and lively."),
        ),
        (
            "lighting",
            Schema::string().describe("The style of lighting (e.g., golden hour, studio)."),
        ),
        (
            "facialExpression",
            Schema::string().describe("The character's facial expression."),
        ),
        (
            "videoDuration",
            Schema::string().describe("The exact duration of the video (e.g., '8 seconds')."),
        ),
        (
            "audioDescription",
            Schema::string()
                .describe("Description of the voiceover audio, including background music."),
        ),
    ]);
    let platform_label = match platform {
        AffiliatePlatform::Tiktok => "TikTok",
        AffiliatePlatform::Facebook => "Facebook",
    };
    Schema::object([
        (
            "description",
            Schema::string().describe(format!(
                "Promotional product description in Vietnamese, suitable for a voiceover on \
                 {platform_label}. It MUST include commas and periods for natural voiceover \
                 pacing."
            )),
        ),
        (
            "animationPrompts",
            Schema::array(animation_prompt).describe(
                "An array of detailed video generation prompts. Contains 1 for TikTok, 2 for \
                 Facebook.",
            ),
        ),
    ])
}

pub async fn run_affiliate_batch(
    client: &GenAiClient,
    board: &SharedBoard<AffiliateResult>,
    events: EventSink,
    watermark_caption: &str,
    req: &AffiliateRequest,
) -> Result<BatchToken> {
    if req.model_image.0.is_empty() || req.product_image.0.is_empty() {
        return Err(Error::Unknown(
            "Vui lòng tải lên cả ảnh người mẫu và ảnh sản phẩm.".into(),
        ));
    }

    let labels: Vec<String> = (1..=req.count).map(|i| format!("Kết quả {i}")).collect();
    let (runner, seeds) = BatchRunner::begin_with_batch(
        board.clone(),
        events,
        TaskBatch::from_prompts(&labels, 1),
    );
    tracing::info!(tasks = seeds.len(), "starting affiliate batch");

    runner
        .run_sequential(seeds, |handle, seed| async move {
            let variation_seed = seed.index;

            handle.progress(TaskStatus::Generating, "Đang tạo ảnh quảng cáo...");
            let composite = client
                .edit_image(ImageEditRequest {
                    model: GenModel::Gemini25FlashImage,
                    parts: vec![
                        UserPart::Text(build_image_prompt(req, variation_seed)),
                        UserPart::Image {
                            bytes: req.model_image.0.clone(),
                            mime: req.model_image.1.clone(),
                        },
                        UserPart::Image {
                            bytes: req.product_image.0.clone(),
                            mime: req.product_image.1.clone(),
                        },
                    ],
                })
                .await?;

            let watermarked = apply_watermark(&composite.bytes, watermark_caption)?;

            handle.progress(
                TaskStatus::Generating,
                "Đang tạo lời thoại và prompt chuyển động...",
            );
            let item_label = match req.mode {
                AffiliateMode::Fashion => "Fashion Item Image:",
                AffiliateMode::Product => "Product Image:",
            };
            let value = client
                .generate_structured(
                    GenModel::Gemini25Flash,
                    None,
                    vec![
                        UserPart::Text(build_prompt_set_instruction(req, variation_seed)),
                        UserPart::Text(item_label.to_string()),
                        UserPart::Image {
                            bytes: req.product_image.0.clone(),
                            mime: req.product_image.1.clone(),
                        },
                        UserPart::Text("Generated Promotional Image with Person:".to_string()),
                        UserPart::Image {
                            bytes: composite.bytes.clone(),
                            mime: composite.mime.clone(),
                        },
                    ],
                    prompt_set_schema(req.platform),
                )
                .await?;
            let prompt_set: PromptSet = serde_json::from_value(value).map_err(|e| {
                Error::MalformedResponse(format!(
                    "Lời thoại trả về không đúng cấu trúc: {e}"
                ))
            })?;

            Ok(AffiliateResult {
                image: Artifact::new(
                    format!("ai-product-shot-{}.png", seed.id),
                    "image/png",
                    watermarked,
                ),
                prompt_set,
            })
        })
        .await;

    Ok(runner.token())
}
