//! Storyboard tool: splits a video idea into 8-second scenes and produces a
//! paired still-image prompt (Vietnamese) and motion prompt (English) per
//! scene, ready for a Whisk/Flow-style pipeline.

use serde::{Deserialize, Serialize};

use mf_core::artifact::Artifact;
use mf_core::duration::required_scenes;
use mf_core::models::GenModel;
use mf_core::{Error, Result};
use mf_genai::{GenAiClient, Schema, UserPart};

pub const CINEMATIC_STYLES: &[&str] = &[
    "Mặc định",
    "Hiện đại",
    "Điện ảnh",
    "Viễn tưởng",
    "Tiền sử",
    "Hoạt hình",
    "Hài hước",
];

pub const DEFAULT_STYLE: &str = "Mặc định";
const ANIMATED_STYLE: &str = "Hoạt hình";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationUnit {
    Minutes,
    Seconds,
}

#[derive(Debug, Clone)]
pub struct StoryboardRequest {
    pub video_idea: String,
    pub total_duration: f64,
    pub unit: DurationUnit,
    pub cinematic_style: String,
}

impl StoryboardRequest {
    pub fn total_seconds(&self) -> f64 {
        match self.unit {
            DurationUnit::Minutes => self.total_duration * 60.0,
            DurationUnit::Seconds => self.total_duration,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryboardScene {
    /// Left empty; the user attaches the reference character downstream.
    pub character: String,
    pub style: String,
    pub scene: String,
    #[serde(rename = "characterSummary")]
    pub character_summary: String,
    pub whisk_prompt_vi: String,
    pub motion_prompt: String,
}

/// Scene count for the request, with the same user-facing validation the
/// form performs.
pub fn scene_count(req: &StoryboardRequest) -> Result<u32> {
    if !req.total_duration.is_finite() || req.total_duration <= 0.0 {
        return Err(Error::Unknown(
            "Thời lượng video phải là một số dương.".into(),
        ));
    }
    let scenes = required_scenes(req.total_seconds());
    if scenes == 0 {
        return Err(Error::Unknown("Thời lượng quá ngắn để tạo cảnh.".into()));
    }
    Ok(scenes)
}

fn whisk_prompt_description(cinematic_style: &str) -> &'static str {
    if cinematic_style == ANIMATED_STYLE {
        "Concise, cinematic, sufficiently detailed, and emotionally evocative VIETNAMESE prompt \
         for static image generation, in an ANIMATED style. Crucially, this prompt MUST describe \
         the context (bối cảnh) clearly and in detail, consistent with the scene description. \
         This is mandatory for every single prompt. Focus on the visual composition and mood. \
         DO NOT describe faces, clothes, gender, or identity."
    } else {
        "Concise, cinematic, sufficiently detailed, and emotionally evocative VIETNAMESE prompt \
         for static image generation. The prompt MUST explicitly request a PHOTOREALISTIC, \
         truthful, and realistic image. Crucially, this prompt MUST describe the context \
         (bối cảnh) clearly and in detail, consistent with the scene description. This is \
         mandatory for every single prompt. Focus on the visual composition and mood. DO NOT \
         describe faces, clothes, gender, or identity."
    }
}

pub fn build_system_prompt(video_idea: &str, number_of_scenes: u32, cinematic_style: &str) -> String {
    let style_instruction = if cinematic_style == DEFAULT_STYLE {
        String::new()
    } else {
        format!(
            "The overall cinematic style for this video should be: {cinematic_style}. \
             Elaborate on this style in each scene's 'style' field."
        )
    };

    format!(
        "\nYou are an AI film scriptwriting tool that generates scene descriptions and prompts \
         for image and video generation systems.\nYour task is to take a video idea and a total \
         duration, divide it into 8-second scenes, and for each scene, generate a structured \
         output. Each scene description should immediately present a high-climax visual or a \
         pivotal moment. The narrative should focus on impactful, visually striking events \
         directly.\n\n**CRITICAL RULES TO FOLLOW:**\n1.  **Mandatory Context:** For EVERY scene \
         without exception, the 'scene' description and the 'whisk_prompt_vi' MUST clearly and \
         detailedly describe the context (bối cảnh). This rule is absolute.\n2.  **Perfect \
         Character Accuracy:** The 'characterSummary' field MUST be 100% accurate for every \
         scene. Adhere strictly to the character counting rules. Inaccuracy is not acceptable.\n\
         \nVideo Idea: \"{video_idea}\"\nThis video will be divided into {number_of_scenes} \
         scenes, each 8 seconds long.\n{style_instruction}\n\nCrucially, ensure the generated \
         script maintains strong contextual consistency between the \"Video Idea\" and the \
         selected \"Cinematic style.\" All elements (environment, objects, actions) must be \
         thematically aligned with the core concept.\n\nFor each scene, generate the following \
         structure as a JSON array. Ensure all fields are present and follow the specified \
         guidelines:\n"
    )
}

pub fn build_user_prompt(number_of_scenes: u32) -> String {
    format!(
        "Generate a JSON array with {number_of_scenes} scene objects, following the video idea \
         and scene-by-scene progression. The narrative should have a realistic cinematic tone, \
         natural lighting, and an emotional, narrative rhythm."
    )
}

pub fn response_schema(cinematic_style: &str) -> Schema {
    Schema::array(Schema::object([
        (
            "character",
            Schema::string().describe("Left empty, user will attach reference character later."),
        ),
        (
            "style",
            Schema::string()
                .describe("Cinematic style, lighting, tone, depth of field, visual texture, camera."),
        ),
        (
            "scene",
            Schema::string().describe(
                "Context, action, emotion, lighting, environment. NO specific character \
                 description. In Vietnamese.",
            ),
        ),
        (
            "characterSummary",
            Schema::string().describe(
                "Summarize the main characters in this scene, e.g., '1 Nam', '1 Nữ', '1 Thú', \
                 '1 Nam và 1 Nữ', 'Không có nhân vật chính'.",
            ),
        ),
        (
            "whisk_prompt_vi",
            Schema::string().describe(whisk_prompt_description(cinematic_style)),
        ),
        (
            "motion_prompt",
            Schema::string().describe(
                "English prompt for the motion model. Describes camera movement, dynamic \
                 lighting, emotional rhythm, moving objects or environment. No faces, clothes, \
                 gender, identity.",
            ),
        ),
    ]))
}

pub async fn generate_storyboard(
    client: &GenAiClient,
    req: &StoryboardRequest,
) -> Result<Vec<StoryboardScene>> {
    let scenes = scene_count(req)?;
    let system = build_system_prompt(&req.video_idea, scenes, &req.cinematic_style);
    let user = build_user_prompt(scenes);

    let value = client
        .generate_structured(
            GenModel::Gemini25Pro,
            Some(&system),
            vec![UserPart::Text(user)],
            response_schema(&req.cinematic_style),
        )
        .await?;

    let parsed: Vec<StoryboardScene> = serde_json::from_value(value).map_err(|e| {
        Error::MalformedResponse(format!("Kịch bản trả về không đúng cấu trúc: {e}"))
    })?;

    if parsed.len() != scenes as usize {
        tracing::warn!(
            expected = scenes,
            returned = parsed.len(),
            "storyboard scene count differs from the requested duration"
        );
    }
    Ok(parsed)
}

fn numbered_prompt_list(prompts: impl Iterator<Item = String>) -> Vec<u8> {
    prompts
        .enumerate()
        .map(|(index, prompt)| format!("Cảnh {}:\n{}", index + 1, prompt))
        .collect::<Vec<_>>()
        .join("\n\n")
        .into_bytes()
}

/// The Vietnamese still-image prompts, one section per scene.
pub fn whisk_prompts_artifact(scenes: &[StoryboardScene]) -> Artifact {
    let bytes = numbered_prompt_list(scenes.iter().map(|s| s.whisk_prompt_vi.clone()));
    Artifact::new("whisk_prompts_vi.txt", "text/plain", bytes)
}

/// The English motion prompts, one section per scene.
pub fn motion_prompts_artifact(scenes: &[StoryboardScene]) -> Artifact {
    let bytes = numbered_prompt_list(scenes.iter().map(|s| s.motion_prompt.clone()));
    Artifact::new("flow_veo_prompts.txt", "text/plain", bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(duration: f64, unit: DurationUnit) -> StoryboardRequest {
        StoryboardRequest {
            video_idea: "một hành trình trên sao Hỏa".into(),
            total_duration: duration,
            unit,
            cinematic_style: DEFAULT_STYLE.into(),
        }
    }

    #[test]
    fn test_scene_count_from_minutes() {
        assert_eq!(scene_count(&request(1.0, DurationUnit::Minutes)).unwrap(), 8);
        assert_eq!(scene_count(&request(0.5, DurationUnit::Minutes)).unwrap(), 4);
    }

    #[test]
    fn test_scene_count_from_seconds() {
        assert_eq!(scene_count(&request(9.0, DurationUnit::Seconds)).unwrap(), 2);
    }

    #[test]
    fn test_non_positive_duration_rejected() {
        assert!(scene_count(&request(0.0, DurationUnit::Seconds)).is_err());
        assert!(scene_count(&request(-3.0, DurationUnit::Minutes)).is_err());
    }

    #[test]
    fn test_system_prompt_carries_idea_and_count() {
        let prompt = build_system_prompt("cá mập khổng lồ", 5, "Điện ảnh");
        assert!(prompt.contains("Video Idea: \"cá mập khổng lồ\""));
        assert!(prompt.contains("divided into 5 scenes"));
        assert!(prompt.contains("cinematic style for this video should be: Điện ảnh"));

        let default_style = build_system_prompt("cá mập", 5, DEFAULT_STYLE);
        assert!(!default_style.contains("cinematic style for this video should be"));
    }

    #[test]
    fn test_animated_style_switches_whisk_description() {
        let animated = serde_json::to_value(response_schema(ANIMATED_STYLE)).unwrap();
        let animated_desc = animated["items"]["properties"]["whisk_prompt_vi"]["description"]
            .as_str()
            .unwrap();
        assert!(animated_desc.contains("ANIMATED"));

        let realistic = serde_json::to_value(response_schema(DEFAULT_STYLE)).unwrap();
        let realistic_desc = realistic["items"]["properties"]["whisk_prompt_vi"]["description"]
            .as_str()
            .unwrap();
        assert!(realistic_desc.contains("PHOTOREALISTIC"));
    }

    #[test]
    fn test_prompt_artifacts_are_numbered_sections() {
        let scenes = vec![
            StoryboardScene {
                character: String::new(),
                style: "cinematic".into(),
                scene: "mở đầu".into(),
                character_summary: "1 Nam".into(),
                whisk_prompt_vi: "cảnh rừng sương mù".into(),
                motion_prompt: "slow dolly through fog".into(),
            },
            StoryboardScene {
                character: String::new(),
                style: "cinematic".into(),
                scene: "cao trào".into(),
                character_summary: "1 Nam và 1 Thú".into(),
                whisk_prompt_vi: "trận chiến dưới mưa".into(),
                motion_prompt: "handheld follow shot in rain".into(),
            },
        ];

        let whisk = whisk_prompts_artifact(&scenes);
        assert_eq!(whisk.file_name, "whisk_prompts_vi.txt");
        let text = String::from_utf8(whisk.bytes).unwrap();
        assert!(text.starts_with("Cảnh 1:\ncảnh rừng sương mù"));
        assert!(text.contains("Cảnh 2:\ntrận chiến dưới mưa"));

        let motion = motion_prompts_artifact(&scenes);
        assert_eq!(motion.file_name, "flow_veo_prompts.txt");
    }
}
