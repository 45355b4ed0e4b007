//! Script writer: turns a one-line idea into a scene-by-scene script where
//! every scene carries a structured JSON prompt for a downstream video
//! model.

use serde::{Deserialize, Serialize};

use mf_core::artifact::Artifact;
use mf_core::duration::{parse_duration_seconds, required_scenes};
use mf_core::models::GenModel;
use mf_core::{Error, Result};
use mf_genai::openai::OpenAiClient;
use mf_genai::{GenAiClient, Schema, UserPart};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiProvider {
    Google,
    OpenAi,
}

#[derive(Debug, Clone)]
pub struct ScriptRequest {
    pub idea: String,
    /// Free-text duration; unparseable input degrades to "not specified".
    pub duration: String,
    pub provider: ApiProvider,
}

/// One scene of the generated script. The nested `prompt` object doubles as
/// an engineered prompt for the video model, which is why its field names
/// are the prompt-engineering labels rather than Rust-style keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptScene {
    pub scene: u32,
    /// Vietnamese description of what happens in the scene.
    pub description: String,
    pub prompt: StructuredPrompt,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredPrompt {
    #[serde(rename = "Objective")]
    pub objective: String,
    #[serde(rename = "Persona")]
    pub persona: Persona,
    #[serde(rename = "Task_Instructions")]
    pub task_instructions: Vec<String>,
    #[serde(rename = "Constraints")]
    pub constraints: Vec<String>,
    #[serde(rename = "Input_Examples")]
    pub input_examples: Vec<InputExample>,
    #[serde(rename = "Output_Format")]
    pub output_format: OutputFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Persona {
    #[serde(rename = "Role")]
    pub role: String,
    #[serde(rename = "Tone")]
    pub tone: String,
    #[serde(rename = "Knowledge_Level")]
    pub knowledge_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputExample {
    #[serde(rename = "Input")]
    pub input: String,
    #[serde(rename = "Expected_Output")]
    pub expected_output: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputFormat {
    #[serde(rename = "Type")]
    pub format_type: String,
    #[serde(rename = "Structure")]
    pub structure: OutputStructure,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputStructure {
    pub character_details: String,
    pub setting_details: String,
    pub key_action: String,
    pub camera_direction: String,
}

pub const SCRIPT_SYSTEM_INSTRUCTION: &str = r#"You are an expert scriptwriter and AI prompt engineer. Your task is to transform a user's simple idea into a detailed script. For each scene, you must generate a highly structured, detailed JSON prompt object designed to guide another AI in creating a consistent video clip.

**INTERNAL MONOLOGUE & CONSISTENCY PLAN (CRITICAL):**
Before generating the JSON output, you MUST first create an internal plan. This plan will NOT be part of the final output.
1.  **Define Core Entities:** Create a detailed "entity sheet" for all main characters and key locations.
    *   **For Characters:** Specify their species, gender, age, clothing, hair color/style, facial features, unique marks (e.g., "a 25-year-old male explorer with short, messy brown hair, a rugged leather jacket over a grey t-shirt, cargo pants, and a noticeable scar above his left eyebrow").
    *   **For Locations:** Describe the key elements, atmosphere, lighting, and time of day (e.g., "a dense, Amazonian jungle at dusk, with thick fog clinging to the ground, giant glowing mushrooms providing an eerie blue light").
2.  **Reference the Plan:** For every scene you generate, you MUST refer back to this entity sheet and use the exact descriptive details to populate the fields in the structured JSON prompt. This is the key to consistency.

**LANGUAGE REQUIREMENT (CRITICAL):**
- The top-level "description" field for each scene MUST be in VIETNAMESE.
- All content inside the nested "prompt" JSON object MUST be in ENGLISH.

**STRUCTURED PROMPT FOR EACH SCENE (CRITICAL):**
For each scene, the "prompt" field must be a JSON object with the keys "Objective", "Persona" (with "Role", "Tone", "Knowledge_Level"), "Task_Instructions", "Constraints", "Input_Examples" (pairs of "Input" and "Expected_Output"), and "Output_Format" (with "Type" and a "Structure" object holding "character_details", "setting_details", "key_action", "camera_direction"). You will populate it with details from your internal plan and the specific actions of the scene."#;

/// The user half of the request. When the duration parses, the exact scene
/// count becomes a hard requirement; otherwise the raw text is passed along
/// as-is.
pub fn build_user_prompt(idea: &str, duration: &str) -> String {
    let mut prompt =
        format!("Generate a script and video prompts based on these details:\n\nIdea: \"{idea}\"");
    match parse_duration_seconds(duration) {
        Some(total_seconds) => {
            let scenes = required_scenes(total_seconds);
            prompt.push_str(&format!(
                "\n\nRequirement: The final video should be approximately {duration} \
                 ({total_seconds} seconds). To achieve this, you MUST generate exactly \
                 {scenes} scenes, as each scene will become an 8-second video clip."
            ));
        }
        None => {
            let label = if duration.trim().is_empty() {
                "not specified"
            } else {
                duration
            };
            prompt.push_str(&format!("\n\nDesired Video Duration: \"{label}\""));
        }
    }
    prompt
}

/// The constrained output shape: an array of scene objects with the fully
/// nested structured prompt.
pub fn response_schema() -> Schema {
    let structure = Schema::object([
        ("character_details", Schema::string()),
        ("setting_details", Schema::string()),
        ("key_action", Schema::string()),
        ("camera_direction", Schema::string()),
    ]);
    let structured_prompt = Schema::object([
        ("Objective", Schema::string()),
        (
            "Persona",
            Schema::object([
                ("Role", Schema::string()),
                ("Tone", Schema::string()),
                ("Knowledge_Level", Schema::string()),
            ]),
        ),
        ("Task_Instructions", Schema::array(Schema::string())),
        ("Constraints", Schema::array(Schema::string())),
        (
            "Input_Examples",
            Schema::array(Schema::object([
                ("Input", Schema::string()),
                ("Expected_Output", Schema::string()),
            ])),
        ),
        (
            "Output_Format",
            Schema::object([("Type", Schema::string()), ("Structure", structure)]),
        ),
    ]);

    Schema::array(Schema::object([
        (
            "scene",
            Schema::integer().describe("The scene number, starting from 1."),
        ),
        (
            "description",
            Schema::string().describe("A VIETNAMESE description of what happens in this scene."),
        ),
        (
            "prompt",
            structured_prompt.describe("A structured JSON prompt object for the video generation AI."),
        ),
    ]))
}

#[derive(Debug, Deserialize)]
struct ScenesEnvelope {
    scenes: Vec<ScriptScene>,
}

pub async fn generate_script(
    client: &GenAiClient,
    openai: Option<&OpenAiClient>,
    req: &ScriptRequest,
) -> Result<Vec<ScriptScene>> {
    if req.idea.trim().is_empty() {
        return Err(Error::Unknown("Vui lòng nhập ý tưởng nội dung.".into()));
    }
    let user_prompt = build_user_prompt(&req.idea, &req.duration);

    let scenes = match req.provider {
        ApiProvider::Google => {
            let value = client
                .generate_structured(
                    GenModel::Gemini25Flash,
                    Some(SCRIPT_SYSTEM_INSTRUCTION),
                    vec![UserPart::Text(user_prompt)],
                    response_schema(),
                )
                .await?;
            serde_json::from_value::<Vec<ScriptScene>>(value).map_err(|e| {
                Error::MalformedResponse(format!("Kịch bản trả về không đúng cấu trúc: {e}"))
            })?
        }
        ApiProvider::OpenAi => {
            let openai = openai.ok_or_else(|| {
                Error::InvalidCredential("OpenAI API key chưa được cấu hình.".into())
            })?;
            let system = format!(
                "{SCRIPT_SYSTEM_INSTRUCTION}\n\n**OUTPUT FORMAT (CRITICAL):**\nYour final \
                 output must be a single, valid JSON object with one key: \"scenes\". The value \
                 of \"scenes\" should be an array of objects, where each object represents a \
                 scene. Each scene object must contain 'scene', 'description', and 'prompt' keys."
            );
            let content = openai.chat_json("gpt-4o", &system, &user_prompt).await?;
            serde_json::from_str::<ScenesEnvelope>(&content)
                .map_err(|_| {
                    Error::MalformedResponse(
                        "Invalid response format from OpenAI. Expected a 'scenes' array.".into(),
                    )
                })?
                .scenes
        }
    };

    if let Some(total_seconds) = parse_duration_seconds(&req.duration) {
        let expected = required_scenes(total_seconds) as usize;
        if scenes.len() != expected {
            tracing::warn!(
                expected,
                returned = scenes.len(),
                "scene count differs from the requested duration"
            );
        }
    }

    Ok(scenes)
}

/// A JSON bundle holding only the per-scene prompts, keyed `scene_N`.
pub fn prompts_artifact(scenes: &[ScriptScene]) -> Artifact {
    let mut map = serde_json::Map::new();
    for scene in scenes {
        map.insert(
            format!("scene_{}", scene.scene),
            serde_json::to_value(&scene.prompt).unwrap_or(serde_json::Value::Null),
        );
    }
    let bytes = serde_json::to_vec_pretty(&map).unwrap_or_default();
    Artifact::new("generated_prompts.json", "application/json", bytes)
}

/// The full script, scenes and descriptions included.
pub fn script_artifact(scenes: &[ScriptScene]) -> Artifact {
    let bytes = serde_json::to_vec_pretty(scenes).unwrap_or_default();
    Artifact::new("generated_script.json", "application/json", bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_scene_json() -> &'static str {
        r#"{
            "scene": 1,
            "description": "Kong xuất hiện giữa rừng rậm.",
            "prompt": {
                "Objective": "An 8-second cinematic clip.",
                "Persona": {"Role": "Cinematographer", "Tone": "Epic", "Knowledge_Level": "Expert"},
                "Task_Instructions": ["Show Kong pushing through vines."],
                "Constraints": ["Exactly 8 seconds."],
                "Input_Examples": [{"Input": "similar scene", "Expected_Output": "great clip"}],
                "Output_Format": {
                    "Type": "video/mp4",
                    "Structure": {
                        "character_details": "giant ape",
                        "setting_details": "Amazon jungle at dusk",
                        "key_action": "pushing vines aside",
                        "camera_direction": "dolly zoom"
                    }
                }
            }
        }"#
    }

    #[test]
    fn test_user_prompt_embeds_exact_scene_count() {
        let prompt = build_user_prompt("Kong vs bear", "30 giây");
        assert!(prompt.contains("Idea: \"Kong vs bear\""));
        assert!(prompt.contains("(30 seconds)"));
        assert!(prompt.contains("exactly 4 scenes"));
    }

    #[test]
    fn test_user_prompt_without_parseable_duration() {
        let prompt = build_user_prompt("Kong vs bear", "dài vừa phải");
        assert!(prompt.contains("Desired Video Duration: \"dài vừa phải\""));
        assert!(!prompt.contains("exactly"));

        let empty = build_user_prompt("Kong vs bear", "");
        assert!(empty.contains("Desired Video Duration: \"not specified\""));
    }

    #[test]
    fn test_scene_round_trips_original_field_names() {
        let scene: ScriptScene = serde_json::from_str(sample_scene_json()).unwrap();
        assert_eq!(scene.scene, 1);
        assert_eq!(scene.prompt.persona.role, "Cinematographer");
        assert_eq!(scene.prompt.output_format.structure.camera_direction, "dolly zoom");

        let back = serde_json::to_value(&scene).unwrap();
        assert!(back["prompt"]["Task_Instructions"].is_array());
        assert_eq!(back["prompt"]["Output_Format"]["Type"], "video/mp4");
        assert_eq!(
            back["prompt"]["Output_Format"]["Structure"]["key_action"],
            "pushing vines aside"
        );
    }

    #[test]
    fn test_response_schema_shape() {
        let json = serde_json::to_value(response_schema()).unwrap();
        assert_eq!(json["type"], "ARRAY");
        let item = &json["items"];
        assert_eq!(item["properties"]["scene"]["type"], "INTEGER");
        assert_eq!(
            item["properties"]["prompt"]["properties"]["Persona"]["properties"]["Knowledge_Level"]
                ["type"],
            "STRING"
        );
    }

    #[test]
    fn test_artifacts_named_like_downloads() {
        let scene: ScriptScene = serde_json::from_str(sample_scene_json()).unwrap();
        let scenes = vec![scene];

        let prompts = prompts_artifact(&scenes);
        assert_eq!(prompts.file_name, "generated_prompts.json");
        let value: serde_json::Value = serde_json::from_slice(&prompts.bytes).unwrap();
        assert!(value.get("scene_1").is_some());

        let script = script_artifact(&scenes);
        assert_eq!(script.file_name, "generated_script.json");
    }
}
