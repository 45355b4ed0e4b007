use std::env;

use anyhow::Context;

use mf_genai::Credential;

/// Default caption drawn over affiliate images when none is configured.
pub const DEFAULT_WATERMARK_CAPTION: &str = "MEDIAFORGE AI STUDIO";

/// Explicit configuration for the studio. Loaded once and injected; no
/// component reads the environment on its own.
#[derive(Debug, Clone)]
pub struct StudioConfig {
    pub gemini_api_key: String,
    pub openai_api_key: Option<String>,
    pub watermark_caption: String,
}

impl StudioConfig {
    pub fn load() -> anyhow::Result<Self> {
        // A missing .env file is fine; real env vars still apply.
        let _ = dotenvy::dotenv();

        let gemini_api_key =
            env::var("GEMINI_API_KEY").context("GEMINI_API_KEY must be set")?;
        let openai_api_key = env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty());
        let watermark_caption = env::var("MEDIAFORGE_WATERMARK")
            .ok()
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_WATERMARK_CAPTION.to_string());

        Ok(Self {
            gemini_api_key,
            openai_api_key,
            watermark_caption,
        })
    }

    pub fn gemini_credential(&self) -> Credential {
        Credential::new(self.gemini_api_key.clone())
    }

    pub fn openai_credential(&self) -> Option<Credential> {
        self.openai_api_key.as_ref().map(Credential::new)
    }
}
