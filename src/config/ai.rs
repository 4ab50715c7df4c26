// src/config/ai.rs
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path};

pub const DEFAULT_AI_CONFIG_PATH: &str = "config/ai.json";

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}
fn default_daily_limit() -> u32 {
    200
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    pub enabled: bool,
    /// Only "openai" is supported (case-insensitive).
    pub provider: String,
    #[serde(default = "default_daily_limit")]
    pub daily_limit: u32,
    /// "ENV" means: read from OPENAI_API_KEY (or VITE_OPENAI_API_KEY)
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: "openai".to_string(),
            daily_limit: default_daily_limit(),
            api_key: String::new(),
            model: default_model(),
        }
    }
}

impl AiConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    pub fn from_json_str(data: &str) -> anyhow::Result<Self> {
        let mut cfg: AiConfig = serde_json::from_str(data)?;

        cfg.provider = cfg.provider.trim().to_lowercase();

        // A disabled config never needs a key.
        if cfg.enabled && cfg.api_key.trim().eq_ignore_ascii_case("env") {
            cfg.api_key = match cfg.provider.as_str() {
                "openai" => env::var("OPENAI_API_KEY")
                    .or_else(|_| env::var("VITE_OPENAI_API_KEY"))
                    .map_err(|_| anyhow::anyhow!("Missing OPENAI_API_KEY env var"))?,
                other => anyhow::bail!("Unsupported provider in config: {other}"),
            };
        }

        if cfg.model.trim().is_empty() {
            cfg.model = default_model();
        }

        Ok(cfg)
    }

    /// Reads `config/ai.json` when present, otherwise summaries stay off.
    pub fn load_default() -> anyhow::Result<Self> {
        let p = Path::new(DEFAULT_AI_CONFIG_PATH);
        if p.exists() {
            Self::load_from_file(p)
        } else {
            Ok(Self::default())
        }
    }
}
