use serde::Deserialize;
use std::fs;
use tracing::{debug, warn};

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SheetConfig {
    pub title: String,
    pub business: String,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            title: "TIME SHEET".to_string(),
            business: String::new(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct EntryConfig {
    #[serde(default)]
    pub text_mode: bool,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TimesConfig {
    pub first: String,
    pub last: String,
    pub step_minutes: u32,
}

impl Default for TimesConfig {
    fn default() -> Self {
        Self {
            first: "4:30 AM".to_string(),
            last: "4:30 PM".to_string(),
            step_minutes: 15,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct StorageConfig {
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ReviewConfig {
    pub model: String,
    pub api_key_env: String,
    pub endpoint: String,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct PdfConfig {
    #[serde(default)]
    pub output_dir: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub sheet: SheetConfig,
    #[serde(default)]
    pub entry: EntryConfig,
    #[serde(default)]
    pub times: TimesConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub review: ReviewConfig,
    #[serde(default)]
    pub pdf: PdfConfig,
}

impl Config {
    pub fn time_options(&self) -> Vec<String> {
        crate::clock::time_options(&self.times.first, &self.times.last, self.times.step_minutes)
    }

    /// Key from the configured variable, then the generic `API_KEY`.
    pub fn review_api_key(&self) -> Option<String> {
        std::env::var(&self.review.api_key_env)
            .or_else(|_| std::env::var("API_KEY"))
            .ok()
            .filter(|k| !k.trim().is_empty())
    }
}

pub fn load_config() -> Config {
    let config_path = dirs::config_dir()
        .map(|p| p.join("timecard/config.json"))
        .or_else(|| dirs::home_dir().map(|p| p.join(".config/timecard/config.json")));

    if let Some(path) = config_path {
        if path.exists() {
            match fs::read_to_string(&path).map(|c| serde_json::from_str::<Config>(&c)) {
                Ok(Ok(config)) => {
                    debug!(path = %path.display(), "config loaded");
                    return config;
                }
                Ok(Err(e)) => warn!(error = %e, "config is invalid, using defaults"),
                Err(e) => warn!(error = %e, "config unreadable, using defaults"),
            }
        }
    }

    Config::default()
}
