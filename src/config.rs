use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

const DEFAULT_CONFIG_FILE: &str = "editor_config.json";

/// Editor configuration persisted between sessions as pretty-printed JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorConfig {
    pub api_key: String,
    pub selected_model: String,
    pub models: Vec<String>,
    pub last_file: String,
}

/// Partial update posted by the settings dialog; absent fields keep their
/// current value.
#[derive(Debug, Deserialize)]
pub struct ConfigUpdate {
    pub api_key: Option<String>,
    pub selected_model: Option<String>,
    pub models: Option<Vec<String>>,
    pub last_file: Option<String>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        let models: Vec<String> = [
            "qwen/qwen3-vl-235b-a22b-thinking",
            "meta-llama/llama-3.2-3b-instruct:free",
            "google/gemini-2.0-flash-exp:free",
            "anthropic/claude-3.5-sonnet",
            "anthropic/claude-3-haiku",
            "openai/gpt-4-turbo",
        ]
        .iter()
        .map(ToString::to_string)
        .collect();

        Self {
            api_key: String::new(),
            selected_model: models[0].clone(),
            models,
            last_file: String::new(),
        }
    }
}

impl EditorConfig {
    pub fn config_file() -> PathBuf {
        env::var("EDITOR_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    /// Loads the config file, falling back to defaults when it is missing or
    /// unparseable.
    pub fn load() -> Self {
        let path = Self::config_file();
        match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(config) => {
                    debug!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    warn!("Config file '{}' is not valid JSON ({}), using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self) -> Result<(), String> {
        let path = Self::config_file();
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;
        fs::write(&path, content).map_err(|e| format!("Failed to write '{}': {}", path.display(), e))
    }

    pub fn apply(&mut self, update: ConfigUpdate) {
        if let Some(api_key) = update.api_key {
            self.api_key = api_key;
        }
        if let Some(selected_model) = update.selected_model {
            self.selected_model = selected_model;
        }
        if let Some(models) = update.models {
            self.models = models;
        }
        if let Some(last_file) = update.last_file {
            self.last_file = last_file;
        }
    }

    /// API key for the chat endpoint, preferring the config value over the
    /// OPENROUTER_API_KEY environment variable.
    pub fn resolved_api_key(&self) -> Option<String> {
        if !self.api_key.is_empty() {
            return Some(self.api_key.clone());
        }
        env::var("OPENROUTER_API_KEY").ok().filter(|k| !k.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_select_first_model() {
        let config = EditorConfig::default();
        assert!(!config.models.is_empty());
        assert_eq!(config.selected_model, config.models[0]);
        assert!(config.api_key.is_empty());
        assert!(config.last_file.is_empty());
    }

    #[test]
    fn apply_merges_only_present_fields() {
        let mut config = EditorConfig::default();
        let original_models = config.models.clone();
        config.apply(ConfigUpdate {
            api_key: Some("sk-test".to_string()),
            selected_model: None,
            models: None,
            last_file: Some("/tmp/a.py".to_string()),
        });
        assert_eq!(config.api_key, "sk-test");
        assert_eq!(config.models, original_models);
        assert_eq!(config.last_file, "/tmp/a.py");
    }

    #[test]
    fn roundtrips_through_json() {
        let mut config = EditorConfig::default();
        config.api_key = "sk-roundtrip".to_string();
        let json = serde_json::to_string(&config).unwrap();
        let back: EditorConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.api_key, "sk-roundtrip");
        assert_eq!(back.models, config.models);
    }

    #[test]
    fn unparseable_update_fields_are_optional() {
        let update: ConfigUpdate = serde_json::from_str("{}").unwrap();
        let mut config = EditorConfig::default();
        let before = config.clone();
        config.apply(update);
        assert_eq!(config.selected_model, before.selected_model);
    }
}
