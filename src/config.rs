use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "photochat.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub chat_path: String,
    pub photo_path: String,
    /// Persona identifier forwarded to both endpoints as `girl_id`.
    pub persona: Option<String>,
    /// Replaces the bundled persona table when set.
    pub personas_file: Option<PathBuf>,
    pub request_timeout_secs: Option<u64>,
    pub photo_style: Option<String>,
    pub photo_pose: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            chat_path: "/chat".to_string(),
            photo_path: "/photo".to_string(),
            persona: None,
            personas_file: None,
            request_timeout_secs: None,
            photo_style: None,
            photo_pose: None,
        }
    }
}

impl Config {
    /// Reads `explicit` if given, otherwise `photochat.toml` when it exists, then
    /// applies environment overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    log::debug!("no {DEFAULT_CONFIG_FILE} found, using defaults");
                    Self::default()
                }
            }
        };

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(base_url) = non_empty("PHOTOCHAT_BASE_URL") {
            self.base_url = base_url;
        }
        if let Some(chat_path) = non_empty("PHOTOCHAT_CHAT_PATH") {
            self.chat_path = chat_path;
        }
        if let Some(photo_path) = non_empty("PHOTOCHAT_PHOTO_PATH") {
            self.photo_path = photo_path;
        }
        if let Some(persona) = non_empty("PHOTOCHAT_PERSONA") {
            self.persona = Some(persona);
        }
        if let Some(file) = non_empty("PHOTOCHAT_PERSONAS_FILE") {
            self.personas_file = Some(PathBuf::from(file));
        }
        if let Some(timeout) = non_empty("PHOTOCHAT_TIMEOUT_SECS") {
            match timeout.trim().parse() {
                Ok(secs) => self.request_timeout_secs = Some(secs),
                Err(_) => log::warn!("ignoring invalid PHOTOCHAT_TIMEOUT_SECS={timeout:?}"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Config;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn file_values_fill_missing_fields_from_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file should be created");
        writeln!(
            file,
            "base_url = \"http://chat.local\"\nchat_path = \"/api/chat\"\npersona = \"anastasia\""
        )
        .expect("config fixture should write");

        let config = Config::from_file(file.path()).expect("config should load");
        assert_eq!(config.base_url, "http://chat.local");
        assert_eq!(config.chat_path, "/api/chat");
        assert_eq!(config.photo_path, "/photo");
        assert_eq!(config.persona.as_deref(), Some("anastasia"));
        assert!(config.request_timeout_secs.is_none());
    }

    #[test]
    fn invalid_file_reports_parse_error() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file should be created");
        writeln!(file, "base_url = [").expect("config fixture should write");

        let error = Config::from_file(file.path()).expect_err("invalid toml should fail");
        assert!(error.to_string().contains("failed to parse"));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let error = Config::load(Some(std::path::Path::new("/nonexistent/photochat.toml")))
            .expect_err("missing explicit file should fail");
        assert!(error.to_string().contains("failed to read"));
    }

    #[test]
    fn env_overrides_replace_non_empty_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("PHOTOCHAT_BASE_URL", "http://override"),
            ("PHOTOCHAT_PERSONA", "lena"),
            ("PHOTOCHAT_PHOTO_PATH", "  "),
            ("PHOTOCHAT_TIMEOUT_SECS", "45"),
        ]);
        let mut config = Config::default();
        config.apply_env(|key| env.get(key).map(|value| value.to_string()));

        assert_eq!(config.base_url, "http://override");
        assert_eq!(config.persona.as_deref(), Some("lena"));
        assert_eq!(config.photo_path, "/photo");
        assert_eq!(config.request_timeout_secs, Some(45));
    }

    #[test]
    fn invalid_timeout_is_ignored() {
        let mut config = Config::default();
        config.apply_env(|key| (key == "PHOTOCHAT_TIMEOUT_SECS").then(|| "soon".to_string()));
        assert!(config.request_timeout_secs.is_none());
    }
}
