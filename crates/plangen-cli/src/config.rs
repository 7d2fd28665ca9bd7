//! Configuration file management for plangen.
//!
//! Provides a TOML-based config file at `~/.config/plangen/config.toml` and a
//! resolution chain: CLI flag > env var > config file > default.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use plangen_core::client::{Credential, GeminiBackend, GenerationSettings, LessonPlanClient};

/// Env vars checked for the API key, in priority order.
pub const API_KEY_ENV_VARS: [&str; 2] = ["PLANGEN_API_KEY", "GEMINI_API_KEY"];
pub const MODEL_ENV_VAR: &str = "PLANGEN_MODEL";
pub const BASE_URL_ENV_VAR: &str = "PLANGEN_BASE_URL";

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub gemini: GeminiSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GeminiSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the plangen config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/plangen` or `~/.config/plangen`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("plangen");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("plangen")
}

/// Return the path to the plangen config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    let path = config_path();
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents).context("failed to parse config file")?;
    Ok(config)
}

/// Serialize and write the config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix since the file may hold an API key.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct PlangenConfig {
    pub credential: Credential,
    pub settings: GenerationSettings,
    pub base_url: String,
}

fn non_blank_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl PlangenConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// - API key: `cli_api_key` > `PLANGEN_API_KEY` > `GEMINI_API_KEY` > `gemini.api_key` > empty
    /// - Model: `cli_model` > `PLANGEN_MODEL` > `gemini.model` > `GenerationSettings::DEFAULT_MODEL`
    /// - Base URL: `PLANGEN_BASE_URL` > `gemini.base_url` > `GeminiBackend::DEFAULT_BASE_URL`
    /// - Temperature: `gemini.temperature` > `GenerationSettings::DEFAULT_TEMPERATURE`
    ///
    /// A missing API key is not an error here; each call fails instead.
    pub fn resolve(cli_api_key: Option<&str>, cli_model: Option<&str>) -> Result<Self> {
        let file_config = match load_config() {
            Ok(cfg) => Some(cfg),
            Err(e) => {
                if config_path().exists() {
                    tracing::warn!(error = %format!("{e:#}"), "ignoring unreadable config file");
                }
                None
            }
        };
        let gemini = file_config.map(|c| c.gemini).unwrap_or_default();

        let api_key = if let Some(key) = cli_api_key {
            key.to_string()
        } else if let Some(key) = API_KEY_ENV_VARS.iter().find_map(|v| non_blank_env(v)) {
            key
        } else {
            gemini.api_key.clone().unwrap_or_default()
        };
        let credential = Credential::new(api_key);
        if credential.is_missing() {
            tracing::warn!("no API key configured; generation requests will fail");
        }

        let model = if let Some(m) = cli_model {
            m.to_string()
        } else if let Some(m) = non_blank_env(MODEL_ENV_VAR) {
            m
        } else {
            gemini
                .model
                .clone()
                .unwrap_or_else(|| GenerationSettings::DEFAULT_MODEL.to_string())
        };

        let temperature = gemini
            .temperature
            .unwrap_or(GenerationSettings::DEFAULT_TEMPERATURE);
        if !(0.0..=2.0).contains(&temperature) {
            bail!("gemini.temperature must be between 0.0 and 2.0, got {temperature}");
        }

        let base_url = non_blank_env(BASE_URL_ENV_VAR)
            .or(gemini.base_url)
            .unwrap_or_else(|| GeminiBackend::DEFAULT_BASE_URL.to_string());

        Ok(Self {
            credential,
            settings: GenerationSettings { model, temperature },
            base_url,
        })
    }

    /// Build a client talking to the configured Gemini endpoint.
    pub fn client(&self) -> LessonPlanClient {
        LessonPlanClient::new(
            self.credential.clone(),
            self.settings.clone(),
            Arc::new(GeminiBackend::new(&self.base_url)),
        )
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn lock_env() -> std::sync::MutexGuard<'static, ()> {
        crate::test_util::lock_env()
    }

    /// Point config lookup at an empty temp dir and clear plangen env vars.
    fn isolated() -> tempfile::TempDir {
        let tmp = tempfile::TempDir::new().unwrap();
        unsafe { std::env::set_var("XDG_CONFIG_HOME", tmp.path()) };
        for var in API_KEY_ENV_VARS.iter().chain([&MODEL_ENV_VAR, &BASE_URL_ENV_VAR]) {
            unsafe { std::env::remove_var(var) };
        }
        tmp
    }

    fn restore() {
        unsafe { std::env::remove_var("XDG_CONFIG_HOME") };
        for var in API_KEY_ENV_VARS.iter().chain([&MODEL_ENV_VAR, &BASE_URL_ENV_VAR]) {
            unsafe { std::env::remove_var(var) };
        }
    }

    fn write_file(cfg: &ConfigFile) {
        save_config(cfg).unwrap();
    }

    #[test]
    fn save_and_load_config_roundtrip() {
        let _lock = lock_env();
        let _tmp = isolated();

        let original = ConfigFile {
            gemini: GeminiSection {
                api_key: Some("file-key".to_string()),
                model: Some("gemini-2.5-pro".to_string()),
                base_url: None,
                temperature: Some(0.2),
            },
        };
        write_file(&original);
        let loaded = load_config().unwrap();
        restore();

        assert_eq!(loaded.gemini.api_key.as_deref(), Some("file-key"));
        assert_eq!(loaded.gemini.model.as_deref(), Some("gemini-2.5-pro"));
        assert_eq!(loaded.gemini.temperature, Some(0.2));
        assert!(loaded.gemini.base_url.is_none());
    }

    #[cfg(unix)]
    #[test]
    fn save_config_sets_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let _lock = lock_env();
        let _tmp = isolated();
        write_file(&ConfigFile::default());
        let meta = std::fs::metadata(config_path()).unwrap();
        restore();

        assert_eq!(meta.permissions().mode() & 0o777, 0o600);
    }

    #[test]
    fn resolve_with_cli_flag_overrides_all() {
        let _lock = lock_env();
        let _tmp = isolated();
        write_file(&ConfigFile {
            gemini: GeminiSection {
                api_key: Some("file-key".to_string()),
                ..Default::default()
            },
        });
        unsafe { std::env::set_var("PLANGEN_API_KEY", "env-key") };

        let config = PlangenConfig::resolve(Some("cli-key"), Some("cli-model")).unwrap();
        restore();

        assert_eq!(config.credential.expose(), "cli-key");
        assert_eq!(config.settings.model, "cli-model");
    }

    #[test]
    fn resolve_env_order() {
        let _lock = lock_env();
        let _tmp = isolated();
        unsafe { std::env::set_var("GEMINI_API_KEY", "gemini-env") };
        let fallback = PlangenConfig::resolve(None, None).unwrap();
        unsafe { std::env::set_var("PLANGEN_API_KEY", "plangen-env") };
        let preferred = PlangenConfig::resolve(None, None).unwrap();
        restore();

        assert_eq!(fallback.credential.expose(), "gemini-env");
        assert_eq!(preferred.credential.expose(), "plangen-env");
    }

    #[test]
    fn resolve_env_overrides_config_file() {
        let _lock = lock_env();
        let _tmp = isolated();
        write_file(&ConfigFile {
            gemini: GeminiSection {
                api_key: Some("file-key".to_string()),
                model: Some("file-model".to_string()),
                base_url: Some("http://file.example".to_string()),
                temperature: Some(1.0),
            },
        });
        unsafe { std::env::set_var("GEMINI_API_KEY", "env-key") };
        unsafe { std::env::set_var("PLANGEN_BASE_URL", "http://env.example") };

        let config = PlangenConfig::resolve(None, None).unwrap();
        restore();

        assert_eq!(config.credential.expose(), "env-key");
        assert_eq!(config.settings.model, "file-model");
        assert_eq!(config.settings.temperature, 1.0);
        assert_eq!(config.base_url, "http://env.example");
    }

    #[test]
    fn resolve_defaults_when_nothing_set() {
        let _lock = lock_env();
        let _tmp = isolated();
        let config = PlangenConfig::resolve(None, None).unwrap();
        restore();

        assert!(config.credential.is_missing());
        assert_eq!(config.settings, GenerationSettings::default());
        assert_eq!(config.base_url, GeminiBackend::DEFAULT_BASE_URL);
    }

    #[test]
    fn resolve_rejects_out_of_range_temperature() {
        let _lock = lock_env();
        let _tmp = isolated();
        write_file(&ConfigFile {
            gemini: GeminiSection {
                temperature: Some(3.5),
                ..Default::default()
            },
        });
        let result = PlangenConfig::resolve(None, None);
        restore();

        let msg = result.unwrap_err().to_string();
        assert!(msg.contains("temperature"), "unexpected error: {msg}");
    }

    #[test]
    fn config_path_ends_with_expected_filename() {
        let _lock = lock_env();
        let path = config_path();
        assert!(
            path.ends_with("plangen/config.toml"),
            "unexpected config path: {}",
            path.display()
        );
    }
}
