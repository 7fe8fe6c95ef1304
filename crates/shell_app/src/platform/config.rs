//! Shell configuration, read from a RON file at startup.
//!
//! A missing or unreadable file is not fatal: the shell falls back to the
//! built-in defaults and logs why.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use shell_core::{Allowlist, AllowlistError, MatchMode};
use shell_logging::{shell_info, shell_warn};
use thiserror::Error;
use url::Url;

const CONFIG_FILENAME: &str = "shell.ron";
const CONFIG_ENV: &str = "SHELL_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Allowlist(#[from] AllowlistError),
    #[error("invalid url {value:?} for {field}: {reason}")]
    Url {
        field: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MatchModeSetting {
    #[default]
    Prefix,
    Origin,
}

impl From<MatchModeSetting> for MatchMode {
    fn from(value: MatchModeSetting) -> Self {
        match value {
            MatchModeSetting::Prefix => MatchMode::Prefix,
            MatchModeSetting::Origin => MatchMode::Origin,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    pub app_name: String,
    pub home_url: String,
    pub allowed_origins: Vec<String>,
    pub match_mode: MatchModeSetting,
    pub feed_url: String,
    pub auto_check_on_startup: bool,
    pub startup_check_delay_ms: u64,
    pub allow_prerelease: bool,
    pub download_dir: Option<PathBuf>,
    pub suppress_reload_shortcuts: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            app_name: "ChatECNU Desktop".to_string(),
            home_url: "https://chat.ecnu.edu.cn".to_string(),
            allowed_origins: vec![
                "https://chat.ecnu.edu.cn".to_string(),
                "https://sso.ecnu.edu.cn".to_string(),
            ],
            match_mode: MatchModeSetting::Prefix,
            feed_url: "https://chat.ecnu.edu.cn/desktop/latest.json".to_string(),
            auto_check_on_startup: true,
            startup_check_delay_ms: 3000,
            allow_prerelease: true,
            download_dir: None,
            suppress_reload_shortcuts: true,
        }
    }
}

impl ShellConfig {
    pub fn allowlist(&self) -> Result<Allowlist, ConfigError> {
        Ok(Allowlist::new(
            self.allowed_origins.iter().cloned(),
            self.match_mode.into(),
        )?)
    }

    pub fn feed_url(&self) -> Result<Url, ConfigError> {
        parse_url("feed_url", &self.feed_url)
    }

    pub fn home_url(&self) -> Result<Url, ConfigError> {
        parse_url("home_url", &self.home_url)
    }

    pub fn download_dir(&self) -> PathBuf {
        self.download_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("kiosk-shell-updates"))
    }
}

fn parse_url(field: &'static str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|err| ConfigError::Url {
        field,
        value: value.to_string(),
        reason: err.to_string(),
    })
}

/// `$SHELL_CONFIG` if set, else `./shell.ron`.
pub fn config_path() -> PathBuf {
    std::env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(".").join(CONFIG_FILENAME))
}

pub fn load_config(path: &Path) -> ShellConfig {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            shell_info!("No config at {:?}; using defaults", path);
            return ShellConfig::default();
        }
        Err(err) => {
            shell_warn!("Failed to read config from {:?}: {}", path, err);
            return ShellConfig::default();
        }
    };

    match ron::from_str(&content) {
        Ok(config) => {
            shell_info!("Loaded config from {:?}", path);
            config
        }
        Err(err) => {
            shell_warn!("Failed to parse config from {:?}: {}", path, err);
            ShellConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shell.ron");
        std::fs::write(
            &path,
            r#"(
                app_name: "Campus Chat",
                allowed_origins: ["https://chat.example.edu"],
                match_mode: Origin,
                startup_check_delay_ms: 500,
            )"#,
        )
        .unwrap();

        let config = load_config(&path);
        assert_eq!(config.app_name, "Campus Chat");
        assert_eq!(config.match_mode, MatchModeSetting::Origin);
        assert_eq!(config.startup_check_delay_ms, 500);
        assert!(config.auto_check_on_startup);
        assert_eq!(config.allowlist().unwrap().mode(), MatchMode::Origin);
    }

    #[test]
    fn unreadable_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shell.ron");
        std::fs::write(&path, "this is not ron").unwrap();

        assert_eq!(load_config(&path), ShellConfig::default());
        assert_eq!(load_config(&dir.path().join("missing.ron")), ShellConfig::default());
    }

    #[test]
    fn defaults_are_valid() {
        let config = ShellConfig::default();
        assert_eq!(config.allowlist().unwrap().entries().len(), 2);
        assert!(config.feed_url().is_ok());
        assert!(config.home_url().is_ok());
        assert_eq!(config.startup_check_delay_ms, 3000);
    }

    #[test]
    fn empty_allowlist_is_rejected() {
        let config = ShellConfig {
            allowed_origins: Vec::new(),
            ..ShellConfig::default()
        };
        assert!(matches!(
            config.allowlist(),
            Err(ConfigError::Allowlist(AllowlistError::Empty))
        ));
    }
}
