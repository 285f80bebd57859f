//! Runtime configuration from `CARDIORENAL_*` environment variables.

use std::path::PathBuf;

use ed25519_dalek::VerifyingKey;

use crate::adapters::bundle::verifying_key_from_b64;
use crate::adapters::sanitize::DEFAULT_SANITIZE_MAX_BYTES;
use crate::{CardiorenalError, Result};

/// Where log output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMode {
    /// File when stdout is a terminal (the TUI owns it), stdout otherwise
    Auto,
    File,
    Stdout,
}

impl LogMode {
    /// Resolve `Auto` against whether stdout is interactive.
    #[must_use]
    pub fn use_file(self, interactive: bool) -> bool {
        match self {
            Self::File => true,
            Self::Stdout => false,
            Self::Auto => interactive,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory holding `model.json` and `feature_names.json`
    pub model_dir: PathBuf,
    /// Ed25519 key that model bundles must be signed with
    pub verifying_key: Option<VerifyingKey>,
    pub allow_unsigned_models: bool,
    pub log_mode: LogMode,
    pub log_file: PathBuf,
    pub sanitize_max_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            verifying_key: None,
            allow_unsigned_models: false,
            log_mode: LogMode::Auto,
            log_file: PathBuf::from("cardiorenal.log"),
            sanitize_max_bytes: DEFAULT_SANITIZE_MAX_BYTES,
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment.
    ///
    /// # Errors
    /// Returns `CardiorenalError::Config` for unparseable values.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    /// Returns `CardiorenalError::Config` for unparseable values.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(dir) = lookup("CARDIORENAL_MODEL_DIR") {
            config.model_dir = PathBuf::from(dir);
        }

        let key_b64 = match (
            lookup("CARDIORENAL_MODEL_PUBKEY_B64"),
            lookup("CARDIORENAL_MODEL_PUBKEY_B64_FILE"),
        ) {
            (Some(b64), _) => Some(b64),
            (None, Some(path)) => Some(std::fs::read_to_string(path.trim()).map_err(|e| {
                CardiorenalError::Config(format!("failed reading verifying key file: {e}"))
            })?),
            (None, None) => None,
        };
        config.verifying_key = key_b64
            .map(|b64| verifying_key_from_b64(&b64))
            .transpose()
            .map_err(|e| CardiorenalError::Config(e.to_string()))?;

        if let Some(v) = lookup("CARDIORENAL_ALLOW_UNSIGNED_MODELS") {
            config.allow_unsigned_models = parse_bool(&v);
        }

        if let Some(mode) = lookup("CARDIORENAL_LOG_MODE") {
            config.log_mode = match mode.trim().to_ascii_lowercase().as_str() {
                "auto" => LogMode::Auto,
                "file" => LogMode::File,
                "stdout" => LogMode::Stdout,
                other => {
                    return Err(CardiorenalError::Config(format!(
                        "CARDIORENAL_LOG_MODE must be auto, file or stdout (got '{other}')"
                    )))
                }
            };
        }

        if let Some(path) = lookup("CARDIORENAL_LOG_FILE") {
            config.log_file = PathBuf::from(path);
        }

        if let Some(v) = lookup("CARDIORENAL_SANITIZE_MAX_BYTES") {
            config.sanitize_max_bytes = v
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|&n| n > 0)
                .ok_or_else(|| {
                    CardiorenalError::Config(format!(
                        "CARDIORENAL_SANITIZE_MAX_BYTES must be a positive integer (got '{v}')"
                    ))
                })?;
        }

        Ok(config)
    }
}

fn parse_bool(v: &str) -> bool {
    matches!(v.trim(), "1" | "true" | "TRUE" | "yes" | "YES")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[])).expect("defaults");
        assert_eq!(config.model_dir, PathBuf::from("models"));
        assert!(config.verifying_key.is_none());
        assert!(!config.allow_unsigned_models);
        assert_eq!(config.log_mode, LogMode::Auto);
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("CARDIORENAL_MODEL_DIR", "/srv/models"),
            ("CARDIORENAL_ALLOW_UNSIGNED_MODELS", "yes"),
            ("CARDIORENAL_LOG_MODE", "stdout"),
            ("CARDIORENAL_SANITIZE_MAX_BYTES", "4096"),
        ]))
        .expect("config");
        assert_eq!(config.model_dir, PathBuf::from("/srv/models"));
        assert!(config.allow_unsigned_models);
        assert!(!config.log_mode.use_file(true));
        assert_eq!(config.sanitize_max_bytes, 4096);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(AppConfig::from_lookup(lookup(&[("CARDIORENAL_LOG_MODE", "syslog")])).is_err());
        assert!(
            AppConfig::from_lookup(lookup(&[("CARDIORENAL_SANITIZE_MAX_BYTES", "0")])).is_err()
        );
        assert!(
            AppConfig::from_lookup(lookup(&[("CARDIORENAL_MODEL_PUBKEY_B64", "not-a-key")]))
                .is_err()
        );
    }

    #[test]
    fn test_auto_log_mode_follows_terminal() {
        assert!(LogMode::Auto.use_file(true));
        assert!(!LogMode::Auto.use_file(false));
        assert!(LogMode::File.use_file(false));
    }
}
