//! Configuration types.

use std::path::PathBuf;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Default location of the user records file.
pub const DEFAULT_DATA_PATH: &str = "users_data.json";

/// Telegram channel settings.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: SecretString,
    /// Usernames or numeric ids; `*` allows everyone.
    pub allowed_users: Vec<String>,
}

/// Bot configuration, built from environment variables.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Where user records are persisted.
    pub data_path: PathBuf,
    /// Optional JSON question bank replacing the built-in one.
    pub question_bank_path: Option<PathBuf>,
    /// Whether the stdin/stdout channel runs.
    pub cli_enabled: bool,
    /// Present when `TELEGRAM_BOT_TOKEN` is set.
    pub telegram: Option<TelegramConfig>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            question_bank_path: None,
            cli_enabled: true,
            telegram: None,
        }
    }
}

impl BotConfig {
    /// Build config from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let data_path = non_empty("MORATALK_DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));

        let question_bank_path = non_empty("MORATALK_QUESTION_BANK").map(PathBuf::from);

        let cli_enabled = match non_empty("MORATALK_CLI") {
            Some(v) => parse_bool("MORATALK_CLI", &v)?,
            None => true,
        };

        let telegram = non_empty("TELEGRAM_BOT_TOKEN").map(|token| {
            let allowed_users: Vec<String> = lookup("TELEGRAM_ALLOWED_USERS")
                .unwrap_or_else(|| "*".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            TelegramConfig {
                bot_token: SecretString::from(token),
                allowed_users,
            }
        });

        if !cli_enabled && telegram.is_none() {
            return Err(ConfigError::InvalidValue {
                key: "MORATALK_CLI".into(),
                message: "CLI is disabled and TELEGRAM_BOT_TOKEN is not set, no channel would run"
                    .into(),
            });
        }

        Ok(Self {
            data_path,
            question_bank_path,
            cli_enabled,
            telegram,
        })
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("expected a boolean, got {other:?}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<BotConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        BotConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_set() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.data_path, PathBuf::from("users_data.json"));
        assert!(cfg.question_bank_path.is_none());
        assert!(cfg.cli_enabled);
        assert!(cfg.telegram.is_none());
    }

    #[test]
    fn telegram_enabled_by_token() {
        let cfg = config(&[
            ("TELEGRAM_BOT_TOKEN", "123:ABC"),
            ("TELEGRAM_ALLOWED_USERS", "alice, 42 ,,"),
        ])
        .unwrap();
        let tg = cfg.telegram.unwrap();
        assert_eq!(tg.bot_token.expose_secret(), "123:ABC");
        assert_eq!(tg.allowed_users, vec!["alice", "42"]);
    }

    #[test]
    fn telegram_allows_everyone_by_default() {
        let cfg = config(&[("TELEGRAM_BOT_TOKEN", "t")]).unwrap();
        assert_eq!(cfg.telegram.unwrap().allowed_users, vec!["*"]);
    }

    #[test]
    fn paths_are_overridable() {
        let cfg = config(&[
            ("MORATALK_DATA_PATH", "/var/lib/moratalk/users.json"),
            ("MORATALK_QUESTION_BANK", "bank.json"),
        ])
        .unwrap();
        assert_eq!(cfg.data_path, PathBuf::from("/var/lib/moratalk/users.json"));
        assert_eq!(cfg.question_bank_path, Some(PathBuf::from("bank.json")));
    }

    #[test]
    fn invalid_bool_is_rejected() {
        let err = config(&[("MORATALK_CLI", "sometimes")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "MORATALK_CLI"));
    }

    #[test]
    fn needs_at_least_one_channel() {
        assert!(config(&[("MORATALK_CLI", "off")]).is_err());
        let cfg = config(&[("MORATALK_CLI", "off"), ("TELEGRAM_BOT_TOKEN", "t")]).unwrap();
        assert!(!cfg.cli_enabled);
    }
}
