//! Runtime configuration from `NEXUS_*` environment variables.
//!
//! Variables are read once at startup. Unset variables take their defaults;
//! set but unparsable ones are an error naming the variable.

use std::path::PathBuf;

use thiserror::Error;

use crate::adapter::ServerConfig;
use crate::types::{BoardSize, GameConfig};

pub const ENV_LEVEL: &str = "NEXUS_LEVEL";
pub const ENV_SIZE: &str = "NEXUS_SIZE";
pub const ENV_SEED: &str = "NEXUS_SEED";
pub const ENV_KEEP_PLAYING: &str = "NEXUS_KEEP_PLAYING";
pub const ENV_RECORDS_PATH: &str = "NEXUS_RECORDS_PATH";
pub const ENV_LOG: &str = "NEXUS_LOG";
pub const ENV_LOG_PATH: &str = "NEXUS_LOG_PATH";
pub const ENV_AI_HOST: &str = "NEXUS_AI_HOST";
pub const ENV_AI_PORT: &str = "NEXUS_AI_PORT";
pub const ENV_AI_MAX_PENDING: &str = "NEXUS_AI_MAX_PENDING";
pub const ENV_AI_DISABLED: &str = "NEXUS_AI_DISABLED";

/// Configuration error
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    /// A variable was set to something that does not parse.
    #[error("{var}={value:?}: expected {expected}")]
    Invalid {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub game: GameConfig,
    pub records_path: Option<PathBuf>,
    pub log_filter: String,
    /// Log file; `None` disables logging.
    pub log_path: Option<PathBuf>,
    /// `None` when the adapter is disabled.
    pub adapter: Option<ServerConfig>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let level = parse_num::<u32>(ENV_LEVEL, get(ENV_LEVEL))?.unwrap_or(0);
        let mut game = GameConfig::for_level(level);
        if let Some(side) = parse_num::<u8>(ENV_SIZE, get(ENV_SIZE))? {
            let size = BoardSize::from_side(side).ok_or_else(|| ConfigError::Invalid {
                var: ENV_SIZE,
                value: side.to_string(),
                expected: "4, 5 or 6",
            })?;
            game = game.with_size(size);
        }
        game = game.with_seed(parse_num::<u32>(ENV_SEED, get(ENV_SEED))?.unwrap_or_else(time_seed));
        if let Some(keep) = parse_bool(ENV_KEEP_PLAYING, get(ENV_KEEP_PLAYING))? {
            game = game.with_keep_playing(keep);
        }

        let disabled = parse_bool(ENV_AI_DISABLED, get(ENV_AI_DISABLED))?.unwrap_or(false);
        let adapter = if disabled {
            None
        } else {
            let defaults = ServerConfig::default();
            Some(ServerConfig {
                host: get(ENV_AI_HOST).unwrap_or(defaults.host),
                port: parse_num(ENV_AI_PORT, get(ENV_AI_PORT))?.unwrap_or(defaults.port),
                max_pending_commands: parse_num(ENV_AI_MAX_PENDING, get(ENV_AI_MAX_PENDING))?
                    .unwrap_or(defaults.max_pending_commands),
            })
        };

        Ok(Self {
            game,
            records_path: get(ENV_RECORDS_PATH).map(PathBuf::from),
            log_filter: get(ENV_LOG).unwrap_or_else(|| "info".to_string()),
            log_path: get(ENV_LOG_PATH).map(PathBuf::from),
            adapter,
        })
    }
}

fn parse_num<T: std::str::FromStr>(
    var: &'static str,
    value: Option<String>,
) -> Result<Option<T>, ConfigError> {
    value
        .map(|v| {
            v.parse().map_err(|_| ConfigError::Invalid {
                var,
                value: v,
                expected: "a non-negative integer",
            })
        })
        .transpose()
}

fn parse_bool(var: &'static str, value: Option<String>) -> Result<Option<bool>, ConfigError> {
    value
        .map(|v| match v.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::Invalid {
                var,
                value: v,
                expected: "1/0 or true/false",
            }),
        })
        .transpose()
}

fn time_seed() -> u32 {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    (nanos as u32) ^ ((nanos >> 32) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let c = config(&[(ENV_SEED, "7")]).unwrap();
        assert_eq!(c.game.level, 0);
        assert_eq!(c.game.size, BoardSize::Four);
        assert_eq!(c.game.seed, 7);
        assert!(c.game.keep_playing_after_win);
        assert_eq!(c.log_filter, "info");
        assert!(c.log_path.is_none());
        assert_eq!(c.adapter, Some(ServerConfig::default()));
    }

    #[test]
    fn test_level_drives_size_unless_overridden() {
        let c = config(&[(ENV_LEVEL, "12")]).unwrap();
        assert_eq!(c.game.size, BoardSize::Five);

        let c = config(&[(ENV_LEVEL, "12"), (ENV_SIZE, "6")]).unwrap();
        assert_eq!(c.game.size, BoardSize::Six);
        assert_eq!(c.game.level, 12);
    }

    #[test]
    fn test_invalid_values_name_the_variable() {
        let err = config(&[(ENV_SIZE, "7")]).unwrap_err();
        assert!(err.to_string().starts_with("NEXUS_SIZE="));

        let err = config(&[(ENV_AI_PORT, "http")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: ENV_AI_PORT, .. }));

        assert!(config(&[(ENV_KEEP_PLAYING, "maybe")]).is_err());
    }

    #[test]
    fn test_adapter_settings() {
        let c = config(&[(ENV_AI_DISABLED, "true")]).unwrap();
        assert!(c.adapter.is_none());

        let c = config(&[(ENV_AI_PORT, "9000"), (ENV_AI_MAX_PENDING, "2")]).unwrap();
        let adapter = c.adapter.unwrap();
        assert_eq!(adapter.port, 9000);
        assert_eq!(adapter.max_pending_commands, 2);
    }

    #[test]
    fn test_keep_playing_and_paths() {
        let c = config(&[
            (ENV_KEEP_PLAYING, "0"),
            (ENV_RECORDS_PATH, "/tmp/records.json"),
            (ENV_LOG_PATH, " "),
        ])
        .unwrap();
        assert!(!c.game.keep_playing_after_win);
        assert_eq!(c.records_path, Some(PathBuf::from("/tmp/records.json")));
        assert!(c.log_path.is_none());
    }
}
