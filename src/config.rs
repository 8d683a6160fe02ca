use std::env;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub polling: PollingConfig,
    pub ui: UiConfig,
    pub session: SessionSeed,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Backend origin without the `/api` suffix (paths already carry it).
    pub base_url: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Swallowed background failures are reported with `tracing::warn!`.
    Log,
    /// Swallowed background failures leave no trace at all.
    Silent,
}

impl FailurePolicy {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "log" => Some(FailurePolicy::Log),
            "silent" => Some(FailurePolicy::Silent),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollingConfig {
    /// Seconds between two background fetch cycles.
    pub interval_seconds: u64,
    /// Maximum unread notifications requested per cycle.
    pub unread_limit: u32,
    /// Maximum already-read notifications requested per cycle.
    pub read_limit: u32,
    pub failure_policy: FailurePolicy,
}

impl PollingConfig {
    /// Never shorter than one second; a zero period would stall the timer.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds.max(1))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
    pub language: String,
    /// Items shown in the dropdown before collapsing the header count to "N+".
    pub visible_items: usize,
    /// Delay between a successful invitation answer and the page reload.
    pub reload_delay_ms: u64,
}

impl UiConfig {
    pub fn reload_delay(&self) -> Duration {
        Duration::from_millis(self.reload_delay_ms)
    }
}

/// Initial session values for the headless runner.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionSeed {
    pub token: Option<String>,
    pub user_json: Option<String>,
    pub roles_json: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let base_url =
            env::var("ROBOTECH_API_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());
        url::Url::parse(&base_url)
            .map_err(|_| ConfigError::InvalidValue("ROBOTECH_API_URL".to_string()))?;

        Ok(Config {
            api: ApiConfig {
                base_url: base_url.trim_end_matches('/').to_string(),
                timeout_seconds: env_or("ROBOTECH_API_TIMEOUT_SECONDS", 30)?,
            },
            polling: PollingConfig {
                interval_seconds: positive(
                    "NOTIFICATIONS_POLL_INTERVAL_SECONDS",
                    env_or("NOTIFICATIONS_POLL_INTERVAL_SECONDS", 60)?,
                )?,
                unread_limit: env_or("NOTIFICATIONS_UNREAD_LIMIT", 10)?,
                read_limit: env_or("NOTIFICATIONS_READ_LIMIT", 5)?,
                failure_policy: match env::var("NOTIFICATIONS_FAILURE_POLICY") {
                    Ok(v) => FailurePolicy::from_str(&v).ok_or_else(|| {
                        ConfigError::InvalidValue("NOTIFICATIONS_FAILURE_POLICY".to_string())
                    })?,
                    Err(_) => FailurePolicy::Log,
                },
            },
            ui: UiConfig {
                language: ui_language(env::var("UI_LANGUAGE").ok().as_deref()),
                visible_items: env_or("NOTIFICATIONS_VISIBLE_ITEMS", 5)?,
                reload_delay_ms: env_or("INVITATION_RELOAD_DELAY_MS", 1500)?,
            },
            session: SessionSeed {
                token: env::var("ROBOTECH_TOKEN").ok().filter(|t| !t.is_empty()),
                user_json: env::var("ROBOTECH_USER").ok(),
                roles_json: env::var("ROBOTECH_ROLES").ok(),
            },
        })
    }
}

/// Numeric env var with a default when unset. Malformed values are errors.
fn env_or<T: FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    parse_or(key, env::var(key).ok().as_deref(), default)
}

fn parse_or<T: FromStr>(key: &str, raw: Option<&str>, default: T) -> Result<T, ConfigError> {
    match raw {
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

fn positive(key: &str, value: u64) -> Result<u64, ConfigError> {
    if value == 0 {
        return Err(ConfigError::InvalidValue(key.to_string()));
    }
    Ok(value)
}

/// Normalized UI language; unsupported tags fall back to the default.
fn ui_language(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return crate::i18n::DEFAULT_LANG.to_string();
    };
    let lang = crate::i18n::normalize_language(raw);
    if crate::i18n::is_supported_language(&lang) {
        lang
    } else {
        tracing::warn!(
            "Unsupported UI_LANGUAGE {:?}, using {}",
            raw,
            crate::i18n::DEFAULT_LANG
        );
        crate::i18n::DEFAULT_LANG.to_string()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api: ApiConfig {
                base_url: "http://localhost:8080".to_string(),
                timeout_seconds: 30,
            },
            polling: PollingConfig {
                interval_seconds: 60,
                unread_limit: 10,
                read_limit: 5,
                failure_policy: FailurePolicy::Log,
            },
            ui: UiConfig {
                language: crate::i18n::DEFAULT_LANG.to_string(),
                visible_items: 5,
                reload_delay_ms: 1500,
            },
            session: SessionSeed::default(),
        }
    }
}
