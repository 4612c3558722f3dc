use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::FixedOffset;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub insights: InsightsConfig,
    pub batch: BatchConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

/// Business-calendar settings shared by the window selector and the scheduler.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InsightsConfig {
    /// Fixed offset of the business timezone from UTC. Daylight saving is not modelled.
    pub business_utc_offset_minutes: i32,
    /// Local wall-clock hour of the daily batch slot.
    pub daily_slot_hour: u32,
    /// Visits a weekday needs before the interactive path reports it as weak.
    pub weak_weekday_min_visits: u64,
    pub currency_symbol: String,
}

#[derive(Clone, Debug)]
pub struct BatchConfig {
    pub trigger_token: Option<SecretString>,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub log_level: Option<String>,
    pub business_utc_offset_minutes: Option<i32>,
    pub daily_slot_hour: Option<u32>,
    pub batch_trigger_token: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            business_utc_offset_minutes: -180,
            daily_slot_hour: 8,
            weak_weekday_min_visits: 10,
            currency_symbol: "R$".to_string(),
        }
    }
}

impl InsightsConfig {
    pub fn business_offset(&self) -> Result<FixedOffset, ConfigError> {
        FixedOffset::east_opt(self.business_utc_offset_minutes * 60).ok_or_else(|| {
            ConfigError::Validation(format!(
                "insights.business_utc_offset_minutes `{}` is not a valid UTC offset",
                self.business_utc_offset_minutes
            ))
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://storepulse.db".to_string(),
                max_connections: 5,
                timeout_secs: 30,
            },
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 8080,
                graceful_shutdown_secs: 15,
            },
            insights: InsightsConfig::default(),
            batch: BatchConfig { trigger_token: None },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("storepulse.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(database) = patch.database {
            if let Some(url) = database.url {
                self.database.url = url;
            }
            if let Some(max_connections) = database.max_connections {
                self.database.max_connections = max_connections;
            }
            if let Some(timeout_secs) = database.timeout_secs {
                self.database.timeout_secs = timeout_secs;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(insights) = patch.insights {
            if let Some(offset) = insights.business_utc_offset_minutes {
                self.insights.business_utc_offset_minutes = offset;
            }
            if let Some(hour) = insights.daily_slot_hour {
                self.insights.daily_slot_hour = hour;
            }
            if let Some(min_visits) = insights.weak_weekday_min_visits {
                self.insights.weak_weekday_min_visits = min_visits;
            }
            if let Some(symbol) = insights.currency_symbol {
                self.insights.currency_symbol = symbol;
            }
        }

        if let Some(batch) = patch.batch {
            if let Some(trigger_token_value) = batch.trigger_token {
                self.batch.trigger_token = Some(secret_value(trigger_token_value));
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("STOREPULSE_DATABASE_URL") {
            self.database.url = value;
        }
        if let Some(value) = read_env("STOREPULSE_DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections =
                parse_u32("STOREPULSE_DATABASE_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = read_env("STOREPULSE_DATABASE_TIMEOUT_SECS") {
            self.database.timeout_secs = parse_u64("STOREPULSE_DATABASE_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("STOREPULSE_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("STOREPULSE_SERVER_PORT") {
            self.server.port = parse_u16("STOREPULSE_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("STOREPULSE_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("STOREPULSE_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        if let Some(value) = read_env("STOREPULSE_INSIGHTS_BUSINESS_UTC_OFFSET_MINUTES") {
            self.insights.business_utc_offset_minutes =
                parse_i32("STOREPULSE_INSIGHTS_BUSINESS_UTC_OFFSET_MINUTES", &value)?;
        }
        if let Some(value) = read_env("STOREPULSE_INSIGHTS_DAILY_SLOT_HOUR") {
            self.insights.daily_slot_hour =
                parse_u32("STOREPULSE_INSIGHTS_DAILY_SLOT_HOUR", &value)?;
        }
        if let Some(value) = read_env("STOREPULSE_INSIGHTS_WEAK_WEEKDAY_MIN_VISITS") {
            self.insights.weak_weekday_min_visits =
                parse_u64("STOREPULSE_INSIGHTS_WEAK_WEEKDAY_MIN_VISITS", &value)?;
        }
        if let Some(value) = read_env("STOREPULSE_INSIGHTS_CURRENCY_SYMBOL") {
            self.insights.currency_symbol = value;
        }

        if let Some(value) = read_env("STOREPULSE_BATCH_TRIGGER_TOKEN") {
            self.batch.trigger_token = Some(secret_value(value));
        }

        let log_level =
            read_env("STOREPULSE_LOGGING_LEVEL").or_else(|| read_env("STOREPULSE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("STOREPULSE_LOGGING_FORMAT").or_else(|| read_env("STOREPULSE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(database_url) = overrides.database_url {
            self.database.url = database_url;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(offset) = overrides.business_utc_offset_minutes {
            self.insights.business_utc_offset_minutes = offset;
        }
        if let Some(hour) = overrides.daily_slot_hour {
            self.insights.daily_slot_hour = hour;
        }
        if let Some(trigger_token) = overrides.batch_trigger_token {
            self.batch.trigger_token = Some(secret_value(trigger_token));
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_database(&self.database)?;
        validate_server(&self.server)?;
        validate_insights(&self.insights)?;
        validate_batch(&self.batch)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("storepulse.toml"), PathBuf::from("config/storepulse.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_database(database: &DatabaseConfig) -> Result<(), ConfigError> {
    let url = database.url.trim();
    let sqlite_url =
        url.starts_with("sqlite://") || url.starts_with("sqlite::") || url == ":memory:";
    if !sqlite_url {
        return Err(ConfigError::Validation(
            "database.url must be a sqlite URL (`sqlite://...`, `sqlite::...`, or `:memory:`)"
                .to_string(),
        ));
    }

    if database.max_connections == 0 {
        return Err(ConfigError::Validation(
            "database.max_connections must be greater than zero".to_string(),
        ));
    }

    if database.timeout_secs == 0 || database.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "database.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_insights(insights: &InsightsConfig) -> Result<(), ConfigError> {
    if !(-840..=840).contains(&insights.business_utc_offset_minutes) {
        return Err(ConfigError::Validation(
            "insights.business_utc_offset_minutes must be in range -840..=840".to_string(),
        ));
    }
    insights.business_offset()?;

    if insights.daily_slot_hour > 23 {
        return Err(ConfigError::Validation(
            "insights.daily_slot_hour must be in range 0..=23".to_string(),
        ));
    }

    if insights.currency_symbol.trim().is_empty() {
        return Err(ConfigError::Validation(
            "insights.currency_symbol must not be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_batch(batch: &BatchConfig) -> Result<(), ConfigError> {
    let blank = batch
        .trigger_token
        .as_ref()
        .map(|value| value.expose_secret().trim().is_empty())
        .unwrap_or(false);
    if blank {
        return Err(ConfigError::Validation(
            "batch.trigger_token must not be blank when set; remove it to disable the check"
                .to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_i32(key: &str, value: &str) -> Result<i32, ConfigError> {
    value.parse::<i32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    database: Option<DatabasePatch>,
    server: Option<ServerPatch>,
    insights: Option<InsightsPatch>,
    batch: Option<BatchPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabasePatch {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct InsightsPatch {
    business_utc_offset_minutes: Option<i32>,
    daily_slot_hour: Option<u32>,
    weak_weekday_min_visits: Option<u64>,
    currency_symbol: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct BatchPatch {
    trigger_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    use secrecy::ExposeSecret;
    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn defaults_describe_the_business_calendar() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let config = AppConfig::load(LoadOptions::default())
            .map_err(|err| format!("config load failed: {err}"))?;

        ensure(config.insights.business_utc_offset_minutes == -180, "default offset is UTC-3")?;
        ensure(config.insights.daily_slot_hour == 8, "default slot is 08:00 local")?;
        ensure(config.insights.weak_weekday_min_visits == 10, "default weekday floor is 10")?;
        ensure(config.batch.trigger_token.is_none(), "trigger token is optional")?;
        ensure(
            matches!(config.logging.format, LogFormat::Compact),
            "default logging format should be compact",
        )
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("TEST_STOREPULSE_TRIGGER", "cron-from-env");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("storepulse.toml");
            fs::write(
                &path,
                r#"
[batch]
trigger_token = "${TEST_STOREPULSE_TRIGGER}"

[insights]
business_utc_offset_minutes = 60
daily_slot_hour = 7
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            let token = config
                .batch
                .trigger_token
                .as_ref()
                .map(|value| value.expose_secret().to_string())
                .unwrap_or_default();
            ensure(token == "cron-from-env", "trigger token should be interpolated from env")?;
            ensure(config.insights.business_utc_offset_minutes == 60, "offset from file")?;
            ensure(config.insights.daily_slot_hour == 7, "slot hour from file")?;
            Ok(())
        })();

        clear_vars(&["TEST_STOREPULSE_TRIGGER"]);
        result
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("STOREPULSE_LOG_LEVEL", "warn");
        env::set_var("STOREPULSE_LOG_FORMAT", "pretty");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "warn", "warning log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Pretty),
                "pretty logging format should be set from env var",
            )?;
            Ok(())
        })();

        clear_vars(&["STOREPULSE_LOG_LEVEL", "STOREPULSE_LOG_FORMAT"]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("STOREPULSE_DATABASE_URL", "sqlite://from-env.db");
        env::set_var("STOREPULSE_INSIGHTS_DAILY_SLOT_HOUR", "9");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("storepulse.toml");
            fs::write(
                &path,
                r#"
[database]
url = "sqlite://from-file.db"

[insights]
daily_slot_hour = 6
currency_symbol = "US$"

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    database_url: Some("sqlite://from-override.db".to_string()),
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.database.url == "sqlite://from-override.db",
                "override database url should win",
            )?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")?;
            ensure(config.insights.daily_slot_hour == 9, "env slot hour should win over file")?;
            ensure(config.insights.currency_symbol == "US$", "file currency should win over default")?;
            Ok(())
        })();

        clear_vars(&["STOREPULSE_DATABASE_URL", "STOREPULSE_INSIGHTS_DAILY_SLOT_HOUR"]);
        result
    }

    #[test]
    fn validation_fails_fast_with_actionable_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("STOREPULSE_INSIGHTS_DAILY_SLOT_HOUR", "24");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => {
                    return Err("expected validation failure but config load succeeded".to_string())
                }
                Err(error) => error,
            };
            let has_message = matches!(
                error,
                ConfigError::Validation(ref message) if message.contains("insights.daily_slot_hour")
            );
            ensure(has_message, "validation failure should mention insights.daily_slot_hour")
        })();

        clear_vars(&["STOREPULSE_INSIGHTS_DAILY_SLOT_HOUR"]);
        result
    }

    #[test]
    fn malformed_numeric_env_override_is_rejected() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("STOREPULSE_INSIGHTS_BUSINESS_UTC_OFFSET_MINUTES", "minus-three");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => return Err("expected env override failure".to_string()),
                Err(error) => error,
            };
            ensure(
                matches!(error, ConfigError::InvalidEnvOverride { ref key, .. }
                    if key == "STOREPULSE_INSIGHTS_BUSINESS_UTC_OFFSET_MINUTES"),
                "error should name the offending variable",
            )
        })();

        clear_vars(&["STOREPULSE_INSIGHTS_BUSINESS_UTC_OFFSET_MINUTES"]);
        result
    }

    #[test]
    fn secret_values_are_not_leaked_by_debug() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("STOREPULSE_BATCH_TRIGGER_TOKEN", "cron-secret-value");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;
            let debug = format!("{config:?}");

            ensure(
                !debug.contains("cron-secret-value"),
                "debug output should not contain the trigger token",
            )
        })();

        clear_vars(&["STOREPULSE_BATCH_TRIGGER_TOKEN"]);
        result
    }
}
