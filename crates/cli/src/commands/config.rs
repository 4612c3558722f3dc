use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use storepulse_core::config::{AppConfig, LoadOptions};
use toml::Value;

/// Effective configuration with per-field source attribution. Secrets are redacted.
pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];

    lines.push(render_line(
        "database.url",
        &config.database.url,
        source("database.url", &["STOREPULSE_DATABASE_URL"]),
    ));
    lines.push(render_line(
        "database.max_connections",
        &config.database.max_connections.to_string(),
        source("database.max_connections", &["STOREPULSE_DATABASE_MAX_CONNECTIONS"]),
    ));
    lines.push(render_line(
        "database.timeout_secs",
        &config.database.timeout_secs.to_string(),
        source("database.timeout_secs", &["STOREPULSE_DATABASE_TIMEOUT_SECS"]),
    ));

    lines.push(render_line(
        "server.bind_address",
        &config.server.bind_address,
        source("server.bind_address", &["STOREPULSE_SERVER_BIND_ADDRESS"]),
    ));
    lines.push(render_line(
        "server.port",
        &config.server.port.to_string(),
        source("server.port", &["STOREPULSE_SERVER_PORT"]),
    ));
    lines.push(render_line(
        "server.graceful_shutdown_secs",
        &config.server.graceful_shutdown_secs.to_string(),
        source("server.graceful_shutdown_secs", &["STOREPULSE_SERVER_GRACEFUL_SHUTDOWN_SECS"]),
    ));

    lines.push(render_line(
        "insights.business_utc_offset_minutes",
        &config.insights.business_utc_offset_minutes.to_string(),
        source(
            "insights.business_utc_offset_minutes",
            &["STOREPULSE_INSIGHTS_BUSINESS_UTC_OFFSET_MINUTES"],
        ),
    ));
    lines.push(render_line(
        "insights.daily_slot_hour",
        &config.insights.daily_slot_hour.to_string(),
        source("insights.daily_slot_hour", &["STOREPULSE_INSIGHTS_DAILY_SLOT_HOUR"]),
    ));
    lines.push(render_line(
        "insights.weak_weekday_min_visits",
        &config.insights.weak_weekday_min_visits.to_string(),
        source(
            "insights.weak_weekday_min_visits",
            &["STOREPULSE_INSIGHTS_WEAK_WEEKDAY_MIN_VISITS"],
        ),
    ));
    lines.push(render_line(
        "insights.currency_symbol",
        &config.insights.currency_symbol,
        source("insights.currency_symbol", &["STOREPULSE_INSIGHTS_CURRENCY_SYMBOL"]),
    ));

    lines.push(render_line(
        "batch.trigger_token",
        &redact_token(config.batch.trigger_token.as_ref()),
        source("batch.trigger_token", &["STOREPULSE_BATCH_TRIGGER_TOKEN"]),
    ));

    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        source("logging.level", &["STOREPULSE_LOGGING_LEVEL", "STOREPULSE_LOG_LEVEL"]),
    ));
    lines.push(render_line(
        "logging.format",
        &format!("{:?}", config.logging.format),
        source("logging.format", &["STOREPULSE_LOGGING_FORMAT", "STOREPULSE_LOG_FORMAT"]),
    ));

    lines.join("\n")
}

fn detect_config_path() -> Option<PathBuf> {
    let root = PathBuf::from("storepulse.toml");
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config/storepulse.toml");
    if nested.exists() {
        return Some(nested);
    }

    None
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

fn redact_token(token: Option<&SecretString>) -> String {
    match token {
        None => "<unset>".to_string(),
        Some(token) if token.expose_secret().trim().is_empty() => "<empty>".to_string(),
        Some(_) => "<redacted>".to_string(),
    }
}
