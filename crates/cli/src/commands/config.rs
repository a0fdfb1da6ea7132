use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use braseiro_core::config::{AppConfig, LoadOptions};
use toml::Value;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_key: &str| {
        field_source(key_path, env_key, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];

    lines.push(render_line(
        "backend.webhook_url",
        &config.backend.webhook_url,
        source("backend.webhook_url", "BRASEIRO_BACKEND_WEBHOOK_URL"),
    ));
    lines.push(render_line(
        "backend.status_url",
        &config.backend.status_url,
        source("backend.status_url", "BRASEIRO_BACKEND_STATUS_URL"),
    ));
    lines.push(render_line(
        "backend.timeout_secs",
        &config.backend.timeout_secs.to_string(),
        source("backend.timeout_secs", "BRASEIRO_BACKEND_TIMEOUT_SECS"),
    ));

    lines.push(render_line(
        "chat.reconnect_initial_secs",
        &config.chat.reconnect_initial_secs.to_string(),
        source("chat.reconnect_initial_secs", "BRASEIRO_CHAT_RECONNECT_INITIAL_SECS"),
    ));
    lines.push(render_line(
        "chat.reconnect_max_secs",
        &config.chat.reconnect_max_secs.to_string(),
        source("chat.reconnect_max_secs", "BRASEIRO_CHAT_RECONNECT_MAX_SECS"),
    ));
    lines.push(render_line(
        "chat.outbox_interval_secs",
        &config.chat.outbox_interval_secs.to_string(),
        source("chat.outbox_interval_secs", "BRASEIRO_CHAT_OUTBOX_INTERVAL_SECS"),
    ));
    lines.push(render_line(
        "chat.follow_up_delay_secs",
        &config.chat.follow_up_delay_secs.to_string(),
        source("chat.follow_up_delay_secs", "BRASEIRO_CHAT_FOLLOW_UP_DELAY_SECS"),
    ));

    lines.push(render_line(
        "server.bind_address",
        &config.server.bind_address,
        source("server.bind_address", "BRASEIRO_SERVER_BIND_ADDRESS"),
    ));
    lines.push(render_line(
        "server.health_check_port",
        &config.server.health_check_port.to_string(),
        source("server.health_check_port", "BRASEIRO_SERVER_HEALTH_CHECK_PORT"),
    ));
    lines.push(render_line(
        "server.graceful_shutdown_secs",
        &config.server.graceful_shutdown_secs.to_string(),
        source("server.graceful_shutdown_secs", "BRASEIRO_SERVER_GRACEFUL_SHUTDOWN_SECS"),
    ));

    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        source("logging.level", "BRASEIRO_LOGGING_LEVEL"),
    ));
    lines.push(render_line(
        "logging.format",
        &format!("{:?}", config.logging.format),
        source("logging.format", "BRASEIRO_LOGGING_FORMAT"),
    ));

    lines.join("\n")
}

fn detect_config_path() -> Option<PathBuf> {
    let root = PathBuf::from("braseiro.toml");
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config/braseiro.toml");
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
    env_key: &str,
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if env::var_os(env_key).is_some() {
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
