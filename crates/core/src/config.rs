use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub chat: ChatConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct BackendConfig {
    /// Order-creation webhook.
    pub webhook_url: String,
    /// Store open/closed status endpoint.
    pub status_url: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct ChatConfig {
    pub reconnect_initial_secs: u64,
    pub reconnect_max_secs: u64,
    /// Drain interval of the decoupled outbound queue.
    pub outbox_interval_secs: u64,
    /// Delay before the agent-handoff follow-up message.
    pub follow_up_delay_secs: u64,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub health_check_port: u16,
    pub graceful_shutdown_secs: u64,
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
    pub webhook_url: Option<String>,
    pub status_url: Option<String>,
    pub log_level: Option<String>,
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

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig {
                webhook_url: "http://localhost:3000/api/orders/webhook".to_string(),
                status_url: "http://localhost:3000/api/store/status".to_string(),
                timeout_secs: 15,
            },
            chat: ChatConfig {
                reconnect_initial_secs: 5,
                reconnect_max_secs: 60,
                outbox_interval_secs: 5,
                follow_up_delay_secs: 30,
            },
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                health_check_port: 8080,
                graceful_shutdown_secs: 15,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
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
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("braseiro.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(backend) = patch.backend {
            if let Some(webhook_url) = backend.webhook_url {
                self.backend.webhook_url = webhook_url;
            }
            if let Some(status_url) = backend.status_url {
                self.backend.status_url = status_url;
            }
            if let Some(timeout_secs) = backend.timeout_secs {
                self.backend.timeout_secs = timeout_secs;
            }
        }

        if let Some(chat) = patch.chat {
            if let Some(reconnect_initial_secs) = chat.reconnect_initial_secs {
                self.chat.reconnect_initial_secs = reconnect_initial_secs;
            }
            if let Some(reconnect_max_secs) = chat.reconnect_max_secs {
                self.chat.reconnect_max_secs = reconnect_max_secs;
            }
            if let Some(outbox_interval_secs) = chat.outbox_interval_secs {
                self.chat.outbox_interval_secs = outbox_interval_secs;
            }
            if let Some(follow_up_delay_secs) = chat.follow_up_delay_secs {
                self.chat.follow_up_delay_secs = follow_up_delay_secs;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(health_check_port) = server.health_check_port {
                self.server.health_check_port = health_check_port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
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
        if let Some(value) = read_env("BRASEIRO_BACKEND_WEBHOOK_URL") {
            self.backend.webhook_url = value;
        }
        if let Some(value) = read_env("BRASEIRO_BACKEND_STATUS_URL") {
            self.backend.status_url = value;
        }
        if let Some(value) = read_env("BRASEIRO_BACKEND_TIMEOUT_SECS") {
            self.backend.timeout_secs = parse_u64("BRASEIRO_BACKEND_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("BRASEIRO_CHAT_RECONNECT_INITIAL_SECS") {
            self.chat.reconnect_initial_secs =
                parse_u64("BRASEIRO_CHAT_RECONNECT_INITIAL_SECS", &value)?;
        }
        if let Some(value) = read_env("BRASEIRO_CHAT_RECONNECT_MAX_SECS") {
            self.chat.reconnect_max_secs = parse_u64("BRASEIRO_CHAT_RECONNECT_MAX_SECS", &value)?;
        }
        if let Some(value) = read_env("BRASEIRO_CHAT_OUTBOX_INTERVAL_SECS") {
            self.chat.outbox_interval_secs =
                parse_u64("BRASEIRO_CHAT_OUTBOX_INTERVAL_SECS", &value)?;
        }
        if let Some(value) = read_env("BRASEIRO_CHAT_FOLLOW_UP_DELAY_SECS") {
            self.chat.follow_up_delay_secs =
                parse_u64("BRASEIRO_CHAT_FOLLOW_UP_DELAY_SECS", &value)?;
        }

        if let Some(value) = read_env("BRASEIRO_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("BRASEIRO_SERVER_HEALTH_CHECK_PORT") {
            self.server.health_check_port =
                parse_u16("BRASEIRO_SERVER_HEALTH_CHECK_PORT", &value)?;
        }
        if let Some(value) = read_env("BRASEIRO_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("BRASEIRO_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        let log_level =
            read_env("BRASEIRO_LOGGING_LEVEL").or_else(|| read_env("BRASEIRO_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("BRASEIRO_LOGGING_FORMAT").or_else(|| read_env("BRASEIRO_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(webhook_url) = overrides.webhook_url {
            self.backend.webhook_url = webhook_url;
        }
        if let Some(status_url) = overrides.status_url {
            self.backend.status_url = status_url;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_backend(&self.backend)?;
        validate_chat(&self.chat)?;
        validate_server(&self.server)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("braseiro.toml"), PathBuf::from("config/braseiro.toml")]
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

fn validate_backend(backend: &BackendConfig) -> Result<(), ConfigError> {
    for (name, url) in
        [("backend.webhook_url", &backend.webhook_url), ("backend.status_url", &backend.status_url)]
    {
        let url = url.trim();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "{name} must start with http:// or https://"
            )));
        }
    }

    if backend.timeout_secs == 0 || backend.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "backend.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_chat(chat: &ChatConfig) -> Result<(), ConfigError> {
    if chat.reconnect_initial_secs == 0 {
        return Err(ConfigError::Validation(
            "chat.reconnect_initial_secs must be greater than zero".to_string(),
        ));
    }
    if chat.reconnect_max_secs < chat.reconnect_initial_secs {
        return Err(ConfigError::Validation(
            "chat.reconnect_max_secs must be >= chat.reconnect_initial_secs".to_string(),
        ));
    }
    if chat.outbox_interval_secs == 0 {
        return Err(ConfigError::Validation(
            "chat.outbox_interval_secs must be greater than zero".to_string(),
        ));
    }
    if chat.follow_up_delay_secs == 0 {
        return Err(ConfigError::Validation(
            "chat.follow_up_delay_secs must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.health_check_port == 0 {
        return Err(ConfigError::Validation(
            "server.health_check_port must be greater than zero".to_string(),
        ));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
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

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    backend: Option<BackendPatch>,
    chat: Option<ChatPatch>,
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct BackendPatch {
    webhook_url: Option<String>,
    status_url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ChatPatch {
    reconnect_initial_secs: Option<u64>,
    reconnect_max_secs: Option<u64>,
    outbox_interval_secs: Option<u64>,
    follow_up_delay_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    health_check_port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
