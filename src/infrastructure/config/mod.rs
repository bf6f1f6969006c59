//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::application::errors::ConfigError;
use crate::domain::entities::{Command, CommandHandler, ContentSource};

/// Bot configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    pub bot: BotConfig,
    pub telegram: TelegramConfig,
    pub fetch: FetchConfig,
    pub health: HealthConfig,
    /// Extra fetched commands, registered after the built-ins
    pub sources: Vec<SourceConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct BotConfig {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct TelegramConfig {
    pub token: Option<String>,
    /// Long-poll timeout for getUpdates, in seconds
    pub poll_timeout: u64,
    /// Publish the command list with setMyCommands on startup
    pub register_commands: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct FetchConfig {
    pub timeout_seconds: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct HealthConfig {
    /// Server is only started when a port is set
    pub port: Option<u16>,
    pub path: String,
    pub body: String,
    /// Hold the poller until the first health request
    pub lazy_start: bool,
}

/// A fetched command declared in the config file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct SourceConfig {
    pub name: String,
    pub description: String,
    #[serde(flatten)]
    pub source: ContentSource,
}

impl SourceConfig {
    pub fn to_command(&self) -> Command {
        Command::new(&self.name, CommandHandler::Fetched(self.source.clone()))
            .with_description(self.description.clone())
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: "relay-bot".to_string(),
        }
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: None,
            poll_timeout: 30,
            register_commands: true,
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 10,
            user_agent: format!("relay-bot/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            port: None,
            path: "/".to_string(),
            body: "Bot is running".to_string(),
            lazy_start: false,
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config {}: {}", path.display(), e)))?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Overlay process environment variables
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = non_empty("TELEGRAM_BOT_TOKEN").or_else(|| non_empty("BOT_TOKEN")) {
            self.telegram.token = Some(token.trim().to_string());
        }

        if let Some(port) = non_empty("PORT") {
            let port = port
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidValue(format!("PORT must be a port number, got {:?}", port)))?;
            self.health.port = Some(port);
        }

        if let Some(secs) = non_empty("FETCH_TIMEOUT_SECS") {
            self.fetch.timeout_seconds = secs
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(format!("FETCH_TIMEOUT_SECS must be an integer, got {:?}", secs)))?;
        }

        self.validate()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fetch.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue("fetch.timeout-seconds must be positive".to_string()));
        }
        if !self.health.path.starts_with('/') {
            return Err(ConfigError::InvalidValue(format!("health.path must start with '/', got {:?}", self.health.path)));
        }
        // Wildcard and capture segments are route parameters, not a fixed path
        let is_param = |seg: &str| seg.starts_with(':') || seg.starts_with('*') || seg.contains(|c: char| c == '{' || c == '}');
        if self.health.path.split('/').any(is_param) {
            return Err(ConfigError::InvalidValue(format!("health.path must be a literal path, got {:?}", self.health.path)));
        }
        for source in &self.sources {
            if source.source.pointers().is_empty() {
                return Err(ConfigError::InvalidValue(format!(
                    "source /{} has no {{/pointer}} placeholder in its template",
                    source.name
                )));
            }
        }
        Ok(())
    }

    /// The bot token, required to talk to Telegram
    pub fn token(&self) -> Result<&str, ConfigError> {
        self.telegram
            .token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(ConfigError::MissingToken)
    }
}
