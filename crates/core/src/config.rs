use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::messages::{MessagesError, WelcomeMessages};
use crate::signature::DEFAULT_SIGNATURE;

pub const DEFAULT_DATABASE_FILE: &str = "good-human.db";
pub const DEFAULT_WELCOME_MESSAGES_PATH: &str = "welcome_messages.json";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub reddit: RedditConfig,
    pub bot: BotConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct RedditConfig {
    pub client_id: String,
    pub client_secret: SecretString,
    pub username: String,
    pub password: SecretString,
    pub user_agent: String,
    pub request_timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct BotConfig {
    pub subreddit: String,
    pub signature: String,
    /// Lower-cased community names whose comments are never answered.
    pub ignore_subreddits: Vec<String>,
    pub poll_interval_secs: u64,
    pub welcome_messages_path: PathBuf,
    /// Inline messages; when non-empty they take the place of the JSON file.
    pub welcome_messages: Vec<String>,
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
    pub reddit_client_id: Option<String>,
    pub reddit_client_secret: Option<String>,
    pub reddit_username: Option<String>,
    pub reddit_password: Option<String>,
    pub poll_interval_secs: Option<u64>,
    pub ignore_subreddits: Option<Vec<String>>,
    pub welcome_messages: Option<Vec<String>>,
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
    #[error(transparent)]
    Messages(#[from] MessagesError),
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: database_url_for_path(DEFAULT_DATABASE_FILE),
                max_connections: 1,
                timeout_secs: 30,
            },
            reddit: RedditConfig {
                client_id: String::new(),
                client_secret: String::new().into(),
                username: String::new(),
                password: String::new().into(),
                user_agent: format!(
                    "goodhuman/{} (by /u/you_are_good_human)",
                    env!("CARGO_PKG_VERSION")
                ),
                request_timeout_secs: 30,
            },
            bot: BotConfig {
                subreddit: "all".to_string(),
                signature: DEFAULT_SIGNATURE.to_string(),
                ignore_subreddits: Vec::new(),
                poll_interval_secs: 30,
                welcome_messages_path: PathBuf::from(DEFAULT_WELCOME_MESSAGES_PATH),
                welcome_messages: Vec::new(),
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

/// SQLite URL for a plain file path, as accepted by `DB_LOCATION`.
pub fn database_url_for_path(path: &str) -> String {
    if path.starts_with("sqlite:") {
        path.to_string()
    } else {
        format!("sqlite://{path}")
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

fn normalize_subreddits(names: Vec<String>) -> Vec<String> {
    names
        .into_iter()
        .map(|name| name.trim().trim_start_matches("r/").to_ascii_lowercase())
        .filter(|name| !name.is_empty())
        .collect()
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
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("goodhuman.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    /// Resolves the welcome message pool, preferring inline messages over the file.
    pub fn welcome_messages(&self) -> Result<WelcomeMessages, ConfigError> {
        if !self.bot.welcome_messages.is_empty() {
            return Ok(WelcomeMessages::new(self.bot.welcome_messages.clone())?);
        }
        Ok(WelcomeMessages::from_json_file(&self.bot.welcome_messages_path)?)
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

        if let Some(reddit) = patch.reddit {
            if let Some(client_id) = reddit.client_id {
                self.reddit.client_id = client_id;
            }
            if let Some(client_secret_value) = reddit.client_secret {
                self.reddit.client_secret = secret_value(client_secret_value);
            }
            if let Some(username) = reddit.username {
                self.reddit.username = username;
            }
            if let Some(password_value) = reddit.password {
                self.reddit.password = secret_value(password_value);
            }
            if let Some(user_agent) = reddit.user_agent {
                self.reddit.user_agent = user_agent;
            }
            if let Some(request_timeout_secs) = reddit.request_timeout_secs {
                self.reddit.request_timeout_secs = request_timeout_secs;
            }
        }

        if let Some(bot) = patch.bot {
            if let Some(subreddit) = bot.subreddit {
                self.bot.subreddit = subreddit;
            }
            if let Some(signature) = bot.signature {
                self.bot.signature = signature;
            }
            if let Some(ignore_subreddits) = bot.ignore_subreddits {
                self.bot.ignore_subreddits = normalize_subreddits(ignore_subreddits);
            }
            if let Some(poll_interval_secs) = bot.poll_interval_secs {
                self.bot.poll_interval_secs = poll_interval_secs;
            }
            if let Some(welcome_messages_path) = bot.welcome_messages_path {
                self.bot.welcome_messages_path = welcome_messages_path;
            }
            if let Some(welcome_messages) = bot.welcome_messages {
                self.bot.welcome_messages = welcome_messages;
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
        if let Some(value) = read_env("DB_LOCATION") {
            self.database.url = database_url_for_path(&value);
        }
        if let Some(value) = read_env("GOODHUMAN_DATABASE_URL") {
            self.database.url = value;
        }
        if let Some(value) = read_env("GOODHUMAN_DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections =
                parse_u32("GOODHUMAN_DATABASE_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = read_env("GOODHUMAN_DATABASE_TIMEOUT_SECS") {
            self.database.timeout_secs = parse_u64("GOODHUMAN_DATABASE_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("GOODHUMAN_REDDIT_CLIENT_ID") {
            self.reddit.client_id = value;
        }
        if let Some(value) = read_env("GOODHUMAN_REDDIT_CLIENT_SECRET") {
            self.reddit.client_secret = secret_value(value);
        }
        if let Some(value) = read_env("GOODHUMAN_REDDIT_USERNAME") {
            self.reddit.username = value;
        }
        if let Some(value) = read_env("GOODHUMAN_REDDIT_PASSWORD") {
            self.reddit.password = secret_value(value);
        }
        if let Some(value) = read_env("GOODHUMAN_REDDIT_USER_AGENT") {
            self.reddit.user_agent = value;
        }
        if let Some(value) = read_env("GOODHUMAN_REDDIT_REQUEST_TIMEOUT_SECS") {
            self.reddit.request_timeout_secs =
                parse_u64("GOODHUMAN_REDDIT_REQUEST_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("GOODHUMAN_BOT_SUBREDDIT") {
            self.bot.subreddit = value;
        }
        if let Some(value) = read_env("GOODHUMAN_BOT_IGNORE_SUBREDDITS") {
            self.bot.ignore_subreddits =
                normalize_subreddits(value.split(',').map(str::to_owned).collect());
        }
        if let Some(value) = read_env("GOODHUMAN_BOT_POLL_INTERVAL_SECS") {
            self.bot.poll_interval_secs = parse_u64("GOODHUMAN_BOT_POLL_INTERVAL_SECS", &value)?;
        }
        if let Some(value) = read_env("GOODHUMAN_BOT_WELCOME_MESSAGES_PATH") {
            self.bot.welcome_messages_path = PathBuf::from(value);
        }

        let log_level =
            read_env("GOODHUMAN_LOGGING_LEVEL").or_else(|| read_env("GOODHUMAN_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("GOODHUMAN_LOGGING_FORMAT").or_else(|| read_env("GOODHUMAN_LOG_FORMAT"));
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
        if let Some(client_id) = overrides.reddit_client_id {
            self.reddit.client_id = client_id;
        }
        if let Some(client_secret) = overrides.reddit_client_secret {
            self.reddit.client_secret = secret_value(client_secret);
        }
        if let Some(username) = overrides.reddit_username {
            self.reddit.username = username;
        }
        if let Some(password) = overrides.reddit_password {
            self.reddit.password = secret_value(password);
        }
        if let Some(poll_interval_secs) = overrides.poll_interval_secs {
            self.bot.poll_interval_secs = poll_interval_secs;
        }
        if let Some(ignore_subreddits) = overrides.ignore_subreddits {
            self.bot.ignore_subreddits = normalize_subreddits(ignore_subreddits);
        }
        if let Some(welcome_messages) = overrides.welcome_messages {
            self.bot.welcome_messages = welcome_messages;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_database(&self.database)?;
        validate_reddit(&self.reddit)?;
        validate_bot(&self.bot)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("goodhuman.toml"), PathBuf::from("config/goodhuman.toml")]
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

fn validate_reddit(reddit: &RedditConfig) -> Result<(), ConfigError> {
    if reddit.client_id.trim().is_empty() {
        return Err(ConfigError::Validation(
            "reddit.client_id is required. Create a \"script\" app at https://www.reddit.com/prefs/apps".to_string(),
        ));
    }
    if reddit.client_secret.expose_secret().trim().is_empty() {
        return Err(ConfigError::Validation(
            "reddit.client_secret is required. It is shown under the app at https://www.reddit.com/prefs/apps".to_string(),
        ));
    }
    if reddit.username.trim().is_empty() {
        return Err(ConfigError::Validation(
            "reddit.username is required (the bot account name)".to_string(),
        ));
    }
    if reddit.username.starts_with("u/") || reddit.username.starts_with("/u/") {
        return Err(ConfigError::Validation(
            "reddit.username must be the bare account name without the `u/` prefix".to_string(),
        ));
    }
    if reddit.password.expose_secret().is_empty() {
        return Err(ConfigError::Validation("reddit.password is required".to_string()));
    }
    if reddit.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation("reddit.user_agent must not be empty".to_string()));
    }
    if reddit.request_timeout_secs == 0 || reddit.request_timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "reddit.request_timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_bot(bot: &BotConfig) -> Result<(), ConfigError> {
    if bot.subreddit.trim().is_empty() {
        return Err(ConfigError::Validation("bot.subreddit must not be empty".to_string()));
    }
    if bot.signature.split_whitespace().next().is_none() {
        return Err(ConfigError::Validation(
            "bot.signature must contain at least one word".to_string(),
        ));
    }
    if bot.poll_interval_secs == 0 {
        return Err(ConfigError::Validation(
            "bot.poll_interval_secs must be greater than zero".to_string(),
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

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
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
    reddit: Option<RedditPatch>,
    bot: Option<BotPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabasePatch {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct RedditPatch {
    client_id: Option<String>,
    client_secret: Option<String>,
    username: Option<String>,
    password: Option<String>,
    user_agent: Option<String>,
    request_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct BotPatch {
    subreddit: Option<String>,
    signature: Option<String>,
    ignore_subreddits: Option<Vec<String>>,
    poll_interval_secs: Option<u64>,
    welcome_messages_path: Option<PathBuf>,
    welcome_messages: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
