//! Process configuration read from the environment.
//!
//! Every required variable must be present and non-empty; startup stops
//! with a [`ConfigError`] naming the first one that is not.

use std::fmt;
use thiserror::Error;

const DB_LOGIN: &str = "TASK_MGR_DB_LOGIN";
const DB_PASSWORD: &str = "TASK_MGR_DB_PASSWORD";
const DB_NAME: &str = "TASK_MGR_DB_NAME";
const DB_HOST: &str = "TASK_MGR_DB_HOST";
const DB_PORT: &str = "TASK_MGR_DB_PORT";
const DB_POOL_SIZE: &str = "TASK_MGR_DB_POOL_SIZE";
const BEARER: &str = "TASK_MGR_BEARER";
const HOST: &str = "TASK_MGR_HOST";
const PORT: &str = "TASK_MGR_PORT";
const SEED_TASKS: &str = "TASK_MGR_SEED_TASKS";

/// Connection pool size used when `TASK_MGR_DB_POOL_SIZE` is unset.
pub const DEFAULT_POOL_SIZE: u32 = 10;

/// Errors raised while reading configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is unset or empty.
    #[error("missing config for {0}")]
    Missing(&'static str),

    /// A variable is set but cannot be parsed.
    #[error("invalid value for {name}: {reason}")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Database connection settings.
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseSettings {
    login: String,
    password: String,
    name: String,
    host: String,
    port: u16,
    pool_size: u32,
}

impl DatabaseSettings {
    /// Returns the `PostgreSQL` connection URL with credentials escaped.
    #[must_use]
    pub fn url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            urlencoding::encode(&self.login),
            urlencoding::encode(&self.password),
            self.host,
            self.port,
            urlencoding::encode(&self.name),
        )
    }

    /// Returns the maximum number of pooled connections.
    #[must_use]
    pub const fn pool_size(&self) -> u32 {
        self.pool_size
    }
}

impl fmt::Debug for DatabaseSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseSettings")
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .field("name", &self.name)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("pool_size", &self.pool_size)
            .finish()
    }
}

/// Complete service configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct Configuration {
    database: DatabaseSettings,
    bearer: String,
    host: String,
    port: u16,
    seed_tasks: bool,
}

impl Configuration {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is missing, empty,
    /// or malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, which maps a variable name to
    /// its value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is missing, empty,
    /// or malformed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let database = DatabaseSettings {
            login: required(DB_LOGIN)?,
            password: required(DB_PASSWORD)?,
            name: required(DB_NAME)?,
            host: required(DB_HOST)?,
            port: parse_port(DB_PORT, &required(DB_PORT)?)?,
            pool_size: lookup(DB_POOL_SIZE)
                .filter(|value| !value.is_empty())
                .map_or(Ok(DEFAULT_POOL_SIZE), |value| parse_pool_size(&value))?,
        };

        Ok(Self {
            database,
            bearer: required(BEARER)?,
            host: required(HOST)?,
            port: parse_port(PORT, &required(PORT)?)?,
            seed_tasks: lookup(SEED_TASKS)
                .filter(|value| !value.is_empty())
                .map_or(Ok(false), |value| parse_flag(SEED_TASKS, &value))?,
        })
    }

    /// Returns the database settings.
    #[must_use]
    pub const fn database(&self) -> &DatabaseSettings {
        &self.database
    }

    /// Returns the static bearer secret.
    #[must_use]
    pub fn bearer(&self) -> &str {
        &self.bearer
    }

    /// Returns `true` when the starter tasks should be inserted at startup.
    #[must_use]
    pub const fn seed_tasks(&self) -> bool {
        self.seed_tasks
    }

    /// Returns the `host:port` pair to listen on.
    #[must_use]
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("database", &self.database)
            .field("bearer", &"<redacted>")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("seed_tasks", &self.seed_tasks)
            .finish()
    }
}

fn parse_flag(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        other => Err(ConfigError::Invalid {
            name,
            reason: format!("expected true or false, got '{other}'"),
        }),
    }
}

fn parse_port(name: &'static str, value: &str) -> Result<u16, ConfigError> {
    value.trim().parse().map_err(|err| ConfigError::Invalid {
        name,
        reason: format!("{err}"),
    })
}

fn parse_pool_size(value: &str) -> Result<u32, ConfigError> {
    match value.trim().parse::<u32>() {
        Ok(0) => Err(ConfigError::Invalid {
            name: DB_POOL_SIZE,
            reason: "must be greater than zero".to_owned(),
        }),
        Ok(size) => Ok(size),
        Err(err) => Err(ConfigError::Invalid {
            name: DB_POOL_SIZE,
            reason: format!("{err}"),
        }),
    }
}
