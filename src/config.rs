use std::{env, fmt, str::FromStr};

use chrono::{Duration, Utc};

const DEV_DATABASE_URL: &str = "sqlite://pizza.db?mode=rwc";
const TEST_DATABASE_URL: &str = "sqlite::memory:";
const TEST_SECRET: &str = "pizza-api-test-secret";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_ACCESS_TTL_SECS: i64 = 15 * 60;
const DEFAULT_REFRESH_TTL_SECS: i64 = 30 * 24 * 60 * 60;
const MAX_TTL_SECS: i64 = 10 * 366 * 24 * 60 * 60;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dev" | "development" => Ok(Environment::Development),
            "test" | "testing" => Ok(Environment::Test),
            "prod" | "production" => Ok(Environment::Production),
            _ => Err(ConfigError::Invalid {
                name: "APP_ENV",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Environment::Development => "development",
            Environment::Test => "test",
            Environment::Production => "production",
        };
        f.write_str(name)
    }
}

/// Process-wide settings, loaded once at startup and handed to each component.
#[derive(Clone)]
pub struct Config {
    pub environment: Environment,
    pub database_url: String,
    pub jwt_secret: String,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    pub bind_addr: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("environment", &self.environment)
            .field("database_url", &self.database_url)
            .field("jwt_secret", &"<redacted>")
            .field("access_token_ttl", &self.access_token_ttl)
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .field("bind_addr", &self.bind_addr)
            .finish()
    }
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Fixed configuration for tests: in-memory database and a known secret.
    pub fn test() -> Self {
        Config {
            environment: Environment::Test,
            database_url: TEST_DATABASE_URL.to_string(),
            jwt_secret: TEST_SECRET.to_string(),
            access_token_ttl: Duration::seconds(DEFAULT_ACCESS_TTL_SECS),
            refresh_token_ttl: Duration::seconds(DEFAULT_REFRESH_TTL_SECS),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let environment = match var("APP_ENV") {
            Some(value) => value.parse()?,
            None => Environment::Development,
        };

        let database_url = match (var("DATABASE_URL"), environment) {
            (Some(url), _) => url,
            (None, Environment::Development) => DEV_DATABASE_URL.to_string(),
            (None, Environment::Test) => TEST_DATABASE_URL.to_string(),
            (None, Environment::Production) => return Err(ConfigError::Missing("DATABASE_URL")),
        };

        let jwt_secret = match (var("JWT_SECRET_KEY"), environment) {
            (Some(secret), _) => secret,
            (None, Environment::Test) => TEST_SECRET.to_string(),
            (None, _) => return Err(ConfigError::Missing("JWT_SECRET_KEY")),
        };

        let access_token_ttl = ttl(&var, "ACCESS_TOKEN_TTL_SECS", DEFAULT_ACCESS_TTL_SECS)?;
        let refresh_token_ttl = ttl(&var, "REFRESH_TOKEN_TTL_SECS", DEFAULT_REFRESH_TTL_SECS)?;
        if refresh_token_ttl <= access_token_ttl {
            return Err(ConfigError::Invalid {
                name: "REFRESH_TOKEN_TTL_SECS",
                value: refresh_token_ttl.num_seconds().to_string(),
            });
        }

        Ok(Config {
            environment,
            database_url,
            jwt_secret,
            access_token_ttl,
            refresh_token_ttl,
            bind_addr: var("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
        })
    }
}

fn ttl<F>(var: &F, name: &'static str, default: i64) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = var(name) else {
        return Ok(Duration::seconds(default));
    };
    let ttl = raw
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|secs| (1..=MAX_TTL_SECS).contains(secs))
        .and_then(Duration::try_seconds)
        .filter(|ttl| Utc::now().checked_add_signed(*ttl).is_some());
    ttl.ok_or(ConfigError::Invalid { name, value: raw })
}
