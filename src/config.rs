//! Environment-driven application settings.
//!
//! Values come from the process environment, optionally seeded from a `.env`
//! file via [`load_dotenv`]. Every lookup goes through a closure so tests can
//! supply their own variables without touching the real environment.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be a valid {expected}, got {value:?}")]
    Invalid {
        key: &'static str,
        expected: &'static str,
        value: String,
    },
}

fn invalid(key: &'static str, expected: &'static str, value: &str) -> ConfigError {
    ConfigError::Invalid {
        key,
        expected,
        value: value.to_string(),
    }
}

/// Load `.env` from the working directory if one exists.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => log::debug!("loaded environment from {}", path.display()),
        Err(err) if err.not_found() => {}
        Err(err) => log::warn!("failed to read .env file: {}", err),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Development,
    Production,
    Test,
}

impl FromStr for Environment {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "development" => Ok(Environment::Development),
            "production" => Ok(Environment::Production),
            "test" => Ok(Environment::Test),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Environment::Development => "development",
            Environment::Production => "production",
            Environment::Test => "test",
        };
        f.write_str(name)
    }
}

/// Postgres connection settings.
///
/// An explicit `DATABASE_URL` wins over the individual `DB_*` parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    pub name: String,
    /// Whether any `DB_*` variable was set, as opposed to all defaults.
    parts_set: bool,
}

const DB_PART_KEYS: [&str; 5] = ["DB_HOST", "DB_PORT", "DB_USER", "DB_PASSWORD", "DB_NAME"];

impl DatabaseConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = Lookup(&lookup);
        Ok(Self {
            url: lookup.optional("DATABASE_URL"),
            host: lookup.string("DB_HOST", "127.0.0.1"),
            port: lookup.parsed("DB_PORT", "port number", 5432)?,
            user: lookup.optional("DB_USER"),
            password: lookup.optional("DB_PASSWORD"),
            name: lookup.string("DB_NAME", "six_cities"),
            parts_set: DB_PART_KEYS
                .iter()
                .any(|key| lookup.optional(key).is_some()),
        })
    }

    /// The connection URL, but only when `DATABASE_URL` or a `DB_*` variable
    /// was set. `None` leaves the choice to Rocket's own configuration.
    pub fn explicit_url(&self) -> Option<String> {
        if self.url.is_some() || self.parts_set {
            Some(self.connection_url())
        } else {
            None
        }
    }

    pub fn connection_url(&self) -> String {
        if let Some(url) = &self.url {
            return url.clone();
        }

        let credentials = match (&self.user, &self.password) {
            (Some(user), Some(password)) => format!("{}:{}@", user, password),
            (Some(user), None) => format!("{}@", user),
            _ => String::new(),
        };

        format!(
            "postgres://{}{}:{}/{}",
            credentials, self.host, self.port, self.name
        )
    }
}

/// Settings for the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub environment: Environment,
    /// Overrides Rocket's configured port when set.
    pub port: Option<u16>,
    pub database: DatabaseConfig,
    pub upload_dir: PathBuf,
    pub static_dir: PathBuf,
    /// Stand-in for the authenticated user until sessions exist.
    pub mock_user_id: i32,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database = DatabaseConfig::from_lookup(&lookup)?;
        let lookup = Lookup(&lookup);

        let environment = match lookup.optional("APP_ENV") {
            Some(value) => value
                .parse()
                .map_err(|_| invalid("APP_ENV", "development, production or test", &value))?,
            None => Environment::default(),
        };

        let port = match lookup.optional("PORT") {
            Some(value) => Some(
                value
                    .parse::<u16>()
                    .map_err(|_| invalid("PORT", "port number", &value))?,
            ),
            None => None,
        };

        Ok(Self {
            environment,
            port,
            database,
            upload_dir: PathBuf::from(lookup.string("UPLOAD_DIR", "uploads")),
            static_dir: PathBuf::from(lookup.string("STATIC_DIR", "public")),
            mock_user_id: lookup.parsed("MOCK_USER_ID", "user id", 1)?,
        })
    }
}

struct Lookup<'a, F: Fn(&str) -> Option<String>>(&'a F);

impl<F: Fn(&str) -> Option<String>> Lookup<'_, F> {
    /// Empty values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn string(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    fn parsed<T: FromStr>(
        &self,
        key: &'static str,
        expected: &'static str,
        default: T,
    ) -> Result<T, ConfigError> {
        match self.optional(key) {
            Some(value) => value.parse().map_err(|_| invalid(key, expected, &value)),
            None => Ok(default),
        }
    }
}
