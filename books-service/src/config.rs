use std::env;
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_ENV_FILE: &str = ".env";
pub const DEFAULT_INDEX: &str = "books";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Error loading {path}: {source}")]
    EnvFile {
        path: String,
        #[source]
        source: dotenvy::Error,
    },
    #[error("{0} is required but not set")]
    Missing(&'static str),
    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    Elasticsearch,
    Memory,
}

impl std::str::FromStr for BackendType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "elasticsearch" | "elastic" | "es" => Ok(BackendType::Elasticsearch),
            "memory" => Ok(BackendType::Memory),
            _ => Err(format!("Invalid backend type: {}", s)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub backend: BackendType,
    /// Always set for the Elasticsearch backend.
    pub elastic_url: Option<String>,
    pub index: String,
    pub port: u16,
}

impl Config {
    /// Loads the environment file named by `ENV_FILE` (default `.env`) into
    /// the process environment, then reads the configuration from it.
    pub fn load() -> Result<Self, ConfigError> {
        let env_file = env::var("ENV_FILE").unwrap_or_else(|_| DEFAULT_ENV_FILE.to_string());
        load_env_file(&env_file)?;
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend = match lookup("BACKEND_TYPE") {
            Some(value) => value.parse::<BackendType>().map_err(|_| ConfigError::Invalid {
                key: "BACKEND_TYPE",
                value,
            })?,
            None => BackendType::Elasticsearch,
        };

        let elastic_url = lookup("ELASTIC_URL")
            .or_else(|| lookup("elastic_url"))
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());

        if backend == BackendType::Elasticsearch && elastic_url.is_none() {
            return Err(ConfigError::Missing("ELASTIC_URL"));
        }

        let index = lookup("BOOKS_INDEX")
            .filter(|index| !index.is_empty())
            .unwrap_or_else(|| DEFAULT_INDEX.to_string());

        let port = match lookup("PORT") {
            Some(value) => value
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid { key: "PORT", value })?,
            None => DEFAULT_PORT,
        };

        Ok(Config {
            backend,
            elastic_url,
            index,
            port,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

pub fn load_env_file(path: &str) -> Result<(), ConfigError> {
    dotenvy::from_path(Path::new(path))
        .map(|_| ())
        .map_err(|source| ConfigError::EnvFile {
            path: path.to_string(),
            source,
        })
}
