//! Service settings read from environment variables.
//!
//! # Environment Variables
//!
//! - `VOTE_STORE`: `postgres` or `memory` (default: postgres)
//! - `DATABASE_URL`: PostgreSQL connection string (required for postgres)
//! - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
//! - `RUN_MIGRATIONS`: Apply bundled migrations on startup (default: true)
//! - `SERVER_HOST`: Bind address (default: 127.0.0.1)
//! - `SERVER_PORT`: Bind port (default: 8080)
//! - `VOTE_CONFLICT_RETRIES`: Retries of a conflicting vote transaction (default: 3)
//! - `CORS_ALLOWED_ORIGINS`: Comma-separated origins (default: localhost dev servers)
//! - `LOG_FORMAT`: `pretty` or `json` (default: pretty)
//! - `MEMORY_PROJECTS`: Comma-separated project ids seeded into the memory store
use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use axum::http::HeaderValue;
use votes_shared::ProjectId;

use crate::errors::ConfigError;

const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1));
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_CONFLICT_RETRIES: usize = 3;
const DEFAULT_CORS_ORIGINS: &str =
    "http://localhost:3000,http://localhost:5173,http://127.0.0.1:3000,http://127.0.0.1:5173";

/// Which vote store backs the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Fully parsed service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub run_migrations: bool,
    pub server_addr: SocketAddr,
    pub conflict_retries: usize,
    pub cors_allowed_origins: Vec<HeaderValue>,
    pub log_format: LogFormat,
    pub memory_projects: Vec<ProjectId>,
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let store_backend = match var("VOTE_STORE").map(|v| v.to_lowercase()).as_deref() {
            None | Some("postgres") => StoreBackend::Postgres,
            Some("memory") => StoreBackend::Memory,
            Some(other) => {
                return Err(ConfigError::invalid(
                    "VOTE_STORE",
                    other,
                    "expected `postgres` or `memory`",
                ));
            }
        };

        let database_url = var("DATABASE_URL");
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let host = parse_or("SERVER_HOST", var("SERVER_HOST"), DEFAULT_HOST)?;
        let port = parse_or("SERVER_PORT", var("SERVER_PORT"), DEFAULT_PORT)?;

        let log_format = match var("LOG_FORMAT").map(|v| v.to_lowercase()).as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::invalid("LOG_FORMAT", other, "expected `pretty` or `json`"));
            }
        };

        let cors_allowed_origins = split_list(
            &var("CORS_ALLOWED_ORIGINS").unwrap_or_else(|| DEFAULT_CORS_ORIGINS.to_string()),
        )
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .map_err(|e| ConfigError::invalid("CORS_ALLOWED_ORIGINS", origin, e))
        })
        .collect::<Result<Vec<_>, _>>()?;

        let memory_projects = split_list(&var("MEMORY_PROJECTS").unwrap_or_default())
            .map(|id| ProjectId::new(id).map_err(|e| ConfigError::invalid("MEMORY_PROJECTS", id, e)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            store_backend,
            database_url,
            database_max_connections: parse_or(
                "DATABASE_MAX_CONNECTIONS",
                var("DATABASE_MAX_CONNECTIONS"),
                DEFAULT_MAX_CONNECTIONS,
            )?,
            run_migrations: parse_or("RUN_MIGRATIONS", var("RUN_MIGRATIONS"), true)?,
            server_addr: SocketAddr::new(host, port),
            conflict_retries: parse_or(
                "VOTE_CONFLICT_RETRIES",
                var("VOTE_CONFLICT_RETRIES"),
                DEFAULT_CONFLICT_RETRIES,
            )?,
            cors_allowed_origins,
            log_format,
            memory_projects,
        })
    }
}

fn parse_or<T>(name: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: ToString,
{
    match value {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::invalid(name, raw.clone(), e)),
    }
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|item| !item.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_postgres_requires_database_url() {
        let result = Config::from_lookup(lookup(&[]));
        assert_eq!(result.unwrap_err(), ConfigError::Missing("DATABASE_URL"));
    }

    #[test]
    fn test_defaults() {
        let config =
            Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/votes")])).unwrap();

        assert_eq!(config.store_backend, StoreBackend::Postgres);
        assert_eq!(config.server_addr, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.database_max_connections, 10);
        assert!(config.run_migrations);
        assert_eq!(config.conflict_retries, 3);
        assert_eq!(config.cors_allowed_origins.len(), 4);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert!(config.memory_projects.is_empty());
    }

    #[test]
    fn test_memory_backend_without_database() {
        let config = Config::from_lookup(lookup(&[
            ("VOTE_STORE", "Memory"),
            ("MEMORY_PROJECTS", "p1, p2,,p3"),
            ("SERVER_PORT", "9000"),
            ("LOG_FORMAT", "json"),
        ]))
        .unwrap();

        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert_eq!(config.database_url, None);
        assert_eq!(config.server_addr.port(), 9000);
        assert_eq!(config.log_format, LogFormat::Json);
        let ids: Vec<&str> = config.memory_projects.iter().map(|p| p.as_str()).collect();
        assert_eq!(ids, ["p1", "p2", "p3"]);
    }

    #[test]
    fn test_invalid_values_are_reported() {
        let err = Config::from_lookup(lookup(&[("VOTE_STORE", "firestore")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "VOTE_STORE", .. }));

        let err = Config::from_lookup(lookup(&[
            ("VOTE_STORE", "memory"),
            ("SERVER_PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "SERVER_PORT", .. }));

        let err = Config::from_lookup(lookup(&[
            ("VOTE_STORE", "memory"),
            ("RUN_MIGRATIONS", "maybe"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "RUN_MIGRATIONS", .. }));
    }

    #[test]
    #[serial]
    fn test_from_env_reads_process_environment() {
        unsafe {
            env::set_var("VOTE_STORE", "memory");
            env::set_var("VOTE_CONFLICT_RETRIES", "5");
            env::remove_var("DATABASE_URL");
        }

        let config = Config::from_env().unwrap();

        unsafe {
            env::remove_var("VOTE_STORE");
            env::remove_var("VOTE_CONFLICT_RETRIES");
        }
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert_eq!(config.conflict_retries, 5);
    }
}
