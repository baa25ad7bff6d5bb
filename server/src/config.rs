// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use tracing::warn;

/// Server configuration.
///
/// Reads `STUDY_PLANNER_DATABASE_URL` and `STUDY_PLANNER_ADDR`, falling back
/// to the compile-time defaults when unset.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// SQLite connection URL.
    pub database_url: String,
    /// Address the HTTP listener binds to.
    pub bind_addr: SocketAddr,
}

impl ServerConfig {
    pub const DATABASE_URL_VAR: &str = "STUDY_PLANNER_DATABASE_URL";
    pub const ADDR_VAR: &str = "STUDY_PLANNER_ADDR";

    pub const DEFAULT_DATABASE_URL: &str = "sqlite://database/planner.db";
    pub const DEFAULT_ADDR: SocketAddr = SocketAddr::new(
        std::net::IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED),
        3000,
    );

    /// Build a config from the environment.
    pub fn from_env() -> Self {
        let database_url = env::var(Self::DATABASE_URL_VAR)
            .unwrap_or_else(|_| Self::DEFAULT_DATABASE_URL.to_owned());
        let bind_addr = match env::var(Self::ADDR_VAR) {
            Ok(raw) => parse_addr(&raw),
            Err(_) => Self::DEFAULT_ADDR,
        };
        Self {
            database_url,
            bind_addr,
        }
    }

    /// Build a config from explicit values (useful for tests).
    pub fn new(database_url: impl Into<String>, bind_addr: SocketAddr) -> Self {
        Self {
            database_url: database_url.into(),
            bind_addr,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

fn parse_addr(raw: &str) -> SocketAddr {
    raw.parse().unwrap_or_else(|e| {
        warn!(
            "Ignoring invalid {} value {:?} ({}), using {}.",
            ServerConfig::ADDR_VAR,
            raw,
            e,
            ServerConfig::DEFAULT_ADDR
        );
        ServerConfig::DEFAULT_ADDR
    })
}

/// Returns the on-disk file behind a SQLite URL, or `None` for in-memory
/// databases.
pub fn sqlite_file_path(database_url: &str) -> Option<PathBuf> {
    let rest = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or_default();
    if path.is_empty() || path == ":memory:" {
        return None;
    }
    Some(PathBuf::from(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let cfg = ServerConfig::new(ServerConfig::DEFAULT_DATABASE_URL, ServerConfig::DEFAULT_ADDR);
        assert_eq!(cfg.database_url, "sqlite://database/planner.db");
        assert_eq!(cfg.bind_addr.port(), 3000);
    }

    #[test]
    fn test_invalid_addr_falls_back() {
        assert_eq!(parse_addr("not an address"), ServerConfig::DEFAULT_ADDR);
        assert_eq!(
            parse_addr("127.0.0.1:8080"),
            "127.0.0.1:8080".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn test_sqlite_file_path() {
        assert_eq!(
            sqlite_file_path("sqlite://database/planner.db"),
            Some(PathBuf::from("database/planner.db"))
        );
        assert_eq!(
            sqlite_file_path("sqlite:planner.db?mode=rwc"),
            Some(PathBuf::from("planner.db"))
        );
        assert_eq!(sqlite_file_path("sqlite::memory:"), None);
        assert_eq!(sqlite_file_path("postgres://localhost/db"), None);
    }
}
