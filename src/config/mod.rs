//! Runtime configuration from environment variables (a `.env` file is loaded first by the binary).

use crate::error::ConfigError;
use std::net::SocketAddr;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";
pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost/student_api";
pub const DEFAULT_SCHEMA: &str = "public";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(ConfigError::Invalid {
                var: "STORE_BACKEND",
                reason: format!("{} (expected postgres or memory)", s),
            }),
        }
    }
}

/// Username and password of the user created or reset at startup.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub backend: StoreBackend,
    pub database_url: String,
    pub max_connections: u32,
    /// Schema holding the `students`, `users` and `auth_tokens` tables.
    pub schema: String,
    pub max_body_bytes: usize,
    pub admin: Option<AdminCredentials>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr = parse_var("BIND_ADDR", get("BIND_ADDR").as_deref().unwrap_or(DEFAULT_BIND_ADDR))?;
        let backend = get("STORE_BACKEND")
            .map(|v| v.parse::<StoreBackend>())
            .transpose()?
            .unwrap_or(StoreBackend::Postgres);
        let max_connections = match get("DB_MAX_CONNECTIONS") {
            Some(v) => parse_var("DB_MAX_CONNECTIONS", &v)?,
            None => DEFAULT_MAX_CONNECTIONS,
        };
        let max_body_bytes = match get("MAX_BODY_BYTES") {
            Some(v) => parse_var("MAX_BODY_BYTES", &v)?,
            None => DEFAULT_MAX_BODY_BYTES,
        };
        let admin = match (get("ADMIN_USERNAME"), get("ADMIN_PASSWORD")) {
            (Some(username), Some(password)) => Some(AdminCredentials { username, password }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Incomplete("ADMIN_USERNAME", "ADMIN_PASSWORD")),
            (None, Some(_)) => return Err(ConfigError::Incomplete("ADMIN_PASSWORD", "ADMIN_USERNAME")),
        };

        Ok(AppConfig {
            bind_addr,
            backend,
            database_url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.into()),
            max_connections,
            schema: get("STUDENT_API_SCHEMA").unwrap_or_else(|| DEFAULT_SCHEMA.into()),
            max_body_bytes,
            admin,
        })
    }
}

fn parse_var<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        reason: format!("{}: {}", value, e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults() {
        let c = config(&[]).unwrap();
        assert_eq!(c.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(c.backend, StoreBackend::Postgres);
        assert_eq!(c.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(c.schema, "public");
        assert_eq!(c.max_connections, 5);
        assert!(c.admin.is_none());
    }

    #[test]
    fn overrides() {
        let c = config(&[
            ("BIND_ADDR", "0.0.0.0:9000"),
            ("STORE_BACKEND", "Memory"),
            ("MAX_BODY_BYTES", "1024"),
            ("ADMIN_USERNAME", "admin"),
            ("ADMIN_PASSWORD", "admin"),
        ])
        .unwrap();
        assert_eq!(c.bind_addr.port(), 9000);
        assert_eq!(c.backend, StoreBackend::Memory);
        assert_eq!(c.max_body_bytes, 1024);
        assert_eq!(c.admin.as_ref().map(|a| a.username.as_str()), Some("admin"));
        assert!(!format!("{:?}", c).contains("password: \"admin\""));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            config(&[("STORE_BACKEND", "sqlite")]),
            Err(ConfigError::Invalid { var: "STORE_BACKEND", .. })
        ));
        assert!(matches!(
            config(&[("DB_MAX_CONNECTIONS", "many")]),
            Err(ConfigError::Invalid { var: "DB_MAX_CONNECTIONS", .. })
        ));
        assert!(matches!(config(&[("ADMIN_USERNAME", "admin")]), Err(ConfigError::Incomplete(..))));
    }

    #[test]
    fn empty_values_fall_back_to_defaults() {
        let c = config(&[("BIND_ADDR", ""), ("DATABASE_URL", "  ")]).unwrap();
        assert_eq!(c.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(c.database_url, DEFAULT_DATABASE_URL);
    }
}
