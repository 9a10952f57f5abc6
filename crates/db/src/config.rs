//! Database configuration read from the environment.
//!
//! Credentials never live in source: `DATABASE_URL` is required and there is
//! no built-in fallback.  A `.env` file is honored in development via
//! `dotenvy`.

use tracing::debug;

use crate::pool::{create_pool, DbPool};
use crate::DbError;

const DATABASE_URL: &str = "DATABASE_URL";
const MAX_CONNECTIONS: &str = "TGAPP_DB_MAX_CONNECTIONS";

const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Everything needed to open a [`DbPool`].
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub database_url: String,
    pub max_connections: u32,
}

impl DbConfig {
    /// Read the configuration from the process environment.
    ///
    /// Fails if `DATABASE_URL` is unset or `TGAPP_DB_MAX_CONNECTIONS` is set
    /// to something that is not a positive integer.
    pub fn from_env() -> Result<Self, DbError> {
        dotenvy::dotenv().ok();

        let database_url =
            std::env::var(DATABASE_URL).map_err(|_| DbError::MissingEnv(DATABASE_URL))?;

        let max_connections = match std::env::var(MAX_CONNECTIONS) {
            // Zero parses but would build a pool that can never hand out a
            // connection, so it is rejected alongside garbage.
            Ok(raw) => match raw.parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(DbError::InvalidConfig {
                        var: MAX_CONNECTIONS,
                        message: format!("expected a positive integer, got '{raw}'"),
                    })
                }
            },
            Err(_) => {
                debug!("{MAX_CONNECTIONS} not set, defaulting to {DEFAULT_MAX_CONNECTIONS}");
                DEFAULT_MAX_CONNECTIONS
            }
        };

        Ok(Self {
            database_url,
            max_connections,
        })
    }

    /// Open a pool against the configured database.
    pub async fn connect(&self) -> Result<DbPool, DbError> {
        create_pool(&self.database_url, self.max_connections).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Environment variables are process-global; serialize the tests that
    // touch them.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn with_env(vars: &[(&str, Option<&str>)], f: impl FnOnce()) {
        let _guard = ENV_LOCK.lock().unwrap();
        let saved: Vec<(&str, Option<String>)> = vars
            .iter()
            .map(|(key, _)| (*key, std::env::var(key).ok()))
            .collect();
        for (key, value) in vars {
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }
        f();
        for (key, value) in saved {
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }
    }

    #[test]
    fn from_env_fails_when_database_url_is_unset() {
        with_env(&[(DATABASE_URL, None), (MAX_CONNECTIONS, None)], || {
            match DbConfig::from_env() {
                Err(DbError::MissingEnv(var)) => assert_eq!(var, DATABASE_URL),
                other => panic!("expected MissingEnv, got {other:?}"),
            }
        });
    }

    #[test]
    fn from_env_reads_both_variables() {
        let url = "postgres://localhost/tgapp";
        with_env(
            &[(DATABASE_URL, Some(url)), (MAX_CONNECTIONS, Some("3"))],
            || {
                let config = DbConfig::from_env().unwrap();
                assert_eq!(config.database_url, url);
                assert_eq!(config.max_connections, 3);
            },
        );
    }

    #[test]
    fn from_env_defaults_the_pool_size() {
        with_env(
            &[
                (DATABASE_URL, Some("postgres://localhost/tgapp")),
                (MAX_CONNECTIONS, None),
            ],
            || {
                let config = DbConfig::from_env().unwrap();
                assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
            },
        );
    }

    #[test]
    fn from_env_rejects_non_numeric_pool_size() {
        with_env(
            &[
                (DATABASE_URL, Some("postgres://localhost/tgapp")),
                (MAX_CONNECTIONS, Some("ten")),
            ],
            || match DbConfig::from_env() {
                Err(DbError::InvalidConfig { var, .. }) => assert_eq!(var, MAX_CONNECTIONS),
                other => panic!("expected InvalidConfig, got {other:?}"),
            },
        );
    }

    #[test]
    fn from_env_rejects_zero_pool_size() {
        with_env(
            &[
                (DATABASE_URL, Some("postgres://localhost/tgapp")),
                (MAX_CONNECTIONS, Some("0")),
            ],
            || match DbConfig::from_env() {
                Err(DbError::InvalidConfig { var, .. }) => assert_eq!(var, MAX_CONNECTIONS),
                other => panic!("expected InvalidConfig, got {other:?}"),
            },
        );
    }
}
