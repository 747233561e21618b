use crate::error::{BadEnvVarSnafu, OpenDatabaseSnafu, ParsePortSnafu, RosterResult};
use dotenvy::var;
use snafu::ResultExt;
use sqlx::sqlite::SqliteConnectOptions;
use std::{str::FromStr, sync::Arc};

pub const DEFAULT_PORT: u16 = 5010;
pub const DEFAULT_DB_PATH: &str = "students.db";

#[derive(Clone, Debug)]
pub struct RuntimeConfiguration {
    port: u16,
    db_config: Arc<DbConfig>,
}

impl RuntimeConfiguration {
    pub fn new() -> RosterResult<Self> {
        let port = match optional_env_var("PORT")? {
            Some(port) => port.parse().context(ParsePortSnafu { original: port })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            port,
            db_config: Arc::new(DbConfig::new()?),
        })
    }

    #[cfg(test)]
    pub fn in_memory() -> Self {
        Self {
            port: DEFAULT_PORT,
            db_config: Arc::new(DbConfig {
                location: DbLocation::Memory,
            }),
        }
    }

    #[cfg(test)]
    pub fn with_db_file(path: impl Into<String>) -> Self {
        Self {
            port: DEFAULT_PORT,
            db_config: Arc::new(DbConfig {
                location: DbLocation::File(path.into()),
            }),
        }
    }

    pub const fn port(&self) -> u16 {
        self.port
    }

    pub fn server_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }

    pub fn db_config(&self) -> Arc<DbConfig> {
        self.db_config.clone()
    }
}

#[derive(Debug)]
enum DbLocation {
    File(String),
    #[cfg_attr(not(test), allow(dead_code))]
    Memory,
}

#[derive(Debug)]
pub struct DbConfig {
    location: DbLocation,
}

impl DbConfig {
    pub fn new() -> RosterResult<Self> {
        let path = optional_env_var("ROSTER_DB_PATH")?.unwrap_or_else(|| DEFAULT_DB_PATH.into());

        Ok(Self {
            location: DbLocation::File(path),
        })
    }

    pub fn get_db_path(&self) -> &str {
        match &self.location {
            DbLocation::File(path) => path,
            DbLocation::Memory => ":memory:",
        }
    }

    ///file paths go in as-is, never through URL parsing
    pub fn connect_options(&self) -> RosterResult<SqliteConnectOptions> {
        match &self.location {
            DbLocation::File(path) => Ok(SqliteConnectOptions::new().filename(path)),
            DbLocation::Memory => {
                SqliteConnectOptions::from_str("sqlite::memory:").context(OpenDatabaseSnafu)
            }
        }
    }

    ///in-memory databases vanish with their last connection, so the pool has to hold exactly one forever
    pub const fn is_in_memory(&self) -> bool {
        matches!(self.location, DbLocation::Memory)
    }
}

fn optional_env_var(name: &'static str) -> RosterResult<Option<String>> {
    match var(name) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(dotenvy::Error::EnvVar(std::env::VarError::NotPresent)) => Ok(None),
        Err(e) => Err(e).context(BadEnvVarSnafu { name }),
    }
}
