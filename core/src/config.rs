//! Runtime configuration, read from the environment (and `.env`) and then
//! overridden by command line flags.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::model::activity::Session;

/// Owner used by the local backend when no user is configured.
pub const LOCAL_OWNER: &str = "local";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unknown backend '{0}' (expected 'local' or 'sqlite')")]
    InvalidBackend(String),

    #[error("Could not determine home directory")]
    NoHomeDir,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    /// JSON document in the data directory.
    #[default]
    Local,
    /// Owner-scoped table in `activities.db`.
    Sqlite,
}

impl FromStr for Backend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" | "file" => Ok(Backend::Local),
            "sqlite" | "db" => Ok(Backend::Sqlite),
            other => Err(ConfigError::InvalidBackend(other.to_string())),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Local => write!(f, "local"),
            Backend::Sqlite => write!(f, "sqlite"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub backend: Backend,
    pub data_dir: PathBuf,
    pub user: Option<String>,
}

impl Config {
    /// Reads `STUDYPLAN_BACKEND`, `STUDYPLAN_DATA_DIR` and `STUDYPLAN_USER`.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let backend = match env::var("STUDYPLAN_BACKEND") {
            Ok(raw) => raw.parse()?,
            Err(_) => Backend::default(),
        };
        let data_dir = match env::var("STUDYPLAN_DATA_DIR") {
            Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
            _ => default_data_dir()?,
        };
        let user = env::var("STUDYPLAN_USER")
            .ok()
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty());

        Ok(Self { backend, data_dir, user })
    }

    /// The session the store should start with, if any.
    ///
    /// The local backend always has one; the sqlite backend is signed out
    /// until a user is configured.
    pub fn session(&self) -> Option<Session> {
        match (&self.user, self.backend) {
            (Some(user), _) => Some(Session::new(user.clone())),
            (None, Backend::Local) => Some(Session::new(LOCAL_OWNER)),
            (None, Backend::Sqlite) => None,
        }
    }
}

fn default_data_dir() -> Result<PathBuf, ConfigError> {
    let home_dir = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
    Ok(home_dir.join(".studyplan"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(backend: Backend, user: Option<&str>) -> Config {
        Config {
            backend,
            data_dir: PathBuf::from("/tmp/studyplan"),
            user: user.map(str::to_string),
        }
    }

    #[test]
    fn test_parse_backend() {
        assert_eq!("SQLite".parse::<Backend>(), Ok(Backend::Sqlite));
        assert_eq!(" local ".parse::<Backend>(), Ok(Backend::Local));
        assert_eq!(
            "postgres".parse::<Backend>(),
            Err(ConfigError::InvalidBackend("postgres".to_string()))
        );
    }

    #[test]
    fn test_session_selection() {
        assert_eq!(config(Backend::Local, None).session(), Some(Session::new(LOCAL_OWNER)));
        assert_eq!(config(Backend::Sqlite, None).session(), None);
        assert_eq!(
            config(Backend::Sqlite, Some("ana")).session(),
            Some(Session::new("ana"))
        );
    }
}
