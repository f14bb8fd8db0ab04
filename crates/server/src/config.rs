use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use clap::Parser;
use thiserror::Error;

/// Command-line arguments for course-server
#[derive(Parser, Debug, Clone)]
#[command(name = "course-server")]
#[command(about = "Course video progress and completion stats service")]
#[command(version)]
pub struct Config {
    /// SQLite database URL or path
    #[arg(long = "db", env = "COURSE_DB_URL", default_value = "sqlite://course.sqlite3")]
    pub db_url: String,

    /// Address to listen on
    #[arg(long, env = "COURSE_BIND", default_value = "127.0.0.1:8080")]
    pub bind: SocketAddr,

    /// Create an admin with this display name when no users exist yet
    #[arg(long, env = "COURSE_BOOTSTRAP_ADMIN")]
    pub bootstrap_admin: Option<String>,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid --db value: {raw}")]
    InvalidDbUrl { raw: String },
    #[error("cannot prepare database file: {0}")]
    Io(#[from] std::io::Error),
}

/// Turn a bare path or `sqlite:` URL into an absolute `sqlite://` URL.
///
/// In-memory and already-absolute URLs pass through untouched.
#[must_use]
pub fn normalize_sqlite_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed == "sqlite::memory:" || trimmed.starts_with("sqlite://") {
        return trimmed.to_owned();
    }

    let path_str = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
    let path = Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// Make sure the database file and its parent directory exist.
///
/// # Errors
///
/// Returns `ConfigError::InvalidDbUrl` for a URL without a path, or
/// `ConfigError::Io` if the file cannot be created.
pub fn prepare_sqlite_file(db_url: &str) -> Result<(), ConfigError> {
    if db_url == "sqlite::memory:" || db_url.contains("mode=memory") {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ConfigError::InvalidDbUrl {
            raw: db_url.to_owned(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ConfigError::InvalidDbUrl {
            raw: db_url.to_owned(),
        });
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }
    Ok(())
}
