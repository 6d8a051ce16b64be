//! # worldlined
//!
//! Worldline service daemon — opens the database, runs migrations, and
//! starts the HTTP server. Also provisions users from the command line,
//! since there is no HTTP surface for user management.

#![deny(unsafe_code)]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use worldline_server::{ServerConfig, WorldlineServer};
use worldline_store::{ConnectionConfig, EventStore, new_file, run_migrations};

/// Worldline scenario service.
#[derive(Parser, Debug)]
#[command(name = "worldlined", about = "Worldline scenario service")]
struct Cli {
    /// Host to bind.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to bind (0 for auto-assign).
    #[arg(long, default_value = "8000")]
    port: u16,

    /// Path to the `SQLite` database.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Provision a user with this username, print the bearer token, and
    /// exit without serving.
    #[arg(long, value_name = "USERNAME")]
    create_user: Option<String>,
}

impl Cli {
    fn default_db_path() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
        PathBuf::from(home).join(".worldline").join("worldline.db")
    }
}

fn ensure_parent_dir(path: &std::path::Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Cli::parse();

    let db_path = args.db_path.unwrap_or_else(Cli::default_db_path);
    ensure_parent_dir(&db_path)?;
    let db_str = db_path.to_string_lossy();
    let pool =
        new_file(&db_str, &ConnectionConfig::default()).context("Failed to open database")?;
    {
        let conn = pool.get().context("Failed to get DB connection")?;
        let _ = run_migrations(&conn).context("Failed to run migrations")?;
    }
    let store = EventStore::new(pool);

    if let Some(username) = args.create_user {
        let user = store
            .create_user(&username)
            .with_context(|| format!("Failed to create user: {username}"))?;
        println!("{}", user.token);
        return Ok(());
    }

    let config = ServerConfig {
        host: args.host,
        port: args.port,
    };
    let server = WorldlineServer::new(config, store);

    tokio::select! {
        result = server.listen() => result.context("Server error")?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutting down...");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_default_host() {
        let cli = Cli::parse_from(["worldlined"]);
        assert_eq!(cli.host, "127.0.0.1");
    }

    #[test]
    fn cli_default_port() {
        let cli = Cli::parse_from(["worldlined"]);
        assert_eq!(cli.port, 8000);
    }

    #[test]
    fn cli_custom_port() {
        let cli = Cli::parse_from(["worldlined", "--port", "8080"]);
        assert_eq!(cli.port, 8080);
    }

    #[test]
    fn cli_db_path() {
        let cli = Cli::parse_from(["worldlined", "--db-path", "/tmp/test.db"]);
        assert_eq!(cli.db_path, Some(PathBuf::from("/tmp/test.db")));
    }

    #[test]
    fn cli_create_user() {
        let cli = Cli::parse_from(["worldlined", "--create-user", "alice"]);
        assert_eq!(cli.create_user.as_deref(), Some("alice"));
    }

    #[test]
    fn default_db_path_under_worldline_dir() {
        let path = Cli::default_db_path();
        assert!(path.to_string_lossy().contains(".worldline"));
        assert!(path.to_string_lossy().ends_with("worldline.db"));
    }

    #[test]
    fn ensure_parent_dir_creates_nested() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("test.db");
        ensure_parent_dir(&path).unwrap();
        assert!(path.parent().unwrap().exists());
    }
}
