use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};

use atlas_db::DEFAULT_READER_POOL_SIZE;

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub reader_pool: usize,
}

impl Config {
    /// Read settings from the environment, falling back to local defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_path = lookup("ATLAS_DB_PATH").unwrap_or_else(|| "atlas.db".into());
        let host = lookup("ATLAS_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = lookup("ATLAS_PORT")
            .unwrap_or_else(|| "3000".into())
            .parse()
            .context("ATLAS_PORT must be a port number")?;
        let reader_pool = lookup("ATLAS_READER_POOL")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_READER_POOL_SIZE)
            .max(1);

        Ok(Self {
            db_path: db_path.into(),
            host,
            port,
            reader_pool,
        })
    }

    pub fn addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid bind address {}:{}", self.host, self.port))
    }
}
