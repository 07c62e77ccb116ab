use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};

use mosaic_api::Wiring;

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub wiring: Wiring,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let db_path = lookup("MOSAIC_DB_PATH").unwrap_or_else(|| "mosaic.db".into());
        let host = lookup("MOSAIC_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = lookup("MOSAIC_PORT")
            .unwrap_or_else(|| "3000".into())
            .parse()
            .context("MOSAIC_PORT must be a port number")?;

        let flag = |key: &str| -> Result<bool> {
            match lookup(key) {
                Some(raw) => parse_bool(&raw).with_context(|| format!("invalid value for {}", key)),
                None => Ok(false),
            }
        };

        Ok(Self {
            db_path: PathBuf::from(db_path),
            host,
            port,
            wiring: Wiring {
                private_users: flag("MOSAIC_PRIVATE_USERS")?,
                shared_post_comment_collection: flag("MOSAIC_SHARED_POST_COMMENT_COLLECTION")?,
                authenticate_on_create: flag("MOSAIC_AUTHENTICATE_ON_CREATE")?,
            },
        })
    }

    pub fn addr(&self) -> Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => bail!("expected a boolean, got '{}'", other),
    }
}
