use std::net::SocketAddr;

use anyhow::{Context, Result};

pub const ADDR_ENV: &str = "RELAY_ADDR";
const DEFAULT_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub addr: SocketAddr,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw = lookup(ADDR_ENV).unwrap_or_else(|| DEFAULT_ADDR.into());
        let addr = raw
            .parse::<SocketAddr>()
            .with_context(|| format!("invalid {ADDR_ENV} `{raw}`"))?;
        Ok(Self { addr })
    }
}
