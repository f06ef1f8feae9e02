use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow, bail};

use toilet_api::HashCost;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Sqlite,
    Memory,
}

impl FromStr for StoreKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sqlite" => Ok(StoreKind::Sqlite),
            "memory" => Ok(StoreKind::Memory),
            other => Err(anyhow!("unknown store backend '{}'", other)),
        }
    }
}

/// Process configuration, read once at startup.
pub struct Config {
    pub jwt_secret: String,
    pub store: StoreKind,
    pub db_path: PathBuf,
    pub addr: SocketAddr,
    pub hash_cost: HashCost,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let jwt_secret = lookup("TOILET_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() {
            bail!("TOILET_JWT_SECRET must be set");
        }

        let store = lookup("TOILET_STORE")
            .unwrap_or_else(|| "sqlite".into())
            .parse::<StoreKind>()
            .context("invalid TOILET_STORE")?;
        let db_path = PathBuf::from(lookup("TOILET_DB_PATH").unwrap_or_else(|| "toilets.db".into()));

        let host = lookup("TOILET_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = lookup("TOILET_PORT")
            .unwrap_or_else(|| "8080".into())
            .parse::<u16>()
            .context("invalid TOILET_PORT")?;
        let addr = format!("{}:{}", host, port)
            .parse::<SocketAddr>()
            .context("invalid TOILET_HOST")?;

        let defaults = HashCost::default();
        let hash_cost = HashCost {
            memory_kib: parse_or(&lookup, "TOILET_HASH_MEMORY_KIB", defaults.memory_kib)?,
            iterations: parse_or(&lookup, "TOILET_HASH_ITERATIONS", defaults.iterations)?,
            parallelism: parse_or(&lookup, "TOILET_HASH_PARALLELISM", defaults.parallelism)?,
        };

        Ok(Self {
            jwt_secret,
            store,
            db_path,
            addr,
            hash_cost,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw.parse::<T>().with_context(|| format!("invalid {}", key)),
        None => Ok(default),
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("jwt_secret", &"<redacted>")
            .field("store", &self.store)
            .field("db_path", &self.db_path)
            .field("addr", &self.addr)
            .field("hash_cost", &self.hash_cost)
            .finish()
    }
}
