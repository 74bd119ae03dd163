// Server configuration - defaults overridden from the environment

use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use tracing::info;

use crate::error::{Error, Result};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_CSV_PATH: &str = "data/competitors.csv";
pub const DEFAULT_PUBLIC_DIR: &str = "public";

/// Server settings, built once at startup and handed to the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub csv_path: PathBuf,
    pub public_dir: PathBuf,
    /// Write the header-only file at startup when it is missing.
    pub init_store: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            csv_path: PathBuf::from(DEFAULT_CSV_PATH),
            public_dir: PathBuf::from(DEFAULT_PUBLIC_DIR),
            init_store: false,
        }
    }
}

impl Config {
    /// Defaults overridden by `REGISTRY_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as `from_env` but reading from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Ok(Self {
            host: try_load(&lookup, "REGISTRY_HOST", defaults.host)?,
            port: try_load(&lookup, "REGISTRY_PORT", defaults.port)?,
            csv_path: try_load(&lookup, "REGISTRY_CSV_PATH", defaults.csv_path)?,
            public_dir: try_load(&lookup, "REGISTRY_PUBLIC_DIR", defaults.public_dir)?,
            init_store: try_load(&lookup, "REGISTRY_INIT_STORE", defaults.init_store)?,
        })
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn try_load<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + std::fmt::Debug,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| Error::Config {
            key: key.to_string(),
            message: format!("{e} (got {raw:?})"),
        }),
        None => {
            info!("{key} not set, using default: {default:?}");
            Ok(default)
        }
    }
}
