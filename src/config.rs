use crate::error::Error;
use serde::Deserialize;
use serde_with::{serde_as, DurationSeconds};
use std::fs::File;
use std::io::BufReader;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub type Shared = Arc<Config>;

/// Environment variable naming the API group the solver is registered under.
pub const GROUP_NAME_ENV: &str = "GROUP_NAME";

#[serde_as]
#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    pub api_bind_addr: SocketAddr,
    #[serde_as(as = "DurationSeconds<u64>")]
    pub api_timeout: Duration,
    pub store: StoreConfig,
}

/// Connection parameters handed to [`Solver::initialize`][crate::solver::Solver::initialize].
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StoreConfig {
    /// Records live only as long as the process.
    Memory,
    /// Records are persisted as JSON at `path` after every change.
    File { path: String },
}

impl Config {
    pub fn try_from_file(p: impl AsRef<Path>) -> Result<Self, Error> {
        let f = File::open(p)?;
        let reader = BufReader::new(f);
        let conf: Config = serde_json::from_reader(reader)?;
        Ok(conf)
    }
}

/// Read the API group name from the process environment, failing if it's unset or empty.
///
/// # Errors
///
/// Returns [`Error::MissingGroupName`] when [`GROUP_NAME_ENV`] is unset or blank.
pub fn group_name() -> Result<String, Error> {
    group_name_from(std::env::var(GROUP_NAME_ENV).ok())
}

fn group_name_from(value: Option<String>) -> Result<String, Error> {
    match value {
        Some(group) if !group.trim().is_empty() => Ok(group),
        _ => Err(Error::MissingGroupName),
    }
}
