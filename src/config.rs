use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

pub(crate) const DEFAULT_LOG_FILTER: &str = "finboard=info";

#[derive(Debug, Clone)]
pub(crate) struct Config {
    pub(crate) database_path: PathBuf,
    pub(crate) log_path: PathBuf,
    /// Identity every read and write is scoped to.
    pub(crate) owner: String,
    pub(crate) log_filter: String,
}

impl Config {
    pub(crate) fn from_env() -> Result<Self> {
        let proj_dirs = directories::ProjectDirs::from("com", "finboard", "FinBoard")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        let data_dir = proj_dirs.data_dir().to_path_buf();
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        let database_path = env::var("FINBOARD_DB")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("finboard.db"));

        Ok(Self {
            log_path: data_dir.join("finboard.log"),
            database_path,
            owner: resolve_owner(env::var("FINBOARD_USER").ok(), env::var("USER").ok()),
            log_filter: env::var("FINBOARD_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        })
    }
}

/// First non-blank candidate wins, falling back to "local".
pub(crate) fn resolve_owner(explicit: Option<String>, login: Option<String>) -> String {
    [explicit, login]
        .into_iter()
        .flatten()
        .map(|s| s.trim().to_string())
        .find(|s| !s.is_empty())
        .unwrap_or_else(|| "local".into())
}
