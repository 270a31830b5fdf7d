use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

pub fn substation_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".substation"))
}

pub fn ensure_substation_home() -> Result<PathBuf> {
    let dir = substation_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

/// Daily chat transcripts live here.
pub fn chat_log_dir() -> Result<PathBuf> {
    let dir = ensure_substation_home()?.join("chat");
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}
