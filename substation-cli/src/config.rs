use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use substation_core::AssistantSettings;
use substation_server::{ChatSettings, ServerConfig};

use crate::state::ensure_substation_home;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub data: DataSection,
    pub assistant: AssistantSettings,
    pub chat: ChatSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSection {
    /// `.sql` seed script or `.json` dump; the built-in rows when unset
    pub path: Option<PathBuf>,
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_substation_home()?.join("config.toml"))
}

fn resolve(path: Option<&Path>) -> Result<PathBuf> {
    match path {
        Some(p) => Ok(p.to_path_buf()),
        None => config_path(),
    }
}

/// Read the config file (defaults when absent), then apply environment overrides.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let p = resolve(path)?;
    let mut cfg = if p.exists() {
        let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
        toml::from_str(&s).with_context(|| format!("parse {}", p.display()))?
    } else {
        Config::default()
    };
    apply_env(&mut cfg, |k| std::env::var(k).ok())?;
    Ok(cfg)
}

pub fn save_config(cfg: &Config, path: Option<&Path>) -> Result<PathBuf> {
    let p = resolve(path)?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(p)
}

pub fn init_config(path: Option<&Path>) -> Result<()> {
    let p = resolve(path)?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    let written = save_config(&Config::default(), Some(&p))?;
    println!("Wrote {}", written.display());
    Ok(())
}

/// SERVER_PORT wins over PORT; blank values are ignored.
pub fn apply_env(cfg: &mut Config, var: impl Fn(&str) -> Option<String>) -> Result<()> {
    let get = |k: &str| var(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    if let Some(port) = get("SERVER_PORT").or_else(|| get("PORT")) {
        cfg.server.port = port
            .parse()
            .with_context(|| format!("invalid port in environment: {port}"))?;
    }
    if let Some(path) = get("SUBSTATION_DATASET") {
        cfg.data.path = Some(PathBuf::from(path));
    }
    if let Some(key) = get("OPENAI_API_KEY") {
        cfg.chat.llm.api_key = Some(key);
    }
    Ok(())
}
