use anyhow::{Context, Result, bail};
use fluxo_core::time::DEFAULT_TIMEZONE;
use fluxo_ingest::StatementProfile;
use fluxo_ingest::StrategyChoice;
use fluxo_ingest::profile::BUILTIN_PROFILES;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::ensure_fluxo_home;

/// `~/.fluxo/config.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub import: ImportSection,

    /// User-defined statement profiles; a name here shadows a built-in.
    #[serde(default)]
    pub profiles: BTreeMap<String, StatementProfile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSection {
    pub profile: String,
    pub strategy: StrategyChoice,
    /// IANA zone that decides "today" for the pending cutoff.
    pub timezone: String,
}

impl Default for ImportSection {
    fn default() -> Self {
        Self {
            profile: "default".to_string(),
            strategy: StrategyChoice::Auto,
            timezone: DEFAULT_TIMEZONE.to_string(),
        }
    }
}

impl Config {
    /// Resolve a profile name: user profiles first, then built-ins.
    pub fn profile(&self, name: &str) -> Result<StatementProfile> {
        let profile = match self.profiles.get(name) {
            Some(p) => p.clone().with_name(name),
            None => match StatementProfile::builtin(name) {
                Some(p) => p,
                None => bail!(
                    "unknown profile '{name}' (available: {})",
                    self.profile_names().join(", ")
                ),
            },
        };
        profile
            .validate()
            .with_context(|| format!("profile '{name}'"))?;
        Ok(profile)
    }

    /// Built-ins followed by user profiles, without repeats.
    pub fn profile_names(&self) -> Vec<String> {
        let mut names: Vec<String> = BUILTIN_PROFILES.iter().map(|s| s.to_string()).collect();
        for name in self.profiles.keys() {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        names
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_fluxo_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(p: &Path) -> Result<Config> {
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}
