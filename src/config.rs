/*
 *  config.rs
 *
 *  SkyCard - weather at a glance
 *	(c) 2020-26 Stuart Hunter
 *
 *	Layered configuration: defaults, YAML file, CLI overrides
 *
 *	This program is free software: you can redistribute it and/or modify
 *	it under the terms of the GNU General Public License as published by
 *	the Free Software Foundation, either version 3 of the License, or
 *	(at your option) any later version.
 *
 *	This program is distributed in the hope that it will be useful,
 *	but WITHOUT ANY WARRANTY; without even the implied warranty of
 *	MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *	GNU General Public License for more details.
 *
 *	See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *	Public License.
 *
 */
use clap::{ArgAction, Parser, ValueHint};
use dirs_next::home_dir;
use serde::{Deserialize, Serialize};
use std::{fs, path::{Path, PathBuf}};
use thiserror::Error;

pub const DEFAULT_CITY: &str = "new-york";

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Top-level app configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: Option<String>,
    /// weatherapi.com key; `WEATHER_API_KEY` also works
    pub api_key: Option<String>,
    /// location queried at startup
    pub city: String,
    pub api: ApiConfig,
    pub clock: ClockConfig,
    pub map: MapConfig,
    /// ANSI colors on the card
    pub color: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: None,
            api_key: None,
            city: DEFAULT_CITY.to_string(),
            api: ApiConfig::default(),
            clock: ClockConfig::default(),
            map: MapConfig::default(),
            color: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub connect_timeout_ms: u64,
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.weatherapi.com/v1".to_string(),
            connect_timeout_ms: 2_000,
            timeout_ms: 5_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    pub tick_ms: u64,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self { tick_ms: 1_000 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub zoom: u8,
    pub default_lat: f64,
    pub default_lon: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self { zoom: 13, default_lat: 51.505, default_lon: -0.09 }
    }
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone, Default)]
#[command(name = "skycard", version, about = "SkyCard - weather at a glance")]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(short = 'c', long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    /// Enable debug log level
    #[arg(short = 'v', long, alias = "verbose", action = ArgAction::SetTrue)]
    pub debug: bool,
    #[arg(long)]
    pub log_level: Option<String>,
    /// weatherapi.com API key
    #[arg(short = 'k', long, env = "WEATHER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
    /// City (or any weatherapi location query) shown at startup
    #[arg(short = 'C', long)]
    pub city: Option<String>,
    #[arg(long)]
    pub base_url: Option<String>,
    #[arg(long)]
    pub tick_ms: Option<u64>,
    #[arg(long)]
    pub zoom: Option<u8>,
    /// plain text card, no ANSI colors
    #[arg(long, action = ArgAction::SetTrue)]
    pub no_color: bool,
    /// fetch once, print the card and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub once: bool,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

/// Read YAML (explicit path or search) and layer `cli` on top, then validate.
pub fn resolve(cli: &Cli) -> Result<Config, ConfigError> {
    // 1) defaults, 2) YAML file
    let mut cfg = if let Some(p) = cli.config.as_ref() {
        if !p.exists() {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
        read_yaml(p)?
    } else if let Some(p) = find_config_file() {
        read_yaml(&p)?
    } else {
        Config::default()
    };

    // 3) CLI overrides (highest precedence)
    apply_cli_overrides(&mut cfg, cli);

    // 4) Validate
    validate(&cfg)?;
    Ok(cfg)
}

pub const REDACTED: &str = "<redacted>";

/// Merged config as YAML for `--dump-config`, with the API key masked.
pub fn to_yaml(cfg: &Config) -> Result<String, ConfigError> {
    let mut shown = cfg.clone();
    if shown.api_key.is_some() {
        shown.api_key = Some(REDACTED.to_string());
    }
    Ok(serde_yaml::to_string(&shown)?)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    // XDG-style: ~/.config/skycard/config.yaml
    if let Some(home) = home_dir() {
        let p = home.join(".config/skycard/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/skycard.yaml");
        if p.exists() { return Some(p) }
    }
    // project local
    for candidate in &["skycard.yaml", "config.yaml", "config/skycard.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    parse_yaml(&s)
}

pub fn parse_yaml(s: &str) -> Result<Config, ConfigError> {
    let cfg: Config = serde_yaml::from_str(s)?;
    Ok(cfg)
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if cli.debug                  { cfg.log_level = Some("debug".to_string()); }
    if cli.log_level.is_some()    { cfg.log_level = cli.log_level.clone(); }
    if cli.api_key.is_some()      { cfg.api_key = cli.api_key.clone(); }
    if let Some(city) = &cli.city { cfg.city = city.clone(); }
    if let Some(url) = &cli.base_url { cfg.api.base_url = url.clone(); }
    if let Some(ms) = cli.tick_ms { cfg.clock.tick_ms = ms; }
    if let Some(z) = cli.zoom     { cfg.map.zoom = z; }
    if cli.no_color               { cfg.color = false; }
}

fn validate(cfg: &Config) -> Result<(), ConfigError> {
    match cfg.api_key.as_deref().map(str::trim) {
        None | Some("") => {
            return Err(ConfigError::Validation(
                "api_key is required (config, --api-key or WEATHER_API_KEY)".into(),
            ))
        }
        _ => {}
    }
    if cfg.city.trim().is_empty() {
        return Err(ConfigError::Validation("city must not be empty".into()));
    }
    if cfg.clock.tick_ms == 0 {
        return Err(ConfigError::Validation("clock tick_ms must be > 0".into()));
    }
    if cfg.map.zoom > 19 {
        return Err(ConfigError::Validation("map zoom must be 0..=19".into()));
    }
    if !(-90.0..=90.0).contains(&cfg.map.default_lat) || !(-180.0..=180.0).contains(&cfg.map.default_lon) {
        return Err(ConfigError::Validation("map default_lat/default_lon out of range".into()));
    }
    Ok(())
}
