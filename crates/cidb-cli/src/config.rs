// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use cidb_rest::Endpoint;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const APP_NAME: &str = "cidb";
const CONFIG_VERSION: i64 = 1;
const DEFAULT_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_SERVICE: &str = "amforeas";
const DEFAULT_DATABASE: &str = "demo1";
const DEFAULT_TIMEOUT: &str = "5s";
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub server: Server,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub details: Details,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            server: Server::default(),
            ui: Ui::default(),
            details: Details::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    pub base_url: Option<String>,
    pub service: Option<String>,
    pub database: Option<String>,
    pub timeout: Option<String>,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            base_url: Some(DEFAULT_BASE_URL.to_owned()),
            service: Some(DEFAULT_SERVICE.to_owned()),
            database: Some(DEFAULT_DATABASE.to_owned()),
            timeout: Some(DEFAULT_TIMEOUT.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ui {
    pub confirm_save: Option<bool>,
}

impl Default for Ui {
    fn default() -> Self {
        Self {
            confirm_save: Some(true),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Details {
    pub server_filter: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Log {
    pub path: Option<String>,
    pub filter: Option<String>,
}

impl Default for Log {
    fn default() -> Self {
        Self {
            path: None,
            filter: Some(DEFAULT_LOG_FILTER.to_owned()),
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("CIDB_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set CIDB_CONFIG_PATH to the config file")
        })?;
        Ok(config_root.join(APP_NAME).join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} has no version; add `version = 1` and put values under [server], [ui], [details] and [log]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        self.endpoint()
            .with_context(|| format!("invalid [server] section in {}", path.display()))?;

        let timeout = self.timeout()?;
        if timeout.is_zero() {
            bail!(
                "server.timeout in {} must be positive, got {}",
                path.display(),
                self.server.timeout.as_deref().unwrap_or(DEFAULT_TIMEOUT)
            );
        }

        if let Some(filter) = &self.log.filter
            && filter.trim().is_empty()
        {
            bail!(
                "log.filter in {} must not be empty; use e.g. \"info\" or \"cidb_rest=debug\"",
                path.display()
            );
        }

        if let Some(log_path) = &self.log.path
            && log_path.trim().is_empty()
        {
            bail!(
                "log.path in {} must not be empty; remove it to use the default",
                path.display()
            );
        }

        Ok(())
    }

    pub fn endpoint(&self) -> Result<Endpoint> {
        Endpoint::new(
            self.server.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL),
            self.server.service.as_deref().unwrap_or(DEFAULT_SERVICE),
            self.server.database.as_deref().unwrap_or(DEFAULT_DATABASE),
        )
    }

    pub fn timeout(&self) -> Result<Duration> {
        parse_duration(self.server.timeout.as_deref().unwrap_or(DEFAULT_TIMEOUT))
    }

    pub fn confirm_save(&self) -> bool {
        self.ui.confirm_save.unwrap_or(true)
    }

    pub fn server_filter(&self) -> bool {
        self.details.server_filter.unwrap_or(false)
    }

    pub fn log_filter(&self) -> &str {
        self.log.filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }

    pub fn log_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.log.path {
            return Ok(PathBuf::from(path));
        }
        let data_root = dirs::data_dir().ok_or_else(|| {
            anyhow!("cannot resolve data directory; set log.path in the config file")
        })?;
        Ok(data_root.join(APP_NAME).join("cidb.log"))
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# cidb config\n# Place this file at: {}\n\nversion = 1\n\n[server]\nbase_url = \"{DEFAULT_BASE_URL}\"\nservice = \"{DEFAULT_SERVICE}\"\ndatabase = \"{DEFAULT_DATABASE}\"\n# <N>ms, <N>s or <N>m\ntimeout = \"{DEFAULT_TIMEOUT}\"\n\n[ui]\n# Ask before sending changes to the server\nconfirm_save = true\n\n[details]\n# Let the backend filter comments and pictures by car\nserver_filter = false\n\n[log]\n# Optional. Default is the platform data dir (for example ~/.local/share/cidb/cidb.log)\n# path = \"/absolute/path/to/cidb.log\"\n# tracing filter directive; CIDB_LOG overrides it\nfilter = \"{DEFAULT_LOG_FILTER}\"\n",
            path.display(),
        )
    }
}

fn parse_duration(raw: &str) -> Result<Duration> {
    let raw = raw.trim();
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_secs(mins * 60));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 500ms or 5s)")
}
