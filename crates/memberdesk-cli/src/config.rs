// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use memberdesk_app::{MIN_DEBOUNCE, PageSize};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const APP_NAME: &str = "memberdesk";
const CONFIG_VERSION: i64 = 1;
const DEFAULT_TIMEOUT: &str = "10s";
const DEFAULT_DEBOUNCE: &str = "300ms";
const DEFAULT_LOG_LEVEL: &str = "info";

pub const CONFIG_PATH_ENV: &str = "MEMBERDESK_CONFIG_PATH";
pub const TOKEN_ENV: &str = "MEMBERDESK_API_TOKEN";
pub const ENDPOINT_ENV: &str = "MEMBERDESK_ENDPOINT";
pub const LOG_ENV: &str = "MEMBERDESK_LOG";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub api: Api,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            api: Api::default(),
            ui: Ui::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Api {
    pub endpoint: Option<String>,
    pub token: Option<String>,
    pub timeout: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ui {
    pub page_size: Option<u32>,
    pub debounce: Option<String>,
}

impl Default for Ui {
    fn default() -> Self {
        Self {
            page_size: Some(PageSize::Ten.get()),
            debounce: Some(DEFAULT_DEBOUNCE.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Log {
    pub level: Option<String>,
    pub path: Option<String>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set {CONFIG_PATH_ENV} to the config file")
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
                    "config file {} is not versioned. Add `version = 1` and put values under [api], [ui], and [log]",
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
        if let Some(endpoint) = &self.api.endpoint {
            validate_endpoint(endpoint)
                .with_context(|| format!("invalid api.endpoint in {}", path.display()))?;
        }

        if let Some(timeout) = &self.api.timeout {
            let parsed = parse_duration(timeout)?;
            if parsed <= Duration::ZERO {
                bail!(
                    "api.timeout in {} must be positive, got {}",
                    path.display(),
                    timeout
                );
            }
        }

        if let Some(size) = self.ui.page_size
            && PageSize::parse(size).is_none()
        {
            bail!(
                "ui.page_size in {} must be one of 10, 25 or 50, got {}",
                path.display(),
                size
            );
        }

        if let Some(debounce) = &self.ui.debounce {
            let parsed = parse_duration(debounce)?;
            if parsed < MIN_DEBOUNCE {
                bail!(
                    "ui.debounce in {} must be at least {}ms, got {}",
                    path.display(),
                    MIN_DEBOUNCE.as_millis(),
                    debounce
                );
            }
        }

        Ok(())
    }

    /// Endpoint from `MEMBERDESK_ENDPOINT`, then `[api].endpoint`.
    pub fn api_endpoint(&self) -> Result<String> {
        if let Some(endpoint) = env_value(ENDPOINT_ENV) {
            validate_endpoint(&endpoint).with_context(|| format!("invalid {ENDPOINT_ENV}"))?;
            return Ok(endpoint);
        }
        self.api
            .endpoint
            .as_deref()
            .map(|endpoint| endpoint.trim().to_owned())
            .filter(|endpoint| !endpoint.is_empty())
            .ok_or_else(|| {
                anyhow!("no GraphQL endpoint configured; set [api].endpoint or {ENDPOINT_ENV}")
            })
    }

    /// Bearer token from `MEMBERDESK_API_TOKEN`, then `[api].token`. Empty
    /// means requests go out without an Authorization header.
    pub fn api_token(&self) -> String {
        env_value(TOKEN_ENV)
            .or_else(|| self.api.token.clone())
            .unwrap_or_default()
    }

    pub fn api_timeout(&self) -> Result<Duration> {
        parse_duration(self.api.timeout.as_deref().unwrap_or(DEFAULT_TIMEOUT))
    }

    pub fn page_size(&self) -> PageSize {
        self.ui
            .page_size
            .and_then(PageSize::parse)
            .unwrap_or_default()
    }

    pub fn debounce(&self) -> Result<Duration> {
        parse_duration(self.ui.debounce.as_deref().unwrap_or(DEFAULT_DEBOUNCE))
    }

    /// Filter directive from `MEMBERDESK_LOG`, then `[log].level`.
    pub fn log_level(&self) -> String {
        env_value(LOG_ENV)
            .or_else(|| self.log.level.clone())
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_owned())
    }

    pub fn log_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.log.path {
            return Ok(PathBuf::from(path));
        }
        let root = dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .ok_or_else(|| anyhow!("cannot resolve a log directory; set [log].path"))?;
        Ok(root.join(APP_NAME).join(format!("{APP_NAME}.log")))
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# memberdesk config\n# Place this file at: {}\n\nversion = 1\n\n[api]\nendpoint = \"https://api.example.com/graphql\"\n# Prefer the {} environment variable over storing the token here.\n# token = \"\"\ntimeout = \"{}\"\n\n[ui]\n# One of 10, 25 or 50.\npage_size = {}\n# Quiet period before filter edits reload the table (minimum 300ms).\ndebounce = \"{}\"\n\n[log]\nlevel = \"{}\"\n# Optional. Default is the platform state dir (for example ~/.local/state/memberdesk/memberdesk.log)\n# path = \"/absolute/path/to/memberdesk.log\"\n",
            path.display(),
            TOKEN_ENV,
            DEFAULT_TIMEOUT,
            PageSize::Ten.get(),
            DEFAULT_DEBOUNCE,
            DEFAULT_LOG_LEVEL,
        )
    }
}

fn env_value(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn validate_endpoint(endpoint: &str) -> Result<()> {
    let trimmed = endpoint.trim();
    if trimmed.is_empty() {
        bail!("endpoint must not be empty");
    }
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        bail!("endpoint {trimmed:?} must start with http:// or https://");
    }
    Ok(())
}

fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_secs(mins * 60));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 500ms or 5s)")
}
