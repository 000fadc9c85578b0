use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context, Result};
use client_core::DirectorySettings;
use serde::Deserialize;
use url::Url;

pub const CONFIG_FILE: &str = "skillswap.toml";
pub const DEFAULT_API_URL: &str = "http://localhost:5000/api/";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_url: String,
    pub page_size: u32,
    pub search_debounce_ms: u64,
    pub request_timeout_secs: u64,
    pub token_path: PathBuf,
    pub log: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            page_size: 6,
            search_debounce_ms: 500,
            request_timeout_secs: 30,
            token_path: default_token_path(),
            log: "info".into(),
        }
    }
}

impl Settings {
    pub fn base_url(&self) -> Result<Url> {
        parse_api_url(&self.api_url)
    }

    pub fn directory(&self) -> DirectorySettings {
        DirectorySettings {
            page_size: self.page_size,
            debounce: Duration::from_millis(self.search_debounce_ms),
            ..DirectorySettings::default()
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    api_url: Option<String>,
    page_size: Option<u32>,
    search_debounce_ms: Option<u64>,
    request_timeout_secs: Option<u64>,
    token_path: Option<PathBuf>,
    log: Option<String>,
}

fn default_token_path() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".skillswap")
        .join("token")
}

/// Defaults, then `skillswap.toml` (or `config_path`), then environment.
pub fn load_settings(config_path: Option<&Path>) -> Result<Settings> {
    let mut settings = Settings::default();

    let path = config_path.unwrap_or_else(|| Path::new(CONFIG_FILE));
    match fs::read_to_string(path) {
        Ok(raw) => apply_file(&mut settings, &raw)
            .with_context(|| format!("invalid config file '{}'", path.display()))?,
        Err(err) if config_path.is_some() => {
            return Err(err)
                .with_context(|| format!("failed to read config file '{}'", path.display()));
        }
        Err(_) => {}
    }

    apply_env(&mut settings, |key| std::env::var(key).ok())?;
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> Result<()> {
    let file_cfg: FileConfig = toml::from_str(raw)?;
    if let Some(v) = file_cfg.api_url {
        settings.api_url = parse_api_url(&v)?.into();
    }
    if let Some(v) = file_cfg.page_size {
        settings.page_size = v;
    }
    if let Some(v) = file_cfg.search_debounce_ms {
        settings.search_debounce_ms = v;
    }
    if let Some(v) = file_cfg.request_timeout_secs {
        settings.request_timeout_secs = v;
    }
    if let Some(v) = file_cfg.token_path {
        settings.token_path = v;
    }
    if let Some(v) = file_cfg.log {
        settings.log = v;
    }
    validate(settings)
}

fn apply_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) -> Result<()> {
    if let Some(v) = var("SKILLSWAP_API_URL") {
        settings.api_url = parse_api_url(&v)?.into();
    }
    if let Some(v) = var("APP__API_URL") {
        settings.api_url = parse_api_url(&v)?.into();
    }

    if let Some(v) = var("APP__PAGE_SIZE") {
        if let Ok(parsed) = v.trim().parse::<u32>() {
            settings.page_size = parsed;
        }
    }
    if let Some(v) = var("APP__SEARCH_DEBOUNCE_MS") {
        if let Ok(parsed) = v.trim().parse::<u64>() {
            settings.search_debounce_ms = parsed;
        }
    }
    if let Some(v) = var("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.trim().parse::<u64>() {
            settings.request_timeout_secs = parsed;
        }
    }

    if let Some(v) = var("APP__TOKEN_PATH") {
        if !v.trim().is_empty() {
            settings.token_path = PathBuf::from(v.trim());
        }
    }
    if let Some(v) = var("APP__LOG") {
        settings.log = v;
    }

    validate(settings)
}

fn validate(settings: &Settings) -> Result<()> {
    if settings.page_size == 0 {
        bail!("page_size must be at least 1");
    }
    if settings.request_timeout_secs == 0 {
        bail!("request_timeout_secs must be at least 1");
    }
    Ok(())
}

/// Accepts the base with or without a trailing slash; only http(s) is allowed.
pub fn parse_api_url(raw: &str) -> Result<Url> {
    let raw = raw.trim();
    let url = Url::parse(raw).with_context(|| format!("invalid api url '{raw}'"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("api url '{raw}' must use http or https");
    }
    if url.cannot_be_a_base() {
        bail!("api url '{raw}' cannot be used as a base");
    }
    Ok(url)
}
