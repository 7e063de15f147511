// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use planboard_app::SessionSettings;
use planboard_app::focus::DEFAULT_FOCUS_ATTEMPTS;
use planboard_app::history::DEFAULT_HISTORY_LIMIT;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_VERSION: i64 = 1;
const DEFAULT_LOG_LEVEL: &str = "warn";
const MAX_FOCUS_RETRY_ATTEMPTS: u32 = 100;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub storage: Storage,
    #[serde(default)]
    pub editor: Editor,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            storage: Storage::default(),
            editor: Editor::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
    pub db_path: Option<String>,
    pub scope_key: Option<String>,
    pub max_payload_size: Option<i64>,
}

impl Default for Storage {
    fn default() -> Self {
        Self {
            db_path: None,
            scope_key: Some(planboard_db::DEFAULT_SCOPE_KEY.to_owned()),
            max_payload_size: Some(planboard_db::MAX_PAYLOAD_SIZE as i64),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Editor {
    pub history_limit: Option<i64>,
    pub focus_retry_attempts: Option<i64>,
}

impl Default for Editor {
    fn default() -> Self {
        Self {
            history_limit: Some(DEFAULT_HISTORY_LIMIT as i64),
            focus_retry_attempts: Some(i64::from(DEFAULT_FOCUS_ATTEMPTS)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Log {
    pub level: Option<String>,
}

impl Default for Log {
    fn default() -> Self {
        Self {
            level: Some(DEFAULT_LOG_LEVEL.to_owned()),
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("PLANBOARD_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set PLANBOARD_CONFIG_PATH to the config file")
        })?;

        let app_dir = config_root.join(planboard_db::APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
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
                    "config file {} is not versioned. Add `version = 1` and put values under [storage], [editor], and [log]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1. Run `planboard --print-example-config` for the current schema",
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
        if let Some(db_path) = &self.storage.db_path {
            planboard_db::validate_db_path(db_path)?;
        }

        if let Some(scope_key) = &self.storage.scope_key
            && scope_key.trim().is_empty()
        {
            bail!(
                "storage.scope_key in {} must not be empty; remove it to use {:?}",
                path.display(),
                planboard_db::DEFAULT_SCOPE_KEY
            );
        }

        if let Some(max_size) = self.storage.max_payload_size
            && max_size <= 0
        {
            bail!(
                "storage.max_payload_size in {} must be positive, got {}",
                path.display(),
                max_size
            );
        }

        if let Some(limit) = self.editor.history_limit
            && limit <= 0
        {
            bail!(
                "editor.history_limit in {} must be positive, got {}",
                path.display(),
                limit
            );
        }

        if let Some(attempts) = self.editor.focus_retry_attempts
            && !(1..=i64::from(MAX_FOCUS_RETRY_ATTEMPTS)).contains(&attempts)
        {
            bail!(
                "editor.focus_retry_attempts in {} must be between 1 and {}, got {}",
                path.display(),
                MAX_FOCUS_RETRY_ATTEMPTS,
                attempts
            );
        }

        if let Some(level) = &self.log.level
            && level.trim().is_empty()
        {
            bail!(
                "log.level in {} must not be empty; use a filter such as \"warn\" or \"planboard_db=debug\"",
                path.display()
            );
        }

        Ok(())
    }

    pub fn db_path(&self) -> Result<PathBuf> {
        match &self.storage.db_path {
            Some(path) => Ok(PathBuf::from(path)),
            None => planboard_db::default_db_path(),
        }
    }

    pub fn scope_key(&self) -> &str {
        self.storage
            .scope_key
            .as_deref()
            .unwrap_or(planboard_db::DEFAULT_SCOPE_KEY)
    }

    pub fn max_payload_size(&self) -> usize {
        self.storage
            .max_payload_size
            .and_then(|value| usize::try_from(value).ok())
            .unwrap_or(planboard_db::MAX_PAYLOAD_SIZE)
    }

    pub fn history_limit(&self) -> usize {
        self.editor
            .history_limit
            .and_then(|value| usize::try_from(value).ok())
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
    }

    pub fn focus_retry_attempts(&self) -> u32 {
        self.editor
            .focus_retry_attempts
            .and_then(|value| u32::try_from(value).ok())
            .unwrap_or(DEFAULT_FOCUS_ATTEMPTS)
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            history_limit: self.history_limit(),
            focus_retry_attempts: self.focus_retry_attempts(),
        }
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# planboard config\n# Place this file at: {}\n\nversion = 1\n\n[storage]\n# Optional. Default is platform data dir (for example ~/.local/share/planboard/planboard.db)\n# db_path = \"/absolute/path/to/planboard.db\"\nscope_key = \"{}\"\nmax_payload_size = {}\n\n[editor]\nhistory_limit = {}\nfocus_retry_attempts = {}\n\n[log]\n# Any tracing filter; PLANBOARD_LOG overrides it.\nlevel = \"{}\"\n",
            path.display(),
            planboard_db::DEFAULT_SCOPE_KEY,
            planboard_db::MAX_PAYLOAD_SIZE,
            DEFAULT_HISTORY_LIMIT,
            DEFAULT_FOCUS_ATTEMPTS,
            DEFAULT_LOG_LEVEL,
        )
    }
}
