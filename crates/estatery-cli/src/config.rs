// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use estatery_app::{DEFAULT_PAGE_SIZE, SelectScope};
use serde::Deserialize;
use std::env;
use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

const CONFIG_VERSION: i64 = 1;
pub const CONFIG_PATH_ENV: &str = "ESTATERY_CONFIG_PATH";
const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub storage: Storage,
    #[serde(default)]
    pub table: Table,
    #[serde(default)]
    pub export: Export,
    #[serde(default)]
    pub logging: Logging,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            storage: Storage::default(),
            table: Table::default(),
            export: Export::default(),
            logging: Logging::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Storage {
    pub db_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Table {
    pub page_size: Option<i64>,
    pub select_all_scope: Option<SelectScope>,
}

impl Default for Table {
    fn default() -> Self {
        Self {
            page_size: Some(DEFAULT_PAGE_SIZE.get() as i64),
            select_all_scope: Some(SelectScope::Page),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Export {
    pub directory: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Logging {
    pub level: Option<String>,
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            level: Some(DEFAULT_LOG_LEVEL.to_owned()),
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set {CONFIG_PATH_ENV} to the config file")
        })?;

        let app_dir = config_root.join(estatery_db::APP_NAME);
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
                    "config file {} is not versioned. Add `version = 1` and keep values under [storage], [table], [export], and [logging]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1. Run `estatery print-example-config` for a fresh template",
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
            estatery_db::validate_db_path(db_path)?;
        }

        if let Some(page_size) = self.table.page_size
            && page_size <= 0
        {
            bail!(
                "table.page_size in {} must be positive, got {}",
                path.display(),
                page_size
            );
        }

        if let Some(directory) = &self.export.directory
            && directory.trim().is_empty()
        {
            bail!(
                "export.directory in {} must not be empty; remove it to export into the working directory",
                path.display()
            );
        }

        Ok(())
    }

    pub fn db_path(&self) -> Result<PathBuf> {
        match &self.storage.db_path {
            Some(path) => Ok(PathBuf::from(path)),
            None => estatery_db::default_db_path(),
        }
    }

    pub fn page_size(&self) -> NonZeroUsize {
        self.table
            .page_size
            .and_then(|size| usize::try_from(size).ok())
            .and_then(NonZeroUsize::new)
            .unwrap_or(DEFAULT_PAGE_SIZE)
    }

    pub fn select_all_scope(&self) -> SelectScope {
        self.table.select_all_scope.unwrap_or_default()
    }

    pub fn export_dir(&self) -> PathBuf {
        self.export
            .directory
            .as_deref()
            .map_or_else(|| PathBuf::from("."), PathBuf::from)
    }

    pub fn log_level(&self) -> &str {
        self.logging.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# estatery config\n# Place this file at: {}\n\nversion = 1\n\n[storage]\n# Optional. Default is platform data dir (for example ~/.local/share/estatery/estatery.db)\n# db_path = \"/absolute/path/to/estatery.db\"\n\n[table]\npage_size = {}\n# page | filtered\nselect_all_scope = \"page\"\n\n[export]\n# directory = \"/absolute/path/to/exports\"\n\n[logging]\n# Overridden by ESTATERY_LOG\nlevel = \"{}\"\n",
            path.display(),
            DEFAULT_PAGE_SIZE,
            DEFAULT_LOG_LEVEL,
        )
    }
}
