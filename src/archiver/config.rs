use crate::error::ArchiveError;
use anyhow::{Result, anyhow};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    Local,
    Drive,
}

impl StorageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Drive => "drive",
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageKind {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "local" | "fs" => Ok(Self::Local),
            "drive" | "gdrive" => Ok(Self::Drive),
            other => Err(anyhow!("unknown storage kind `{other}` (use `local` or `drive`)")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DriveConfig {
    pub root_folder_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveConfig {
    pub storage: StorageKind,
    pub timezone: String,
    pub include_non_member: bool,
    pub request_timeout_secs: u64,
    pub drive: DriveConfig,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            storage: StorageKind::Local,
            timezone: "UTC".to_string(),
            include_non_member: false,
            request_timeout_secs: 60,
            drive: DriveConfig::default(),
        }
    }
}

impl ArchiveConfig {
    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .trim()
            .parse::<Tz>()
            .map_err(|err| ArchiveError::InvalidConfig(format!("timezone: {err}")).into())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialArchiveConfig {
    storage: Option<StorageKind>,
    timezone: Option<String>,
    include_non_member: Option<bool>,
    request_timeout_secs: Option<u64>,
    drive: Option<DriveConfig>,
}

fn env_or_u64(var: &str, fallback: u64) -> u64 {
    match env::var(var) {
        Ok(v) => v.trim().parse::<u64>().ok().unwrap_or(fallback),
        Err(_) => fallback,
    }
}

fn env_or_bool(var: &str, fallback: bool) -> bool {
    match env::var(var) {
        Ok(v) => match v.trim() {
            "1" | "true" | "TRUE" | "yes" | "on" => true,
            "0" | "false" | "FALSE" | "no" | "off" => false,
            _ => fallback,
        },
        Err(_) => fallback,
    }
}

fn env_or_string(var: &str, fallback: &str) -> String {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => fallback.to_string(),
    }
}

fn validate(cfg: &ArchiveConfig) -> Result<()> {
    cfg.tz()?;
    if cfg.request_timeout_secs == 0 {
        return Err(ArchiveError::InvalidConfig(
            "request timeout must be >= 1 second".to_string(),
        )
        .into());
    }
    if cfg.storage == StorageKind::Drive && cfg.drive.root_folder_id.trim().is_empty() {
        return Err(ArchiveError::MissingDriveRoot.into());
    }
    Ok(())
}

pub fn resolve_config_path() -> Option<PathBuf> {
    if let Ok(custom) = env::var("SLACK_ARCHIVE_CONFIG_PATH") {
        let trimmed = custom.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }

    if let Ok(home) = env::var("SLACK_ARCHIVE_HOME") {
        let trimmed = home.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed).join("config.toml"));
        }
    }

    let home = dirs::home_dir()?;
    Some(home.join(".slack-archive").join("config.toml"))
}

fn merge_toml(base: &mut ArchiveConfig, raw: &str) -> Result<()> {
    let parsed: PartialArchiveConfig = toml::from_str(raw)?;
    if let Some(storage) = parsed.storage {
        base.storage = storage;
    }
    if let Some(timezone) = parsed.timezone {
        base.timezone = timezone;
    }
    if let Some(include_non_member) = parsed.include_non_member {
        base.include_non_member = include_non_member;
    }
    if let Some(secs) = parsed.request_timeout_secs {
        base.request_timeout_secs = secs;
    }
    if let Some(drive) = parsed.drive {
        base.drive = drive;
    }
    Ok(())
}

fn merge_file_config(base: &mut ArchiveConfig) -> Result<()> {
    let Some(path) = resolve_config_path() else {
        return Ok(());
    };
    if !path.exists() {
        return Ok(());
    }

    let raw = fs::read_to_string(&path)?;
    merge_toml(base, &raw)
        .map_err(|err| anyhow!("failed to parse archive config {}: {err}", path.display()))
}

fn apply_env_overrides(cfg: &mut ArchiveConfig) -> Result<()> {
    if let Ok(raw) = env::var("SLACK_ARCHIVE_STORAGE")
        && !raw.trim().is_empty()
    {
        cfg.storage = raw.parse()?;
    }
    cfg.timezone = env_or_string("SLACK_ARCHIVE_TIMEZONE", &cfg.timezone);
    cfg.include_non_member =
        env_or_bool("SLACK_ARCHIVE_INCLUDE_NON_MEMBER", cfg.include_non_member);
    cfg.request_timeout_secs = env_or_u64(
        "SLACK_ARCHIVE_REQUEST_TIMEOUT_SECS",
        cfg.request_timeout_secs,
    );
    cfg.drive.root_folder_id =
        env_or_string("SLACK_ARCHIVE_DRIVE_ROOT", &cfg.drive.root_folder_id);
    Ok(())
}

/// Defaults, then the TOML file, then environment, then the CLI override.
pub fn load_config(storage_override: Option<StorageKind>) -> Result<ArchiveConfig> {
    let mut cfg = ArchiveConfig::default();
    merge_file_config(&mut cfg)?;
    apply_env_overrides(&mut cfg)?;
    if let Some(storage) = storage_override {
        cfg.storage = storage;
    }

    validate(&cfg)?;
    Ok(cfg)
}
