use anyhow::Result;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ArchivePaths {
    pub home: PathBuf,
    pub archive_dir: PathBuf,
    pub logs_dir: PathBuf,
}

impl ArchivePaths {
    pub fn audit_log(&self) -> PathBuf {
        self.logs_dir.join("audit.log")
    }

    pub fn lock_file(&self) -> PathBuf {
        self.logs_dir.join("archive.lock")
    }
}

fn required_home_dir() -> Result<PathBuf> {
    if let Some(home) = dirs::home_dir() {
        return Ok(home);
    }
    Err(anyhow::anyhow!("HOME directory could not be resolved"))
}

fn env_or_default_path(var: &str, fallback: PathBuf) -> PathBuf {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => PathBuf::from(v.trim()),
        _ => fallback,
    }
}

/// Archive output defaults to `./archive` relative to the working directory;
/// logs and the run lock live under `~/.slack-archive`.
pub fn resolve_paths() -> Result<ArchivePaths> {
    let home = match env::var("SLACK_ARCHIVE_HOME") {
        Ok(v) if !v.trim().is_empty() => PathBuf::from(v.trim()),
        _ => required_home_dir()?.join(".slack-archive"),
    };

    let archive_dir = env_or_default_path("SLACK_ARCHIVE_DIR", PathBuf::from("archive"));
    let logs_dir = env_or_default_path("SLACK_ARCHIVE_LOGS_DIR", home.join("logs"));

    Ok(ArchivePaths {
        home,
        archive_dir,
        logs_dir,
    })
}
