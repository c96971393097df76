use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("SLACK_TOKEN is not set")]
    MissingToken,
    #[error("drive storage requires SLACK_ARCHIVE_DRIVE_ROOT (root folder id)")]
    MissingDriveRoot,
    #[error("drive storage requires SLACK_ARCHIVE_DRIVE_TOKEN (oauth access token)")]
    MissingDriveToken,
    #[error("drive root folder is named `{actual}` but the workspace domain is `{expected}`")]
    RootFolderMismatch { expected: String, actual: String },
    #[error("{count} archive units named `{name}` exist for channel {channel}")]
    AmbiguousUnit {
        channel: String,
        name: String,
        count: usize,
    },
    #[error("{count} folders named `{name}` exist under drive folder {parent}")]
    AmbiguousFolder {
        parent: String,
        name: String,
        count: usize,
    },
    #[error("slack api {method} failed: {error}")]
    SlackApi { method: String, error: String },
    #[error("drive api {action} failed: {error}")]
    DriveApi { action: String, error: String },
    #[error("invalid message timestamp: {0}")]
    InvalidTimestamp(String),
    #[error("config invalid: {0}")]
    InvalidConfig(String),
    #[error("another archive run holds the lock at {0}")]
    Locked(String),
}
