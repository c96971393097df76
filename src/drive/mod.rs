pub mod api;
pub mod client;

pub use api::{DriveApi, DriveFile};
pub use client::DriveClient;
