pub mod api;
pub mod client;
pub mod types;

pub use api::{Page, SlackApi};
pub use client::SlackClient;
