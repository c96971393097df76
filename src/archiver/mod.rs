pub mod audit;
pub mod channels;
pub mod config;
pub mod drive_store;
pub mod local_store;
pub mod lock;
pub mod model;
pub mod month;
pub mod paths;
pub mod render;
pub mod run;
pub mod store;
pub mod text;
pub mod thread;
pub mod users;
pub mod walker;
pub mod warn;

#[cfg(test)]
pub mod testing;
