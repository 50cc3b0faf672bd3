//! Library exports for the event and venue service, so the binary and the
//! integration tests share one set of modules.

pub mod app;
pub mod backend;
pub mod common;
pub mod config;
pub mod features;

#[cfg(test)]
mod testing;

pub use app::AppState;
pub use config::Settings;
