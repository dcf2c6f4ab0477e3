//! Process startup helpers

pub mod config;

pub use config::load_config;
