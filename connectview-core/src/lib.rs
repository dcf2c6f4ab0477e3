pub mod bootstrap;
pub mod cache;
pub mod config;
pub mod error;
pub mod fanout;
pub mod logging;
pub mod models;
pub mod resilience;
pub mod sanitizer;

pub use config::Config;
pub use error::{Error, Result, TaskRestartFailure};
pub use sanitizer::ConfigSanitizer;
