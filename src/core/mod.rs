//! Core infrastructure: engine configuration and the fixed-rate task queue.

pub mod config;
pub mod tasks;

pub use config::{ConfigError, EngineConfig};
pub use tasks::{Task, TaskQueue};
