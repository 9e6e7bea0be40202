pub mod chain;
pub mod config;
pub mod error;
pub mod funding;
pub mod notify;
pub mod pipeline;
pub mod watcher;
