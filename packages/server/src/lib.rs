//! Hiroba chat server library.
//!
//! Room-based chat over WebSocket: users join named rooms, exchange text and
//! image messages and see membership changes live.

pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

// Re-export entry points
pub use config::ServerConfig;
pub use ui::run as run_server;
