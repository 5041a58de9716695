//! HTTP adapter for the Stagebook booking directory.
//!
//! Handlers translate requests into core query/mutation calls and render
//! JSON; they hold no business rules of their own.

pub mod config;
pub mod error;
pub mod handlers;
pub mod state;

pub use config::{ConfigError, ServerConfig};
pub use error::ApiError;
pub use state::AppState;
