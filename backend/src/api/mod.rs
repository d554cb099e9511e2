//! HTTP API module.
//!
//! This module provides the HTTP server, response types and the operator log
//! stream for the dashboard front end.

pub mod server;
pub mod types;
pub mod logs;

pub use server::{start_server, AppState};
pub use types::*;
pub use logs::*;
