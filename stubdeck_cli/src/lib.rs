//! Stubdeck CLI - Terminal dashboard for mock HTTP server instances
//!
//! The binary lives in `main.rs`; this library holds everything it drives so
//! the admin client and the dashboard can be exercised from integration tests.

pub mod admin;
pub mod commands;
pub mod config;
pub mod dashboard;
pub mod tui;
