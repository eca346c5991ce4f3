// ABOUTME: Library root for gantry - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod build;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod gate;
pub mod output;
pub mod release;
pub mod runtime;
pub mod types;
