//! Shared configuration and base types for the turnstile harness crates.

pub mod config;
pub mod types;
