//! tenki-notify — daily forecast and clothing advice broadcaster.
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod data;
pub mod strategy;
pub mod llm;
pub mod platforms;
pub mod engine;
