//! # nesram
//!
//! Application layer over `nesram-core`: the HTTP API, the CLI, and
//! configuration loading. Exposed as a library so integration tests can
//! build the router directly.

pub mod api;
pub mod cli;
pub mod config;
