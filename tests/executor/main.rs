//! Executor Layer Tests
//!
//! End-to-end tests through the public `arbordb` API:
//! - Arbor - server instance, configuration, shutdown
//! - Session - one client's commands against shared databases
//! - Executor - stateless dispatch over a caller-owned Context

mod common;

mod config;
mod error_handling;
mod executor_direct;
mod workflow;
