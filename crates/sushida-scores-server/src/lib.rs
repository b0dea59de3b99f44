//! HTTP API for the sushida score repository.
//!
//! The binary wires configuration, logging and middleware around
//! [`server::router`]; integration tests drive the same router directly.

pub mod server;
