//! Outpost web library.
//!
//! The server is built as a library so handlers and middleware can be
//! exercised in tests; `main.rs` only wires configuration, tracing and the
//! listener.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
