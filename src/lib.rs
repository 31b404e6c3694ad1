//! kbase: a small knowledge base of articles served as HTML pages.
//!
//! The binary in `main.rs` wires these modules together; tests drive
//! `handler::handle_request` directly.

pub mod config;
pub mod handler;
pub mod http;
pub mod logger;
pub mod middleware;
pub mod routing;
pub mod server;
pub mod store;
pub mod views;
