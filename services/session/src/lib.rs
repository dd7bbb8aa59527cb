//! Session and tenant context for the Upkeep client
//!
//! This crate owns the client-held session (created at login, cleared at
//! logout), the tenant context resolver that decides which organization every
//! outgoing API request is scoped to, and the HTTP client that stamps
//! credentials and the tenant header onto each request.

pub mod api;
pub mod config;
pub mod error;
pub mod flow;
pub mod models;
pub mod session;
pub mod tenant;
