//! Push notification registration for the Upkeep client
//!
//! Obtains user consent, acquires a provider-issued device token, persists
//! it locally and registers it with the backend. Push notifications are an
//! enhancement, not a required capability: every step in this crate is
//! best-effort and no failure here is ever surfaced to the end user.

pub mod config;
pub mod coordinator;
pub mod foreground;
pub mod provider;
pub mod registration;
