//! Common library for the Upkeep client core
//!
//! This crate provides shared functionality used across the client
//! subsystems, including the dual-scope key-value storage and error
//! handling.

pub mod error;
pub mod storage;
