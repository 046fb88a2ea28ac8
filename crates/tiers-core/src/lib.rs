//! Core types and trait definitions for the Tiers hierarchy store.
//!
//! Values sit at the top, Goals in the middle, Metrics at the bottom. The
//! tiers are linked by two many-to-many relations (Goal↔Value, Metric↔Goal).
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod entity;
pub mod error;
pub mod kind;
pub mod store;

pub use error::{Error, Result};
