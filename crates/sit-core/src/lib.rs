//! Core types and trait definitions for the situation model.
//!
//! This crate holds the schema registry, the domain types of the Situation
//! and Situation Report models, and the storage and tracker abstractions.
//! It is free of HTTP and database dependencies.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod crud;
pub mod error;
pub mod fields;
pub mod location;
pub mod meta;
pub mod model;
pub mod reference;
pub mod schema;
pub mod situation;
pub mod sitrep;
pub mod store;
pub mod tracker;

pub use error::{Classify, Error, ErrorClass, Result};
