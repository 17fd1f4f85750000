//! Document storage module
//!
//! Provides JSON-file document collections with an ordered in-memory cache.

pub mod json_store;

pub use json_store::{Document, JsonCollection};
