//! Shared test utilities for the map viewer workspace.
//!
//! This crate provides:
//! - Capabilities XML fixtures
//! - A generator for synthetic capabilities documents
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{fixtures, capabilities_document, LayerSpec};
//! ```

pub mod fixtures;
pub mod generators;

pub use generators::*;
