//! Shared test utilities for the modquery workspace.
//!
//! This crate provides graph fixtures so each crate's test suite can describe
//! a dependency graph in a few lines instead of hand-building `ModuleSpec`s.
//! It is a dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`fixture`]: [`GraphFixture`] builder and the canned scenarios
//! - [`files`]: snapshot documents written to temporary directories

pub mod files;
pub mod fixture;

pub use files::{BASIC_SNAPSHOT, SnapshotDir};
pub use fixture::{GraphFixture, ext, key};
