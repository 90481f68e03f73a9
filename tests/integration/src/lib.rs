//! Integration test utilities for the sync core
//!
//! This crate provides an in-memory remote with fault injection and
//! helpers for wiring complete sync contexts in end-to-end scenarios.

pub mod fixtures;

pub use fixtures::*;
pub use helpers::*;
