//! Integration test utilities for the poll bot
//!
//! This crate provides an in-memory room client and a bot harness for
//! running end-to-end scenarios against the real services and store.

pub mod helpers;

pub use helpers::*;
pub use fixtures::*;
