//! # Configuration Module
//!
//! Centralizes the numeric configuration of the crate. Bounds that the block
//! store validates at construction live next to the defaults the builders
//! fall back to, so a change to one is checked against the other by the
//! compile-time assertions in [`constants`].
//!
//! ## Module Organization
//!
//! - [`constants`]: block geometry, cache sizes and descriptor limits

pub mod constants;
pub use constants::*;
