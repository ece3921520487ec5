//! Operations module
//!
//! Coordinates fetch runs across one or more repositories

pub mod fetch;

pub use fetch::*;
