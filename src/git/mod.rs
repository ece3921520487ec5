//! Git operations module
//!
//! Handles the partial clone and sparse checkout pipeline

pub mod patterns;
pub mod repository;
pub mod sparse_fetch;

pub use patterns::*;
pub use repository::*;
pub use sparse_fetch::*;
