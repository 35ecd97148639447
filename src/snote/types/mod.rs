//! Foundational data structures, error types and decoding configuration.

pub mod error;
pub mod models;
pub mod palette;
