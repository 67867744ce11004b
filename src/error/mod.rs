//! Error handling module
//!
//! Defines the validation error contract and the input-loading errors,
//! each with an exit code for the binary.

pub mod types;

pub use types::*;
