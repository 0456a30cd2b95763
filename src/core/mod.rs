//! Core types shared by every part of the crate.
//!
//! Currently this is the error taxonomy ([`SolutionError`]) and its
//! presentation wrapper ([`ErrorContext`]). Library operations return
//! [`Result`], which is `std::result::Result<T, SolutionError>`.

pub mod error;

pub use error::{ErrorContext, SolutionError, user_friendly_error};

/// Result alias used by every fallible operation in the crate.
pub type Result<T, E = SolutionError> = std::result::Result<T, E>;
