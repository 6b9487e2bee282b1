//! Shared utility helpers.

pub mod error;
pub mod math;

pub use error::{GridNmsError, GridNmsResult};
