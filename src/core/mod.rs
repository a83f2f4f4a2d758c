//! Core traits and their implementations for the crate's matrix and vector types.

pub mod traits;
pub mod wrappers;

pub use traits::{InnerProduct, MatVec};
