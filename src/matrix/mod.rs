//! Matrix module: compressed sparse row storage shared by every hierarchy level.

pub mod sparse;
pub use sparse::{CsrMatrix, SparseMatrix};
