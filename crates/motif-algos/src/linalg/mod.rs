//! Linear algebra utilities
//!
//! - [`svd3`]: analytical 3×3 SVD decomposition (Jacobi eigenvalue method)

pub mod svd3;

pub use svd3::{svd3, Svd3};
