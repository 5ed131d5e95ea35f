//! Timeline module: normalization, merging and fetch-cycle orchestration

pub mod core;
pub mod merger;
pub mod normalizer;
pub mod view_model;

pub use core::*;
pub use merger::*;
pub use normalizer::*;
pub use view_model::*;
