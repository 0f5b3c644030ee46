//! Falling blocks (workspace facade crate).
//!
//! Re-exports the workspace crates as `falling_blocks::{core,runtime,types}`
//! while the implementation lives in dedicated crates under `crates/`.

pub use falling_blocks_core as core;
pub use falling_blocks_runtime as runtime;
pub use falling_blocks_types as types;
