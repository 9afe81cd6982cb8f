//! Public facade crate for `quotescout`.
//!
//! This crate intentionally contains no IO or backend-specific logic.
//! It re-exports the backend-agnostic types/traits from `quotescout-core`.

pub use quotescout_core::*;
