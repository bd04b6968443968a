//! Umbrella crate for the in-game-time extraction workspace.
//!
//! Re-exports the pixel primitives, morphology, digit normalization and the
//! frame scanner so applications can depend on a single crate.

pub use igt_core::*;
pub use igt_digit::*;
pub use igt_morph::*;
pub use igt_scan::*;
