//! The phantom material model.
//!
//! Per-voxel densities from the phantom file are compacted into a minimal
//! palette of unique materials ([`compactor`]), each constructed from a fixed
//! table of base materials ([`base`]) rescaled to the exact requested density.

pub mod base;
pub mod compactor;

pub use base::{BaseMaterial, Material, MaterialError};
pub use compactor::MaterialPalette;
