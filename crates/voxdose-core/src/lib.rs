//! # VoxDose Core Library
//!
//! A voxelized-phantom material model and dose-scoring pipeline for Monte-Carlo
//! radiotherapy simulation, designed to sit underneath an external particle
//! transport engine.
//!
//! ## Architectural Philosophy
//!
//! The library is designed with a strict three-layer architecture to ensure a clear
//! separation of concerns, making it modular, testable, and extensible.
//!
//! - **[`core`]: The Foundation.** Contains stateless data models (`PhantomGrid`,
//!   `VoxelSpec`, `BeamletKey`), the unique-material palette construction, and I/O
//!   utilities for the phantom, fluence-map, and checkpoint file formats.
//!
//! - **[`engine`]: The Logic Core.** This stateful layer owns the simulation-facing
//!   machinery: the nested material provider queried by the transport engine during
//!   geometry traversal, the per-stream `RunAccumulator` that tallies event hit
//!   collections, the beamlet classifier, and the cumulative checkpoint writer.
//!
//! - **[`workflows`]: The Public API.** The highest-level, user-facing layer. It ties
//!   `engine` and `core` together to execute a complete scoring run: phantom load,
//!   material compaction, worker fan-out over an external [`workflows::simulate::TransportEngine`],
//!   merge, and checkpoint persistence.

pub mod core;
pub mod engine;
pub mod workflows;
