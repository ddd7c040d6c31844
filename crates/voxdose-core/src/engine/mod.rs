//! # Engine Module
//!
//! The stateful, simulation-facing layer of the library.
//!
//! ## Overview
//!
//! The engine owns everything the external transport engine and the run
//! orchestration touch while a simulation is in flight: the nested material
//! provider answering geometry-traversal queries, the per-stream accumulator
//! tallying event hit collections, the beamlet classifier, and the cumulative
//! checkpoint writer that persists merged results.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Run parameters, builder, and TOML file form
//! - **Run Bookkeeping** ([`context`]) - Cross-run event/run counters
//! - **Material Provider** ([`geometry`]) - Voxel coordinate → material + transform
//! - **Beamlet Classification** ([`classifier`]) - Event vertex → fluence-map cell
//! - **Accumulation** ([`accumulator`]) - Per-stream scorer tallies and merging
//! - **Checkpoint Output** ([`output`]) - Densification and cumulative persistence
//! - **Progress Monitoring** ([`progress`]) - Phase and stream progress callbacks
//! - **Error Handling** ([`error`]) - Engine-level error aggregation

pub mod accumulator;
pub mod classifier;
pub mod config;
pub mod context;
pub mod error;
pub mod geometry;
pub mod output;
pub mod progress;
