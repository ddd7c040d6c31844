//! # Workflows Module
//!
//! High-level entry points tying the core and engine layers together.
//!
//! ## Overview
//!
//! A workflow executes one complete scoring run: phantom load, material
//! compaction, worker fan-out over the external transport engine, merge of
//! the per-stream accumulators, and cumulative checkpoint persistence. The
//! transport engine itself is a collaborator supplied by the caller through
//! the [`simulate::TransportEngine`] trait.

pub mod simulate;
