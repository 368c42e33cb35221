//! Core library for the snarkwrap proof-finalization pipeline.
//!
//! Defines the three stage traits in [`stage`] that turn a STARK proof into
//! on-chain calldata, along with shared infrastructure: the error taxonomy,
//! configuration loading, field encodings, rank-1 constraint systems,
//! artifact files, cancellation, and the [`pipeline::Pipeline`] orchestrator.
//!
//! Stage implementations live in their own crates:
//! - `snarkwrap-stark`: STARK verification and verifier-circuit witness generation
//! - `snarkwrap-groth16`: Groth16 proving, calldata export, reference verification

pub mod artifacts;
pub mod cancel;
pub mod config;
pub mod error;
pub mod field;
pub mod pipeline;
pub mod proof;
pub mod r1cs;
pub mod stage;
