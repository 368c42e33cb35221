//! Groth16 backend for snarkwrap.
//!
//! Proves verifier-circuit witnesses with [arkworks](https://arkworks.rs)
//! Groth16 over BN254 and encodes the result as ABI calldata for a Solidity
//! `verifyProof` entry point (256 bytes of EIP-197 words for A|B|C, then one
//! word per public signal).
//!
//! - [`keys`]: circuit-specific setup and key files.
//! - [`Groth16Prover`]: the proving stage, on a dedicated rayon pool.
//! - [`AbiCalldataExporter`]: the calldata stage.
//! - [`verifier`]: off-chain check of exported calldata.

pub mod calldata;
pub mod circuit;
pub mod keys;
pub mod prover;
pub mod serializer;
pub mod verifier;

pub use calldata::AbiCalldataExporter;
pub use keys::{setup, ProvingKey};
pub use prover::Groth16Prover;
pub use verifier::{verify_calldata, verify_proof};
