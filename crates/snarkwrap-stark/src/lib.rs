//! STARK verification and verifier-circuit witness generation.
//!
//! [`StarkWitnessGenerator`] is the first pipeline stage: it fully verifies a
//! do-work STARK proof, then derives the witness of the R1CS verifier circuit
//! that the Groth16 stage proves. Commitments and transcript use Poseidon, so
//! the circuit re-checks the complete verification, hashing included.
//! [`circuit_for`] returns that circuit for a set of parameters, which is all
//! key setup needs.
//!
//! The `prover` feature enables a fixture prover for tests and local tooling.

pub mod air;
pub mod circuit;
pub mod merkle;
pub mod poseidon;
pub mod proof;
#[cfg(any(test, feature = "prover"))]
pub mod prover;
pub mod transcript;
pub mod verifier;

use snarkwrap_core::artifacts::Witness;
use snarkwrap_core::error::{FinalizeError, Result};
use snarkwrap_core::r1cs::R1cs;
use snarkwrap_core::stage::WitnessGenerator;

pub use proof::{PublicInput, StarkArtifact, StarkParams, StarkProof};

/// Constraint system of the verifier circuit for proofs with `params`.
pub fn circuit_for(params: StarkParams) -> Result<R1cs> {
    params.validate()?;
    let (r1cs, _) = circuit::synthesize(&circuit::blank(params))?;
    Ok(r1cs)
}

/// Witness generation for do-work STARK proofs.
#[derive(Debug, Clone, Default)]
pub struct StarkWitnessGenerator {
    public_input: Option<PublicInput>,
}

impl StarkWitnessGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check proofs against `public_input` instead of the one embedded in
    /// the artifact.
    pub fn with_public_input(public_input: PublicInput) -> Self {
        Self {
            public_input: Some(public_input),
        }
    }
}

impl WitnessGenerator for StarkWitnessGenerator {
    fn name(&self) -> &'static str {
        "stark"
    }

    fn generate_witness(&self, artifact: &[u8]) -> Result<Witness> {
        let mut artifact = StarkArtifact::from_json(artifact)?;
        if let Some(public_input) = self.public_input {
            artifact.public_input = public_input;
        }

        let verified = verifier::verify(&artifact)?;
        tracing::info!(
            "STARK proof verified: {} rows, blowup {}, {} queries",
            verified.params.trace_length,
            verified.params.blowup,
            verified.params.num_queries
        );

        let (r1cs, values) = circuit::synthesize(&artifact)?;
        r1cs.check_assignment(&values)
            .map_err(|constraint| FinalizeError::CircuitUnsatisfied { constraint })?;

        let digest = r1cs.digest();
        tracing::debug!("witness for circuit {}", hex::encode(digest));
        Witness::new(digest, r1cs.num_public, values)
    }
}
