//! The three pipeline stages.
//!
//! Each stage is a pure function from one artifact to the next. Stages hold
//! only immutable configuration (a shared proving key, an expected signal
//! count) and keep no state between calls.

use rand::{CryptoRng, RngCore};

use crate::artifacts::{Calldata, Witness};
use crate::cancel::CancellationToken;
use crate::config::CalldataFormat;
use crate::error::Result;
use crate::proof::SnarkProof;

/// Verifies a STARK proof artifact and derives the verifier-circuit witness.
pub trait WitnessGenerator: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Verify `artifact` (serialized proof plus public input) and derive the witness.
    ///
    /// Fails with `MalformedProof` or `PublicInputMismatch`.
    fn generate_witness(&self, artifact: &[u8]) -> Result<Witness>;
}

/// Produces a Groth16 proof from a witness.
pub trait SnarkProver: Send + Sync {
    fn name(&self) -> &'static str;

    /// Prove `witness`, drawing blinding randomness from `rng`.
    ///
    /// Fails with `ProvingKeyMismatch`, `ProverInternalError`,
    /// `InsufficientStack`, `CircuitUnsatisfied`, or `Cancelled`.
    fn prove<R: RngCore + CryptoRng + Send>(
        &self,
        witness: &Witness,
        rng: &mut R,
        cancel: &CancellationToken,
    ) -> Result<SnarkProof>;
}

/// Encodes a proof as verifier calldata.
pub trait CalldataExporter: Send + Sync {
    fn name(&self) -> &'static str;

    /// Deterministic: equal proofs give byte-identical calldata.
    ///
    /// Fails only with `SignalCountMismatch`.
    fn export(&self, proof: &SnarkProof) -> Result<Calldata>;

    /// Render exported calldata in an output format.
    fn render(&self, calldata: &Calldata, format: CalldataFormat) -> Result<Vec<u8>>;
}
