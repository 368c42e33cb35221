//! Off-chain Groth16 verification of exported calldata and proof files.
//!
//! Mirrors what the on-chain verifier accepts: malformed encodings are a
//! rejection, not an error. Errors are reserved for inputs that cannot be
//! matched to the verifying key at all.

use ark_bn254::Bn254;
use ark_groth16::{prepare_verifying_key, Groth16, Proof, VerifyingKey};
use ark_snark::SNARK;

use snarkwrap_core::error::{FinalizeError, Result};
use snarkwrap_core::proof::SnarkProof;

use crate::calldata::{selector, split_calldata};
use crate::serializer::{g1_from_bytes, g2_from_bytes, scalars_from_bytes};

fn check_input_count(vk: &VerifyingKey<Bn254>, num_signals: usize) -> Result<()> {
    let expected = vk.gamma_abc_g1.len().saturating_sub(1);
    if expected != num_signals {
        return Err(FinalizeError::SignalCountMismatch {
            expected,
            found: num_signals,
        });
    }
    Ok(())
}

/// Verify `proof` and its public signals against `vk`.
pub fn verify_proof(vk: &VerifyingKey<Bn254>, proof: &SnarkProof) -> Result<bool> {
    check_input_count(vk, proof.public_signals.len())?;
    let pvk = prepare_verifying_key(vk);
    let proof_points = Proof {
        a: proof.a,
        b: proof.b,
        c: proof.c,
    };
    Groth16::<Bn254>::verify_with_processed_vk(&pvk, &proof.public_signals, &proof_points)
        .map_err(|e| FinalizeError::ProverInternalError(format!("pairing check failed: {e}")))
}

/// Verify ABI calldata (with or without selector) carrying `num_signals` inputs.
///
/// Returns `Ok(false)` for a wrong selector, non-canonical words, off-curve
/// or wrong-subgroup points, and failed pairing checks.
pub fn verify_calldata(vk: &VerifyingKey<Bn254>, calldata: &[u8], num_signals: usize) -> Result<bool> {
    let parts = split_calldata(calldata, num_signals)?;
    check_input_count(vk, num_signals)?;

    if let Some(sel) = parts.selector {
        if sel != selector(num_signals) {
            tracing::debug!("rejecting calldata: selector 0x{} does not match", hex::encode(sel));
            return Ok(false);
        }
    }

    let decoded = g1_from_bytes(&parts.proof[..64]).and_then(|a| {
        let b = g2_from_bytes(&parts.proof[64..192])?;
        let c = g1_from_bytes(&parts.proof[192..])?;
        let public_signals = scalars_from_bytes(parts.signals)?;
        Ok(SnarkProof {
            a,
            b,
            c,
            public_signals,
        })
    });
    match decoded {
        Ok(proof) => verify_proof(vk, &proof),
        Err(reason) => {
            tracing::debug!("rejecting calldata: {reason}");
            Ok(false)
        }
    }
}
