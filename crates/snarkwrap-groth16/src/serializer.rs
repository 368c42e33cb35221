//! EIP-197 word encoding of BN254 points and scalars.
//!
//! Every value is a 32-byte big-endian word. The point at infinity encodes as
//! all-zero words, as the `ecPairing` precompile expects.

use ark_bn254::{Fq, Fq2, Fr, G1Affine, G2Affine};
use ark_ff::Zero;

use snarkwrap_core::field;
use snarkwrap_core::proof::SnarkProof;

/// Size of the encoded `A | B | C` proof points.
pub const PROOF_BYTES: usize = 64 + 128 + 64;

/// Encode a G1 point as `x(32 BE) | y(32 BE)` = 64 bytes.
pub fn g1_to_bytes(p: &G1Affine) -> [u8; 64] {
    let mut out = [0u8; 64];
    if p.infinity {
        return out;
    }
    out[..32].copy_from_slice(&field::to_be_bytes(&p.x));
    out[32..].copy_from_slice(&field::to_be_bytes(&p.y));
    out
}

/// Encode a G2 point as `x_c1 | x_c0 | y_c1 | y_c0` = 128 bytes.
pub fn g2_to_bytes(p: &G2Affine) -> [u8; 128] {
    let mut out = [0u8; 128];
    if p.infinity {
        return out;
    }
    // IMPORTANT: component order (security-critical).
    //
    // arkworks and snarkjs hold Fp2 as (c0, c1), low-degree first, but the
    // EIP-197 precompile reads the imaginary part first. With the wrong
    // order the on-chain pairing check fails for every valid proof.
    // `g2_from_bytes` must stay the exact inverse of this layout.
    out[0..32].copy_from_slice(&field::to_be_bytes(&p.x.c1));
    out[32..64].copy_from_slice(&field::to_be_bytes(&p.x.c0));
    out[64..96].copy_from_slice(&field::to_be_bytes(&p.y.c1));
    out[96..128].copy_from_slice(&field::to_be_bytes(&p.y.c0));
    out
}

/// Encode the proof points as `A(G1:64) | B(G2:128) | C(G1:64)` = 256 bytes.
pub fn proof_to_bytes(proof: &SnarkProof) -> Vec<u8> {
    let mut out = Vec::with_capacity(PROOF_BYTES);
    out.extend_from_slice(&g1_to_bytes(&proof.a));
    out.extend_from_slice(&g2_to_bytes(&proof.b));
    out.extend_from_slice(&g1_to_bytes(&proof.c));
    debug_assert_eq!(out.len(), PROOF_BYTES);
    out
}

/// Encode scalars as consecutive 32-byte words.
pub fn scalars_to_bytes(values: &[Fr]) -> Vec<u8> {
    values.iter().flat_map(|v| field::to_be_bytes(v)).collect()
}

fn word(bytes: &[u8], index: usize) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&bytes[index * 32..(index + 1) * 32]);
    out
}

fn fq(bytes: &[u8], index: usize) -> Result<Fq, String> {
    field::from_be_bytes(&word(bytes, index))
        .ok_or_else(|| format!("word {index} is not a canonical base field element"))
}

/// Decode a 64-byte G1 encoding, checking canonicity and the curve equation.
pub fn g1_from_bytes(bytes: &[u8]) -> Result<G1Affine, String> {
    if bytes.len() != 64 {
        return Err(format!("G1 encoding must be 64 bytes, got {}", bytes.len()));
    }
    let (x, y) = (fq(bytes, 0)?, fq(bytes, 1)?);
    if x.is_zero() && y.is_zero() {
        return Ok(G1Affine::identity());
    }
    let p = G1Affine::new_unchecked(x, y);
    if !p.is_on_curve() {
        return Err("G1 point is not on the curve".into());
    }
    Ok(p)
}

/// Decode a 128-byte G2 encoding, checking canonicity, the curve equation and
/// subgroup membership.
pub fn g2_from_bytes(bytes: &[u8]) -> Result<G2Affine, String> {
    if bytes.len() != 128 {
        return Err(format!("G2 encoding must be 128 bytes, got {}", bytes.len()));
    }
    let x = Fq2::new(fq(bytes, 1)?, fq(bytes, 0)?);
    let y = Fq2::new(fq(bytes, 3)?, fq(bytes, 2)?);
    if x.is_zero() && y.is_zero() {
        return Ok(G2Affine::identity());
    }
    let p = G2Affine::new_unchecked(x, y);
    if !p.is_on_curve() {
        return Err("G2 point is not on the curve".into());
    }
    if !p.is_in_correct_subgroup_assuming_on_curve() {
        return Err("G2 point is not in the prime-order subgroup".into());
    }
    Ok(p)
}

/// Decode consecutive scalar words, rejecting values at or above the modulus.
pub fn scalars_from_bytes(bytes: &[u8]) -> Result<Vec<Fr>, String> {
    if bytes.len() % 32 != 0 {
        return Err(format!("scalar block of {} bytes is not word-aligned", bytes.len()));
    }
    bytes
        .chunks_exact(32)
        .enumerate()
        .map(|(i, chunk)| {
            let mut w = [0u8; 32];
            w.copy_from_slice(chunk);
            field::from_be_bytes(&w).ok_or_else(|| format!("signal {i} is not a canonical scalar"))
        })
        .collect()
}
