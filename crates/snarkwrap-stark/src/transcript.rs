//! Poseidon Fiat–Shamir transcript.
//!
//! The running state is one field element. Absorbing `m` replaces the state
//! with `hash2(state, m)`; squeezing replaces it with
//! `hash2(state, SQUEEZE_TAG)` and returns the new state. The verifier
//! circuit replays the same chain in constraints.

use ark_bn254::Fr;
use ark_ff::{BigInteger, PrimeField, Zero};

use crate::poseidon::hash2;

/// Second input of every squeeze.
pub const SQUEEZE_TAG: u64 = u64::MAX;

#[derive(Debug, Clone)]
pub struct Transcript {
    pub state: Fr,
}

impl Transcript {
    /// Start a transcript bound to a domain-separation label of at most 31 bytes.
    pub fn new(label: &'static [u8]) -> Self {
        assert!(label.len() < 32, "transcript label exceeds one field element");
        Self {
            state: hash2(Fr::from_be_bytes_mod_order(label), Fr::zero()),
        }
    }

    pub fn append_u64(&mut self, x: u64) {
        self.append_scalar(&Fr::from(x));
    }

    pub fn append_scalar(&mut self, scalar: &Fr) {
        self.state = hash2(self.state, *scalar);
    }

    pub fn append_digest(&mut self, digest: &Fr) {
        self.append_scalar(digest);
    }

    pub fn challenge_scalar(&mut self) -> Fr {
        self.state = hash2(self.state, Fr::from(SQUEEZE_TAG));
        self.state
    }

    /// Squeeze an index in `[0, bound)` from the low bits of a challenge.
    /// `bound` must be a power of two no larger than `2^63`.
    pub fn challenge_index(&mut self, bound: usize) -> usize {
        debug_assert!(bound.is_power_of_two());
        index_bits(&self.challenge_scalar(), bound.trailing_zeros() as usize)
    }
}

/// The integer formed by the low `bits` bits of the canonical encoding of `value`.
pub fn index_bits(value: &Fr, bits: usize) -> usize {
    value
        .into_bigint()
        .to_bits_le()
        .iter()
        .take(bits)
        .enumerate()
        .fold(0, |acc, (i, bit)| acc | (usize::from(*bit) << i))
}
