//! Poseidon over the BN254 scalar field.
//!
//! Every commitment and every Fiat–Shamir challenge goes through [`hash2`],
//! a width-3 permutation (one capacity element, two rate elements, `x^5`
//! S-box, 8 full and 57 partial rounds) with round constants from the
//! Grain LFSR. The verifier circuit evaluates the same permutation in
//! constraints, so native and in-circuit hashing agree bit for bit.

use std::sync::OnceLock;

use ark_bn254::Fr;
use ark_crypto_primitives::sponge::poseidon::{
    find_poseidon_ark_and_mds, PoseidonConfig, PoseidonSponge,
};
use ark_crypto_primitives::sponge::{CryptographicSponge, FieldBasedCryptographicSponge};
use ark_ff::PrimeField;

pub const RATE: usize = 2;
pub const CAPACITY: usize = 1;
pub const ALPHA: u64 = 5;
pub const FULL_ROUNDS: usize = 8;
pub const PARTIAL_ROUNDS: usize = 57;

static CONFIG: OnceLock<PoseidonConfig<Fr>> = OnceLock::new();

/// Round constants and MDS matrix, generated once per process.
pub fn config() -> &'static PoseidonConfig<Fr> {
    CONFIG.get_or_init(|| {
        let (ark, mds) = find_poseidon_ark_and_mds::<Fr>(
            Fr::MODULUS_BIT_SIZE as u64,
            RATE,
            FULL_ROUNDS as u64,
            PARTIAL_ROUNDS as u64,
            0,
        );
        PoseidonConfig {
            full_rounds: FULL_ROUNDS,
            partial_rounds: PARTIAL_ROUNDS,
            alpha: ALPHA,
            ark,
            mds,
            rate: RATE,
            capacity: CAPACITY,
        }
    })
}

/// Two-to-one compression: permute `[0, left, right]` and keep the first
/// rate element.
pub fn hash2(left: Fr, right: Fr) -> Fr {
    let mut sponge = PoseidonSponge::new(config());
    sponge.absorb(&left);
    sponge.absorb(&right);
    sponge.squeeze_native_field_elements(1)[0]
}

/// Whether round `round` applies the S-box to the whole state.
pub fn is_full_round(round: usize) -> bool {
    let half = FULL_ROUNDS / 2;
    round < half || round >= half + PARTIAL_ROUNDS
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_ff::{Field, Zero};

    /// The permutation written out round by round.
    fn permute(mut state: [Fr; 3]) -> [Fr; 3] {
        let cfg = config();
        for round in 0..FULL_ROUNDS + PARTIAL_ROUNDS {
            for (s, c) in state.iter_mut().zip(&cfg.ark[round]) {
                *s += c;
            }
            if is_full_round(round) {
                for s in state.iter_mut() {
                    *s = s.pow([ALPHA]);
                }
            } else {
                state[0] = state[0].pow([ALPHA]);
            }
            let mut next = [Fr::zero(); 3];
            for (i, row) in cfg.mds.iter().enumerate() {
                next[i] = row.iter().zip(&state).map(|(m, s)| *m * s).sum();
            }
            state = next;
        }
        state
    }

    #[test]
    fn test_config_shape() {
        let cfg = config();
        assert_eq!(cfg.ark.len(), FULL_ROUNDS + PARTIAL_ROUNDS);
        assert!(cfg.ark.iter().all(|row| row.len() == RATE + CAPACITY));
        assert_eq!(cfg.mds.len(), RATE + CAPACITY);
    }

    #[test]
    fn test_hash2_is_first_rate_element() {
        let (l, r) = (Fr::from(3u64), Fr::from(9u64));
        assert_eq!(hash2(l, r), permute([Fr::zero(), l, r])[1]);
    }

    #[test]
    fn test_hash2_is_ordered() {
        let (a, b) = (Fr::from(1u64), Fr::from(2u64));
        assert_ne!(hash2(a, b), hash2(b, a));
        assert_eq!(hash2(a, b), hash2(a, b));
    }
}
