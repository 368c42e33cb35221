//! The proven computation and its evaluation domains.
//!
//! A single-column trace `t_0 .. t_{N-1}` with `t_{i+1} = t_i^3 + 42`,
//! `t_0 = start` and `t_{N-1} = result`. The trace is interpolated over the
//! order-`N` subgroup generated by `g` and committed on the coset `h·<ω>` of
//! size `M = N·B`, where `ω^B = g` and `h` is the multiplicative generator of
//! the field (outside every two-adic subgroup, so no denominator below
//! vanishes on the coset).

use ark_bn254::Fr;
use ark_ff::{FftField, Field, One};

use snarkwrap_core::error::{FinalizeError, Result};

use crate::proof::{PublicInput, StarkParams};

/// Additive constant of the transition function.
pub const ROUND_CONSTANT: u64 = 42;

/// One step of the computation.
pub fn transition(t: Fr) -> Fr {
    t * t * t + Fr::from(ROUND_CONSTANT)
}

/// Run the computation for `steps` rows starting from `start`.
pub fn execute(start: Fr, steps: usize) -> Vec<Fr> {
    let mut trace = Vec::with_capacity(steps);
    let mut t = start;
    for _ in 0..steps {
        trace.push(t);
        t = transition(t);
    }
    trace
}

/// Field constants shared by prover, verifier, and circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Domain {
    pub params: StarkParams,
    /// Coset offset `h`.
    pub offset: Fr,
    /// Generator `ω` of the order-`M` subgroup.
    pub lde_generator: Fr,
    /// Generator `g = ω^B` of the order-`N` trace subgroup.
    pub trace_generator: Fr,
    /// `g^{N-1}`, the last trace point.
    pub last_point: Fr,
}

impl Domain {
    pub fn new(params: StarkParams) -> Result<Self> {
        let lde_generator = Fr::get_root_of_unity(params.lde_size() as u64).ok_or_else(|| {
            FinalizeError::MalformedProof(format!("no root of unity of order {}", params.lde_size()))
        })?;
        let trace_generator = lde_generator.pow([params.blowup as u64]);
        let last_point = trace_generator.pow([(params.trace_length - 1) as u64]);
        Ok(Self {
            params,
            offset: Fr::GENERATOR,
            lde_generator,
            trace_generator,
            last_point,
        })
    }

    /// The coset point `h·ω^index`.
    pub fn lde_point(&self, index: usize) -> Fr {
        self.offset * self.lde_generator.pow([index as u64])
    }

    /// Index of `g·x` when `x` sits at `index`.
    pub fn next_index(&self, index: usize) -> usize {
        (index + self.params.blowup) % self.params.lde_size()
    }
}

/// Evaluate the composition polynomial at `x` from the trace values
/// `t = T(x)` and `t_next = T(g·x)`.
///
/// Returns `None` when `x` hits a denominator root, which never happens on
/// the commitment coset.
pub fn composition(
    domain: &Domain,
    public: &PublicInput,
    alpha: Fr,
    beta: Fr,
    x: Fr,
    t: Fr,
    t_next: Fr,
) -> Option<Fr> {
    let n = domain.params.trace_length as u64;
    let vanishing_inv = (x.pow([n]) - Fr::one()).inverse()?;
    let first_inv = (x - Fr::one()).inverse()?;
    let last_inv = (x - domain.last_point).inverse()?;

    let transition_term = (t_next - transition(t)) * (x - domain.last_point) * vanishing_inv;
    let first_term = alpha * (t - public.start) * first_inv;
    let last_term = beta * (t - public.result) * last_inv;
    Some(transition_term + first_term + last_term)
}

/// One FRI fold of the pair `(f(x), f(-x))` with challenge `beta`.
///
/// Returns `None` only for `x = 0`.
pub fn fold(a: Fr, b: Fr, beta: Fr, x: Fr) -> Option<Fr> {
    let two_inv = Fr::from(2u64).inverse()?;
    let x_inv = x.inverse()?;
    Some((a + b) * two_inv + beta * (a - b) * two_inv * x_inv)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> StarkParams {
        StarkParams {
            trace_length: 8,
            blowup: 4,
            num_queries: 4,
        }
    }

    #[test]
    fn test_execute_applies_transition() {
        let trace = execute(Fr::from(2u64), 3);
        assert_eq!(trace, vec![Fr::from(2u64), Fr::from(50u64), Fr::from(125042u64)]);
    }

    #[test]
    fn test_domain_generators() {
        let domain = Domain::new(params()).unwrap();
        assert_eq!(domain.lde_generator.pow([32u64]), Fr::one());
        assert_ne!(domain.lde_generator.pow([16u64]), Fr::one());
        assert_eq!(domain.trace_generator.pow([8u64]), Fr::one());
        assert_eq!(domain.last_point * domain.trace_generator, Fr::one());
    }

    #[test]
    fn test_next_index_is_shift_by_trace_generator() {
        let domain = Domain::new(params()).unwrap();
        for i in [0, 5, 29, 31] {
            let x = domain.lde_point(i);
            assert_eq!(domain.lde_point(domain.next_index(i)), x * domain.trace_generator);
        }
    }

    #[test]
    fn test_coset_avoids_denominator_roots() {
        let domain = Domain::new(params()).unwrap();
        let public = PublicInput {
            start: Fr::from(1u64),
            result: Fr::from(2u64),
        };
        for i in 0..params().lde_size() {
            let x = domain.lde_point(i);
            assert!(composition(&domain, &public, Fr::one(), Fr::one(), x, x, x).is_some());
        }
        // x = 1 is a root of two denominators
        assert!(composition(&domain, &public, Fr::one(), Fr::one(), Fr::one(), Fr::one(), Fr::one()).is_none());
    }

    #[test]
    fn test_fold_of_even_function_is_its_value() {
        // f(x) = f(-x) = 5 folds to 5 whatever the challenge
        assert_eq!(fold(Fr::from(5u64), Fr::from(5u64), Fr::from(9u64), Fr::from(3u64)), Some(Fr::from(5u64)));
        assert_eq!(fold(Fr::one(), Fr::one(), Fr::one(), Fr::from(0u64)), None);
    }
}
