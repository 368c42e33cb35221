//! R1CS verifier circuit for the do-work STARK.
//!
//! Public wires are `[start, result]`. The commitments (trace root, FRI
//! roots, remainder) and every opening enter as private wires. The circuit
//! then re-runs the whole verifier over them:
//!
//! - replays the Poseidon transcript to derive `alpha`, `beta`, the FRI
//!   challenges and one challenge per query,
//! - decomposes each query challenge into canonical bits and takes the low
//!   bits as the query index,
//! - authenticates every trace and FRI opening against its root with the
//!   index bits as the Merkle path directions,
//! - checks the composition equation at the recomposed point `h·ω^index`,
//!   every FRI fold, and the link to the remainder.
//!
//! Constraint coefficients depend only on [`StarkParams`], so every proof
//! with the same parameters yields the same constraint system.

use ark_bn254::Fr;
use ark_ff::{BigInteger, Field, One, PrimeField, Zero};

use snarkwrap_core::error::Result;
use snarkwrap_core::r1cs::{Constraint, LinearCombination as Lc, R1cs, ONE_WIRE};

use crate::air::{Domain, ROUND_CONSTANT};
use crate::poseidon;
use crate::proof::{
    FriOpening, PublicInput, QueryProof, StarkArtifact, StarkParams, StarkProof, TraceOpening,
    PROOF_VERSION,
};
use crate::transcript::{Transcript, SQUEEZE_TAG};
use crate::verifier::{check_structure, TRANSCRIPT_LABEL};

/// Number of public signals exposed by the circuit.
pub const NUM_PUBLIC: usize = 2;

/// Allocates wires with their values and records constraints over them.
pub struct CircuitBuilder {
    num_public: usize,
    values: Vec<Fr>,
    constraints: Vec<Constraint>,
}

impl CircuitBuilder {
    pub fn new(public: &[Fr]) -> Self {
        let mut values = Vec::with_capacity(1 + public.len());
        values.push(Fr::one());
        values.extend_from_slice(public);
        Self {
            num_public: public.len(),
            values,
            constraints: Vec::new(),
        }
    }

    /// The `i`-th public wire.
    pub fn public(&self, i: usize) -> Lc {
        assert!(i < self.num_public);
        Lc::wire(1 + i)
    }

    pub fn alloc(&mut self, value: Fr) -> Lc {
        self.values.push(value);
        Lc::wire(self.values.len() - 1)
    }

    pub fn value(&self, lc: &Lc) -> Fr {
        lc.evaluate(&self.values)
    }

    pub fn enforce(&mut self, a: Lc, b: Lc, c: Lc) {
        self.constraints.push(Constraint { a, b, c });
    }

    /// A new wire constrained to `a * b`.
    pub fn mul(&mut self, a: Lc, b: Lc) -> Lc {
        let product = self.value(&a) * self.value(&b);
        let out = self.alloc(product);
        self.enforce(a, b, out.clone());
        out
    }

    /// A new wire constrained to equal `lc`.
    pub fn materialize(&mut self, lc: Lc) -> Lc {
        let out = self.alloc(self.value(&lc));
        self.enforce(lc, Lc::wire(ONE_WIRE), out.clone());
        out
    }

    /// A new wire constrained to the inverse of `a`.
    ///
    /// When `a` evaluates to zero the wire holds zero and the assignment is
    /// left unsatisfied.
    pub fn inverse(&mut self, a: Lc) -> Lc {
        let inv = self.value(&a).inverse().unwrap_or_else(Fr::zero);
        let out = self.alloc(inv);
        self.enforce(a, out.clone(), Lc::constant(Fr::one()));
        out
    }

    /// Constrain `lc` to zero.
    pub fn assert_zero(&mut self, lc: Lc) {
        self.enforce(lc, Lc::wire(ONE_WIRE), Lc::zero());
    }

    /// A new wire constrained to a bit.
    pub fn boolean(&mut self, bit: bool) -> Lc {
        let b = self.alloc(if bit { Fr::one() } else { Fr::zero() });
        self.enforce(b.clone(), b.clone() - Lc::constant(Fr::one()), Lc::zero());
        b
    }

    /// `(x, y)` when `bit` is zero, `(y, x)` when it is one.
    pub fn swap(&mut self, bit: Lc, x: Lc, y: Lc) -> (Lc, Lc) {
        let m = self.mul(bit, y.clone() - x.clone());
        (x + m.clone(), y - m)
    }

    /// Product of boolean wires.
    fn and_all(&mut self, bits: &[Lc]) -> Lc {
        let mut acc = bits[0].clone();
        for bit in &bits[1..] {
            acc = self.mul(acc, bit.clone());
        }
        acc
    }

    fn pow5(&mut self, x: Lc) -> Lc {
        let x2 = self.mul(x.clone(), x.clone());
        let x4 = self.mul(x2.clone(), x2);
        self.mul(x4, x)
    }

    /// Poseidon two-to-one compression, matching [`poseidon::hash2`].
    pub fn hash2(&mut self, left: Lc, right: Lc) -> Lc {
        let cfg = poseidon::config();
        let mut state = [Lc::zero(), left, right];
        for round in 0..cfg.full_rounds + cfg.partial_rounds {
            for (s, c) in state.iter_mut().zip(&cfg.ark[round]) {
                *s = std::mem::take(s) + Lc::constant(*c);
            }
            let full = poseidon::is_full_round(round);
            if full {
                for s in state.iter_mut() {
                    *s = self.pow5(std::mem::take(s));
                }
            } else {
                state[0] = self.pow5(std::mem::take(&mut state[0]));
            }
            let mixed: Vec<Lc> = cfg
                .mds
                .iter()
                .map(|row| {
                    row.iter()
                        .zip(&state)
                        .fold(Lc::zero(), |acc, (m, s)| acc + s.clone() * *m)
                })
                .collect();
            for (s, lc) in state.iter_mut().zip(mixed) {
                *s = lc;
            }
            // Keep the unboxed lanes of partial rounds from growing.
            if !full {
                state[1] = self.materialize(std::mem::take(&mut state[1]));
                state[2] = self.materialize(std::mem::take(&mut state[2]));
            }
        }
        std::mem::take(&mut state[1])
    }

    /// Little-endian bits of `lc`, constrained to the canonical encoding
    /// (strictly below the field modulus), so every value has exactly one
    /// decomposition.
    pub fn to_bits_le_strict(&mut self, lc: &Lc) -> Vec<Lc> {
        let value = self.value(lc).into_bigint().to_bits_le();
        let bound = (-Fr::one()).into_bigint().to_bits_le();
        let n = Fr::MODULUS_BIT_SIZE as usize;

        // Walk from the top bit. `last_run` is the AND of every bit sitting
        // under a one of `p - 1` so far; while it holds, a bit under a zero
        // of `p - 1` must be zero.
        let mut bits = Vec::with_capacity(n);
        let mut current_run: Vec<Lc> = Vec::new();
        let mut last_run: Option<Lc> = None;
        for i in (0..n).rev() {
            if bound[i] {
                let bit = self.boolean(value[i]);
                current_run.push(bit.clone());
                bits.push(bit);
                continue;
            }
            if !current_run.is_empty() {
                if let Some(prev) = last_run.take() {
                    current_run.push(prev);
                }
                last_run = Some(self.and_all(&current_run));
                current_run.clear();
            }
            let bit = match &last_run {
                Some(run) => {
                    let bit = self.alloc(if value[i] { Fr::one() } else { Fr::zero() });
                    // (1 - run - bit) * bit = 0
                    let free = Lc::constant(Fr::one()) - run.clone() - bit.clone();
                    self.enforce(free, bit.clone(), Lc::zero());
                    bit
                }
                None => self.boolean(value[i]),
            };
            bits.push(bit);
        }
        bits.reverse();

        let mut coeff = Fr::one();
        let mut sum = Lc::zero();
        for bit in &bits {
            sum = sum + bit.clone() * coeff;
            coeff = coeff + coeff;
        }
        self.assert_zero(sum - lc.clone());
        bits
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn finish(self) -> (R1cs, Vec<Fr>) {
        let r1cs = R1cs {
            num_public: self.num_public,
            num_wires: self.values.len(),
            constraints: self.constraints,
        };
        (r1cs, self.values)
    }
}

/// The Fiat–Shamir transcript replayed in constraints.
struct CircuitTranscript {
    state: Lc,
}

impl CircuitTranscript {
    fn absorb(&mut self, cs: &mut CircuitBuilder, message: Lc) {
        self.state = cs.hash2(std::mem::take(&mut self.state), message);
    }

    fn squeeze(&mut self, cs: &mut CircuitBuilder) -> Lc {
        let state = std::mem::take(&mut self.state);
        self.state = cs.hash2(state, Lc::constant(Fr::from(SQUEEZE_TAG)));
        self.state.clone()
    }
}

/// Build the verifier circuit and its full assignment for a STARK artifact.
///
/// The assignment satisfies the circuit exactly when the proof verifies
/// against the artifact's public input.
pub fn synthesize(artifact: &StarkArtifact) -> Result<(R1cs, Vec<Fr>)> {
    let proof = &artifact.proof;
    let params = proof.params;
    params.validate()?;
    check_structure(proof)?;
    let domain = Domain::new(params)?;
    let layers = params.num_fri_layers();
    let lde_log = params.lde_log();

    let public_input = artifact.public_input;
    let mut cs = CircuitBuilder::new(&[public_input.start, public_input.result]);
    let start = cs.public(0);
    let result = cs.public(1);

    // The label and parameters are constants, so their absorption is folded natively.
    let mut prefix = Transcript::new(TRANSCRIPT_LABEL);
    prefix.append_u64(params.trace_length as u64);
    prefix.append_u64(params.blowup as u64);
    prefix.append_u64(params.num_queries as u64);
    let mut transcript = CircuitTranscript {
        state: Lc::constant(prefix.state),
    };

    transcript.absorb(&mut cs, start.clone());
    transcript.absorb(&mut cs, result.clone());
    let trace_root = cs.alloc(proof.trace_root);
    transcript.absorb(&mut cs, trace_root.clone());
    let alpha = transcript.squeeze(&mut cs);
    let beta = transcript.squeeze(&mut cs);

    let mut fri_roots = Vec::with_capacity(layers);
    let mut fri_betas = Vec::with_capacity(layers);
    for root in &proof.fri_roots {
        let root = cs.alloc(*root);
        transcript.absorb(&mut cs, root.clone());
        fri_betas.push(transcript.squeeze(&mut cs));
        fri_roots.push(root);
    }
    let remainder = cs.alloc(proof.fri_remainder);
    transcript.absorb(&mut cs, remainder.clone());

    let index_bits: Vec<Vec<Lc>> = (0..params.num_queries)
        .map(|_| {
            let challenge = transcript.squeeze(&mut cs);
            let mut bits = cs.to_bits_le_strict(&challenge);
            bits.truncate(lde_log);
            bits
        })
        .collect();

    // ω^{2^j} for each index bit
    let mut bit_factors = Vec::with_capacity(lde_log);
    let mut factor = domain.lde_generator;
    for _ in 0..lde_log {
        bit_factors.push(factor);
        factor.square_in_place();
    }

    let shared = Shared {
        domain: &domain,
        start: &start,
        result: &result,
        alpha: &alpha,
        beta: &beta,
        trace_root: &trace_root,
        fri_roots: &fri_roots,
        fri_betas: &fri_betas,
        remainder: &remainder,
    };
    for (query, bits) in proof.queries.iter().zip(&index_bits) {
        let x = evaluation_point(&mut cs, &domain, &bit_factors, bits);
        check_query(&mut cs, &shared, query, bits, x);
    }

    tracing::debug!(
        "verifier circuit: {} queries, {} constraints",
        proof.queries.len(),
        cs.num_constraints()
    );
    Ok(cs.finish())
}

/// Wires shared by every query.
struct Shared<'a> {
    domain: &'a Domain,
    start: &'a Lc,
    result: &'a Lc,
    alpha: &'a Lc,
    beta: &'a Lc,
    trace_root: &'a Lc,
    fri_roots: &'a [Lc],
    fri_betas: &'a [Lc],
    remainder: &'a Lc,
}

fn check_query(
    cs: &mut CircuitBuilder,
    shared: &Shared<'_>,
    query: &QueryProof,
    bits: &[Lc],
    x: Lc,
) {
    let params = shared.domain.params;
    let layers = params.num_fri_layers();

    // x_k = x^{2^k} for k < L; the last one is x^N.
    let mut powers = vec![x];
    for _ in 1..layers {
        let prev = powers[powers.len() - 1].clone();
        let next = cs.mul(prev.clone(), prev);
        powers.push(next);
    }

    let t = cs.alloc(query.trace.value);
    let t_next = cs.alloc(query.trace_next.value);
    let leaf = cs.hash2(t.clone(), Lc::zero());
    authenticate(cs, leaf, bits, &query.trace.path, shared.trace_root);
    let next_bits = add_power_of_two(cs, bits, params.blowup.trailing_zeros() as usize);
    let leaf = cs.hash2(t_next.clone(), Lc::zero());
    authenticate(cs, leaf, &next_bits, &query.trace_next.path, shared.trace_root);

    // Per layer, the opened pair ordered as (value at x_k, value at -x_k).
    let mut pairs = Vec::with_capacity(layers);
    for (k, opening) in query.fri.iter().enumerate() {
        let v0 = cs.alloc(opening.values[0]);
        let v1 = cs.alloc(opening.values[1]);
        let leaf = cs.hash2(v0.clone(), v1.clone());
        let depth = opening.path.len();
        authenticate(cs, leaf, &bits[..depth], &opening.path, &shared.fri_roots[k]);
        pairs.push(cs.swap(bits[depth].clone(), v0, v1));
    }

    let x_n = powers[powers.len() - 1].clone();
    let q = composition(cs, shared, &powers[0], &x_n, t, t_next);
    cs.assert_zero(pairs[0].0.clone() - q);

    // x_k·(2a_{k+1} - a_k - b_k) = β_k·(a_k - b_k), with a_L the remainder.
    for k in 0..layers {
        let (a, b) = pairs[k].clone();
        let next = match pairs.get(k + 1) {
            Some((next, _)) => next.clone(),
            None => shared.remainder.clone(),
        };
        let m = cs.mul(shared.fri_betas[k].clone(), a.clone() - b.clone());
        cs.enforce(powers[k].clone(), next * Fr::from(2u64) - a - b, m);
    }
}

/// Fold `leaf` up the tree along `bits` and constrain the result to `root`.
fn authenticate(cs: &mut CircuitBuilder, leaf: Lc, bits: &[Lc], path: &[Fr], root: &Lc) {
    let mut node = leaf;
    for (bit, sibling) in bits.iter().zip(path) {
        let sibling = cs.alloc(*sibling);
        let (left, right) = cs.swap(bit.clone(), node, sibling);
        node = cs.hash2(left, right);
    }
    cs.assert_zero(node - root.clone());
}

/// Bits of `(index + 2^shift) mod 2^bits.len()`.
fn add_power_of_two(cs: &mut CircuitBuilder, bits: &[Lc], shift: usize) -> Vec<Lc> {
    let mut out = bits[..shift].to_vec();
    let mut carry = Lc::constant(Fr::one());
    for bit in &bits[shift..] {
        let both = cs.mul(bit.clone(), carry.clone());
        out.push(bit.clone() + carry - both.clone() * Fr::from(2u64));
        carry = both;
    }
    out
}

/// Recompose `h·ω^index` from the bits of `index`.
fn evaluation_point(
    cs: &mut CircuitBuilder,
    domain: &Domain,
    bit_factors: &[Fr],
    bits: &[Lc],
) -> Lc {
    let mut acc = Lc::constant(domain.offset);
    for (bit, factor) in bits.iter().zip(bit_factors) {
        // acc * (1 + (ω^{2^j} - 1)·b)
        let selector = Lc::constant(Fr::one()) + bit.clone() * (*factor - Fr::one());
        acc = cs.mul(acc, selector);
    }
    acc
}

/// The composition polynomial at `x` from `T(x)` and `T(g·x)`.
fn composition(
    cs: &mut CircuitBuilder,
    shared: &Shared<'_>,
    x: &Lc,
    x_n: &Lc,
    t: Lc,
    t_next: Lc,
) -> Lc {
    let one = Lc::constant(Fr::one());

    let t2 = cs.mul(t.clone(), t.clone());
    let t3 = cs.mul(t2, t.clone());
    let to_last = x.clone() - Lc::constant(shared.domain.last_point);
    let transition = t_next - t3 - Lc::constant(Fr::from(ROUND_CONSTANT));
    let numerator = cs.mul(transition, to_last.clone());

    let vanishing_inv = cs.inverse(x_n.clone() - one.clone());
    let first_inv = cs.inverse(x.clone() - one);
    let last_inv = cs.inverse(to_last);

    let transition_term = cs.mul(numerator, vanishing_inv);
    let first_quotient = cs.mul(t.clone() - shared.start.clone(), first_inv);
    let last_quotient = cs.mul(t - shared.result.clone(), last_inv);
    let first_term = cs.mul(shared.alpha.clone(), first_quotient);
    let last_term = cs.mul(shared.beta.clone(), last_quotient);

    transition_term + first_term + last_term
}

/// An all-zero artifact with the shape `params` dictates.
///
/// Synthesizing it yields the constraint system shared by every proof with
/// these parameters.
pub fn blank(params: StarkParams) -> StarkArtifact {
    let layers = params.num_fri_layers();
    let lde_log = params.lde_log();
    let trace_opening = TraceOpening {
        value: Fr::zero(),
        path: vec![Fr::zero(); lde_log],
    };
    let query = QueryProof {
        trace: trace_opening.clone(),
        trace_next: trace_opening,
        fri: (0..layers)
            .map(|k| FriOpening {
                values: vec![Fr::zero(); 2],
                path: vec![Fr::zero(); lde_log - k - 1],
            })
            .collect(),
    };
    StarkArtifact {
        proof: StarkProof {
            version: PROOF_VERSION,
            params,
            claim_digest: [0u8; 32],
            trace_root: Fr::zero(),
            fri_roots: vec![Fr::zero(); layers],
            fri_remainder: Fr::zero(),
            queries: vec![query; params.num_queries],
        },
        public_input: PublicInput {
            start: Fr::zero(),
            result: Fr::zero(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prover;

    fn params() -> StarkParams {
        StarkParams {
            trace_length: 8,
            blowup: 4,
            num_queries: 2,
        }
    }

    #[test]
    fn test_builder_mul_and_inverse() {
        let mut cs = CircuitBuilder::new(&[Fr::from(6u64)]);
        let a = cs.alloc(Fr::from(2u64));
        let b = cs.alloc(Fr::from(3u64));
        let product = cs.mul(a.clone(), b);
        let six = cs.public(0);
        cs.assert_zero(product - six);
        let inv = cs.inverse(a);
        assert_eq!(cs.value(&inv) * Fr::from(2u64), Fr::one());
        let (r1cs, values) = cs.finish();
        assert_eq!(r1cs.num_public, 1);
        assert_eq!(r1cs.check_assignment(&values), Ok(()));
    }

    #[test]
    fn test_inverse_of_zero_is_unsatisfied() {
        let mut cs = CircuitBuilder::new(&[]);
        let z = cs.alloc(Fr::zero());
        cs.inverse(z);
        let (r1cs, values) = cs.finish();
        assert_eq!(r1cs.check_assignment(&values), Err(0));
    }

    #[test]
    fn test_boolean_rejects_other_values() {
        let mut cs = CircuitBuilder::new(&[]);
        cs.boolean(true);
        let (r1cs, mut values) = cs.finish();
        assert_eq!(r1cs.check_assignment(&values), Ok(()));
        values[1] = Fr::from(2u64);
        assert_eq!(r1cs.check_assignment(&values), Err(0));
    }

    #[test]
    fn test_hash2_gadget_matches_native() {
        let (l, r) = (Fr::from(11u64), Fr::from(13u64));
        let mut cs = CircuitBuilder::new(&[]);
        let left = cs.alloc(l);
        let right = cs.alloc(r);
        let out = cs.hash2(left, right);
        assert_eq!(cs.value(&out), poseidon::hash2(l, r));
        let (r1cs, values) = cs.finish();
        assert_eq!(r1cs.check_assignment(&values), Ok(()));
    }

    #[test]
    fn test_strict_bits_recompose() {
        for value in [Fr::zero(), Fr::from(0b1101u64), -Fr::one()] {
            let mut cs = CircuitBuilder::new(&[]);
            let v = cs.alloc(value);
            let bits = cs.to_bits_le_strict(&v);
            assert_eq!(bits.len(), Fr::MODULUS_BIT_SIZE as usize);
            let low: Vec<Fr> = bits.iter().take(4).map(|b| cs.value(b)).collect();
            if value == Fr::from(0b1101u64) {
                assert_eq!(low, vec![Fr::one(), Fr::zero(), Fr::one(), Fr::one()]);
            }
            let (r1cs, values) = cs.finish();
            assert_eq!(r1cs.check_assignment(&values), Ok(()));
        }
    }

    #[test]
    fn test_strict_bits_reject_flipped_bit() {
        let mut cs = CircuitBuilder::new(&[]);
        let v = cs.alloc(Fr::from(6u64));
        let bits = cs.to_bits_le_strict(&v);
        let wire = bits[1].terms[0].wire;
        let (r1cs, mut values) = cs.finish();
        values[wire] = Fr::zero();
        assert!(r1cs.check_assignment(&values).is_err());
    }

    #[test]
    fn test_add_power_of_two_wraps() {
        for (index, shift) in [(0usize, 2usize), (13, 2), (30, 2), (31, 0), (7, 4)] {
            let mut cs = CircuitBuilder::new(&[]);
            let bits: Vec<Lc> = (0..5).map(|j| cs.boolean((index >> j) & 1 == 1)).collect();
            let out = add_power_of_two(&mut cs, &bits, shift);
            let sum = out
                .iter()
                .enumerate()
                .map(|(j, b)| cs.value(b) * Fr::from(1u64 << j))
                .sum::<Fr>();
            assert_eq!(sum, Fr::from(((index + (1 << shift)) % 32) as u64));
            let (r1cs, values) = cs.finish();
            assert_eq!(r1cs.check_assignment(&values), Ok(()));
        }
    }

    #[test]
    fn test_evaluation_point_matches_domain() {
        let domain = Domain::new(params()).unwrap();
        let lde_log = params().lde_log();
        let mut factors = Vec::new();
        let mut f = domain.lde_generator;
        for _ in 0..lde_log {
            factors.push(f);
            f.square_in_place();
        }
        for index in [0, 1, 13, 31] {
            let mut cs = CircuitBuilder::new(&[]);
            let bits: Vec<Lc> = (0..lde_log).map(|j| cs.boolean((index >> j) & 1 == 1)).collect();
            let x = evaluation_point(&mut cs, &domain, &factors, &bits);
            assert_eq!(cs.value(&x), domain.lde_point(index));
            let (r1cs, values) = cs.finish();
            assert_eq!(r1cs.check_assignment(&values), Ok(()));
        }
    }

    #[test]
    fn test_valid_proof_satisfies_circuit() {
        let artifact = prover::prove(params(), Fr::from(42u64)).unwrap();
        let (r1cs, values) = synthesize(&artifact).unwrap();
        assert_eq!(r1cs.check_assignment(&values), Ok(()));
        assert_eq!(r1cs.digest(), synthesize(&blank(params())).unwrap().0.digest());
    }

    #[test]
    fn test_unproven_statement_is_unsatisfiable() {
        // Arbitrary commitments and openings for start = 1, result = 2.
        let mut forged = blank(params());
        forged.public_input = PublicInput {
            start: Fr::from(1u64),
            result: Fr::from(2u64),
        };
        for query in &mut forged.proof.queries {
            query.trace.value = Fr::from(5u64);
            query.trace_next.value = Fr::from(9u64);
            for opening in &mut query.fri {
                opening.values = vec![Fr::from(3u64), Fr::zero()];
            }
        }
        let (r1cs, values) = synthesize(&forged).unwrap();
        assert!(r1cs.check_assignment(&values).is_err());
    }

    #[test]
    fn test_valid_proof_with_other_public_input_is_unsatisfiable() {
        let mut artifact = prover::prove(params(), Fr::from(42u64)).unwrap();
        artifact.public_input = PublicInput {
            start: Fr::from(1u64),
            result: Fr::from(2u64),
        };
        let (r1cs, values) = synthesize(&artifact).unwrap();
        assert!(r1cs.check_assignment(&values).is_err());
    }

    #[test]
    fn test_swapped_fri_pair_is_unsatisfiable() {
        let mut artifact = prover::prove(params(), Fr::from(42u64)).unwrap();
        artifact.proof.queries[0].fri[1].values.swap(0, 1);
        let (r1cs, values) = synthesize(&artifact).unwrap();
        assert!(r1cs.check_assignment(&values).is_err());
    }

    #[test]
    fn test_blank_shape_is_deterministic() {
        let (a, _) = synthesize(&blank(params())).unwrap();
        let (b, _) = synthesize(&blank(params())).unwrap();
        assert_eq!(a.digest(), b.digest());
        assert_eq!(a.num_public, NUM_PUBLIC);
        assert!(a.is_well_formed());

        let wider = StarkParams {
            num_queries: 3,
            ..params()
        };
        let (c, _) = synthesize(&blank(wider)).unwrap();
        assert_ne!(a.digest(), c.digest());
    }
}
