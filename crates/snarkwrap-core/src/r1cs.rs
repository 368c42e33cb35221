//! Rank-1 constraint systems over the BN254 scalar field.
//!
//! Wire layout is fixed: wire `0` is the constant one, wires
//! `1..=num_public` are the public signals, and every later wire is private.
//! A constraint `(a, b, c)` is satisfied when `<a, w> * <b, w> == <c, w>`.

use ark_bn254::Fr;
use ark_ff::{One, Zero};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use sha2::{Digest, Sha256};

use crate::field;

/// Index of the constant-one wire.
pub const ONE_WIRE: usize = 0;

/// A single `coeff * wire` term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct Term {
    pub wire: usize,
    pub coeff: Fr,
}

/// A sparse linear combination of wires.
#[derive(Debug, Clone, Default, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct LinearCombination {
    pub terms: Vec<Term>,
}

impl LinearCombination {
    /// The empty combination (evaluates to zero).
    pub fn zero() -> Self {
        Self::default()
    }

    /// `1 * wire`.
    pub fn wire(wire: usize) -> Self {
        Self::zero().with(Fr::one(), wire)
    }

    /// `value * ONE`.
    pub fn constant(value: Fr) -> Self {
        Self::zero().with(value, ONE_WIRE)
    }

    /// Append a term, returning the extended combination.
    pub fn with(mut self, coeff: Fr, wire: usize) -> Self {
        if !coeff.is_zero() {
            self.terms.push(Term { wire, coeff });
        }
        self
    }

    /// Evaluate against a full wire assignment.
    ///
    /// Panics if a term references a wire outside `assignment`; callers
    /// validate the assignment length against [`R1cs::num_wires`] first.
    pub fn evaluate(&self, assignment: &[Fr]) -> Fr {
        self.terms
            .iter()
            .map(|t| t.coeff * assignment[t.wire])
            .sum()
    }

    fn max_wire(&self) -> Option<usize> {
        self.terms.iter().map(|t| t.wire).max()
    }
}

impl std::ops::Add for LinearCombination {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self.terms.extend(rhs.terms);
        self
    }
}

impl std::ops::Sub for LinearCombination {
    type Output = Self;

    fn sub(mut self, rhs: Self) -> Self {
        self.terms
            .extend(rhs.terms.into_iter().map(|t| Term { wire: t.wire, coeff: -t.coeff }));
        self
    }
}

impl std::ops::Mul<Fr> for LinearCombination {
    type Output = Self;

    fn mul(mut self, rhs: Fr) -> Self {
        for t in &mut self.terms {
            t.coeff *= rhs;
        }
        self
    }
}

/// One rank-1 constraint `a * b = c`.
#[derive(Debug, Clone, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct Constraint {
    pub a: LinearCombination,
    pub b: LinearCombination,
    pub c: LinearCombination,
}

/// A complete constraint system with its wire layout.
#[derive(Debug, Clone, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct R1cs {
    /// Number of public signals (excluding the constant-one wire).
    pub num_public: usize,
    /// Total number of wires, including the constant-one wire.
    pub num_wires: usize,
    pub constraints: Vec<Constraint>,
}

impl R1cs {
    /// SHA-256 over the wire layout and every term, in constraint order.
    ///
    /// Two systems share a digest exactly when they have the same layout and
    /// the same constraints in the same order.
    pub fn digest(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update((self.num_public as u64).to_be_bytes());
        hasher.update((self.num_wires as u64).to_be_bytes());
        hasher.update((self.constraints.len() as u64).to_be_bytes());
        for constraint in &self.constraints {
            for lc in [&constraint.a, &constraint.b, &constraint.c] {
                hasher.update((lc.terms.len() as u64).to_be_bytes());
                for term in &lc.terms {
                    hasher.update((term.wire as u64).to_be_bytes());
                    hasher.update(field::to_be_bytes(&term.coeff));
                }
            }
        }
        hasher.finalize().into()
    }

    /// Number of private wires.
    pub fn num_private(&self) -> usize {
        self.num_wires - 1 - self.num_public
    }

    /// Check that every constraint references an allocated wire.
    pub fn is_well_formed(&self) -> bool {
        self.num_wires > self.num_public
            && self.constraints.iter().all(|c| {
                [&c.a, &c.b, &c.c]
                    .iter()
                    .all(|lc| lc.max_wire().map_or(true, |w| w < self.num_wires))
            })
    }

    /// Check a full assignment.
    ///
    /// Returns the index of the first unsatisfied constraint on failure.
    /// An assignment of the wrong length or without a leading one fails at
    /// constraint `0`.
    pub fn check_assignment(&self, assignment: &[Fr]) -> std::result::Result<(), usize> {
        if assignment.is_empty()
            || assignment.len() != self.num_wires
            || assignment[ONE_WIRE] != Fr::one()
        {
            return Err(0);
        }
        for (i, c) in self.constraints.iter().enumerate() {
            let lhs = c.a.evaluate(assignment) * c.b.evaluate(assignment);
            if lhs != c.c.evaluate(assignment) {
                return Err(i);
            }
        }
        Ok(())
    }
}
