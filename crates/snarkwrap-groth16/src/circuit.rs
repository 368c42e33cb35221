//! Adapter from [`R1cs`] to the arkworks constraint-synthesis interface.

use ark_bn254::Fr;
use ark_relations::lc;
use ark_relations::r1cs::{
    ConstraintSynthesizer, ConstraintSystemRef, LinearCombination, SynthesisError, Variable,
};

use snarkwrap_core::r1cs::{self, R1cs};

/// An [`R1cs`] with an optional full assignment.
///
/// Without an assignment the circuit can only be used for key setup.
pub struct R1csCircuit<'a> {
    r1cs: &'a R1cs,
    assignment: Option<&'a [Fr]>,
}

impl<'a> R1csCircuit<'a> {
    /// Shape only, for key generation.
    pub fn shape(r1cs: &'a R1cs) -> Self {
        Self {
            r1cs,
            assignment: None,
        }
    }

    /// Shape plus a full wire assignment (`assignment[0]` is the constant one).
    pub fn with_assignment(r1cs: &'a R1cs, assignment: &'a [Fr]) -> Self {
        Self {
            r1cs,
            assignment: Some(assignment),
        }
    }
}

fn to_lc(lc: &r1cs::LinearCombination, vars: &[Variable]) -> LinearCombination<Fr> {
    lc.terms
        .iter()
        .fold(lc!(), |acc, term| acc + (term.coeff, vars[term.wire]))
}

impl ConstraintSynthesizer<Fr> for R1csCircuit<'_> {
    fn generate_constraints(self, cs: ConstraintSystemRef<Fr>) -> Result<(), SynthesisError> {
        if !self.r1cs.is_well_formed() {
            return Err(SynthesisError::Unsatisfiable);
        }
        if let Some(assignment) = self.assignment {
            if assignment.len() != self.r1cs.num_wires {
                return Err(SynthesisError::AssignmentMissing);
            }
        }

        // Wire 0 is arkworks' implicit `One`; public wires must be allocated
        // before private ones to keep the same order.
        let mut vars = Vec::with_capacity(self.r1cs.num_wires);
        vars.push(Variable::One);
        for wire in 1..self.r1cs.num_wires {
            let assignment = self.assignment;
            let value = move || {
                assignment
                    .map(|a| a[wire])
                    .ok_or(SynthesisError::AssignmentMissing)
            };
            let var = if wire <= self.r1cs.num_public {
                cs.new_input_variable(value)?
            } else {
                cs.new_witness_variable(value)?
            };
            vars.push(var);
        }

        for constraint in &self.r1cs.constraints {
            cs.enforce_constraint(
                to_lc(&constraint.a, &vars),
                to_lc(&constraint.b, &vars),
                to_lc(&constraint.c, &vars),
            )?;
        }
        Ok(())
    }
}
