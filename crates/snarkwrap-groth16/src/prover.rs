//! Groth16 proving over a verifier-circuit witness.
//!
//! Proving runs in stages (synthesis, QAP witness map, then the A, B and C
//! multi-scalar multiplications) with a cancellation check between each.

use std::ops::AddAssign;
use std::sync::Arc;

use ark_bn254::{Bn254, Fr, G1Projective};
use ark_ec::{AffineRepr, CurveGroup, VariableBaseMSM};
use ark_ff::{PrimeField, UniformRand};
use ark_groth16::r1cs_to_qap::{LibsnarkReduction, R1CSToQAP};
use ark_groth16::{prepare_verifying_key, Groth16, Proof};
use ark_poly::GeneralEvaluationDomain;
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystem, OptimizationGoal};
use ark_snark::SNARK;
use rand::{CryptoRng, RngCore};

use snarkwrap_core::artifacts::Witness;
use snarkwrap_core::cancel::CancellationToken;
use snarkwrap_core::config::ProverConfig;
use snarkwrap_core::error::{FinalizeError, Result};
use snarkwrap_core::proof::SnarkProof;
use snarkwrap_core::r1cs::R1cs;
use snarkwrap_core::stage::SnarkProver;

use crate::circuit::R1csCircuit;

/// Stack every proving worker needs regardless of circuit size.
const BASE_STACK_BYTES: usize = 4 * 1024 * 1024;

/// Extra stack per doubling of the evaluation domain.
const STACK_BYTES_PER_LEVEL: usize = 256 * 1024;

/// Estimated worker stack needed to prove `r1cs`.
///
/// Grows with the depth of the FFT and MSM recursion, i.e. with the log of
/// the constraint domain.
pub fn required_stack_bytes(r1cs: &R1cs) -> usize {
    let domain = (r1cs.constraints.len() + r1cs.num_public + 1).next_power_of_two();
    BASE_STACK_BYTES + STACK_BYTES_PER_LEVEL * domain.trailing_zeros() as usize
}

/// Proves witnesses against one shared proving key.
pub struct Groth16Prover {
    key: Arc<crate::keys::ProvingKey>,
    config: ProverConfig,
}

impl Groth16Prover {
    pub fn new(key: Arc<crate::keys::ProvingKey>, config: ProverConfig) -> Self {
        Self { key, config }
    }

    pub fn key(&self) -> &crate::keys::ProvingKey {
        &self.key
    }

    fn build_pool(&self) -> Result<rayon::ThreadPool> {
        rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.threads.unwrap_or(0))
            .stack_size(self.config.stack_size)
            .thread_name(|i| format!("snarkwrap-prover-{i}"))
            .build()
            .map_err(|e| internal("starting the prover pool", e))
    }
}

impl SnarkProver for Groth16Prover {
    fn name(&self) -> &'static str {
        "groth16"
    }

    fn prove<R: RngCore + CryptoRng + Send>(
        &self,
        witness: &Witness,
        rng: &mut R,
        cancel: &CancellationToken,
    ) -> Result<SnarkProof> {
        cancel.check()?;
        self.key.check_witness(witness)?;
        self.key
            .r1cs
            .check_assignment(&witness.values)
            .map_err(|constraint| FinalizeError::CircuitUnsatisfied { constraint })?;

        let required = required_stack_bytes(&self.key.r1cs);
        if self.config.stack_size < required {
            return Err(FinalizeError::InsufficientStack {
                required,
                configured: self.config.stack_size,
            });
        }

        cancel.check()?;
        let pool = self.build_pool()?;
        tracing::debug!(
            "proving {} constraints on {} threads, {} byte stacks",
            self.key.r1cs.constraints.len(),
            pool.current_num_threads(),
            self.config.stack_size
        );

        let key = &self.key;
        let proof = pool.install(|| prove_staged(key, &witness.values, rng, cancel))?;
        cancel.check()?;

        // Self-check against the key's own verifying key before releasing the proof.
        let public_signals = witness.public_signals().to_vec();
        let pvk = prepare_verifying_key(&self.key.key.vk);
        let valid = Groth16::<Bn254>::verify_with_processed_vk(&pvk, &public_signals, &proof)
            .map_err(|e| internal("self-verification", e))?;
        if !valid {
            return Err(FinalizeError::ProverInternalError(
                "generated proof does not verify against the proving key".into(),
            ));
        }

        Ok(SnarkProof {
            a: proof.a,
            b: proof.b,
            c: proof.c,
            public_signals,
        })
    }
}

fn internal(stage: &str, e: impl std::fmt::Display) -> FinalizeError {
    FinalizeError::ProverInternalError(format!("{stage} failed: {e}"))
}

/// `blind + query[0] + <query[1..], scalars> + offset`
fn query_sum<G>(
    blind: G::Group,
    query: &[G],
    offset: G,
    scalars: &[<G::ScalarField as PrimeField>::BigInt],
) -> G::Group
where
    G: AffineRepr,
    G::Group: VariableBaseMSM<MulBase = G>,
{
    let mut acc = blind;
    acc.add_assign(&query[0]);
    acc += &G::Group::msm_bigint(&query[1..], scalars);
    acc.add_assign(&offset);
    acc
}

/// Produce a proof for a satisfying `values`, polling `cancel` between stages.
fn prove_staged<R: RngCore + CryptoRng>(
    key: &crate::keys::ProvingKey,
    values: &[Fr],
    rng: &mut R,
    cancel: &CancellationToken,
) -> Result<Proof<Bn254>> {
    let cs = ConstraintSystem::<Fr>::new_ref();
    cs.set_optimization_goal(OptimizationGoal::Constraints);
    R1csCircuit::with_assignment(&key.r1cs, values)
        .generate_constraints(cs.clone())
        .map_err(|e| internal("constraint synthesis", e))?;
    cs.finalize();
    let matrices = cs
        .to_matrices()
        .ok_or_else(|| internal("constraint synthesis", "no constraint matrices"))?;
    let num_inputs = cs.num_instance_variables();
    let num_constraints = cs.num_constraints();
    drop(cs);
    cancel.check()?;

    let h = LibsnarkReduction::witness_map_from_matrices::<Fr, GeneralEvaluationDomain<Fr>>(
        &matrices,
        num_inputs,
        num_constraints,
        values,
    )
    .map_err(|e| internal("witness map", e))?;
    drop(matrices);
    tracing::debug!("witness map done over {} points", h.len());
    cancel.check()?;

    let pk = &key.key;
    let r = Fr::rand(rng);
    let s = Fr::rand(rng);
    // every wire except the constant one
    let assignment: Vec<_> = values[1..].iter().map(|v| v.into_bigint()).collect();
    let h: Vec<_> = h.iter().map(|v| v.into_bigint()).collect();
    let mut g_c = G1Projective::msm_bigint(&pk.h_query, &h);
    g_c += G1Projective::msm_bigint(&pk.l_query, &assignment[num_inputs - 1..]);
    drop(h);
    cancel.check()?;

    let g_a = query_sum(pk.delta_g1 * r, &pk.a_query, pk.vk.alpha_g1, &assignment);
    let g1_b = query_sum(pk.delta_g1 * s, &pk.b_g1_query, pk.beta_g1, &assignment);
    cancel.check()?;

    let g2_b = query_sum(pk.vk.delta_g2 * s, &pk.b_g2_query, pk.vk.beta_g2, &assignment);
    g_c += g_a * s;
    g_c += g1_b * r;
    g_c -= pk.delta_g1 * (r * s);

    Ok(Proof {
        a: g_a.into_affine(),
        b: g2_b.into_affine(),
        c: g_c.into_affine(),
    })
}
