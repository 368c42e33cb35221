//! Fixture prover for the do-work computation.
//!
//! Produces proofs that [`crate::verifier::verify`] accepts. It exists so
//! tests and local tooling can manufacture valid inputs for the pipeline; it
//! is not tuned for large traces.

use ark_bn254::Fr;
use ark_ff::Field;
use ark_poly::{EvaluationDomain, Radix2EvaluationDomain};

use snarkwrap_core::error::{FinalizeError, Result};

use crate::air::{self, Domain};
use crate::merkle::{self, MerkleTree};
use crate::proof::{
    FriOpening, PublicInput, QueryProof, StarkArtifact, StarkParams, StarkProof, TraceOpening,
    PROOF_VERSION,
};
use crate::transcript::Transcript;
use crate::verifier::{absorb_statement, TRANSCRIPT_LABEL};

fn internal(reason: &str) -> FinalizeError {
    FinalizeError::MalformedProof(format!("fixture prover: {reason}"))
}

/// Prove `params.trace_length` steps of the computation from `start`.
pub fn prove(params: StarkParams, start: Fr) -> Result<StarkArtifact> {
    params.validate()?;
    let domain = Domain::new(params)?;
    let n = params.trace_length;
    let m = params.lde_size();

    let trace = air::execute(start, n);
    let public_input = PublicInput {
        start,
        result: trace[n - 1],
    };

    // Interpolate over <g>, then evaluate on h·<ω>.
    let trace_domain = Radix2EvaluationDomain::<Fr>::new(n).ok_or_else(|| internal("trace domain"))?;
    let coeffs = trace_domain.ifft(&trace);
    let lde_domain = Radix2EvaluationDomain::<Fr>::new(m)
        .and_then(|d| d.get_coset(domain.offset))
        .ok_or_else(|| internal("lde domain"))?;
    let trace_lde = lde_domain.fft(&coeffs);

    let trace_tree = MerkleTree::new(trace_lde.iter().map(merkle::trace_leaf).collect());

    let mut transcript = Transcript::new(TRANSCRIPT_LABEL);
    absorb_statement(&mut transcript, &params, &public_input, &trace_tree.root());
    let alpha = transcript.challenge_scalar();
    let beta = transcript.challenge_scalar();

    let mut layer = (0..m)
        .map(|i| {
            air::composition(
                &domain,
                &public_input,
                alpha,
                beta,
                domain.lde_point(i),
                trace_lde[i],
                trace_lde[domain.next_index(i)],
            )
            .ok_or_else(|| internal("composition denominator vanished"))
        })
        .collect::<Result<Vec<Fr>>>()?;

    let mut layers = Vec::with_capacity(params.num_fri_layers());
    let mut trees = Vec::with_capacity(params.num_fri_layers());
    let mut fri_roots = Vec::with_capacity(params.num_fri_layers());
    let mut layer_offset = domain.offset;
    let mut layer_generator = domain.lde_generator;

    for _ in 0..params.num_fri_layers() {
        let half = layer.len() / 2;
        let tree = MerkleTree::new(
            (0..half)
                .map(|j| merkle::fri_leaf(&layer[j], &layer[j + half]))
                .collect(),
        );
        transcript.append_digest(&tree.root());
        let beta_k = transcript.challenge_scalar();

        let mut x = layer_offset;
        let mut next = Vec::with_capacity(half);
        for j in 0..half {
            next.push(air::fold(layer[j], layer[j + half], beta_k, x).ok_or_else(|| internal("fold at zero"))?);
            x *= layer_generator;
        }

        fri_roots.push(tree.root());
        trees.push(tree);
        layers.push(std::mem::replace(&mut layer, next));
        layer_offset.square_in_place();
        layer_generator.square_in_place();
    }

    let fri_remainder = layer[0];
    if layer.iter().any(|v| *v != fri_remainder) {
        return Err(internal("composition polynomial exceeds the degree bound"));
    }
    transcript.append_scalar(&fri_remainder);

    let queries = (0..params.num_queries)
        .map(|_| {
            let index = transcript.challenge_index(m);
            let next = domain.next_index(index);
            let fri = layers
                .iter()
                .zip(&trees)
                .map(|(values, tree)| {
                    let half = values.len() / 2;
                    let leaf = index % half;
                    FriOpening {
                        values: vec![values[leaf], values[leaf + half]],
                        path: tree.open(leaf),
                    }
                })
                .collect();
            QueryProof {
                trace: TraceOpening {
                    value: trace_lde[index],
                    path: trace_tree.open(index),
                },
                trace_next: TraceOpening {
                    value: trace_lde[next],
                    path: trace_tree.open(next),
                },
                fri,
            }
        })
        .collect();

    tracing::debug!("fixture proof: {} rows, {} FRI layers", n, fri_roots.len());

    Ok(StarkArtifact {
        proof: StarkProof {
            version: PROOF_VERSION,
            params,
            claim_digest: public_input.digest(),
            trace_root: trace_tree.root(),
            fri_roots,
            fri_remainder,
            queries,
        },
        public_input,
    })
}
