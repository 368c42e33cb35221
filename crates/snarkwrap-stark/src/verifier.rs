//! Native STARK verification.
//!
//! Every hash-based check (transcript replay, Merkle openings) happens here;
//! the verifier circuit then re-checks the algebra over the values this
//! module accepted.

use ark_bn254::Fr;
use ark_ff::Field;

use snarkwrap_core::error::{FinalizeError, Result};

use crate::air::{self, Domain};
use crate::merkle;
use crate::proof::{PublicInput, QueryProof, StarkArtifact, StarkParams, StarkProof, PROOF_VERSION};
use crate::transcript::Transcript;

/// Domain-separation label for the proof transcript.
pub const TRANSCRIPT_LABEL: &[u8] = b"snarkwrap-stark";

/// Values opened for one query after authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryValues {
    pub index: usize,
    /// `T(x)`.
    pub trace: Fr,
    /// `T(g·x)`.
    pub trace_next: Fr,
    /// Per layer: `(f_k(x_k), f_k(-x_k))` with `x_k = x^{2^k}`.
    pub fri: Vec<(Fr, Fr)>,
}

/// A proof that passed native verification, with its Fiat–Shamir challenges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedProof {
    pub params: StarkParams,
    pub public_input: PublicInput,
    pub alpha: Fr,
    pub beta: Fr,
    pub fri_betas: Vec<Fr>,
    pub remainder: Fr,
    pub queries: Vec<QueryValues>,
}

fn malformed(reason: impl Into<String>) -> FinalizeError {
    FinalizeError::MalformedProof(reason.into())
}

/// Challenges drawn before the query phase.
pub(crate) struct Challenges {
    pub alpha: Fr,
    pub beta: Fr,
    pub fri_betas: Vec<Fr>,
    pub indices: Vec<usize>,
}

/// Replay the transcript in the order the prover wrote it.
pub(crate) fn replay_transcript(proof: &StarkProof, public_input: &PublicInput) -> Challenges {
    let params = &proof.params;
    let mut transcript = Transcript::new(TRANSCRIPT_LABEL);
    absorb_statement(&mut transcript, params, public_input, &proof.trace_root);
    let alpha = transcript.challenge_scalar();
    let beta = transcript.challenge_scalar();

    let fri_betas = proof
        .fri_roots
        .iter()
        .map(|root| {
            transcript.append_digest(root);
            transcript.challenge_scalar()
        })
        .collect();

    transcript.append_scalar(&proof.fri_remainder);
    let indices = (0..params.num_queries)
        .map(|_| transcript.challenge_index(params.lde_size()))
        .collect();

    Challenges {
        alpha,
        beta,
        fri_betas,
        indices,
    }
}

pub(crate) fn absorb_statement(
    transcript: &mut Transcript,
    params: &StarkParams,
    public_input: &PublicInput,
    trace_root: &merkle::Digest,
) {
    transcript.append_u64(params.trace_length as u64);
    transcript.append_u64(params.blowup as u64);
    transcript.append_u64(params.num_queries as u64);
    transcript.append_scalar(&public_input.start);
    transcript.append_scalar(&public_input.result);
    transcript.append_digest(trace_root);
}

/// Check the proof's shape against its parameters before any hashing.
pub(crate) fn check_structure(proof: &StarkProof) -> Result<()> {
    let params = &proof.params;
    let layers = params.num_fri_layers();
    let lde_log = params.lde_log();

    if proof.fri_roots.len() != layers {
        return Err(malformed(format!(
            "expected {layers} FRI roots, found {}",
            proof.fri_roots.len()
        )));
    }
    if proof.queries.len() != params.num_queries {
        return Err(malformed(format!(
            "expected {} queries, found {}",
            params.num_queries,
            proof.queries.len()
        )));
    }
    for (q, query) in proof.queries.iter().enumerate() {
        for (name, opening) in [("trace", &query.trace), ("trace_next", &query.trace_next)] {
            if opening.path.len() != lde_log {
                return Err(malformed(format!(
                    "query {q}: {name} path has depth {}, expected {lde_log}",
                    opening.path.len()
                )));
            }
        }
        if query.fri.len() != layers {
            return Err(malformed(format!(
                "query {q}: expected {layers} FRI openings, found {}",
                query.fri.len()
            )));
        }
        for (k, opening) in query.fri.iter().enumerate() {
            if opening.values.len() != 2 {
                return Err(malformed(format!(
                    "query {q}: FRI layer {k} opens {} values, expected 2",
                    opening.values.len()
                )));
            }
            let depth = lde_log - k - 1;
            if opening.path.len() != depth {
                return Err(malformed(format!(
                    "query {q}: FRI layer {k} path has depth {}, expected {depth}",
                    opening.path.len()
                )));
            }
        }
    }
    Ok(())
}

/// Verify a STARK artifact completely.
///
/// Fails with `PublicInputMismatch` when the proof commits to a different
/// public input, and with `MalformedProof` for every other defect.
pub fn verify(artifact: &StarkArtifact) -> Result<VerifiedProof> {
    let proof = &artifact.proof;
    let public_input = &artifact.public_input;

    if proof.version != PROOF_VERSION {
        return Err(malformed(format!(
            "unsupported proof version {} (expected {PROOF_VERSION})",
            proof.version
        )));
    }
    proof.params.validate()?;

    if proof.claim_digest != public_input.digest() {
        return Err(FinalizeError::PublicInputMismatch(format!(
            "proof commits to claim {}, public input hashes to {}",
            hex::encode(proof.claim_digest),
            hex::encode(public_input.digest())
        )));
    }

    check_structure(proof)?;

    let params = proof.params;
    let domain = Domain::new(params)?;
    let challenges = replay_transcript(proof, public_input);
    tracing::debug!(
        "transcript replayed: {} FRI challenges, {} query indices",
        challenges.fri_betas.len(),
        challenges.indices.len()
    );

    let queries = proof
        .queries
        .iter()
        .zip(&challenges.indices)
        .enumerate()
        .map(|(q, (query, &index))| {
            verify_query(proof, public_input, &domain, &challenges, q, index, query)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(VerifiedProof {
        params,
        public_input: *public_input,
        alpha: challenges.alpha,
        beta: challenges.beta,
        fri_betas: challenges.fri_betas,
        remainder: proof.fri_remainder,
        queries,
    })
}

fn verify_query(
    proof: &StarkProof,
    public_input: &PublicInput,
    domain: &Domain,
    challenges: &Challenges,
    q: usize,
    index: usize,
    query: &QueryProof,
) -> Result<QueryValues> {
    let lde_size = proof.params.lde_size();

    if !merkle::verify_path(
        &proof.trace_root,
        merkle::trace_leaf(&query.trace.value),
        index,
        &query.trace.path,
    ) {
        return Err(malformed(format!("query {q}: trace opening at {index} does not match root")));
    }
    let next = domain.next_index(index);
    if !merkle::verify_path(
        &proof.trace_root,
        merkle::trace_leaf(&query.trace_next.value),
        next,
        &query.trace_next.path,
    ) {
        return Err(malformed(format!("query {q}: next-row opening at {next} does not match root")));
    }

    let x = domain.lde_point(index);
    let mut expected = air::composition(
        domain,
        public_input,
        challenges.alpha,
        challenges.beta,
        x,
        query.trace.value,
        query.trace_next.value,
    )
    .ok_or_else(|| malformed(format!("query {q}: evaluation point hits a denominator root")))?;

    let mut x_k = x;
    let mut fri = Vec::with_capacity(query.fri.len());
    for (k, opening) in query.fri.iter().enumerate() {
        let layer_size = lde_size >> k;
        let half = layer_size / 2;
        let position = index % layer_size;
        let leaf = merkle::fri_leaf(&opening.values[0], &opening.values[1]);
        if !merkle::verify_path(&proof.fri_roots[k], leaf, position % half, &opening.path) {
            return Err(malformed(format!("query {q}: FRI layer {k} opening does not match root")));
        }

        let (a, b) = if position < half {
            (opening.values[0], opening.values[1])
        } else {
            (opening.values[1], opening.values[0])
        };
        if a != expected {
            return Err(malformed(format!("query {q}: FRI layer {k} value is inconsistent")));
        }
        expected = air::fold(a, b, challenges.fri_betas[k], x_k)
            .ok_or_else(|| malformed(format!("query {q}: FRI layer {k} folds at zero")))?;
        fri.push((a, b));
        x_k.square_in_place();
    }

    if expected != proof.fri_remainder {
        return Err(malformed(format!("query {q}: FRI remainder mismatch")));
    }

    Ok(QueryValues {
        index,
        trace: query.trace.value,
        trace_next: query.trace_next.value,
        fri,
    })
}
