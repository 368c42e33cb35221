//! End-to-end tests: STARK proof → witness → Groth16 proof → calldata → verifier.
//!
//! STARK proofs come from the fixture prover of `snarkwrap-stark`.

use std::sync::{Arc, OnceLock};

use ark_bn254::{Bn254, Fr};
use ark_ff::One;
use ark_groth16::VerifyingKey;
use rand::rngs::StdRng;
use rand::SeedableRng;

use snarkwrap_core::artifacts::{RunManifest, Witness};
use snarkwrap_core::cancel::CancellationToken;
use snarkwrap_core::config::{CalldataFormat, ProverConfig};
use snarkwrap_core::error::FinalizeError;
use snarkwrap_core::pipeline::{Pipeline, RunLayout};
use snarkwrap_core::proof::SnarkProof;
use snarkwrap_core::stage::{CalldataExporter, SnarkProver, WitnessGenerator};
use snarkwrap_groth16::{keys, verify_calldata, AbiCalldataExporter, Groth16Prover, ProvingKey};
use snarkwrap_stark::prover as stark_prover;
use snarkwrap_stark::{
    circuit, circuit_for, PublicInput, StarkArtifact, StarkParams, StarkWitnessGenerator,
};

fn params() -> StarkParams {
    StarkParams {
        trace_length: 8,
        blowup: 4,
        num_queries: 2,
    }
}

fn stark_artifact() -> StarkArtifact {
    stark_prover::prove(params(), Fr::from(42u64)).unwrap()
}

/// One setup per test binary; the verifier circuit has tens of thousands of constraints.
fn dev_keys() -> (Arc<ProvingKey>, VerifyingKey<Bn254>) {
    static KEYS: OnceLock<(Arc<ProvingKey>, VerifyingKey<Bn254>)> = OnceLock::new();
    KEYS.get_or_init(|| {
        let r1cs = circuit_for(params()).unwrap();
        let (pk, vk) = keys::setup(r1cs, &mut StdRng::seed_from_u64(2024)).unwrap();
        (Arc::new(pk), vk)
    })
    .clone()
}

fn groth16_prover(pk: Arc<ProvingKey>) -> Groth16Prover {
    Groth16Prover::new(pk, ProverConfig::default())
}

fn witness_for(artifact: &StarkArtifact) -> Witness {
    StarkWitnessGenerator::new()
        .generate_witness(&artifact.to_json().unwrap())
        .unwrap()
}

fn prove(prover: &Groth16Prover, witness: &Witness, seed: u64) -> SnarkProof {
    prover
        .prove(witness, &mut StdRng::seed_from_u64(seed), &CancellationToken::new())
        .unwrap()
}

#[test]
fn test_valid_stark_proof_yields_accepted_calldata() {
    let artifact = stark_artifact();
    let (pk, vk) = dev_keys();
    let prover = groth16_prover(pk);

    let witness = witness_for(&artifact);
    let proof = prove(&prover, &witness, 1);
    assert_eq!(
        proof.public_signals,
        vec![artifact.public_input.start, artifact.public_input.result]
    );

    let exporter = AbiCalldataExporter::new(2);
    let calldata = exporter.export(&proof).unwrap();
    assert_eq!(calldata.len(), 4 + 256 + 64);
    assert!(verify_calldata(&vk, calldata.as_bytes(), 2).unwrap());
}

#[test]
fn test_changed_public_input_never_reaches_prover() {
    let mut artifact = stark_artifact();
    artifact.public_input.start = Fr::from(43u64);
    let err = StarkWitnessGenerator::new()
        .generate_witness(&artifact.to_json().unwrap())
        .unwrap_err();
    assert!(matches!(err, FinalizeError::PublicInputMismatch(_)), "{err}");

    artifact.proof.claim_digest = artifact.public_input.digest();
    let err = StarkWitnessGenerator::new()
        .generate_witness(&artifact.to_json().unwrap())
        .unwrap_err();
    assert!(matches!(err, FinalizeError::MalformedProof(_)), "{err}");
}

#[test]
fn test_changed_calldata_signal_is_rejected() {
    let (pk, vk) = dev_keys();
    let prover = groth16_prover(pk);
    let proof = prove(&prover, &witness_for(&stark_artifact()), 1);

    let mut bytes = AbiCalldataExporter::new(2).export(&proof).unwrap().into_bytes();
    // claim a different result
    let last = bytes.len() - 1;
    bytes[last] ^= 1;
    assert!(!verify_calldata(&vk, &bytes, 2).unwrap());
}

#[test]
fn test_reproving_changes_points_not_signals() {
    let (pk, vk) = dev_keys();
    let prover = groth16_prover(pk);
    let witness = witness_for(&stark_artifact());

    let first = prove(&prover, &witness, 1);
    let second = prove(&prover, &witness, 2);
    assert_ne!((first.a, first.c), (second.a, second.c));
    assert_eq!(first.public_signals, second.public_signals);

    let exporter = AbiCalldataExporter::new(2).without_selector();
    for proof in [&first, &second] {
        let calldata = exporter.export(proof).unwrap();
        assert!(verify_calldata(&vk, calldata.as_bytes(), 2).unwrap());
    }
}

#[test]
fn test_witness_for_other_circuit_is_key_mismatch() {
    let (pk, _) = dev_keys();
    let prover = groth16_prover(pk);
    let other_params = StarkParams {
        num_queries: 3,
        ..params()
    };
    let other = stark_prover::prove(other_params, Fr::from(42u64)).unwrap();
    let err = prover
        .prove(&witness_for(&other), &mut StdRng::seed_from_u64(1), &CancellationToken::new())
        .unwrap_err();
    assert!(matches!(err, FinalizeError::ProvingKeyMismatch(_)), "{err}");
}

#[test]
fn test_stack_allowance_is_enforced() {
    let (pk, _) = dev_keys();
    let witness = witness_for(&stark_artifact());

    let small = Groth16Prover::new(
        pk.clone(),
        ProverConfig {
            threads: Some(1),
            stack_size: 2 * 1024 * 1024,
        },
    );
    let err = small
        .prove(&witness, &mut StdRng::seed_from_u64(1), &CancellationToken::new())
        .unwrap_err();
    assert!(matches!(err, FinalizeError::InsufficientStack { .. }), "{err}");
    assert_eq!(err.exit_code(), 22);

    let default = Groth16Prover::new(pk, ProverConfig::default());
    assert!(default
        .prove(&witness, &mut StdRng::seed_from_u64(1), &CancellationToken::new())
        .is_ok());
}

#[test]
fn test_tampered_witness_is_unsatisfied() {
    let (pk, _) = dev_keys();
    let prover = groth16_prover(pk);
    let mut witness = witness_for(&stark_artifact());
    // claimed result
    witness.values[2] += Fr::one();
    let err = prover
        .prove(&witness, &mut StdRng::seed_from_u64(1), &CancellationToken::new())
        .unwrap_err();
    assert!(matches!(err, FinalizeError::CircuitUnsatisfied { .. }), "{err}");
}

#[test]
fn test_forged_statement_cannot_be_proven() {
    let (pk, vk) = dev_keys();
    let prover = groth16_prover(pk.clone());

    // An honest STARK proof relabelled with a statement it does not prove,
    // plus a witness built directly from it, skipping the native verifier.
    let mut forged = stark_artifact();
    forged.public_input = PublicInput {
        start: Fr::from(1u64),
        result: Fr::from(2u64),
    };
    let (_, values) = circuit::synthesize(&forged).unwrap();
    let witness = Witness::new(pk.circuit_digest, 2, values).unwrap();
    let err = prover
        .prove(&witness, &mut StdRng::seed_from_u64(1), &CancellationToken::new())
        .unwrap_err();
    assert!(matches!(err, FinalizeError::CircuitUnsatisfied { .. }), "{err}");

    // The honest proof's calldata does not verify under the forged signals either.
    let proof = prove(&prover, &witness_for(&stark_artifact()), 1);
    let forged_proof = SnarkProof {
        public_signals: vec![Fr::from(1u64), Fr::from(2u64)],
        ..proof
    };
    let calldata = AbiCalldataExporter::new(2).export(&forged_proof).unwrap();
    assert!(!verify_calldata(&vk, calldata.as_bytes(), 2).unwrap());
}

#[test]
fn test_pipeline_run_writes_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("stark_proof.json");
    std::fs::write(&input, stark_artifact().to_json().unwrap()).unwrap();

    let (pk, vk) = dev_keys();
    let pipeline = Pipeline::new(
        StarkWitnessGenerator::new(),
        groth16_prover(pk),
        AbiCalldataExporter::new(2),
    );
    let layout = RunLayout::new(dir.path().join("out"), CalldataFormat::Hex);
    let manifest = pipeline
        .run_to_dir(&input, &layout, &mut StdRng::seed_from_u64(9), &CancellationToken::new())
        .unwrap();

    assert_eq!(RunManifest::load(&layout.out_dir).unwrap(), manifest);
    assert_eq!(Witness::read(&manifest.witness).unwrap().num_public, 2);

    let proof = SnarkProof::load(&manifest.proof, &manifest.public_signals).unwrap();
    assert_eq!(proof.public_signals[0], Fr::from(42u64));

    let hex = std::fs::read_to_string(&manifest.calldata).unwrap();
    let calldata = snarkwrap_core::artifacts::Calldata::from_hex(&hex).unwrap();
    assert!(verify_calldata(&vk, calldata.as_bytes(), 2).unwrap());
}

#[test]
fn test_failed_pipeline_leaves_no_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("stark_proof.json");
    let mut artifact = stark_artifact();
    artifact.proof.fri_remainder += Fr::one();
    std::fs::write(&input, artifact.to_json().unwrap()).unwrap();

    let (pk, _) = dev_keys();
    let pipeline = Pipeline::new(
        StarkWitnessGenerator::new(),
        groth16_prover(pk),
        AbiCalldataExporter::new(2),
    );
    let layout = RunLayout::new(dir.path().join("out"), CalldataFormat::Solidity);
    let err = pipeline
        .run_to_dir(&input, &layout, &mut StdRng::seed_from_u64(9), &CancellationToken::new())
        .unwrap_err();
    assert_eq!(err.exit_code(), 10);
    assert!(!layout.manifest().exists());
    assert!(!layout.witness().exists());
}
