use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use rand::rngs::OsRng;

use snarkwrap_core::artifacts::Witness;
use snarkwrap_core::stage::SnarkProver;
use snarkwrap_groth16::Groth16Prover;

use crate::output;
use crate::ProverArgs;

/// Generate a Groth16 proof from a witness file.
///
/// Writes snarkjs-compatible `proof.json` and `public.json`. Ctrl-C cancels
/// the proof at its next checkpoint.
pub async fn run(
    config_path: &Path,
    witness_path: &Path,
    proving_key: Option<&Path>,
    proof_path: &Path,
    public_path: &Path,
    resources: &ProverArgs,
) -> Result<()> {
    output::print_header("snarkwrap prove");

    let config = super::load_config(config_path)?;
    let key_path = proving_key.unwrap_or(config.proving_key.as_path());
    let prover_config = super::prover_config(&config, resources)?;

    output::print_step(1, 3, "Loading witness...");
    let witness = Witness::read(witness_path)?;
    output::print_key_value("Wires", &witness.len().to_string());
    let stack_mib = prover_config.stack_size / (1024 * 1024);
    output::print_key_value("Stack size", &format!("{stack_mib} MiB"));

    output::print_step(2, 3, "Loading proving key and generating proof...");
    let key_path = key_path.to_path_buf();
    let proof = super::run_blocking("Proving", None, move |cancel| {
        let key = super::load_proving_key(&key_path)?;
        tracing::info!("proving key loaded: {} constraints", key.r1cs.constraints.len());
        let prover = Groth16Prover::new(Arc::new(key), prover_config);
        Ok(prover.prove(&witness, &mut OsRng, &cancel)?)
    })
    .await?;

    output::print_step(3, 3, "Writing proof...");
    proof.save(proof_path, public_path)?;

    output::print_success("Proof generated");
    output::print_key_value("Proof file", &proof_path.display().to_string());
    output::print_key_value("Public signals", &public_path.display().to_string());

    Ok(())
}
