use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rand::rngs::OsRng;

use snarkwrap_groth16::keys;
use snarkwrap_stark::{circuit_for, StarkParams};

use crate::output;

/// Generate development Groth16 keys for the verifier circuit of `params`.
///
/// Keys come from local randomness and are unsuitable for production use.
pub async fn run(
    config_path: &Path,
    trace_length: usize,
    blowup: usize,
    queries: usize,
    out_dir: Option<&Path>,
) -> Result<()> {
    output::print_header("snarkwrap setup");

    let config = super::load_config(config_path)?;
    let (pk_path, vk_path): (PathBuf, PathBuf) = match out_dir {
        Some(dir) => (dir.join("proving.key"), dir.join("verification_key.json")),
        None => (config.proving_key.clone(), config.verification_key.clone()),
    };

    let params = StarkParams {
        trace_length,
        blowup,
        num_queries: queries,
    };
    output::print_key_value("Trace length", &trace_length.to_string());
    output::print_key_value("Blowup", &blowup.to_string());
    output::print_key_value("Queries", &queries.to_string());

    output::print_step(1, 3, "Synthesizing verifier circuit...");
    let r1cs = circuit_for(params)?;
    output::print_key_value("Constraints", &r1cs.constraints.len().to_string());
    output::print_key_value("Wires", &r1cs.num_wires.to_string());

    output::print_step(2, 3, "Running Groth16 setup...");
    output::print_warning("keys are generated from local randomness; use a ceremony for production");
    let spinner = output::spinner("Generating keys");
    let setup = keys::setup(r1cs, &mut OsRng);
    spinner.finish_and_clear();
    let (pk, vk) = setup?;

    output::print_step(3, 3, "Writing keys...");
    pk.save(&pk_path)
        .with_context(|| format!("failed to write proving key to {}", pk_path.display()))?;
    keys::save_vk(&vk, &vk_path)?;

    output::print_success("Keys generated");
    output::print_key_value("Circuit", &hex::encode(pk.circuit_digest));
    output::print_key_value("Proving key", &pk_path.display().to_string());
    output::print_key_value("Verification key", &vk_path.display().to_string());

    Ok(())
}
