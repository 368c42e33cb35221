use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use rand::rngs::OsRng;

use snarkwrap_core::config::CalldataFormat;
use snarkwrap_core::pipeline::{Pipeline, RunLayout};
use snarkwrap_groth16::{AbiCalldataExporter, Groth16Prover};
use snarkwrap_stark::StarkWitnessGenerator;

use crate::output;
use crate::ProverArgs;

/// Run all three stages on one STARK proof, writing every artifact and a
/// manifest under the output directory.
pub async fn run(
    config_path: &Path,
    input_path: &Path,
    proving_key: Option<&Path>,
    out_dir: Option<&Path>,
    timeout: Option<u64>,
    format: Option<CalldataFormat>,
    resources: &ProverArgs,
) -> Result<()> {
    output::print_header("snarkwrap run");

    let config = super::load_config(config_path)?;
    let key_path = proving_key.unwrap_or(config.proving_key.as_path());
    let layout = RunLayout::new(
        out_dir.unwrap_or(config.output_dir.as_path()),
        format.unwrap_or(config.calldata.format),
    );
    output::print_key_value("Input", &input_path.display().to_string());
    output::print_key_value("Output", &layout.out_dir.display().to_string());
    if let Some(secs) = timeout {
        output::print_key_value("Timeout", &format!("{secs}s"));
    }

    let prover_config = super::prover_config(&config, resources)?;
    let with_selector = config.calldata.selector;

    output::print_step(1, 1, "Running witness → prove → export...");
    let input = input_path.to_path_buf();
    let key_path = key_path.to_path_buf();
    let job_layout = layout.clone();
    let timeout = timeout.map(Duration::from_secs);
    let manifest = super::run_blocking("Finalizing proof", timeout, move |cancel| {
        let key = super::load_proving_key(&key_path)?;
        let exporter = AbiCalldataExporter {
            expected_signals: key.num_public(),
            with_selector,
        };
        let prover = Groth16Prover::new(Arc::new(key), prover_config);
        let pipeline = Pipeline::new(StarkWitnessGenerator::new(), prover, exporter);
        Ok(pipeline.run_to_dir(&input, &job_layout, &mut OsRng, &cancel)?)
    })
    .await?;

    output::print_success("Run complete");
    output::print_key_value("Circuit", &manifest.circuit_digest);
    output::print_key_value("Witness", &manifest.witness.display().to_string());
    output::print_key_value("Proof", &manifest.proof.display().to_string());
    output::print_key_value("Public signals", &manifest.public_signals.display().to_string());
    output::print_key_value("Calldata", &manifest.calldata.display().to_string());
    output::print_key_value("Manifest", &layout.manifest().display().to_string());

    Ok(())
}
