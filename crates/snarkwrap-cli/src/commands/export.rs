use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use snarkwrap_core::artifacts::write_durable;
use snarkwrap_core::config::CalldataFormat;
use snarkwrap_core::proof::SnarkProof;
use snarkwrap_core::stage::CalldataExporter;
use snarkwrap_groth16::calldata::verify_signature;
use snarkwrap_groth16::AbiCalldataExporter;

use crate::output;

/// Encode `proof.json` + `public.json` as verifier calldata.
///
/// Calldata goes to stdout unless `output_path` is set; status lines go to
/// stderr either way.
pub async fn run(
    config_path: &Path,
    proof_path: &Path,
    public_path: &Path,
    signals: usize,
    format: Option<CalldataFormat>,
    no_selector: bool,
    output_path: Option<&Path>,
) -> Result<()> {
    output::print_header("snarkwrap export");

    let config = super::load_config(config_path)?;
    let format = format.unwrap_or(config.calldata.format);
    let exporter = AbiCalldataExporter {
        expected_signals: signals,
        with_selector: config.calldata.selector && !no_selector,
    };
    output::print_key_value("Format", &format.to_string());
    output::print_key_value("Entry point", &verify_signature(signals));

    let proof = SnarkProof::load(proof_path, public_path)?;
    let calldata = exporter.export(&proof)?;
    let rendered = exporter.render(&calldata, format)?;

    match output_path {
        Some(path) => {
            write_durable(path, &rendered)?;
            output::print_success(&format!("Calldata written to {}", path.display()));
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&rendered).context("failed to write calldata to stdout")?;
            if format != CalldataFormat::Binary {
                writeln!(stdout).context("failed to write calldata to stdout")?;
            }
            stdout.flush().context("failed to write calldata to stdout")?;
        }
    }
    output::print_key_value("Calldata size", &format!("{} bytes", calldata.len()));

    Ok(())
}
