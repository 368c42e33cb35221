use std::path::Path;

use anyhow::Result;

use snarkwrap_core::artifacts::read_file;
use snarkwrap_core::error::FinalizeError;
use snarkwrap_core::field;
use snarkwrap_core::stage::WitnessGenerator;
use snarkwrap_stark::{PublicInput, StarkWitnessGenerator};

use crate::output;

/// Verify a STARK proof and write the verifier-circuit witness.
pub async fn run(input_path: &Path, public_input: Option<&Path>, output_path: &Path) -> Result<()> {
    output::print_header("snarkwrap witness");
    output::print_key_value("Input", &input_path.display().to_string());

    let generator = match public_input {
        Some(path) => {
            let bytes = read_file(path)?;
            let public_input: PublicInput = serde_json::from_slice(&bytes)
                .map_err(|e| FinalizeError::artifact("public input", e.to_string()))?;
            output::print_key_value("Public input", &path.display().to_string());
            StarkWitnessGenerator::with_public_input(public_input)
        }
        None => StarkWitnessGenerator::new(),
    };

    output::print_step(1, 2, "Verifying STARK proof...");
    let artifact = read_file(input_path)?;
    let witness = generator.generate_witness(&artifact)?;

    output::print_step(2, 2, "Writing witness...");
    witness.write(output_path)?;

    output::print_success("Witness generated");
    output::print_key_value("Witness file", &output_path.display().to_string());
    output::print_key_value("Wires", &witness.len().to_string());
    output::print_key_value("Circuit", &hex::encode(witness.circuit_digest));
    for (i, signal) in witness.public_signals().iter().enumerate() {
        output::print_key_value(&format!("Signal {i}"), &field::to_decimal(signal));
    }

    Ok(())
}
