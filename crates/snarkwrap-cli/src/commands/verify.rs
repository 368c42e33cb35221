use std::path::Path;

use anyhow::{bail, Result};

use snarkwrap_core::artifacts::{read_file, Calldata};
use snarkwrap_groth16::{keys, verify_calldata};

use crate::output;

/// Read calldata written in `hex` or `binary` format.
fn read_calldata(path: &Path) -> Result<Calldata> {
    let bytes = read_file(path)?;
    match std::str::from_utf8(&bytes) {
        Ok(text) if text.trim_start().starts_with("0x") => Ok(Calldata::from_hex(text)?),
        _ => Ok(Calldata::new(bytes)),
    }
}

/// Check calldata against the verification key with the Groth16 pairing equation.
pub async fn run(
    config_path: &Path,
    vk_path: Option<&Path>,
    calldata_path: &Path,
    signals: Option<usize>,
) -> Result<()> {
    output::print_header("snarkwrap verify");

    let config = super::load_config(config_path)?;
    let vk_path = vk_path.unwrap_or(config.verification_key.as_path());
    let vk = keys::load_vk(vk_path)?;
    let signals = signals.unwrap_or(vk.gamma_abc_g1.len().saturating_sub(1));
    output::print_key_value("Verification key", &vk_path.display().to_string());
    output::print_key_value("Public signals", &signals.to_string());

    let calldata = read_calldata(calldata_path)?;
    if verify_calldata(&vk, calldata.as_bytes(), signals)? {
        output::print_success("Calldata accepted");
        Ok(())
    } else {
        bail!("calldata rejected by the verification key")
    }
}
