//! Proving and verifying keys.
//!
//! # Security Warning
//!
//! [`setup`] samples the toxic waste from local randomness. Keys produced
//! this way are for development only; production keys must come from a
//! multi-party ceremony.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use ark_bn254::Bn254;
use ark_ff::One;
use ark_groth16::{Groth16, VerifyingKey};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_snark::SNARK;
use rand::{CryptoRng, RngCore};
use serde_json::{json, Value};

use snarkwrap_core::artifacts::{read_file, write_durable, Witness};
use snarkwrap_core::error::{FinalizeError, Result};
use snarkwrap_core::proof::{g1_from_json, g1_to_json, g2_from_json, g2_to_json};
use snarkwrap_core::r1cs::R1cs;

use crate::circuit::R1csCircuit;

/// Magic bytes at the start of a proving key file.
pub const KEY_MAGIC: &[u8; 4] = b"SWPK";

/// Current proving key file format version.
pub const KEY_VERSION: u32 = 1;

/// A Groth16 proving key bound to the constraint system it was generated for.
#[derive(Debug)]
pub struct ProvingKey {
    pub r1cs: R1cs,
    pub key: ark_groth16::ProvingKey<Bn254>,
    pub circuit_digest: [u8; 32],
}

/// Run a circuit-specific Groth16 setup for `r1cs`.
pub fn setup<R: RngCore + CryptoRng>(r1cs: R1cs, rng: &mut R) -> Result<(ProvingKey, VerifyingKey<Bn254>)> {
    tracing::warn!("generating Groth16 keys from local randomness (development only)");
    let (key, vk) = Groth16::<Bn254>::circuit_specific_setup(R1csCircuit::shape(&r1cs), rng)
        .map_err(|e| FinalizeError::ProverInternalError(format!("setup failed: {e}")))?;
    let circuit_digest = r1cs.digest();
    tracing::info!(
        "setup complete: {} constraints, {} wires, circuit {}",
        r1cs.constraints.len(),
        r1cs.num_wires,
        hex::encode(circuit_digest)
    );
    Ok((
        ProvingKey {
            r1cs,
            key,
            circuit_digest,
        },
        vk,
    ))
}

impl ProvingKey {
    pub fn verifying_key(&self) -> &VerifyingKey<Bn254> {
        &self.key.vk
    }

    pub fn num_public(&self) -> usize {
        self.r1cs.num_public
    }

    /// Check that `witness` was derived for this key's circuit.
    pub fn check_witness(&self, witness: &Witness) -> Result<()> {
        if witness.circuit_digest != self.circuit_digest {
            return Err(FinalizeError::ProvingKeyMismatch(format!(
                "witness is for circuit {}, key is for circuit {}",
                hex::encode(witness.circuit_digest),
                hex::encode(self.circuit_digest)
            )));
        }
        if witness.len() != self.r1cs.num_wires {
            return Err(FinalizeError::ProvingKeyMismatch(format!(
                "witness has {} wires, circuit has {}",
                witness.len(),
                self.r1cs.num_wires
            )));
        }
        if witness.num_public != self.r1cs.num_public {
            return Err(FinalizeError::ProvingKeyMismatch(format!(
                "witness declares {} public signals, circuit has {}",
                witness.num_public, self.r1cs.num_public
            )));
        }
        if !witness.values[0].is_one() {
            return Err(FinalizeError::ProvingKeyMismatch("wire 0 is not the constant one".into()));
        }
        Ok(())
    }

    /// Write `magic | version | R1CS | key` with uncompressed points.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| FinalizeError::io(parent, e))?;
        }
        let tmp = path.with_extension("key.tmp");
        let file = File::create(&tmp).map_err(|e| FinalizeError::io(&tmp, e))?;
        let mut writer = BufWriter::new(file);
        writer.write_all(KEY_MAGIC).map_err(|e| FinalizeError::io(&tmp, e))?;
        writer
            .write_all(&KEY_VERSION.to_be_bytes())
            .map_err(|e| FinalizeError::io(&tmp, e))?;
        self.r1cs
            .serialize_uncompressed(&mut writer)
            .and_then(|_| self.key.serialize_uncompressed(&mut writer))
            .map_err(|e| FinalizeError::artifact("proving key", e.to_string()))?;
        let file = writer
            .into_inner()
            .map_err(|e| FinalizeError::io(&tmp, e.into_error()))?;
        file.sync_all().map_err(|e| FinalizeError::io(&tmp, e))?;
        std::fs::rename(&tmp, path).map_err(|e| FinalizeError::io(path, e))?;
        Ok(())
    }

    /// Load a key written by [`ProvingKey::save`].
    ///
    /// Points are not re-validated: the file is a trusted local artifact and
    /// subgroup checks dominate load time for large keys.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| FinalizeError::io(path, e))?;
        let mut reader = BufReader::new(file);

        let mut header = [0u8; 8];
        reader
            .read_exact(&mut header)
            .map_err(|_| FinalizeError::artifact("proving key", "file shorter than header"))?;
        if &header[..4] != KEY_MAGIC {
            return Err(FinalizeError::artifact("proving key", "bad magic bytes"));
        }
        let version = u32::from_be_bytes([header[4], header[5], header[6], header[7]]);
        if version != KEY_VERSION {
            return Err(FinalizeError::artifact(
                "proving key",
                format!("unsupported version {version} (expected {KEY_VERSION})"),
            ));
        }

        let r1cs = R1cs::deserialize_uncompressed_unchecked(&mut reader)
            .map_err(|e| FinalizeError::artifact("proving key", e.to_string()))?;
        let key = ark_groth16::ProvingKey::<Bn254>::deserialize_uncompressed_unchecked(&mut reader)
            .map_err(|e| FinalizeError::artifact("proving key", e.to_string()))?;
        if !r1cs.is_well_formed() {
            return Err(FinalizeError::artifact("proving key", "constraint system references unallocated wires"));
        }
        if key.vk.gamma_abc_g1.len() != r1cs.num_public + 1 {
            return Err(FinalizeError::artifact("proving key", "verifying key does not match circuit inputs"));
        }
        let circuit_digest = r1cs.digest();
        tracing::info!("loaded proving key for circuit {}", hex::encode(circuit_digest));
        Ok(Self {
            r1cs,
            key,
            circuit_digest,
        })
    }
}

/// Encode a verifying key as snarkjs `verification_key.json`.
pub fn vk_to_json(vk: &VerifyingKey<Bn254>) -> Value {
    json!({
        "protocol": "groth16",
        "curve": "bn128",
        "nPublic": vk.gamma_abc_g1.len().saturating_sub(1),
        "vk_alpha_1": g1_to_json(&vk.alpha_g1),
        "vk_beta_2": g2_to_json(&vk.beta_g2),
        "vk_gamma_2": g2_to_json(&vk.gamma_g2),
        "vk_delta_2": g2_to_json(&vk.delta_g2),
        "IC": vk.gamma_abc_g1.iter().map(g1_to_json).collect::<Vec<_>>(),
    })
}

/// Decode snarkjs `verification_key.json`.
pub fn vk_from_json(vk_json: &Value) -> Result<VerifyingKey<Bn254>> {
    let malformed = |reason: String| FinalizeError::artifact("verification key", reason);
    let array = |name: &str| {
        vk_json[name]
            .as_array()
            .ok_or_else(|| malformed(format!("vk.{name} must be an array")))
    };

    let ic = array("IC")?
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let coords = p.as_array().ok_or_else(|| malformed(format!("IC[{i}] must be an array")))?;
            g1_from_json(coords).map_err(|e| malformed(format!("IC[{i}]: {e}")))
        })
        .collect::<Result<Vec<_>>>()?;
    if ic.is_empty() {
        return Err(malformed("IC must not be empty".into()));
    }
    if let Some(n) = vk_json["nPublic"].as_u64() {
        if n as usize + 1 != ic.len() {
            return Err(malformed(format!("nPublic is {n} but IC has {} points", ic.len())));
        }
    }

    Ok(VerifyingKey {
        alpha_g1: g1_from_json(array("vk_alpha_1")?).map_err(|e| malformed(format!("vk_alpha_1: {e}")))?,
        beta_g2: g2_from_json(array("vk_beta_2")?).map_err(|e| malformed(format!("vk_beta_2: {e}")))?,
        gamma_g2: g2_from_json(array("vk_gamma_2")?).map_err(|e| malformed(format!("vk_gamma_2: {e}")))?,
        delta_g2: g2_from_json(array("vk_delta_2")?).map_err(|e| malformed(format!("vk_delta_2: {e}")))?,
        gamma_abc_g1: ic,
    })
}

pub fn save_vk(vk: &VerifyingKey<Bn254>, path: &Path) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(&vk_to_json(vk))
        .map_err(|e| FinalizeError::artifact("verification key", e.to_string()))?;
    write_durable(path, &bytes)
}

pub fn load_vk(path: &Path) -> Result<VerifyingKey<Bn254>> {
    let bytes = read_file(path)?;
    let json: Value = serde_json::from_slice(&bytes)
        .map_err(|e| FinalizeError::artifact("verification key", e.to_string()))?;
    vk_from_json(&json)
}
