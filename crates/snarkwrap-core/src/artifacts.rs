//! Pipeline artifacts and their on-disk encodings.
//!
//! - [`Witness`]: binary field vector handed from witness generation to proving.
//! - [`Calldata`]: the terminal byte blob.
//! - [`RunManifest`]: written to `<out_dir>/manifest.json` after a successful
//!   run; its presence marks the run's other files as valid.
//!
//! Files are written durably (temp file, `fsync`, rename) so a later stage
//! never observes a partially written input.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use ark_bn254::Fr;
use ark_ff::One;
use serde::{Deserialize, Serialize};

use crate::error::{FinalizeError, Result};
use crate::field;

/// Magic bytes at the start of a witness file.
pub const WITNESS_MAGIC: &[u8; 4] = b"SWTN";

/// Current witness file format version.
pub const WITNESS_VERSION: u32 = 1;

const WITNESS_HEADER_LEN: usize = 4 + 4 + 32 + 4 + 4;

const MANIFEST_FILE: &str = "manifest.json";

/// Full wire assignment of a verifier circuit.
///
/// `values[0]` is the constant one, `values[1..=num_public]` are the public
/// signals, and the remaining values are private wires in allocation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Witness {
    /// Digest of the constraint system this witness was derived for.
    pub circuit_digest: [u8; 32],
    pub num_public: usize,
    pub values: Vec<Fr>,
}

impl Witness {
    /// Build a witness, checking the fixed part of the wire layout.
    pub fn new(circuit_digest: [u8; 32], num_public: usize, values: Vec<Fr>) -> Result<Self> {
        if values.len() < 1 + num_public {
            return Err(FinalizeError::artifact(
                "witness",
                format!(
                    "{} values cannot hold the one wire and {num_public} public signals",
                    values.len()
                ),
            ));
        }
        if values[0] != Fr::one() {
            return Err(FinalizeError::artifact("witness", "wire 0 must be the constant one"));
        }
        Ok(Self {
            circuit_digest,
            num_public,
            values,
        })
    }

    /// The public signals, in wire order.
    pub fn public_signals(&self) -> &[Fr] {
        &self.values[1..=self.num_public]
    }

    /// Number of wires, including the constant-one wire.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Encode as `magic | version | digest | num_public | count | values`.
    ///
    /// Integers are big-endian `u32`; values are 32-byte big-endian words.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(WITNESS_HEADER_LEN + 32 * self.values.len());
        out.extend_from_slice(WITNESS_MAGIC);
        out.extend_from_slice(&WITNESS_VERSION.to_be_bytes());
        out.extend_from_slice(&self.circuit_digest);
        out.extend_from_slice(&(self.num_public as u32).to_be_bytes());
        out.extend_from_slice(&(self.values.len() as u32).to_be_bytes());
        for v in &self.values {
            out.extend_from_slice(&field::to_be_bytes(v));
        }
        out
    }

    /// Decode a witness file. Truncated, padded, or non-canonical input is rejected.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < WITNESS_HEADER_LEN {
            return Err(FinalizeError::artifact("witness", "file shorter than header"));
        }
        if &bytes[..4] != WITNESS_MAGIC {
            return Err(FinalizeError::artifact("witness", "bad magic bytes"));
        }
        let version = read_u32(&bytes[4..8]);
        if version != WITNESS_VERSION {
            return Err(FinalizeError::artifact(
                "witness",
                format!("unsupported version {version} (expected {WITNESS_VERSION})"),
            ));
        }
        let mut circuit_digest = [0u8; 32];
        circuit_digest.copy_from_slice(&bytes[8..40]);
        let num_public = read_u32(&bytes[40..44]) as usize;
        let count = read_u32(&bytes[44..48]) as usize;

        let body = &bytes[WITNESS_HEADER_LEN..];
        if body.len() != count * 32 {
            return Err(FinalizeError::artifact(
                "witness",
                format!("header declares {count} values, body holds {} bytes", body.len()),
            ));
        }

        let values = body
            .chunks_exact(32)
            .enumerate()
            .map(|(i, chunk)| {
                let mut word = [0u8; 32];
                word.copy_from_slice(chunk);
                field::from_be_bytes::<Fr>(&word).ok_or_else(|| {
                    FinalizeError::artifact("witness", format!("value {i} is not a canonical field element"))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(circuit_digest, num_public, values)
    }

    /// Write the witness file durably.
    pub fn write(&self, path: &Path) -> Result<()> {
        write_durable(path, &self.to_bytes())
    }

    /// Read and decode a witness file.
    pub fn read(path: &Path) -> Result<Self> {
        Self::from_bytes(&read_file(path)?)
    }
}

fn read_u32(bytes: &[u8]) -> u32 {
    u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

/// ABI-encoded arguments for the on-chain verifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Calldata(Vec<u8>);

impl Calldata {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `0x`-prefixed lowercase hex.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.0))
    }

    /// Parse hex calldata, with or without the `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        hex::decode(digits)
            .map(Self)
            .map_err(|e| FinalizeError::artifact("calldata", e.to_string()))
    }
}

/// Paths of every artifact produced by one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunManifest {
    pub input: PathBuf,
    pub witness: PathBuf,
    pub proof: PathBuf,
    pub public_signals: PathBuf,
    pub calldata: PathBuf,
    /// Hex digest of the verifier circuit the run was proven against.
    pub circuit_digest: String,
}

impl RunManifest {
    /// Save to `<out_dir>/manifest.json`.
    pub fn save(&self, out_dir: &Path) -> Result<PathBuf> {
        let path = out_dir.join(MANIFEST_FILE);
        let json = serde_json::to_vec_pretty(self)
            .map_err(|e| FinalizeError::artifact("manifest", e.to_string()))?;
        write_durable(&path, &json)?;
        Ok(path)
    }

    /// Load from `<out_dir>/manifest.json`.
    pub fn load(out_dir: &Path) -> Result<Self> {
        let path = out_dir.join(MANIFEST_FILE);
        let bytes = read_file(&path)?;
        serde_json::from_slice(&bytes).map_err(|e| FinalizeError::artifact("manifest", e.to_string()))
    }
}

/// Read a whole file, attaching the path to any I/O error.
pub fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| FinalizeError::io(path, e))
}

/// Write `bytes` to `path` so readers see either the old file or the complete new one.
pub fn write_durable(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| FinalizeError::io(parent, e))?;
    }
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "artifact".into());
    let tmp = path.with_file_name(format!(".{file_name}.tmp"));

    let mut file = File::create(&tmp).map_err(|e| FinalizeError::io(&tmp, e))?;
    file.write_all(bytes).map_err(|e| FinalizeError::io(&tmp, e))?;
    file.sync_all().map_err(|e| FinalizeError::io(&tmp, e))?;
    drop(file);

    std::fs::rename(&tmp, path).map_err(|e| FinalizeError::io(path, e))?;
    tracing::debug!("wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}
