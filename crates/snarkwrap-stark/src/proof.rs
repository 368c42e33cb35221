//! STARK proof artifact format.
//!
//! The artifact is JSON:
//! ```json
//! {
//!   "proof": {
//!     "version": 1,
//!     "params": { "trace_length": 16, "blowup": 8, "num_queries": 8 },
//!     "claim_digest": "<hex>",
//!     "trace_root": "<decimal>",
//!     "fri_roots": ["<decimal>", ...],
//!     "fri_remainder": "<decimal>",
//!     "queries": [{ "trace": {..}, "trace_next": {..}, "fri": [{..}, ..] }]
//!   },
//!   "public_input": { "start": "42", "result": "<decimal>" }
//! }
//! ```
//! Field elements, including Merkle roots and paths, are decimal strings.
//! The claim digest is lowercase hex. Unknown fields are rejected.

use ark_bn254::Fr;
use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};

use snarkwrap_core::error::{FinalizeError, Result};
use snarkwrap_core::field::{self, decimal, decimal_vec};

use crate::merkle::Digest;

/// SHA-256 binding of a proof to its public input.
pub type ClaimDigest = [u8; 32];

/// Current proof format version.
pub const PROOF_VERSION: u32 = 1;

pub const MIN_TRACE_LENGTH: usize = 4;
pub const MAX_TRACE_LENGTH: usize = 1 << 20;
pub const MIN_BLOWUP: usize = 4;
pub const MAX_BLOWUP: usize = 64;
pub const MAX_QUERIES: usize = 128;

/// Shape parameters. These alone determine the verifier circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StarkParams {
    /// Number of trace rows `N`.
    pub trace_length: usize,
    /// Low-degree extension factor `B`.
    pub blowup: usize,
    pub num_queries: usize,
}

impl StarkParams {
    pub fn validate(&self) -> Result<()> {
        if !self.trace_length.is_power_of_two()
            || !(MIN_TRACE_LENGTH..=MAX_TRACE_LENGTH).contains(&self.trace_length)
        {
            return Err(FinalizeError::MalformedProof(format!(
                "trace_length {} must be a power of two in [{MIN_TRACE_LENGTH}, {MAX_TRACE_LENGTH}]",
                self.trace_length
            )));
        }
        if !self.blowup.is_power_of_two() || !(MIN_BLOWUP..=MAX_BLOWUP).contains(&self.blowup) {
            return Err(FinalizeError::MalformedProof(format!(
                "blowup {} must be a power of two in [{MIN_BLOWUP}, {MAX_BLOWUP}]",
                self.blowup
            )));
        }
        if !(1..=MAX_QUERIES).contains(&self.num_queries) {
            return Err(FinalizeError::MalformedProof(format!(
                "num_queries {} must be in [1, {MAX_QUERIES}]",
                self.num_queries
            )));
        }
        Ok(())
    }

    /// Size `M = N·B` of the evaluation domain.
    pub fn lde_size(&self) -> usize {
        self.trace_length * self.blowup
    }

    pub fn lde_log(&self) -> usize {
        self.lde_size().trailing_zeros() as usize
    }

    pub fn trace_log(&self) -> usize {
        self.trace_length.trailing_zeros() as usize
    }

    /// Number of FRI folds; the composition polynomial has degree below `2N`.
    pub fn num_fri_layers(&self) -> usize {
        self.trace_log() + 1
    }
}

/// Initial and final state of the proven computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PublicInput {
    #[serde(with = "decimal")]
    pub start: Fr,
    #[serde(with = "decimal")]
    pub result: Fr,
}

impl PublicInput {
    /// SHA-256 over `start || result` as big-endian words.
    pub fn digest(&self) -> ClaimDigest {
        Sha256::new()
            .chain_update(field::to_be_bytes(&self.start))
            .chain_update(field::to_be_bytes(&self.result))
            .finalize()
            .into()
    }
}

/// An opened trace evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TraceOpening {
    #[serde(with = "decimal")]
    pub value: Fr,
    #[serde(with = "decimal_vec")]
    pub path: Vec<Digest>,
}

/// An opened FRI pair `(f_k(x), f_k(-x))`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FriOpening {
    #[serde(with = "decimal_vec")]
    pub values: Vec<Fr>,
    #[serde(with = "decimal_vec")]
    pub path: Vec<Digest>,
}

/// Openings for one query index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueryProof {
    pub trace: TraceOpening,
    pub trace_next: TraceOpening,
    pub fri: Vec<FriOpening>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StarkProof {
    pub version: u32,
    pub params: StarkParams,
    #[serde(with = "hex_digest")]
    pub claim_digest: ClaimDigest,
    #[serde(with = "decimal")]
    pub trace_root: Digest,
    #[serde(with = "decimal_vec")]
    pub fri_roots: Vec<Digest>,
    #[serde(with = "decimal")]
    pub fri_remainder: Fr,
    pub queries: Vec<QueryProof>,
}

/// A STARK proof together with the public input it is checked against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StarkArtifact {
    pub proof: StarkProof,
    pub public_input: PublicInput,
}

impl StarkArtifact {
    /// Parse untrusted bytes. Any decoding failure is a malformed proof.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| FinalizeError::MalformedProof(e.to_string()))
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self).map_err(|e| FinalizeError::artifact("stark proof", e.to_string()))
    }
}

/// Serde adapter: a digest as 64 lowercase hex characters.
pub mod hex_digest {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(digest: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(digest))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[u8; 32], D::Error> {
        let s = String::deserialize(deserializer)?;
        parse(&s).map_err(de::Error::custom)
    }

    pub(crate) fn parse(s: &str) -> Result<[u8; 32], String> {
        let bytes = hex::decode(s).map_err(|e| format!("invalid digest hex: {e}"))?;
        bytes
            .try_into()
            .map_err(|b: Vec<u8>| format!("digest must be 32 bytes, got {}", b.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(trace_length: usize, blowup: usize, num_queries: usize) -> StarkParams {
        StarkParams {
            trace_length,
            blowup,
            num_queries,
        }
    }

    #[test]
    fn test_params_bounds() {
        assert!(params(16, 8, 8).validate().is_ok());
        assert!(params(4, 4, 1).validate().is_ok());
        assert!(params(12, 8, 8).validate().is_err());
        assert!(params(2, 8, 8).validate().is_err());
        assert!(params(16, 2, 8).validate().is_err());
        assert!(params(16, 128, 8).validate().is_err());
        assert!(params(16, 8, 0).validate().is_err());
        assert!(params(16, 8, 129).validate().is_err());
    }

    #[test]
    fn test_param_derived_sizes() {
        let p = params(16, 8, 8);
        assert_eq!(p.lde_size(), 128);
        assert_eq!(p.lde_log(), 7);
        assert_eq!(p.num_fri_layers(), 5);
    }

    #[test]
    fn test_public_input_digest_binds_order() {
        let a = PublicInput {
            start: Fr::from(1u64),
            result: Fr::from(2u64),
        };
        let b = PublicInput {
            start: Fr::from(2u64),
            result: Fr::from(1u64),
        };
        assert_ne!(a.digest(), b.digest());
    }

    #[test]
    fn test_public_input_json() {
        let pi: PublicInput = serde_json::from_str(r#"{ "start": "42", "result": "7" }"#).unwrap();
        assert_eq!(pi.start, Fr::from(42u64));
        assert!(serde_json::from_str::<PublicInput>(r#"{ "start": 42, "result": "7" }"#).is_err());
        assert!(serde_json::from_str::<PublicInput>(r#"{ "start": "1", "result": "7", "x": "0" }"#).is_err());
    }

    #[test]
    fn test_hex_digest_rejects_bad_length() {
        assert!(hex_digest::parse(&"ab".repeat(32)).is_ok());
        assert!(hex_digest::parse(&"ab".repeat(31)).unwrap_err().contains("32 bytes"));
        assert!(hex_digest::parse("zz").is_err());
    }

    #[test]
    fn test_truncated_artifact_is_malformed() {
        let err = StarkArtifact::from_json(br#"{ "proof": { "version": 1"#).unwrap_err();
        assert!(matches!(err, FinalizeError::MalformedProof(_)));
    }
}
