//! ABI calldata for a Solidity Groth16 verifier.
//!
//! Format: `[4-byte selector | 256-byte proof | n × 32-byte signals]`, where
//! the selector is `keccak256("verifyProof(uint256[2],uint256[2][2],uint256[2],uint256[n])")[..4]`.
//! The selector is optional; everything after it is fixed-width.

use sha3::{Digest, Keccak256};

use snarkwrap_core::artifacts::Calldata;
use snarkwrap_core::config::CalldataFormat;
use snarkwrap_core::error::{FinalizeError, Result};
use snarkwrap_core::proof::SnarkProof;
use snarkwrap_core::stage::CalldataExporter;

use crate::serializer::{proof_to_bytes, scalars_to_bytes, PROOF_BYTES};

pub const SELECTOR_BYTES: usize = 4;

/// Solidity signature of the verifier entry point for `num_signals` inputs.
pub fn verify_signature(num_signals: usize) -> String {
    format!("verifyProof(uint256[2],uint256[2][2],uint256[2],uint256[{num_signals}])")
}

/// Function selector of the verifier entry point for `num_signals` inputs.
pub fn selector(num_signals: usize) -> [u8; 4] {
    let hash = Keccak256::digest(verify_signature(num_signals).as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Calldata split into its fixed-width sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalldataParts<'a> {
    pub selector: Option<&'a [u8]>,
    /// `A | B | C`, [`PROOF_BYTES`] long.
    pub proof: &'a [u8],
    /// `num_signals` consecutive words.
    pub signals: &'a [u8],
}

/// Split calldata for `num_signals` inputs, detecting the selector by length.
///
/// The selector bytes are returned as-is; callers decide whether they match.
pub fn split_calldata(bytes: &[u8], num_signals: usize) -> Result<CalldataParts<'_>> {
    let body = PROOF_BYTES + 32 * num_signals;
    let (selector, rest) = if bytes.len() == body {
        (None, bytes)
    } else if bytes.len() == SELECTOR_BYTES + body {
        let (sel, rest) = bytes.split_at(SELECTOR_BYTES);
        (Some(sel), rest)
    } else {
        return Err(FinalizeError::artifact(
            "calldata",
            format!(
                "expected {body} or {} bytes for {num_signals} signals, got {}",
                body + SELECTOR_BYTES,
                bytes.len()
            ),
        ));
    };
    let (proof, signals) = rest.split_at(PROOF_BYTES);
    Ok(CalldataParts {
        selector,
        proof,
        signals,
    })
}

/// Exports proofs for a verifier with a fixed number of public signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbiCalldataExporter {
    pub expected_signals: usize,
    pub with_selector: bool,
}

impl AbiCalldataExporter {
    pub fn new(expected_signals: usize) -> Self {
        Self {
            expected_signals,
            with_selector: true,
        }
    }

    pub fn without_selector(mut self) -> Self {
        self.with_selector = false;
        self
    }

    /// snarkjs `soliditycalldata` argument list (never carries a selector).
    fn solidity_args(&self, calldata: &Calldata) -> Result<String> {
        let parts = split_calldata(calldata.as_bytes(), self.expected_signals)?;
        let words: Vec<String> = parts
            .proof
            .chunks_exact(32)
            .map(|w| format!("\"0x{}\"", hex::encode(w)))
            .collect();
        let signals: Vec<String> = parts
            .signals
            .chunks_exact(32)
            .map(|w| format!("\"0x{}\"", hex::encode(w)))
            .collect();
        Ok(format!(
            "[{},{}],[[{},{}],[{},{}]],[{},{}],[{}]",
            words[0],
            words[1],
            words[2],
            words[3],
            words[4],
            words[5],
            words[6],
            words[7],
            signals.join(",")
        ))
    }
}

impl CalldataExporter for AbiCalldataExporter {
    fn name(&self) -> &'static str {
        "abi"
    }

    fn export(&self, proof: &SnarkProof) -> Result<Calldata> {
        if proof.public_signals.len() != self.expected_signals {
            return Err(FinalizeError::SignalCountMismatch {
                expected: self.expected_signals,
                found: proof.public_signals.len(),
            });
        }

        let mut bytes = Vec::with_capacity(SELECTOR_BYTES + PROOF_BYTES + 32 * self.expected_signals);
        if self.with_selector {
            bytes.extend_from_slice(&selector(self.expected_signals));
        }
        bytes.extend_from_slice(&proof_to_bytes(proof));
        bytes.extend_from_slice(&scalars_to_bytes(&proof.public_signals));
        Ok(Calldata::new(bytes))
    }

    fn render(&self, calldata: &Calldata, format: CalldataFormat) -> Result<Vec<u8>> {
        match format {
            CalldataFormat::Hex => Ok(calldata.to_hex().into_bytes()),
            CalldataFormat::Binary => Ok(calldata.as_bytes().to_vec()),
            CalldataFormat::Solidity => Ok(self.solidity_args(calldata)?.into_bytes()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bn254::{Fr, G1Affine, G2Affine};
    use ark_ec::{AffineRepr, CurveGroup};

    fn sample_proof(signals: usize) -> SnarkProof {
        SnarkProof {
            a: (G1Affine::generator() * Fr::from(5u64)).into_affine(),
            b: (G2Affine::generator() * Fr::from(11u64)).into_affine(),
            c: (G1Affine::generator() * Fr::from(13u64)).into_affine(),
            public_signals: (0..signals as u64).map(|i| Fr::from(42 + i)).collect(),
        }
    }

    #[test]
    fn test_selector_is_keccak_prefix() {
        let expected = Keccak256::digest(b"verifyProof(uint256[2],uint256[2][2],uint256[2],uint256[2])");
        assert_eq!(selector(2), expected[..4]);
        assert_ne!(selector(2), selector(3));
    }

    #[test]
    fn test_export_layout() {
        let proof = sample_proof(2);
        let calldata = AbiCalldataExporter::new(2).export(&proof).unwrap();
        let bytes = calldata.as_bytes();
        assert_eq!(bytes.len(), 4 + 256 + 64);
        assert_eq!(&bytes[..4], &selector(2));
        assert_eq!(&bytes[4..260], proof_to_bytes(&proof).as_slice());
        assert_eq!(bytes[4 + 256 + 31], 42);
        assert_eq!(bytes[4 + 256 + 63], 43);
    }

    #[test]
    fn test_export_without_selector() {
        let proof = sample_proof(2);
        let with = AbiCalldataExporter::new(2).export(&proof).unwrap();
        let without = AbiCalldataExporter::new(2).without_selector().export(&proof).unwrap();
        assert_eq!(without.len(), 256 + 64);
        assert_eq!(&with.as_bytes()[4..], without.as_bytes());
    }

    #[test]
    fn test_export_is_deterministic() {
        let exporter = AbiCalldataExporter::new(2);
        let proof = sample_proof(2);
        assert_eq!(exporter.export(&proof).unwrap(), exporter.export(&proof.clone()).unwrap());
    }

    #[test]
    fn test_signal_count_mismatch() {
        let err = AbiCalldataExporter::new(2).export(&sample_proof(3)).unwrap_err();
        assert!(matches!(err, FinalizeError::SignalCountMismatch { expected: 2, found: 3 }));
        assert_eq!(err.exit_code(), 30);
    }

    #[test]
    fn test_split_detects_selector() {
        let exporter = AbiCalldataExporter::new(1);
        let proof = sample_proof(1);
        let with = exporter.export(&proof).unwrap();
        let parts = split_calldata(with.as_bytes(), 1).unwrap();
        assert_eq!(parts.selector, Some(&selector(1)[..]));
        assert_eq!(parts.signals.len(), 32);

        let without = exporter.without_selector().export(&proof).unwrap();
        assert_eq!(split_calldata(without.as_bytes(), 1).unwrap().selector, None);

        assert!(split_calldata(&with.as_bytes()[1..], 1).is_err());
        assert!(split_calldata(with.as_bytes(), 2).is_err());
    }

    #[test]
    fn test_render_formats() {
        let exporter = AbiCalldataExporter::new(2);
        let calldata = exporter.export(&sample_proof(2)).unwrap();

        let hex = String::from_utf8(exporter.render(&calldata, CalldataFormat::Hex).unwrap()).unwrap();
        assert!(hex.starts_with("0x"));
        assert_eq!(Calldata::from_hex(&hex).unwrap(), calldata);

        let binary = exporter.render(&calldata, CalldataFormat::Binary).unwrap();
        assert_eq!(binary, calldata.as_bytes());

        let solidity = String::from_utf8(exporter.render(&calldata, CalldataFormat::Solidity).unwrap()).unwrap();
        assert!(solidity.starts_with("[\"0x"));
        assert!(solidity.contains("],[[\"0x"));
        // 8 proof words + 2 signals
        assert_eq!(solidity.matches("\"0x").count(), 10);
        assert!(solidity.ends_with(&format!(
            "[\"0x{}\",\"0x{}\"]",
            hex::encode(snarkwrap_core::field::to_be_bytes(&Fr::from(42u64))),
            hex::encode(snarkwrap_core::field::to_be_bytes(&Fr::from(43u64)))
        )));
    }

    #[test]
    fn test_solidity_render_ignores_selector_setting() {
        let proof = sample_proof(2);
        let with = AbiCalldataExporter::new(2);
        let without = with.without_selector();
        let a = with.render(&with.export(&proof).unwrap(), CalldataFormat::Solidity).unwrap();
        let b = without
            .render(&without.export(&proof).unwrap(), CalldataFormat::Solidity)
            .unwrap();
        assert_eq!(a, b);
    }
}
