//! Unified error types for the snarkwrap pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur while finalizing a STARK proof.
///
/// Every variant is fatal to the invocation that produced it. Nothing in the
/// pipeline retries: the inputs are deterministic, so a retry without new
/// inputs fails the same way.
#[derive(Error, Debug)]
pub enum FinalizeError {
    // --- Configuration ---

    /// The configuration file (`snarkwrap.config.json`) was not found.
    #[error("config file not found at {path}")]
    ConfigNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file exists but contains invalid JSON.
    #[error("failed to parse config at {path}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    // --- Witness generation ---

    /// The STARK proof is structurally invalid or fails verification.
    #[error("malformed STARK proof: {0}")]
    MalformedProof(String),

    /// The STARK proof does not attest to the supplied public input.
    #[error("public input mismatch: {0}")]
    PublicInputMismatch(String),

    // --- Proving ---

    /// The witness was derived for a different circuit than the proving key.
    #[error("proving key mismatch: {0}")]
    ProvingKeyMismatch(String),

    /// The Groth16 backend failed (synthesis, worker pool, or self-check).
    #[error("prover internal error: {0}")]
    ProverInternalError(String),

    /// The configured prover stack is smaller than the circuit requires.
    #[error("insufficient prover stack: {required} bytes required, {configured} configured")]
    InsufficientStack { required: usize, configured: usize },

    /// A witness does not satisfy the constraint system it claims to belong to.
    #[error("witness does not satisfy constraint #{constraint}")]
    CircuitUnsatisfied { constraint: usize },

    /// The caller cancelled the stage before it completed.
    #[error("operation cancelled")]
    Cancelled,

    // --- Calldata ---

    /// The number of public signals differs from the verifier's entry point.
    #[error("public signal count mismatch: verifier expects {expected}, proof has {found}")]
    SignalCountMismatch { expected: usize, found: usize },

    // --- Artifacts ---

    /// An intermediate artifact (witness, key, proof file) could not be decoded.
    #[error("malformed {kind}: {reason}")]
    MalformedArtifact { kind: &'static str, reason: String },

    // --- General ---

    /// Reading or writing an artifact file failed.
    #[error("I/O failure on {path}")]
    IoFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A filesystem I/O error without an associated path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A catch-all for errors from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FinalizeError {
    /// Shorthand for [`FinalizeError::MalformedArtifact`].
    pub fn artifact(kind: &'static str, reason: impl Into<String>) -> Self {
        Self::MalformedArtifact {
            kind,
            reason: reason.into(),
        }
    }

    /// Attach a path to an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoFailure {
            path: path.into(),
            source,
        }
    }

    /// Process exit code for this error class.
    ///
    /// Codes are stable so that external orchestration can tell failure
    /// classes apart without parsing messages.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::ConfigNotFound { .. } | Self::ConfigParse { .. } => 2,
            Self::MalformedProof(_) => 10,
            Self::PublicInputMismatch(_) => 11,
            Self::ProvingKeyMismatch(_) => 20,
            Self::ProverInternalError(_) => 21,
            Self::InsufficientStack { .. } => 22,
            Self::CircuitUnsatisfied { .. } => 23,
            Self::SignalCountMismatch { .. } => 30,
            Self::MalformedArtifact { .. } => 40,
            Self::IoFailure { .. } | Self::Io(_) => 74,
            Self::Cancelled => 75,
            Self::Other(_) => 1,
        }
    }
}

/// Alias for `Result<T, FinalizeError>`.
pub type Result<T> = std::result::Result<T, FinalizeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct_per_stage() {
        let errors = [
            FinalizeError::MalformedProof("x".into()),
            FinalizeError::PublicInputMismatch("x".into()),
            FinalizeError::ProvingKeyMismatch("x".into()),
            FinalizeError::ProverInternalError("x".into()),
            FinalizeError::InsufficientStack {
                required: 2,
                configured: 1,
            },
            FinalizeError::CircuitUnsatisfied { constraint: 0 },
            FinalizeError::SignalCountMismatch {
                expected: 2,
                found: 3,
            },
            FinalizeError::artifact("witness", "x"),
            FinalizeError::Cancelled,
        ];
        let mut codes: Vec<u8> = errors.iter().map(|e| e.exit_code()).collect();
        assert!(codes.iter().all(|&c| c != 0));
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_io_failure_carries_path() {
        let err = FinalizeError::io(
            "/tmp/witness.wtns",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.to_string().contains("/tmp/witness.wtns"));
        assert_eq!(err.exit_code(), 74);
    }

    #[test]
    fn test_signal_mismatch_message() {
        let err = FinalizeError::SignalCountMismatch {
            expected: 2,
            found: 5,
        };
        let msg = err.to_string();
        assert!(msg.contains("expects 2"));
        assert!(msg.contains("has 5"));
    }
}
