//! Pipeline configuration (`snarkwrap.config.json`).
//!
//! Every field has a default, so a partial file (or `{}`) is valid. CLI flags
//! override whatever is loaded here.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{FinalizeError, Result};

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "snarkwrap.config.json";

/// Default stack size for proving worker threads (64 MiB).
pub const DEFAULT_STACK_SIZE: usize = 64 * 1024 * 1024;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Path to the binary proving key produced by `setup`.
    pub proving_key: PathBuf,
    /// Path to the snarkjs-style verification key JSON.
    pub verification_key: PathBuf,
    /// Directory that receives run artifacts.
    pub output_dir: PathBuf,
    pub prover: ProverConfig,
    pub calldata: CalldataConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            proving_key: PathBuf::from("keys/proving.key"),
            verification_key: PathBuf::from("keys/verification_key.json"),
            output_dir: PathBuf::from("out"),
            prover: ProverConfig::default(),
            calldata: CalldataConfig::default(),
        }
    }
}

/// Resources for the Groth16 proving pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProverConfig {
    /// Worker threads; `None` lets the pool pick one per core.
    pub threads: Option<usize>,
    /// Stack size of each worker thread, in bytes.
    pub stack_size: usize,
}

impl Default for ProverConfig {
    fn default() -> Self {
        Self {
            threads: None,
            stack_size: DEFAULT_STACK_SIZE,
        }
    }
}

/// Calldata rendering options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalldataConfig {
    pub format: CalldataFormat,
    /// Prefix the 4-byte `verifyProof` selector.
    pub selector: bool,
}

impl Default for CalldataConfig {
    fn default() -> Self {
        Self {
            format: CalldataFormat::Hex,
            selector: true,
        }
    }
}

/// How calldata is rendered for output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalldataFormat {
    /// `0x`-prefixed hex string.
    Hex,
    /// Raw bytes.
    Binary,
    /// Solidity argument list, as printed by `snarkjs zkey export soliditycalldata`.
    Solidity,
}

impl CalldataFormat {
    /// Conventional file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Hex => "hex",
            Self::Binary => "bin",
            Self::Solidity => "txt",
        }
    }
}

impl std::str::FromStr for CalldataFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "hex" => Ok(Self::Hex),
            "binary" | "bin" => Ok(Self::Binary),
            "solidity" | "sol" => Ok(Self::Solidity),
            other => Err(format!("unknown calldata format '{other}' (expected hex, binary, or solidity)")),
        }
    }
}

impl std::fmt::Display for CalldataFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Hex => "hex",
            Self::Binary => "binary",
            Self::Solidity => "solidity",
        };
        f.write_str(name)
    }
}

impl PipelineConfig {
    /// Load from a JSON file. A missing or unparsable file is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| FinalizeError::ConfigNotFound {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&contents).map_err(|e| FinalizeError::ConfigParse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Load from `path` if it exists, otherwise return the defaults.
    ///
    /// A file that exists but does not parse is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!("no config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| FinalizeError::ConfigParse {
            path: path.to_path_buf(),
            source: e,
        })?;
        std::fs::write(path, json).map_err(|e| FinalizeError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        let config = PipelineConfig {
            prover: ProverConfig {
                threads: Some(4),
                stack_size: 128 * 1024 * 1024,
            },
            calldata: CalldataConfig {
                format: CalldataFormat::Solidity,
                selector: false,
            },
            ..PipelineConfig::default()
        };
        config.save(&path).unwrap();
        assert_eq!(PipelineConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, r#"{ "prover": { "threads": 2 } }"#).unwrap();
        let config = PipelineConfig::load(&path).unwrap();
        assert_eq!(config.prover.threads, Some(2));
        assert_eq!(config.prover.stack_size, DEFAULT_STACK_SIZE);
        assert_eq!(config.calldata.format, CalldataFormat::Hex);
        assert!(config.calldata.selector);
    }

    #[test]
    fn test_missing_config_is_not_found() {
        let err = PipelineConfig::load(Path::new("/tmp/nonexistent_snarkwrap.config.json")).unwrap_err();
        assert!(matches!(err, FinalizeError::ConfigNotFound { .. }));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_load_or_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        assert_eq!(PipelineConfig::load_or_default(&path).unwrap(), PipelineConfig::default());

        std::fs::write(&path, "{ not json").unwrap();
        let err = PipelineConfig::load_or_default(&path).unwrap_err();
        assert!(matches!(err, FinalizeError::ConfigParse { .. }));
    }

    #[test]
    fn test_calldata_format_parsing() {
        assert_eq!("hex".parse::<CalldataFormat>(), Ok(CalldataFormat::Hex));
        assert_eq!("bin".parse::<CalldataFormat>(), Ok(CalldataFormat::Binary));
        assert_eq!("solidity".parse::<CalldataFormat>(), Ok(CalldataFormat::Solidity));
        assert!("base64".parse::<CalldataFormat>().is_err());
        assert_eq!(CalldataFormat::Binary.to_string(), "binary");
        assert_eq!(
            serde_json::to_string(&CalldataFormat::Solidity).unwrap(),
            "\"solidity\""
        );
    }
}
