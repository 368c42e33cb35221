//! Sequential orchestration of the three stages.
//!
//! The pipeline owns file lifecycle: each stage's output is written durably
//! before the next stage starts, and `manifest.json` is written only after
//! every stage has succeeded. The first failure aborts the run.

use std::path::{Path, PathBuf};
use std::time::Instant;

use rand::{CryptoRng, RngCore};

use crate::artifacts::{read_file, write_durable, Calldata, RunManifest, Witness};
use crate::cancel::CancellationToken;
use crate::config::CalldataFormat;
use crate::error::{FinalizeError, Result};
use crate::proof::SnarkProof;
use crate::stage::{CalldataExporter, SnarkProver, WitnessGenerator};

/// Everything one in-memory run produces.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub witness: Witness,
    pub proof: SnarkProof,
    pub calldata: Calldata,
}

/// File names used inside a run's output directory.
#[derive(Debug, Clone)]
pub struct RunLayout {
    pub out_dir: PathBuf,
    pub format: CalldataFormat,
}

impl RunLayout {
    pub fn new(out_dir: impl Into<PathBuf>, format: CalldataFormat) -> Self {
        Self {
            out_dir: out_dir.into(),
            format,
        }
    }

    pub fn witness(&self) -> PathBuf {
        self.out_dir.join("witness.wtns")
    }

    pub fn proof(&self) -> PathBuf {
        self.out_dir.join("proof.json")
    }

    pub fn public_signals(&self) -> PathBuf {
        self.out_dir.join("public.json")
    }

    pub fn calldata(&self) -> PathBuf {
        self.out_dir.join(format!("calldata.{}", self.format.extension()))
    }

    pub fn manifest(&self) -> PathBuf {
        self.out_dir.join("manifest.json")
    }
}

/// WitnessGenerator → SnarkProver → CalldataExporter.
pub struct Pipeline<W, P, E> {
    generator: W,
    prover: P,
    exporter: E,
}

impl<W, P, E> Pipeline<W, P, E>
where
    W: WitnessGenerator,
    P: SnarkProver,
    E: CalldataExporter,
{
    pub fn new(generator: W, prover: P, exporter: E) -> Self {
        Self {
            generator,
            prover,
            exporter,
        }
    }

    pub fn exporter(&self) -> &E {
        &self.exporter
    }

    /// Run all three stages in memory.
    pub fn run<R: RngCore + CryptoRng + Send>(
        &self,
        artifact: &[u8],
        rng: &mut R,
        cancel: &CancellationToken,
    ) -> Result<PipelineOutput> {
        cancel.check()?;
        let witness = self.witness_stage(artifact)?;
        cancel.check()?;
        let proof = self.prove_stage(&witness, rng, cancel)?;
        let calldata = self.export_stage(&proof)?;
        Ok(PipelineOutput {
            witness,
            proof,
            calldata,
        })
    }

    /// Run all three stages from the artifact at `input`, persisting each
    /// stage's output under `layout.out_dir`.
    ///
    /// A stale manifest from an earlier run is removed before any stage
    /// starts, so after a failure the directory never looks complete.
    pub fn run_to_dir<R: RngCore + CryptoRng + Send>(
        &self,
        input: &Path,
        layout: &RunLayout,
        rng: &mut R,
        cancel: &CancellationToken,
    ) -> Result<RunManifest> {
        let manifest_path = layout.manifest();
        match std::fs::remove_file(&manifest_path) {
            Ok(()) => tracing::debug!("removed stale {}", manifest_path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(FinalizeError::io(&manifest_path, e)),
        }

        cancel.check()?;
        let artifact = read_file(input)?;
        let witness = self.witness_stage(&artifact)?;
        witness.write(&layout.witness())?;

        cancel.check()?;
        let proof = self.prove_stage(&witness, rng, cancel)?;
        proof.save(&layout.proof(), &layout.public_signals())?;

        let calldata = self.export_stage(&proof)?;
        let rendered = self.exporter.render(&calldata, layout.format)?;
        write_durable(&layout.calldata(), &rendered)?;

        let manifest = RunManifest {
            input: input.to_path_buf(),
            witness: layout.witness(),
            proof: layout.proof(),
            public_signals: layout.public_signals(),
            calldata: layout.calldata(),
            circuit_digest: hex::encode(witness.circuit_digest),
        };
        manifest.save(&layout.out_dir)?;
        tracing::info!("run complete, manifest at {}", manifest_path.display());
        Ok(manifest)
    }

    fn witness_stage(&self, artifact: &[u8]) -> Result<Witness> {
        let start = Instant::now();
        tracing::info!("[{}] generating witness from {} byte artifact", self.generator.name(), artifact.len());
        let witness = self.generator.generate_witness(artifact)?;
        tracing::info!(
            "[{}] witness ready: {} wires, {} public ({:.2?})",
            self.generator.name(),
            witness.len(),
            witness.num_public,
            start.elapsed()
        );
        Ok(witness)
    }

    fn prove_stage<R: RngCore + CryptoRng + Send>(
        &self,
        witness: &Witness,
        rng: &mut R,
        cancel: &CancellationToken,
    ) -> Result<SnarkProof> {
        let start = Instant::now();
        tracing::info!("[{}] proving", self.prover.name());
        let proof = self.prover.prove(witness, rng, cancel)?;
        tracing::info!("[{}] proof ready ({:.2?})", self.prover.name(), start.elapsed());
        Ok(proof)
    }

    fn export_stage(&self, proof: &SnarkProof) -> Result<Calldata> {
        let calldata = self.exporter.export(proof)?;
        tracing::info!("[{}] calldata: {} bytes", self.exporter.name(), calldata.len());
        Ok(calldata)
    }
}
