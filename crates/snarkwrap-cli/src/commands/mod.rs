//! CLI command implementations for snarkwrap.
//!
//! Each module corresponds to a subcommand (`snarkwrap <command>`).

pub mod export;
pub mod prove;
pub mod run;
pub mod setup;
pub mod verify;
pub mod witness;

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};

use snarkwrap_core::cancel::CancellationToken;
use snarkwrap_core::config::{PipelineConfig, ProverConfig};
use snarkwrap_groth16::ProvingKey;

use crate::output;
use crate::ProverArgs;

/// Load the config file, falling back to defaults when it does not exist.
pub fn load_config(config_path: &Path) -> Result<PipelineConfig> {
    let config = PipelineConfig::load_or_default(config_path)?;
    tracing::debug!("config: {config:?}");
    Ok(config)
}

/// Apply CLI resource overrides to the configured prover settings.
pub fn prover_config(config: &PipelineConfig, args: &ProverArgs) -> Result<ProverConfig> {
    let mut prover = config.prover.clone();
    if let Some(threads) = args.threads {
        prover.threads = Some(threads);
    }
    if let Some(mb) = args.stack_size_mb {
        prover.stack_size = mb
            .checked_mul(1024 * 1024)
            .with_context(|| format!("--stack-size-mb {mb} overflows the address space"))?;
    }
    Ok(prover)
}

/// Load a proving key. Call from blocking jobs only; keys run to hundreds of MiB.
pub fn load_proving_key(path: &Path) -> Result<ProvingKey> {
    ProvingKey::load(path).with_context(|| {
        format!(
            "failed to load proving key {} (run `snarkwrap setup` first)",
            path.display()
        )
    })
}

/// Resolves when the run should be cancelled: the deadline passed or the
/// user pressed Ctrl-C.
async fn interrupted(timeout: Option<Duration>) -> &'static str {
    let deadline = async {
        match timeout {
            Some(limit) => tokio::time::sleep(limit).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::select! {
        _ = deadline => "timeout reached",
        Ok(()) = tokio::signal::ctrl_c() => "interrupted",
    }
}

/// Run a blocking pipeline job on tokio's blocking pool behind a spinner.
///
/// On timeout or Ctrl-C the job's token is cancelled and the job is awaited;
/// it stops at its next cancellation check and returns `Cancelled`.
pub async fn run_blocking<T, F>(message: &str, timeout: Option<Duration>, job: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(CancellationToken) -> Result<T> + Send + 'static,
{
    let cancel = CancellationToken::new();
    let worker_token = cancel.clone();
    let spinner = output::spinner(message);
    let mut task = tokio::task::spawn_blocking(move || job(worker_token));

    let finished = tokio::select! {
        joined = &mut task => Some(joined),
        reason = interrupted(timeout) => {
            tracing::warn!("{reason}, cancelling");
            spinner.set_message(format!("{message} (cancelling)"));
            cancel.cancel();
            None
        }
    };
    let joined = match finished {
        Some(joined) => joined,
        None => task.await,
    };
    spinner.finish_and_clear();

    joined.context("pipeline worker panicked")?
}

#[cfg(test)]
mod tests {
    use super::*;
    use snarkwrap_core::error::FinalizeError;

    #[test]
    fn test_prover_overrides() {
        let config = PipelineConfig::default();
        let unchanged = prover_config(&config, &ProverArgs::default()).unwrap();
        assert_eq!(unchanged, config.prover);

        let args = ProverArgs {
            threads: Some(3),
            stack_size_mb: Some(2),
        };
        let prover = prover_config(&config, &args).unwrap();
        assert_eq!(prover.threads, Some(3));
        assert_eq!(prover.stack_size, 2 * 1024 * 1024);
    }

    #[test]
    fn test_oversized_stack_override_is_rejected() {
        let args = ProverArgs {
            threads: None,
            stack_size_mb: Some(usize::MAX / 1024),
        };
        let err = prover_config(&PipelineConfig::default(), &args).unwrap_err();
        assert!(err.to_string().contains("--stack-size-mb"), "{err}");
    }

    #[tokio::test]
    async fn test_missing_key_fails_inside_job() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.key");
        let err = run_blocking("loading", None, move |_| load_proving_key(&path))
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("snarkwrap setup"), "{err:#}");
        assert!(err.chain().any(|cause| matches!(
            cause.downcast_ref::<FinalizeError>(),
            Some(FinalizeError::IoFailure { .. })
        )));
    }

    #[test]
    fn test_missing_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("snarkwrap.config.json")).unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[tokio::test]
    async fn test_run_blocking_returns_job_result() {
        let value = run_blocking("working", None, |_| Ok(7)).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_timeout_cancels_job() {
        let err = run_blocking("waiting", Some(Duration::from_millis(20)), |cancel| {
            while !cancel.is_cancelled() {
                std::thread::sleep(Duration::from_millis(5));
            }
            Ok(cancel.check()?)
        })
        .await
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FinalizeError>(),
            Some(FinalizeError::Cancelled)
        ));
    }
}
