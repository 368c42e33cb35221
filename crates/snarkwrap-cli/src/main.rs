//! snarkwrap CLI: finalize STARK proofs into Groth16 proofs and EVM calldata.
//!
//! Each pipeline stage is exposed as its own command (`witness`, `prove`,
//! `export`) so artifacts can be inspected between stages; `run` chains all
//! three. `setup` produces development keys and `verify` checks calldata
//! off-chain.

mod commands;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use snarkwrap_core::config::CalldataFormat;
use snarkwrap_core::error::FinalizeError;
use snarkwrap_stark::circuit::NUM_PUBLIC;

#[derive(Parser)]
#[command(
    name = "snarkwrap",
    about = "Finalize STARK proofs into Groth16 proofs and EVM calldata",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to snarkwrap.config.json (default: ./snarkwrap.config.json)
    #[arg(long, global = true, default_value = snarkwrap_core::config::CONFIG_FILE)]
    config: PathBuf,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate development Groth16 keys for a STARK parameter set
    Setup {
        /// Rows in the execution trace (power of two)
        #[arg(long, default_value_t = 8)]
        trace_length: usize,

        /// Low-degree extension blowup factor (power of two)
        #[arg(long, default_value_t = 4)]
        blowup: usize,

        /// Number of FRI queries
        #[arg(long, default_value_t = 4)]
        queries: usize,

        /// Directory for proving.key and verification_key.json (default: paths from config)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },

    /// Verify a STARK proof and derive the verifier-circuit witness
    Witness {
        /// STARK proof artifact (JSON)
        #[arg(long, short)]
        input: PathBuf,

        /// Public input file overriding the one embedded in the proof
        #[arg(long)]
        public_input: Option<PathBuf>,

        /// Output path for the witness file
        #[arg(long, short, default_value = "witness.wtns")]
        output: PathBuf,
    },

    /// Generate a Groth16 proof from a witness
    Prove {
        /// Witness file produced by `witness`
        #[arg(long)]
        witness: PathBuf,

        /// Override the proving key path
        #[arg(long)]
        proving_key: Option<PathBuf>,

        /// Output path for proof.json
        #[arg(long, default_value = "proof.json")]
        proof: PathBuf,

        /// Output path for public.json
        #[arg(long, default_value = "public.json")]
        public: PathBuf,

        #[command(flatten)]
        resources: ProverArgs,
    },

    /// Encode a Groth16 proof as verifier calldata
    Export {
        /// proof.json produced by `prove`
        #[arg(long)]
        proof: PathBuf,

        /// public.json produced by `prove`
        #[arg(long)]
        public: PathBuf,

        /// Number of public signals the verifier expects
        #[arg(long, default_value_t = NUM_PUBLIC)]
        signals: usize,

        /// Override the calldata format
        #[arg(long, value_enum)]
        format: Option<FormatChoice>,

        /// Omit the 4-byte function selector
        #[arg(long)]
        no_selector: bool,

        /// Write calldata to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Run witness generation, proving, and export in one go
    Run {
        /// STARK proof artifact (JSON)
        #[arg(long, short)]
        input: PathBuf,

        /// Override the proving key path
        #[arg(long)]
        proving_key: Option<PathBuf>,

        /// Override the output directory
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Cancel the run after this many seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Override the calldata format
        #[arg(long, value_enum)]
        format: Option<FormatChoice>,

        #[command(flatten)]
        resources: ProverArgs,
    },

    /// Check calldata against a verification key
    Verify {
        /// Override the verification key path
        #[arg(long)]
        vk: Option<PathBuf>,

        /// Calldata file (hex or binary)
        #[arg(long)]
        calldata: PathBuf,

        /// Number of public signals (default: from the verification key)
        #[arg(long)]
        signals: Option<usize>,
    },
}

/// Proving pool overrides.
#[derive(clap::Args, Clone, Debug, Default)]
pub struct ProverArgs {
    /// Worker threads for the proving pool
    #[arg(long)]
    pub threads: Option<usize>,

    /// Stack size of each proving worker, in MiB
    #[arg(long)]
    pub stack_size_mb: Option<usize>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatChoice {
    Hex,
    Binary,
    Solidity,
}

impl From<FormatChoice> for CalldataFormat {
    fn from(choice: FormatChoice) -> Self {
        match choice {
            FormatChoice::Hex => Self::Hex,
            FormatChoice::Binary => Self::Binary,
            FormatChoice::Solidity => Self::Solidity,
        }
    }
}

/// Exit code for a failed command: the code of the first [`FinalizeError`]
/// in the error chain, or 1.
fn exit_code(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<FinalizeError>())
        .map(FinalizeError::exit_code)
        .unwrap_or(1)
}

async fn dispatch(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Setup {
            trace_length,
            blowup,
            queries,
            out_dir,
        } => {
            commands::setup::run(&cli.config, trace_length, blowup, queries, out_dir.as_deref()).await
        }
        Commands::Witness {
            input,
            public_input,
            output,
        } => commands::witness::run(&input, public_input.as_deref(), &output).await,
        Commands::Prove {
            witness,
            proving_key,
            proof,
            public,
            resources,
        } => {
            commands::prove::run(
                &cli.config,
                &witness,
                proving_key.as_deref(),
                &proof,
                &public,
                &resources,
            )
            .await
        }
        Commands::Export {
            proof,
            public,
            signals,
            format,
            no_selector,
            output,
        } => {
            commands::export::run(
                &cli.config,
                &proof,
                &public,
                signals,
                format.map(Into::into),
                no_selector,
                output.as_deref(),
            )
            .await
        }
        Commands::Run {
            input,
            proving_key,
            out_dir,
            timeout,
            format,
            resources,
        } => {
            commands::run::run(
                &cli.config,
                &input,
                proving_key.as_deref(),
                out_dir.as_deref(),
                timeout,
                format.map(Into::into),
                &resources,
            )
            .await
        }
        Commands::Verify { vk, calldata, signals } => {
            commands::verify::run(&cli.config, vk.as_deref(), &calldata, signals).await
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match dispatch(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::print_error(&format!("{err:#}"));
            ExitCode::from(exit_code(&err))
        }
    }
}
