use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::debug;

use irpf_core::{DeductionPolicy, RatePrecision, TableRegistry};
use irpf_cli::app::{self, ComputeRequest};
use irpf_cli::config::{AppConfig, Overrides};
use irpf_cli::logging;
use irpf_cli::report::OutputFormat;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Brazilian income-tax calculator (monthly IRRF withholding and simplified
/// annual IRPF).
#[derive(Debug, Parser)]
#[command(name = "irpf", version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct GlobalArgs {
    /// TOML configuration file.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// How to choose between the per-dependent and simplified deductions.
    #[arg(long, global = true, value_enum)]
    policy: Option<PolicyArg>,

    /// Decimal places kept in the effective rate.
    #[arg(long, global = true, value_enum)]
    rate_precision: Option<PrecisionArg>,

    /// Log filter, e.g. `debug` or `warn,irpf_core=trace`. Overrides RUST_LOG.
    #[arg(long, global = true, value_name = "FILTER")]
    log_level: Option<String>,

    /// Also append log records to this file.
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

impl GlobalArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            deduction_policy: self.policy.map(Into::into),
            rate_precision: self.rate_precision.map(Into::into),
            log_level: self.log_level.clone(),
            log_file: self.log_file.clone(),
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compute the tax for one salary or annual income.
    Compute {
        /// `monthly` or `annual`.
        #[arg(long)]
        mode: String,

        /// Gross amount: `3000`, `3000.50`, `3000,50`, `3.000,50` or `1,234.56`.
        #[arg(long, allow_hyphen_values = true)]
        gross: String,

        #[arg(long, default_value_t = 0)]
        dependents: i32,

        #[arg(long)]
        year: i32,

        /// Month of the payment (monthly mode only, default 1).
        #[arg(long)]
        month: Option<u32>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Compute every row of a CSV file (`mode,gross_amount,dependents,year,month`).
    Batch {
        #[arg(short, long)]
        file: PathBuf,

        /// Write results here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the bracket table in force for a period.
    Tables {
        #[arg(long)]
        year: i32,

        /// Defaults to 1. Ignored with `--annual`.
        #[arg(long)]
        month: Option<u32>,

        /// Show the annual table derived from the December table.
        #[arg(long)]
        annual: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyArg {
    /// Dependents only when their deduction exceeds the simplified amount.
    Threshold,
    /// Dependents whenever there is at least one.
    Presence,
}

impl From<PolicyArg> for DeductionPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Threshold => DeductionPolicy::Threshold,
            PolicyArg::Presence => DeductionPolicy::Presence,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PrecisionArg {
    /// Four decimal places.
    Standard,
    /// Two decimal places.
    Legacy,
}

impl From<PrecisionArg> for RatePrecision {
    fn from(arg: PrecisionArg) -> Self {
        match arg {
            PrecisionArg::Standard => RatePrecision::Standard,
            PrecisionArg::Legacy => RatePrecision::Legacy,
        }
    }
}

// ─── entry point ─────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_optional(cli.global.config.as_deref())?
        .with_overrides(cli.global.overrides());
    logging::init(&config.logging)?;
    debug!(?config, "configuration resolved");

    let engine = app::build_engine(&config);
    let stdout = io::stdout();

    match cli.command {
        Command::Compute {
            mode,
            gross,
            dependents,
            year,
            month,
            format,
        } => {
            let request = ComputeRequest {
                mode,
                gross,
                dependents,
                year,
                month,
            };
            app::run_compute(&engine, &request, format, &mut stdout.lock())?;
        }
        Command::Batch { file, output } => match output {
            Some(path) => {
                app::run_batch_to_file(&engine, &file, &path)?;
            }
            None => {
                app::run_batch(&engine, &file, stdout.lock())?;
            }
        },
        Command::Tables {
            year,
            month,
            annual,
        } => {
            app::run_tables(
                TableRegistry::builtin(),
                year,
                month,
                annual,
                &mut stdout.lock(),
            )?;
        }
    }

    Ok(())
}
