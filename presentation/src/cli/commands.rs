//! CLI command definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use valgen_domain::OutputFormat;

/// Report format selectable on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputArg {
    /// Classification, consultation, every test case and the audit trail
    Full,
    /// Outcome, category and test case titles
    Summary,
    /// The report as JSON
    Json,
}

impl From<OutputArg> for OutputFormat {
    fn from(arg: OutputArg) -> Self {
        match arg {
            OutputArg::Full => OutputFormat::Full,
            OutputArg::Summary => OutputFormat::Summary,
            OutputArg::Json => OutputFormat::Json,
        }
    }
}

/// CLI arguments for valgen
#[derive(Parser, Debug)]
#[command(name = "valgen")]
#[command(author, version, about = "Validation test generation with audited human escalation")]
#[command(long_about = r#"
valgen turns a requirement document into a validation test suite.

The workflow has four stages:
1. Classification: the document is assigned a software category
2. Escalation: low-confidence or ambiguous results are put to a reviewer,
   with a deadline after which the most conservative category applies
3. Coordination: context, research and SME agents advise in parallel
4. Generation: exactly the category's required number of test cases

Every decision is appended to a SHA-256 hash-chained audit ledger.

Configuration files are loaded from (in priority order):
1. VALGEN_* environment variables
2. --config <path>            Explicit config file
3. ./valgen.toml              Project-level config
4. ~/.config/valgen/config.toml   Global config

Example:
  valgen run requirements/urs-001.md
  valgen run --fail-fast --output json urs.md
  valgen verify-ledger .valgen/audit.jsonl
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the workflow on a requirement document
    Run(RunArgs),

    /// Re-verify the hash chain of a persisted audit ledger
    VerifyLedger {
        /// Ledger file (defaults to the configured ledger path)
        path: Option<PathBuf>,
    },

    /// Show configuration file locations and the effective configuration
    ShowConfig,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Requirement document to process
    pub document: PathBuf,

    /// Output format (overrides the configured format)
    #[arg(short, long, value_enum)]
    pub output: Option<OutputArg>,

    /// Confidence threshold below which a reviewer is consulted
    #[arg(long, value_name = "0..1")]
    pub threshold: Option<f64>,

    /// Consultation deadline in seconds
    #[arg(long, value_name = "SECONDS")]
    pub consult_timeout: Option<u64>,

    /// Fail instead of consulting a reviewer
    #[arg(long)]
    pub fail_fast: bool,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,
}
