//! CLI entrypoint for valgen
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use valgen_application::{
    AuditLedger, ConversationLogger, HumanConsultationPort, NoConversationLogger,
    RunWorkflowUseCase, UnattendedConsultation,
};
use valgen_domain::{Document, EscalationMode, OutputFormat, WorkflowOutcome, verify_chain};
use valgen_infrastructure::{
    ConfigLoader, FileConfig, JsonlAuditStore, JsonlTranscriptLogger, LocalCorpusRetriever,
    OpenAiCompatibleGateway,
};
use valgen_presentation::{
    Cli, Command, ConsoleFormatter, InteractiveConsultation, ProgressReporter, RunArgs,
};

const EXIT_FAILED: u8 = 1;
const EXIT_CANCELLED: u8 = 130;

/// How long shutdown waits for blocking tasks. Tokio reads stdin on a
/// blocking thread that cannot be interrupted, so an unanswered prompt
/// would otherwise keep the process alive.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(250);

fn main() -> Result<ExitCode> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let result = runtime.block_on(async_main());
    runtime.shutdown_timeout(SHUTDOWN_GRACE);
    result
}

async fn async_main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let _guard = init_logging(cli.verbose, cli.log_file.as_deref())?;

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).map_err(|e| anyhow!("Invalid configuration: {}", e))?
    };

    if !config.output.color {
        colored::control::set_override(false);
    }

    match cli.command {
        Command::Run(args) => run(args, config).await,
        Command::VerifyLedger { path } => verify_ledger(path.as_deref(), &config),
        Command::ShowConfig => show_config(cli.config.as_ref(), &config),
    }
}

/// Initialize logging based on verbosity level. `RUST_LOG` wins when set.
fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    });

    match log_file {
        Some(path) => {
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
            let file_name = path
                .file_name()
                .ok_or_else(|| anyhow!("--log-file must name a file: {}", path.display()))?;
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(writer)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
            Ok(None)
        }
    }
}

async fn run(args: RunArgs, mut config: FileConfig) -> Result<ExitCode> {
    // Command-line overrides
    if let Some(threshold) = args.threshold {
        config.classification.threshold = threshold;
    }
    if let Some(seconds) = args.consult_timeout {
        config.escalation.timeout_seconds = seconds;
    }
    if args.fail_fast {
        config.escalation.mode = "fail-fast".to_string();
    }

    let issues = config.validate();
    if !issues.is_empty() {
        for issue in &issues {
            eprintln!("config error: {}", issue);
        }
        bail!("{} configuration error(s)", issues.len());
    }
    let workflow_config = config.to_workflow_config()?;

    let content = std::fs::read_to_string(&args.document)
        .with_context(|| format!("Failed to read {}", args.document.display()))?;
    let document_name = args
        .document
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| args.document.display().to_string());
    let document = Document::new(document_name, content);

    // === Dependency Injection ===
    let api_key = config
        .inference
        .api_key_env
        .as_deref()
        .and_then(|var| std::env::var(var).ok());
    let gateway = Arc::new(
        OpenAiCompatibleGateway::new(
            config.inference.endpoint.clone(),
            config.inference.model.clone(),
            Duration::from_secs(config.inference.timeout_seconds),
        )?
        .with_api_key(api_key)
        .with_temperature(config.inference.temperature),
    );

    let retriever = Arc::new(match &config.retrieval.corpus_dir {
        Some(dir) => LocalCorpusRetriever::new(dir.clone(), config.retrieval.passage_chars),
        None => LocalCorpusRetriever::empty(),
    });

    // Ctrl-C cancels the run; the ledger still records the cancellation
    let cancellation = CancellationToken::new();
    let signal_token = cancellation.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling workflow");
            signal_token.cancel();
        }
    });

    let consultation: Arc<dyn HumanConsultationPort> =
        match workflow_config.escalation().mode {
            EscalationMode::Interactive => {
                let reviewer = config
                    .escalation
                    .reviewer
                    .clone()
                    .or_else(|| std::env::var("USER").ok())
                    .unwrap_or_else(|| "reviewer".to_string());
                Arc::new(
                    InteractiveConsultation::new(reviewer).with_cancellation(cancellation.clone()),
                )
            }
            EscalationMode::FailFast => Arc::new(UnattendedConsultation),
        };

    let store = JsonlAuditStore::open(&config.audit.ledger_path)?;
    let ledger = AuditLedger::open(Box::new(store))
        .with_context(|| format!("Failed to open ledger {}", config.audit.ledger_path.display()))?;

    let logger: Arc<dyn ConversationLogger> = match &config.logging.transcript_dir {
        Some(dir) => match JsonlTranscriptLogger::for_run(dir, document.name()) {
            Some(logger) => {
                info!("Writing transcript to {}", logger.path().display());
                Arc::new(logger)
            }
            None => Arc::new(NoConversationLogger),
        },
        None => Arc::new(NoConversationLogger),
    };

    info!(
        "Starting workflow for {} (model {})",
        document.name(),
        gateway.model()
    );

    let mut use_case = RunWorkflowUseCase::new(
        gateway,
        retriever,
        consultation,
        ledger,
        workflow_config,
    )
    .with_conversation_logger(logger)
    .with_cancellation(cancellation);

    let report = if args.quiet {
        use_case.execute(&document).await
    } else {
        let progress = ProgressReporter::new();
        use_case.execute_with_progress(&document, &progress).await
    };

    let format: OutputFormat = args
        .output
        .map(Into::into)
        .or(config.output.format)
        .unwrap_or_default();
    println!("{}", ConsoleFormatter::render(&report, format));

    if let Err(e) = use_case.ledger().verify() {
        warn!("Ledger verification failed after run: {}", e);
    }

    Ok(match report.outcome {
        WorkflowOutcome::Completed { .. } => ExitCode::SUCCESS,
        WorkflowOutcome::Failed { .. } => ExitCode::from(EXIT_FAILED),
        WorkflowOutcome::Cancelled { .. } => ExitCode::from(EXIT_CANCELLED),
    })
}

fn verify_ledger(path: Option<&Path>, config: &FileConfig) -> Result<ExitCode> {
    let path = path.unwrap_or(config.audit.ledger_path.as_path());
    let entries = JsonlAuditStore::read_entries(path)
        .with_context(|| format!("Failed to read ledger {}", path.display()))?;

    match verify_chain(&entries) {
        Ok(()) => {
            println!(
                "{}: {} entries, chain intact",
                path.display(),
                entries.len()
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("{}: chain broken: {}", path.display(), e);
            Ok(ExitCode::from(EXIT_FAILED))
        }
    }
}

fn show_config(explicit: Option<&std::path::PathBuf>, config: &FileConfig) -> Result<ExitCode> {
    for line in ConfigLoader::describe_sources(explicit) {
        println!("{}", line);
    }
    println!();
    println!("Effective configuration:");
    println!("{}", toml::to_string_pretty(config)?);

    let issues = config.validate();
    for issue in &issues {
        eprintln!("config error: {}", issue);
    }
    Ok(if issues.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_FAILED)
    })
}
