//! Interactive consultation for low-confidence classifications.
//!
//! When the confidence gate escalates, the reviewer sees:
//!
//! ```text
//! ════════════════════════════════════════════════════════════
//!   Classification Requires Review
//! ════════════════════════════════════════════════════════════
//!
//! Document: urs-017.md
//! Proposed: Category 4 (Configured) (0.41)
//! Reason:   confidence 0.41 for configured is below threshold 0.60
//! Deadline: 2026-10-17T14:05:00Z
//!
//! Commands:
//!   /accept [rationale]             - Keep the proposed category
//!   /category <name|code> <reason>  - Choose a category
//!   /skip                           - Leave it to the deadline
//!
//! review>
//! ```
//!
//! # Commands
//!
//! | Command | Aliases | Description |
//! |---------|---------|-------------|
//! | `/accept` | `accept`, `a` | Accept the proposed category |
//! | `/category` | `category`, `c` | Decide a category with a rationale |
//! | `/skip` | `skip`, `s` | Stop answering; the session expires |

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use colored::Colorize;
use std::io::{self, Write};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use valgen_application::{
    ConsultationError, ConsultationRequest, DecisionSubmitter, HumanConsultationPort,
};
use valgen_domain::{Category, HumanDecision};

const DEFAULT_ACCEPT_RATIONALE: &str = "Reviewer accepted the proposed classification";

/// A parsed reviewer command.
#[derive(Debug, Clone, PartialEq)]
pub enum ReviewerCommand {
    Decide { category: Category, rationale: String },
    Skip,
    Empty,
}

/// Parse one line of reviewer input against the proposed category.
pub fn parse_command(input: &str, proposed: Category) -> Result<ReviewerCommand, String> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(ReviewerCommand::Empty);
    }
    let (command, rest) = input
        .split_once(char::is_whitespace)
        .map(|(c, r)| (c, r.trim()))
        .unwrap_or((input, ""));

    match command.to_lowercase().as_str() {
        "/accept" | "accept" | "a" => Ok(ReviewerCommand::Decide {
            category: proposed,
            rationale: if rest.is_empty() {
                DEFAULT_ACCEPT_RATIONALE.to_string()
            } else {
                rest.to_string()
            },
        }),
        "/category" | "category" | "c" => {
            let (name, rationale) = rest
                .split_once(char::is_whitespace)
                .map(|(n, r)| (n, r.trim()))
                .unwrap_or((rest, ""));
            if name.is_empty() {
                return Err("Usage: /category <name|code> <rationale>".to_string());
            }
            let category: Category = name.parse()?;
            if rationale.is_empty() {
                return Err("A rationale is required when choosing a category".to_string());
            }
            Ok(ReviewerCommand::Decide {
                category,
                rationale: rationale.to_string(),
            })
        }
        "/skip" | "skip" | "s" => Ok(ReviewerCommand::Skip),
        _ => Err(format!("Unknown command: {}", input)),
    }
}

/// Terminal-based consultation adapter.
///
/// Implements [`HumanConsultationPort`]; every decision is attributed to
/// the configured reviewer identity. Reading stops at the session deadline
/// or when the cancellation token fires, so a pending prompt never outlives
/// its session.
pub struct InteractiveConsultation {
    reviewer: String,
    cancellation: Option<CancellationToken>,
}

impl InteractiveConsultation {
    pub fn new(reviewer: impl Into<String>) -> Self {
        Self {
            reviewer: reviewer.into(),
            cancellation: None,
        }
    }

    /// Stop waiting for input once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    fn display_prompt(&self, request: &ConsultationRequest) {
        let rule = "═".repeat(60);
        println!();
        println!("{}", rule.yellow().bold());
        println!("{}", "  Classification Requires Review".yellow().bold());
        println!("{}", rule.yellow().bold());
        println!();
        println!("{} {}", "Document:".cyan().bold(), request.document_name);
        println!(
            "{} {} ({:.2})",
            "Proposed:".cyan().bold(),
            request.proposed.category().display_name(),
            request.proposed.confidence()
        );
        println!("{} {}", "Reason:  ".cyan().bold(), request.reason);
        println!(
            "{} {}",
            "Deadline:".cyan().bold(),
            request.deadline.to_rfc3339()
        );
        if !request.proposed.rationale().is_empty() {
            println!();
            println!("{}", "Classifier rationale:".cyan().bold());
            println!("  {}", request.proposed.rationale().dimmed());
        }
        if !request.document_excerpt.is_empty() {
            println!();
            println!("{}", "Excerpt:".cyan().bold());
            for line in request.document_excerpt.lines().take(12) {
                println!("  {}", line.dimmed());
            }
        }
        println!();
        println!("{}", "Commands:".cyan().bold());
        println!("  {}             - Keep the proposed category", "/accept [rationale]".green());
        println!("  {}  - Choose a category", "/category <name|code> <reason>".green());
        println!("  {}                           - Leave it to the deadline", "/skip".yellow());
        println!();
    }

    fn show_input_prompt() -> Result<(), ConsultationError> {
        print!("{} ", "review>".magenta().bold());
        io::stdout()
            .flush()
            .map_err(|e| ConsultationError::Io(format!("Failed to flush stdout: {}", e)))
    }

    /// Read commands from `reader` until a decision lands, the reviewer
    /// skips, the deadline passes or the run is cancelled.
    async fn present_from<R>(
        &self,
        request: &ConsultationRequest,
        submitter: &DecisionSubmitter,
        reader: R,
    ) -> Result<(), ConsultationError>
    where
        R: AsyncBufRead + Unpin,
    {
        let proposed = request.proposed.category();
        let deadline = deadline_instant(request.deadline);
        let cancellation = self.cancellation.clone().unwrap_or_default();
        let mut lines = reader.lines();

        loop {
            Self::show_input_prompt()?;
            let input = tokio::select! {
                _ = cancellation.cancelled() => {
                    println!();
                    return Err(ConsultationError::Cancelled);
                }
                _ = tokio::time::sleep_until(deadline) => {
                    println!();
                    println!(
                        "{}",
                        "Deadline passed. The conservative default applies.".yellow()
                    );
                    return Ok(());
                }
                line = lines.next_line() => match line {
                    Ok(Some(line)) => line,
                    Ok(None) => return Err(ConsultationError::Io("stdin closed".to_string())),
                    Err(e) => {
                        return Err(ConsultationError::Io(format!("Failed to read input: {}", e)));
                    }
                },
            };

            match parse_command(&input, proposed) {
                Ok(ReviewerCommand::Decide { category, rationale }) => {
                    let decision = HumanDecision::new(self.reviewer.clone(), category, rationale);
                    match submitter.submit_decision(decision) {
                        Ok(()) => {
                            debug!(session = %submitter.session_id(), %category, "Reviewer decision submitted");
                            println!();
                            println!(
                                "{} {}",
                                "✓ Decision recorded:".green(),
                                category.display_name()
                            );
                            return Ok(());
                        }
                        Err(ConsultationError::SessionClosed(id)) => {
                            warn!(session = %id, "Decision arrived after the session closed");
                            println!();
                            println!(
                                "{}",
                                "✗ The session already closed; the decision was not recorded."
                                    .red()
                            );
                            return Ok(());
                        }
                        Err(ConsultationError::InvalidDecision(reason)) => {
                            println!("{} {}", "⚠".yellow(), reason);
                        }
                        Err(e) => return Err(e),
                    }
                }
                Ok(ReviewerCommand::Skip) => {
                    println!();
                    println!(
                        "{}",
                        "Skipped. The conservative default applies at the deadline.".yellow()
                    );
                    return Ok(());
                }
                Ok(ReviewerCommand::Empty) => continue,
                Err(message) => {
                    println!();
                    println!("{} {}", "⚠".yellow(), message.red());
                    println!("Available commands: /accept, /category, /skip");
                    println!();
                }
            }
        }
    }
}

/// Map a wall-clock deadline onto the runtime clock.
fn deadline_instant(deadline: DateTime<Utc>) -> Instant {
    let remaining = (deadline - Utc::now()).to_std().unwrap_or_default();
    Instant::now() + remaining
}

#[async_trait]
impl HumanConsultationPort for InteractiveConsultation {
    async fn present(
        &self,
        request: ConsultationRequest,
        submitter: DecisionSubmitter,
    ) -> Result<(), ConsultationError> {
        self.display_prompt(&request);
        let stdin = BufReader::new(tokio::io::stdin());
        self.present_from(&request, &submitter, stdin).await
    }
}
