//! Console output formatter for workflow reports

use colored::Colorize;
use valgen_domain::{
    CategorySource, OutputFormat, TestCase, WorkflowError, WorkflowOutcome, WorkflowReport,
};

/// Formats workflow reports for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    pub fn render(report: &WorkflowReport, format: OutputFormat) -> String {
        match format {
            OutputFormat::Full => Self::format(report),
            OutputFormat::Summary => Self::format_summary(report),
            OutputFormat::Json => Self::format_json(report),
        }
    }

    /// Format the complete report
    pub fn format(report: &WorkflowReport) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Validation Test Generation"));
        output.push('\n');
        output.push_str(&Self::overview(report));

        // Classification
        if let Some(classification) = &report.classification {
            output.push_str(&Self::section_header("Classification"));
            output.push_str(&format!(
                "{} ({:.2})\n",
                classification.category().display_name(),
                classification.confidence()
            ));
            if !classification.rationale().is_empty() {
                output.push_str(&format!("{}\n", Self::indent(classification.rationale(), "  ")));
            }
            for indicator in classification.indicators() {
                output.push_str(&format!("  * {}\n", indicator));
            }
        }

        // Consultation
        if let Some(session) = &report.escalation {
            output.push_str(&Self::section_header("Consultation"));
            output.push_str(&format!(
                "{} {} ({})\n",
                "Session:".cyan().bold(),
                session.id(),
                session.status().as_str()
            ));
            output.push_str(&format!("{} {}\n", "Reason:".cyan().bold(), session.trigger_reason()));
            output.push_str(&format!(
                "{} {}\n",
                "Deadline:".cyan().bold(),
                session.deadline().to_rfc3339()
            ));
            if let Some(resolution) = session.resolution() {
                let flag = if resolution.is_fallback {
                    " (fallback)".yellow().bold().to_string()
                } else {
                    String::new()
                };
                output.push_str(&format!(
                    "{} {} by {}{}\n",
                    "Decision:".cyan().bold(),
                    resolution.decided_category.display_name(),
                    resolution.decided_by,
                    flag
                ));
                output.push_str(&format!("{}\n", Self::indent(&resolution.rationale, "  ")));
            }
            if let Some(reason) = session.cancellation_reason() {
                output.push_str(&format!("{} {}\n", "Cancelled:".yellow().bold(), reason));
            }
        }

        // Outcome
        match &report.outcome {
            WorkflowOutcome::Completed { suite } => {
                output.push_str(&Self::section_header(&format!(
                    "Test Suite ({} of {} required)",
                    suite.len(),
                    suite.required_count()
                )));
                for case in suite.cases() {
                    output.push_str(&Self::format_case(case));
                }
            }
            WorkflowOutcome::Failed { error } => {
                output.push_str(&Self::section_header("Failure"));
                output.push_str(&Self::format_error(error));
            }
            WorkflowOutcome::Cancelled { reason } => {
                output.push_str(&Self::section_header("Cancelled"));
                output.push_str(&format!("{}\n", reason));
            }
        }

        // Audit trail
        output.push_str(&Self::section_header("Audit Trail"));
        for entry in &report.audit_trail {
            output.push_str(&format!(
                "  #{:<4} {} {:<30} {:<18} {}\n",
                entry.sequence_number,
                entry.timestamp.format("%H:%M:%S%.3f"),
                entry.event_kind.as_str(),
                entry.actor.to_string(),
                entry.payload_digest.chars().take(12).collect::<String>().dimmed()
            ));
        }

        output.push_str(&Self::footer());
        output
    }

    /// Format as JSON
    pub fn format_json(report: &WorkflowReport) -> String {
        serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
    }

    /// Outcome, category and case titles only
    pub fn format_summary(report: &WorkflowReport) -> String {
        let mut output = Self::overview(report);
        match &report.outcome {
            WorkflowOutcome::Completed { suite } => {
                output.push('\n');
                for case in suite.cases() {
                    output.push_str(&format!("  {} {}\n", case.id.bold(), case.title));
                }
            }
            WorkflowOutcome::Failed { error } => {
                output.push('\n');
                output.push_str(&Self::format_error(error));
            }
            WorkflowOutcome::Cancelled { reason } => {
                output.push_str(&format!("\n{}\n", reason));
            }
        }
        output
    }

    fn overview(report: &WorkflowReport) -> String {
        let status = match &report.outcome {
            WorkflowOutcome::Completed { .. } => "COMPLETED".green().bold(),
            WorkflowOutcome::Failed { .. } => "FAILED".red().bold(),
            WorkflowOutcome::Cancelled { .. } => "CANCELLED".yellow().bold(),
        };
        let mut output = format!(
            "{} {}  {} {}\n",
            "Document:".cyan().bold(),
            report.document_name,
            "Status:".cyan().bold(),
            status
        );
        if let Some(category) = report.effective_category {
            let source = match report.category_source {
                Some(CategorySource::Classifier) => "classifier".normal(),
                Some(CategorySource::Human) => "reviewer".normal(),
                Some(CategorySource::TimeoutFallback) => {
                    "FALLBACK after consultation timeout".yellow().bold()
                }
                None => "unknown".normal(),
            };
            output.push_str(&format!(
                "{} {} [{}], {} test cases required\n",
                "Category:".cyan().bold(),
                category.display_name(),
                source,
                category.required_test_count()
            ));
        }
        output.push_str(&format!(
            "{} {} ({} audit entries)\n",
            "Workflow:".dimmed(),
            report.workflow_id,
            report.audit_trail.len()
        ));
        output
    }

    fn format_case(case: &TestCase) -> String {
        let mut output = format!("\n{} {}\n", format!("[{}]", case.id).yellow().bold(), case.title);
        output.push_str(&format!("  {} {}\n", "Objective:".bold(), case.objective));
        for precondition in &case.preconditions {
            output.push_str(&format!("  {} {}\n", "Given:".bold(), precondition));
        }
        for (i, step) in case.steps.iter().enumerate() {
            output.push_str(&format!("  {}. {} => {}\n", i + 1, step.action, step.expected));
        }
        output.push_str(&format!("  {} {}\n", "Expected:".bold(), case.expected_result));
        if !case.traceability.is_empty() {
            output.push_str(&format!("  {} {}\n", "Traces:".dimmed(), case.traceability.join(", ")));
        }
        output
    }

    fn format_error(error: &WorkflowError) -> String {
        let mut output = format!("{} {}\n", error.kind().as_str().red().bold(), error);
        match error {
            WorkflowError::Tool {
                raw_response: Some(raw),
                ..
            } => {
                output.push_str(&format!("{}\n{}\n", "Raw response:".dimmed(), Self::indent(raw, "  ")));
            }
            WorkflowError::Validation { raw_output, .. } => {
                let preview: String = raw_output.chars().take(500).collect();
                output.push_str(&format!("{}\n{}\n", "Raw output:".dimmed(), Self::indent(&preview, "  ")));
            }
            WorkflowError::Parsing { input_excerpt, .. } if !input_excerpt.is_empty() => {
                output.push_str(&format!("{}\n{}\n", "Input:".dimmed(), Self::indent(input_excerpt, "  ")));
            }
            _ => {}
        }
        output
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
