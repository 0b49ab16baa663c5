//! Outcome of a bulk run

use colored::*;

use crate::entities::EntityKind;

/// One entity that failed during a run
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    pub local_id: String,
    pub error: String,
}

/// Results for one entity kind
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseReport {
    pub kind: EntityKind,
    /// Local ids created (load) or remote ids deleted (delete)
    pub succeeded: Vec<String>,
    /// Models published after creation
    pub published: usize,
    /// Rows repeating an id already handled earlier in the sheet; no second request is made
    pub skipped: usize,
    pub failures: Vec<Failure>,
}

impl PhaseReport {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            succeeded: Vec::new(),
            published: 0,
            skipped: 0,
            failures: Vec::new(),
        }
    }

    /// Record and log a failure
    pub fn fail(&mut self, local_id: impl Into<String>, error: impl std::fmt::Display) {
        let local_id = local_id.into();
        let error = format!("{:#}", error);
        log::error!("{} '{}': {}", self.kind, local_id, error);
        self.failures.push(Failure { local_id, error });
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkOperation {
    Load,
    Delete,
}

impl BulkOperation {
    fn past_tense(&self) -> &'static str {
        match self {
            BulkOperation::Load => "created",
            BulkOperation::Delete => "deleted",
        }
    }
}

/// Results of a whole load or delete run
#[derive(Debug, Clone, PartialEq)]
pub struct BulkReport {
    pub operation: BulkOperation,
    pub phases: Vec<PhaseReport>,
}

impl BulkReport {
    pub fn new(operation: BulkOperation) -> Self {
        Self {
            operation,
            phases: Vec::new(),
        }
    }

    pub fn phase(&self, kind: EntityKind) -> Option<&PhaseReport> {
        self.phases.iter().find(|p| p.kind == kind)
    }

    pub fn succeeded(&self) -> usize {
        self.phases.iter().map(|p| p.succeeded.len()).sum()
    }

    pub fn failed(&self) -> usize {
        self.phases.iter().map(|p| p.failures.len()).sum()
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    /// Print a per-kind summary followed by every failure
    pub fn print_summary(&self) {
        println!();
        for phase in &self.phases {
            let failed = phase.failures.len();
            let failed_label = format!("{} failed", failed);
            let mut extra = String::new();
            if phase.published > 0 {
                extra.push_str(&format!(", {} published", phase.published));
            }
            if phase.skipped > 0 {
                extra.push_str(&format!(", {} repeated rows", phase.skipped));
            }
            println!(
                "  {:<16} {} {}, {}{}",
                phase.kind.label().bold(),
                phase.succeeded.len().to_string().bright_green(),
                self.operation.past_tense(),
                if failed > 0 {
                    failed_label.bright_red()
                } else {
                    failed_label.dimmed()
                },
                extra
            );
        }

        if self.has_failures() {
            println!();
            println!("{}", "Failures:".bright_red().bold());
            for phase in &self.phases {
                for failure in &phase.failures {
                    println!(
                        "  {} '{}': {}",
                        phase.kind,
                        failure.local_id.yellow(),
                        failure.error
                    );
                }
            }
        }

        println!();
        let total = format!(
            "{} {}, {} failed",
            self.succeeded(),
            self.operation.past_tense(),
            self.failed()
        );
        if self.has_failures() {
            println!("{}", total.yellow());
        } else {
            println!("{}", total.bright_green());
        }
    }
}
