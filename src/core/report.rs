use crate::core::validator::ValidationError;
use crate::domain::model::{Outcome, SubmissionResult};
use std::fmt::Write;

/// Everything that happened during one run, printed at the end.
#[derive(Debug, Default)]
pub struct SyncReport {
    pub rows_read: usize,
    pub validation_errors: Vec<ValidationError>,
    pub results: Vec<SubmissionResult>,
}

impl SyncReport {
    pub fn new(rows_read: usize) -> Self {
        Self {
            rows_read,
            ..Self::default()
        }
    }

    pub fn record(&mut self, result: SubmissionResult) {
        self.results.push(result);
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.results.iter().filter(|r| r.outcome == outcome).count()
    }

    pub fn has_failures(&self) -> bool {
        !self.validation_errors.is_empty() || self.count(Outcome::Failure) > 0
    }

    pub fn summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "📋 Price Update Summary:");
        let _ = writeln!(
            out,
            "  Rows: {} read, {} invalid",
            self.rows_read,
            self.validation_errors.len()
        );

        if !self.validation_errors.is_empty() {
            let _ = writeln!(out, "  Invalid rows:");
            for error in &self.validation_errors {
                let _ = writeln!(out, "    ❌ {}", error);
            }
        }

        if !self.results.is_empty() {
            let _ = writeln!(out, "  Items:");
        }
        for result in &self.results {
            let marker = match result.outcome {
                Outcome::Success => "✅",
                Outcome::DryRun => "🔍",
                Outcome::Failure => "❌",
            };
            let _ = write!(
                out,
                "    {} {} {} ({})",
                marker, result.item_type, result.item_id, result.memo
            );
            match (&result.outcome, &result.error_detail) {
                (Outcome::Failure, Some(detail)) => {
                    let _ = writeln!(out, ": {}", detail);
                }
                (Outcome::DryRun, _) => {
                    let _ = writeln!(out, ": dry run, not sent");
                }
                _ => {
                    let _ = writeln!(out);
                }
            }
        }

        let _ = writeln!(
            out,
            "  Result: {} succeeded, {} failed, {} dry run",
            self.count(Outcome::Success),
            self.count(Outcome::Failure),
            self.count(Outcome::DryRun)
        );
        out
    }
}
