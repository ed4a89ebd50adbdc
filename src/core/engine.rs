use crate::core::grouper::group_rows;
use crate::core::loader::ManifestLoader;
use crate::core::report::SyncReport;
use crate::core::validator::validate_rows;
use crate::domain::model::SubmissionResult;
use crate::domain::ports::{ScheduleSubmitter, Storage, TokenProvider};
use crate::utils::error::{Result, SyncError};

/// One pass over a price manifest: load, validate, group, submit.
pub struct SyncEngine<S: Storage, B: ScheduleSubmitter> {
    loader: ManifestLoader<S>,
    submitter: B,
    tokens: Box<dyn TokenProvider>,
}

impl<S: Storage, B: ScheduleSubmitter> SyncEngine<S, B> {
    pub fn new(storage: S, submitter: B, tokens: Box<dyn TokenProvider>) -> Self {
        Self {
            loader: ManifestLoader::new(storage),
            submitter,
            tokens,
        }
    }

    /// Load errors and a manifest with no valid row are fatal. Everything
    /// else is recorded in the report.
    pub async fn run(&self, manifest_path: &str) -> Result<SyncReport> {
        tracing::info!("Starting price schedule update...");

        let raw_rows = self.loader.load(manifest_path).await?;
        let mut report = SyncReport::new(raw_rows.len());

        let validated = validate_rows(&raw_rows);
        if validated.all_failed() {
            tracing::error!("❌ All {} rows failed validation", validated.total());
            return Err(SyncError::AllRowsInvalid {
                rows: validated.total(),
            });
        }
        if validated.valid.is_empty() {
            tracing::warn!("📝 Manifest has no price rows, nothing to update");
            return Ok(report);
        }
        tracing::info!(
            "✅ {} valid rows, {} invalid",
            validated.valid.len(),
            validated.errors.len()
        );
        report.validation_errors = validated.errors;

        let grouped = group_rows(validated.valid);
        for conflict in &grouped.conflicts {
            report.record(SubmissionResult::failure(&conflict.item, conflict.to_string()));
        }
        if grouped.items.is_empty() {
            return Ok(report);
        }

        let token = self.tokens.bearer_token()?;

        for item in &grouped.items {
            let result = self.submitter.submit(item, &token).await;
            report.record(result);
        }

        tracing::info!(
            "📦 Finished {} price schedules",
            report.results.len()
        );
        Ok(report)
    }
}
