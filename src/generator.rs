//! Report generation: fetch, aggregate, render and save, one run at a time.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, error, info};

use crate::aggregate::aggregate;
use crate::context::AppContext;
use crate::error::ReportError;
use crate::model::{ReportSelection, WeeklyStats};
use crate::notify::Notification;

/// Whether a run is currently in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenerationState {
    Idle,
    Generating,
}

/// Result of asking the generator to do work.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GenerationOutcome<T> {
    Completed(T),
    /// Another run was in flight; nothing was done.
    AlreadyRunning,
}

/// A report written to disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportArtifact {
    pub selection: ReportSelection,
    pub path: PathBuf,
    pub bytes_written: usize,
    pub stats: WeeklyStats,
}

/// Clears the in-flight flag when dropped, on success, error, or panic.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Runs the report pipeline against an [`AppContext`].
///
/// At most one run (generate or preview) is in flight per generator; a call
/// made while another is running returns [`GenerationOutcome::AlreadyRunning`]
/// immediately. Failures are logged, reported once through the context's
/// notification sink, and returned to the caller.
pub struct ReportGenerator {
    context: AppContext,
    generating: AtomicBool,
}

impl ReportGenerator {
    pub fn new(context: AppContext) -> Self {
        Self {
            context,
            generating: AtomicBool::new(false),
        }
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    pub fn state(&self) -> GenerationState {
        if self.generating.load(Ordering::Acquire) {
            GenerationState::Generating
        } else {
            GenerationState::Idle
        }
    }

    fn try_begin(&self) -> Option<InFlight<'_>> {
        self.generating
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight(&self.generating))
    }

    /// Fetches, aggregates, renders and saves the report for `selection`.
    pub async fn generate(
        &self,
        selection: ReportSelection,
    ) -> Result<GenerationOutcome<ReportArtifact>, ReportError> {
        let Some(_in_flight) = self.try_begin() else {
            debug!("Report for {} requested while another run is in flight", selection);
            return Ok(GenerationOutcome::AlreadyRunning);
        };

        info!("Generating report for {}", selection);
        let artifact = self.report_failure(selection, self.run(selection).await)?;

        self.context.notifier.notify(Notification::info(format!(
            "Report saved to {}",
            artifact.path.display()
        )));
        Ok(GenerationOutcome::Completed(artifact))
    }

    /// Fetches and aggregates without rendering anything.
    pub async fn preview(
        &self,
        selection: ReportSelection,
    ) -> Result<GenerationOutcome<WeeklyStats>, ReportError> {
        let Some(_in_flight) = self.try_begin() else {
            debug!("Preview for {} requested while another run is in flight", selection);
            return Ok(GenerationOutcome::AlreadyRunning);
        };

        let stats = self.report_failure(selection, self.collect(selection).await)?;
        Ok(GenerationOutcome::Completed(stats))
    }

    async fn run(&self, selection: ReportSelection) -> Result<ReportArtifact, ReportError> {
        let stats = self.collect(selection).await?;
        let report = self.context.renderer.render_stats(&stats, selection)?;
        let path = self.context.downloader.save(selection, &report.bytes)?;

        Ok(ReportArtifact {
            selection,
            path,
            bytes_written: report.bytes.len(),
            stats,
        })
    }

    async fn collect(&self, selection: ReportSelection) -> Result<WeeklyStats, ReportError> {
        let token = self
            .context
            .session
            .bearer_token()
            .ok_or(ReportError::NotAuthenticated)?;
        let records = self.context.source.fetch_transactions(&token).await?;
        Ok(aggregate(&records, selection))
    }

    fn report_failure<T>(
        &self,
        selection: ReportSelection,
        result: Result<T, ReportError>,
    ) -> Result<T, ReportError> {
        result.map_err(|err| {
            error!("Report for {} failed: {}", selection, err);
            self.context
                .notifier
                .notify(Notification::error(err.user_message()));
            err
        })
    }
}
