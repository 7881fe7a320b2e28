use std::sync::Arc;
use log::{debug, error};
use crate::config::Labels;
use crate::document::{Document, SharedDocument};
use crate::errors::{DocumentError, PollError};
use crate::manager_bms::BmsSource;
use crate::models::bms_status::{BmsStatus, FieldKind};
use crate::poller::{PollOutcome, PollTask, RequestGuard, Routine};

/// Polls telemetry and writes every field into the element with the same id
pub struct StatusFetcher<S> {
    source: Arc<S>,
    document: SharedDocument,
    labels: Labels,
    guard: RequestGuard,
}

impl<S: BmsSource> StatusFetcher<S> {
    /// Returns a new instance of the StatusFetcher struct
    ///
    /// # Arguments
    ///
    /// * 'source' - where to get telemetry from
    /// * 'document' - the document to write to
    /// * 'labels' - yes/no and missing value texts
    pub fn new(source: Arc<S>, document: SharedDocument, labels: Labels) -> Self {
        Self { source, document, labels, guard: RequestGuard::new() }
    }

    /// Fetches telemetry and writes it to the document.
    ///
    /// Failures are logged and returned as an outcome, values already on display are left
    /// as they are. A failed request writes nothing, so it does not pass through the guard
    /// and an older request still in flight may write its values once it arrives.
    ///
    /// # Arguments
    ///
    /// * 'generation' - generation issued for this request by the guard
    pub async fn fetch_bms_status(&self, generation: u64) -> PollOutcome {
        let status = match self.source.get_status().await {
            Ok(s) => s,
            Err(e) => {
                error!("Error fetching BMS status: {}", e);
                return PollOutcome::Failed(e.into());
            }
        };

        let mut document = match self.document.lock() {
            Ok(d) => d,
            Err(e) => {
                error!("Error fetching BMS status: {}", e);
                return PollOutcome::Failed(DocumentError::from(e).into());
            }
        };

        if !self.guard.try_commit(generation) {
            debug!("discarding stale BMS status {} (latest issued {})", generation, self.guard.latest_issued());
            return PollOutcome::Stale { generation };
        }

        match render_status(&mut document, &status, &self.labels) {
            Ok(()) => PollOutcome::Updated,
            Err(e) => {
                error!("Error fetching BMS status: {}", e);
                PollOutcome::Failed(PollError::from(e))
            }
        }
    }
}

impl<S: BmsSource> PollTask for StatusFetcher<S> {
    fn routine(&self) -> Routine {
        Routine::Status
    }

    fn guard(&self) -> &RequestGuard {
        &self.guard
    }

    async fn poll(&self, generation: u64) -> PollOutcome {
        self.fetch_bms_status(generation).await
    }
}

/// Writes all telemetry fields to the document, flags as yes/no labels.
/// Stops at the first missing element, fields before it remain written.
///
/// # Arguments
///
/// * 'document' - the document to write to
/// * 'status' - the telemetry snapshot
/// * 'labels' - yes/no and missing value texts
pub fn render_status(document: &mut Document, status: &BmsStatus, labels: &Labels) -> Result<(), DocumentError> {
    for (id, kind, reading) in status.fields() {
        let text = match (kind, reading) {
            (FieldKind::Flag, r) => {
                if r.is_some_and(|r| r.is_truthy()) { labels.yes.clone() } else { labels.no.clone() }
            },
            (FieldKind::Value, Some(r)) => r.to_string(),
            (FieldKind::Value, None) => labels.missing.clone(),
        };
        document.set_text(id, &text)?;
    }

    Ok(())
}
