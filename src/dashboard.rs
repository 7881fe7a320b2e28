use std::sync::Arc;
use std::time::Duration;
use log::info;
use crate::config::Config;
use crate::document::SharedDocument;
use crate::errors::{DashboardError, DocumentError};
use crate::manager_bms::BmsSource;
use crate::pages::show_page;
use crate::poller::{OutcomeHandler, Poller};
use crate::status_fetcher::StatusFetcher;
use crate::connection_checker::ConnectionChecker;

/// Wires the polling routines, their timers and the page switcher to one document
pub struct Dashboard<S> {
    document: SharedDocument,
    status: Arc<StatusFetcher<S>>,
    connection: Arc<ConnectionChecker<S>>,
    poller: Poller,
    status_period: Duration,
    connection_period: Duration,
    default_page: String,
}

impl<S: BmsSource> Dashboard<S> {
    /// Returns a new instance of the Dashboard struct
    ///
    /// With `display.fail_on_missing_elements` set, a document lacking any element the
    /// polling routines write to is rejected here instead of failing every poll.
    ///
    /// # Arguments
    ///
    /// * 'config' - polling periods, labels and display settings
    /// * 'source' - where to get telemetry and connection state from
    /// * 'document' - the document to render into
    /// * 'handler' - receives the outcome of every poll
    pub fn new(config: &Config, source: Arc<S>, document: SharedDocument, handler: OutcomeHandler) -> Result<Self, DashboardError> {
        if config.display.fail_on_missing_elements {
            let missing = document.lock().map_err(DocumentError::from)?.missing_targets();
            if !missing.is_empty() {
                return Err(DashboardError::MissingElements(missing));
            }
        }

        let status = StatusFetcher::new(source.clone(), document.clone(), config.labels.clone());
        let connection = ConnectionChecker::new(source, document.clone(), config.labels.clone());

        Ok(Self {
            document,
            status: Arc::new(status),
            connection: Arc::new(connection),
            poller: Poller::new(handler),
            status_period: Duration::from_millis(config.polling.status_interval_ms),
            connection_period: Duration::from_millis(config.polling.connection_interval_ms),
            default_page: config.display.default_page.clone(),
        })
    }

    /// Fetches status and connection state right away, keeps repeating both on their
    /// own timers and shows the default page. Calling it again restarts the timers.
    ///
    pub fn start(&mut self) -> Result<(), DashboardError> {
        self.poller.stop();
        self.poller.start(self.status.clone(), self.status_period);
        self.poller.start(self.connection.clone(), self.connection_period);
        info!("polling started, status every {} ms, connection every {} ms",
            self.status_period.as_millis(), self.connection_period.as_millis());

        let page = self.default_page.clone();
        self.show_page(&page)?;

        Ok(())
    }

    /// Stops both timers, in-flight requests are abandoned
    pub fn stop(&mut self) {
        self.poller.stop();
        info!("polling stopped");
    }

    /// Shows the named page, returns false if the document has no such page
    ///
    /// # Arguments
    ///
    /// * 'page' - name of the page
    pub fn show_page(&self, page: &str) -> Result<bool, DocumentError> {
        let mut document = self.document.lock()?;
        show_page(&mut document, page)
    }

    pub fn document(&self) -> SharedDocument {
        self.document.clone()
    }

    pub fn active_timers(&self) -> usize {
        self.poller.active_timers()
    }
}
