use std::sync::{Arc, Mutex};
use chrono::Local;
use log::{debug, info, warn};
use crate::config::Config;
use crate::dashboard::Dashboard;
use crate::document::{Document, SharedDocument};
use crate::errors::InitError;
use crate::manager_bms::BmsClient;
use crate::poller::{OutcomeHandler, PollOutcome, Routine};

const ROUTINES: [Routine; 2] = [Routine::Status, Routine::Connection];

pub struct Mgr {
    pub dashboard: Dashboard<BmsClient>,
}

/// Builds the BMS client, the document and the dashboard wired to them
///
/// # Arguments
///
/// * 'config' - the loaded configuration
pub fn init(config: &Config) -> Result<Mgr, InitError> {
    info!("bms-dash version: {}", env!("CARGO_PKG_VERSION"));
    info!("polling {}", config.server.base_url);

    let client = BmsClient::new(&config.server)?;

    let alert_ids = ROUTINES.map(|r| r.alert_id());
    let document: SharedDocument = Arc::new(Mutex::new(Document::from_layout(&config.pages, &alert_ids)));

    let dashboard = Dashboard::new(config, Arc::new(client), document.clone(), alert_handler(document))?;

    Ok(Mgr { dashboard })
}

/// Returns an outcome handler that keeps one alert line per routine in the document,
/// set when a poll fails and cleared by the next successful one
///
/// # Arguments
///
/// * 'document' - the document holding the alert lines
pub fn alert_handler(document: SharedDocument) -> OutcomeHandler {
    Arc::new(move |routine: Routine, outcome: &PollOutcome| {
        let alert = match outcome {
            PollOutcome::Updated => String::new(),
            PollOutcome::Failed(e) => {
                format!("{} update failed at {}: {}", routine, Local::now().format("%H:%M:%S"), e)
            },
            PollOutcome::Stale { generation } => {
                debug!("{} response {} arrived after a newer one", routine, generation);
                return;
            },
        };

        match document.lock() {
            Ok(mut d) => {
                if let Err(e) = d.set_text(routine.alert_id(), &alert) {
                    warn!("{}", e);
                }
            },
            Err(e) => warn!("{}", e),
        }
    })
}
