use std::sync::Arc;
use log::{debug, error};
use crate::config::Labels;
use crate::document::{Color, Document, SharedDocument, STATUS_TEXT_ID};
use crate::errors::{DocumentError, PollError};
use crate::manager_bms::BmsSource;
use crate::poller::{PollOutcome, PollTask, RequestGuard, Routine};

/// Polls the server's link state and keeps the connection indicator up to date
pub struct ConnectionChecker<S> {
    source: Arc<S>,
    document: SharedDocument,
    labels: Labels,
    guard: RequestGuard,
}

impl<S: BmsSource> ConnectionChecker<S> {
    /// Returns a new instance of the ConnectionChecker struct
    ///
    /// # Arguments
    ///
    /// * 'source' - where to get the connection state from
    /// * 'document' - the document holding the indicator
    /// * 'labels' - connected/disconnected/unknown texts
    pub fn new(source: Arc<S>, document: SharedDocument, labels: Labels) -> Self {
        Self { source, document, labels, guard: RequestGuard::new() }
    }

    /// Fetches the connection state and sets the indicator to connected (green),
    /// disconnected (red) or, on any failure, unknown (orange)
    ///
    /// # Arguments
    ///
    /// * 'generation' - generation issued for this request by the guard
    pub async fn check_connection_status(&self, generation: u64) -> PollOutcome {
        let result = self.source.get_connection_status().await;

        let mut document = match self.document.lock() {
            Ok(d) => d,
            Err(e) => {
                error!("Error fetching connection status: {}", e);
                return PollOutcome::Failed(DocumentError::from(e).into());
            }
        };

        if !self.guard.try_commit(generation) {
            debug!("discarding stale connection status {} (latest issued {})", generation, self.guard.latest_issued());
            return PollOutcome::Stale { generation };
        }

        let written = result.map_err(PollError::from).and_then(|status| {
            let (text, color) = if status.is_connected() {
                (&self.labels.connected, Color::Green)
            } else {
                (&self.labels.disconnected, Color::Red)
            };
            set_indicator(&mut document, text, color).map_err(PollError::from)
        });

        match written {
            Ok(()) => PollOutcome::Updated,
            Err(e) => {
                error!("Error fetching connection status: {}", e);
                if let Err(e) = set_indicator(&mut document, &self.labels.unknown, Color::Orange) {
                    error!("Error showing unknown connection status: {}", e);
                }
                PollOutcome::Failed(e)
            }
        }
    }
}

impl<S: BmsSource> PollTask for ConnectionChecker<S> {
    fn routine(&self) -> Routine {
        Routine::Connection
    }

    fn guard(&self) -> &RequestGuard {
        &self.guard
    }

    async fn poll(&self, generation: u64) -> PollOutcome {
        self.check_connection_status(generation).await
    }
}

fn set_indicator(document: &mut Document, text: &str, color: Color) -> Result<(), DocumentError> {
    debug!("connection indicator: {} ({})", text, color);
    document.set_text(STATUS_TEXT_ID, text)?;
    document.set_color(STATUS_TEXT_ID, color)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use crate::manager_bms::errors::BmsError;
    use crate::models::bms_status::BmsStatus;
    use crate::models::connection_status::ConnectionStatus;

    struct FixedSource(Option<&'static str>);

    impl BmsSource for FixedSource {
        async fn get_status(&self) -> Result<BmsStatus, BmsError> {
            unreachable!()
        }

        async fn get_connection_status(&self) -> Result<ConnectionStatus, BmsError> {
            Ok(serde_json::from_str(self.0.unwrap_or("{"))?)
        }
    }

    /// Answers connection requests in order, `None` fails
    struct SequenceSource(Mutex<VecDeque<Option<&'static str>>>);

    impl BmsSource for SequenceSource {
        async fn get_status(&self) -> Result<BmsStatus, BmsError> {
            unreachable!()
        }

        async fn get_connection_status(&self) -> Result<ConnectionStatus, BmsError> {
            let json = self.0.lock().unwrap().pop_front().unwrap();
            Ok(serde_json::from_str(json.unwrap_or("{"))?)
        }
    }

    async fn check(json: Option<&'static str>, document: Document) -> (PollOutcome, Document) {
        let document = Arc::new(Mutex::new(document));
        let checker = ConnectionChecker::new(Arc::new(FixedSource(json)), document.clone(), Labels::default());
        let outcome = checker.check_connection_status(checker.guard.issue()).await;
        let document = document.lock().unwrap().clone();
        (outcome, document)
    }

    fn indicator() -> Document {
        let mut document = Document::new();
        document.insert(crate::document::Element::new(STATUS_TEXT_ID));
        document
    }

    fn state(document: &Document) -> (String, Option<Color>) {
        let element = document.element(STATUS_TEXT_ID).unwrap();
        (element.text.clone(), element.color)
    }

    #[tokio::test]
    async fn connected_is_green() {
        let (outcome, document) = check(Some(r#"{"connected": true}"#), indicator()).await;

        assert!(matches!(outcome, PollOutcome::Updated));
        assert_eq!(state(&document), ("Connected".to_string(), Some(Color::Green)));
    }

    #[tokio::test]
    async fn disconnected_is_red() {
        let (outcome, document) = check(Some(r#"{"connected": false}"#), indicator()).await;

        assert!(matches!(outcome, PollOutcome::Updated));
        assert_eq!(state(&document), ("Disconnected".to_string(), Some(Color::Red)));
    }

    #[tokio::test]
    async fn non_boolean_is_disconnected() {
        let (_, document) = check(Some(r#"{"connected": "yes"}"#), indicator()).await;

        assert_eq!(state(&document), ("Disconnected".to_string(), Some(Color::Red)));
    }

    #[tokio::test]
    async fn failure_is_unknown_orange() {
        let (outcome, document) = check(None, indicator()).await;

        assert!(matches!(outcome, PollOutcome::Failed(PollError::Bms(BmsError::Document(_)))));
        assert_eq!(state(&document), ("Unknown".to_string(), Some(Color::Orange)));
    }

    #[tokio::test]
    async fn missing_indicator_is_failure() {
        let (outcome, _) = check(Some(r#"{"connected": true}"#), Document::new()).await;

        assert!(matches!(outcome, PollOutcome::Failed(PollError::Document(DocumentError::MissingElement(_)))));
    }

    #[tokio::test]
    async fn stale_response_leaves_indicator() {
        let document = Arc::new(Mutex::new(indicator()));
        let checker = ConnectionChecker::new(Arc::new(FixedSource(Some(r#"{"connected": false}"#))), document.clone(), Labels::default());

        let older = checker.guard.issue();
        let newer = checker.guard.issue();
        checker.check_connection_status(newer).await;
        document.lock().unwrap().set_text(STATUS_TEXT_ID, "marker").unwrap();
        let outcome = checker.check_connection_status(older).await;

        assert!(matches!(outcome, PollOutcome::Stale { generation: 1 }));
        assert_eq!(document.lock().unwrap().text(STATUS_TEXT_ID), Some("marker"));
    }

    #[tokio::test]
    async fn stale_failure_leaves_indicator() {
        let document = Arc::new(Mutex::new(indicator()));
        let source = SequenceSource(Mutex::new(VecDeque::from([Some(r#"{"connected": true}"#), None])));
        let checker = ConnectionChecker::new(Arc::new(source), document.clone(), Labels::default());

        let older = checker.guard.issue();
        let newer = checker.guard.issue();
        assert!(matches!(checker.check_connection_status(newer).await, PollOutcome::Updated));
        let outcome = checker.check_connection_status(older).await;

        assert!(matches!(outcome, PollOutcome::Stale { generation: 1 }));
        assert_eq!(state(&document.lock().unwrap()), ("Connected".to_string(), Some(Color::Green)));
    }
}
