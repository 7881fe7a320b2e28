pub mod errors;

use std::future::Future;
use std::time::Duration;
use log::debug;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use crate::config::Server;
use crate::manager_bms::errors::BmsError;
use crate::models::bms_status::BmsStatus;
use crate::models::connection_status::ConnectionStatus;

/// Source of BMS telemetry and connection state
///
pub trait BmsSource: Send + Sync + 'static {
    fn get_status(&self) -> impl Future<Output = Result<BmsStatus, BmsError>> + Send;
    fn get_connection_status(&self) -> impl Future<Output = Result<ConnectionStatus, BmsError>> + Send;
}

/// Client for the SmartBMS web server
pub struct BmsClient {
    base_url: String,
    status_path: String,
    connection_path: String,
    client: Client,
}

impl BmsClient {
    /// Returns a new instance of the BmsClient struct
    ///
    /// # Arguments
    ///
    /// * 'config' - server configuration, base url, paths and request timeout
    pub fn new(config: &Server) -> Result<Self, BmsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            status_path: config.status_path.clone(),
            connection_path: config.connection_path.clone(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends a get request and parses the response body as json
    ///
    /// # Arguments
    ///
    /// * 'path' - path of the endpoint, appended to the base url
    async fn get_request<T: DeserializeOwned>(&self, path: &str) -> Result<T, BmsError> {
        let url = self.url(path);
        debug!("GET {}", url);

        let res = self.client.get(&url).send().await?;

        if res.status() != StatusCode::OK {
            return Err(BmsError::Http(res.status()));
        }

        let json = res.text().await?;

        Ok(serde_json::from_str(&json)?)
    }
}

impl BmsSource for BmsClient {
    /// Retrieves the latest telemetry snapshot
    ///
    async fn get_status(&self) -> Result<BmsStatus, BmsError> {
        self.get_request(&self.status_path).await
    }

    /// Retrieves whether the server currently has a link to the BMS
    ///
    async fn get_connection_status(&self) -> Result<ConnectionStatus, BmsError> {
        self.get_request(&self.connection_path).await
    }
}
