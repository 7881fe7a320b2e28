use thiserror::Error;

#[derive(Error, Debug)]
pub enum BmsError {
    #[error("http request error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("http error: {0}")]
    Http(reqwest::StatusCode),
    #[error("json document error: {0}")]
    Document(#[from] serde_json::Error),
}
