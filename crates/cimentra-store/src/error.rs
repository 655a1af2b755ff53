use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("store returned {status}: {body}")]
    Server { status: u16, body: String },

    #[error("store response parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("insert returned no row")]
    NoRows,
}
