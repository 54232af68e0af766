use thiserror::Error;

#[derive(Debug, Error)]
pub enum MyobError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),

    #[error("dates must be in YYYY-MM-DD format, got {input:?}")]
    InvalidDate {
        input: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("invoice {number} has an unparseable date {date:?}")]
    InvalidInvoiceDate { number: String, date: String },

    #[error("account discovery returned no accounts")]
    NoAccounts,

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid or unexpected response format: {0}")]
    InvalidResponse(#[from] serde_json::Error),

    #[error("api rejected request: {0}")]
    Api(#[from] ApiError),
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("not authorized (401)")]
    Unauthorized,

    #[error("forbidden (403)")]
    Forbidden,

    #[error("resource not found (404)")]
    NotFound,

    #[error("failed to download attachment ({status}): {body}")]
    DownloadFailed {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("unexpected status {0}")]
    UnexpectedStatus(reqwest::StatusCode),
}
