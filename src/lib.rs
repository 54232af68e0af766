//! Rust client for the MYOB AccountRight API, scoped to downloading the
//! attachment files of purchase bills within a date range.

pub mod batch;
pub mod client;
pub mod error;
pub mod models;
pub mod query;

pub use batch::{
    AttachmentOutcome, BatchDownloader, DEFAULT_OUTPUT_DIR, DateRange, DownloadSummary, RunConfig,
    run,
};
pub use client::{Client, DISCOVERY_URL, RawResponse};
pub use error::{ApiError, MyobError};
pub use models::{Attachment, CompanyFile, Invoice};
pub use query::QueryParams;
