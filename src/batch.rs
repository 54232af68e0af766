//! Batch download of bill attachments for a date range.
//!
//! The run is strictly sequential: one invoice at a time, one attachment at
//! a time. A failed download is logged and skipped; only argument
//! validation, client construction, and malformed API data abort the run.

use crate::client::{Client, DISCOVERY_URL};
use crate::error::MyobError;
use crate::models::{Attachment, Invoice};
use chrono::NaiveDate;
use log::{error, info};
use std::fmt;
use std::path::{Path, PathBuf};

/// Directory attachments are written to, relative to the working directory.
pub const DEFAULT_OUTPUT_DIR: &str = "invoice_pdfs";

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(raw: &str) -> Result<NaiveDate, MyobError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|source| MyobError::InvalidDate {
        input: raw.to_string(),
        source,
    })
}

/// Inclusive range of issue dates to search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn parse(start: &str, end: &str) -> Result<Self, MyobError> {
        Ok(Self {
            start: parse_date(start)?,
            end: parse_date(end)?,
        })
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Everything a run needs, as given on the command line.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub client_id: String,
    pub access_token: String,
    pub start_date: String,
    pub end_date: String,
    pub output_dir: PathBuf,
    pub discovery_url: String,
}

impl RunConfig {
    pub fn new(
        client_id: impl Into<String>,
        access_token: impl Into<String>,
        start_date: impl Into<String>,
        end_date: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            access_token: access_token.into(),
            start_date: start_date.into(),
            end_date: end_date.into(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            discovery_url: DISCOVERY_URL.to_string(),
        }
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn with_discovery_url(mut self, discovery_url: impl Into<String>) -> Self {
        self.discovery_url = discovery_url.into();
        self
    }
}

/// What happened to a single attachment.
#[derive(Debug)]
pub enum AttachmentOutcome {
    Downloaded(PathBuf),
    /// The attachment had no file URI.
    Skipped,
    Failed(MyobError),
}

/// Running totals for a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadSummary {
    pub invoices: usize,
    pub total_attachments: usize,
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl DownloadSummary {
    fn record(&mut self, outcome: &AttachmentOutcome) {
        match outcome {
            AttachmentOutcome::Downloaded(_) => self.downloaded += 1,
            AttachmentOutcome::Skipped => self.skipped += 1,
            AttachmentOutcome::Failed(_) => self.failed += 1,
        }
    }
}

impl fmt::Display for DownloadSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Found {} attachments, successfully downloaded {}",
            self.total_attachments, self.downloaded
        )
    }
}

/// Validate dates, prepare the output directory, connect, and download every
/// attachment of every bill in range.
pub async fn run(config: &RunConfig) -> Result<DownloadSummary, MyobError> {
    let range = DateRange::parse(&config.start_date, &config.end_date)?;
    ensure_output_dir(&config.output_dir).await?;

    let client = Client::connect_to(
        &config.discovery_url,
        &config.client_id,
        &config.access_token,
    )
    .await?;

    let summary = BatchDownloader::new(&client, &config.output_dir)
        .run(range)
        .await?;
    info!("Download complete. {}", summary);
    Ok(summary)
}

/// Create `dir` (and parents) unless it already exists.
pub async fn ensure_output_dir(dir: &Path) -> Result<(), MyobError> {
    tokio::fs::create_dir_all(dir).await?;
    Ok(())
}

/// Walks invoices and their attachments with an already connected client.
#[derive(Debug)]
pub struct BatchDownloader<'a> {
    client: &'a Client,
    output_dir: &'a Path,
}

impl<'a> BatchDownloader<'a> {
    pub fn new(client: &'a Client, output_dir: &'a Path) -> Self {
        Self { client, output_dir }
    }

    pub async fn run(&self, range: DateRange) -> Result<DownloadSummary, MyobError> {
        info!("Collecting attachments for bills dated {}", range);
        let invoices = self
            .client
            .get_invoices_between_dates(range.start, range.end)
            .await?;

        let mut summary = DownloadSummary::default();
        for invoice in &invoices {
            summary.invoices += 1;
            self.process_invoice(invoice, &mut summary).await?;
        }
        Ok(summary)
    }

    async fn process_invoice(
        &self,
        invoice: &Invoice,
        summary: &mut DownloadSummary,
    ) -> Result<(), MyobError> {
        info!(
            "Processing invoice {} from {}",
            invoice.number(),
            invoice.date()
        );

        let attachments = self.client.get_invoice_attachments(&invoice.uid).await?;
        if attachments.is_empty() {
            info!("No attachments found for invoice {}", invoice.number());
            return Ok(());
        }

        summary.total_attachments += attachments.len();
        info!(
            "Found {} attachments for invoice {}",
            attachments.len(),
            invoice.number()
        );

        for attachment in &attachments {
            let outcome = self.process_attachment(invoice, attachment).await?;
            summary.record(&outcome);
        }
        Ok(())
    }

    /// Download one attachment. Only a malformed invoice date is returned as
    /// an error; fetch and write failures become [`AttachmentOutcome::Failed`].
    async fn process_attachment(
        &self,
        invoice: &Invoice,
        attachment: &Attachment,
    ) -> Result<AttachmentOutcome, MyobError> {
        let Some(file_uri) = attachment.file_uri() else {
            error!(
                "No FileUri found in attachment data for invoice {}",
                invoice.number()
            );
            return Ok(AttachmentOutcome::Skipped);
        };

        let save_path = self
            .output_dir
            .join(invoice.attachment_file_name(attachment)?);

        match self.client.download_attachment(file_uri, &save_path).await {
            Ok(()) => {
                info!("Successfully downloaded: {}", save_path.display());
                Ok(AttachmentOutcome::Downloaded(save_path))
            }
            Err(err) => {
                error!(
                    "Failed to download attachment for invoice {}: {}",
                    invoice.number(),
                    err
                );
                Ok(AttachmentOutcome::Failed(err))
            }
        }
    }
}
