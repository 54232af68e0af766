use crate::error::MyobError;
use chrono::{NaiveDate, NaiveDateTime};
use log::debug;
use serde::Deserialize;

const UNKNOWN: &str = "unknown";
const UNKNOWN_FILE_NAME: &str = "unknown.pdf";
const INVOICE_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// One entry of the AccountRight company-file listing.
#[derive(Debug, Clone, Deserialize)]
pub struct CompanyFile {
    #[serde(rename = "Id", default)]
    pub id: Option<String>,
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    #[serde(rename = "Uri")]
    pub uri: String,
}

/// A purchase bill as returned by `Purchase/Bill`.
#[derive(Debug, Clone, Deserialize)]
pub struct Invoice {
    #[serde(rename = "UID")]
    pub uid: String,
    #[serde(rename = "Number", default)]
    pub number: Option<String>,
    #[serde(rename = "Date", default)]
    pub date: Option<String>,
}

impl Invoice {
    pub fn number(&self) -> &str {
        self.number.as_deref().unwrap_or(UNKNOWN)
    }

    pub fn date(&self) -> &str {
        self.date.as_deref().unwrap_or(UNKNOWN)
    }

    /// Calendar day the invoice was issued on.
    pub fn issue_date(&self) -> Result<NaiveDate, MyobError> {
        NaiveDateTime::parse_from_str(self.date(), INVOICE_DATE_FORMAT)
            .map(|dt| dt.date())
            .map_err(|_| MyobError::InvalidInvoiceDate {
                number: self.number().to_string(),
                date: self.date().to_string(),
            })
    }

    /// Local file name for one of this invoice's attachments:
    /// `invoice_{YYYYMMDD}_{number}_{original name}`.
    pub fn attachment_file_name(&self, attachment: &Attachment) -> Result<String, MyobError> {
        let date = self.issue_date()?;
        Ok(format!(
            "invoice_{}_{}_{}",
            date.format("%Y%m%d"),
            self.number(),
            attachment.original_file_name()
        ))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Attachment {
    #[serde(rename = "FileUri", default)]
    pub file_uri: Option<String>,
    #[serde(rename = "OriginalFileName", default)]
    pub original_file_name: Option<String>,
}

impl Attachment {
    /// Pre-signed download location; `None` when absent or blank.
    pub fn file_uri(&self) -> Option<&str> {
        self.file_uri.as_deref().filter(|uri| !uri.is_empty())
    }

    pub fn original_file_name(&self) -> &str {
        self.original_file_name
            .as_deref()
            .unwrap_or(UNKNOWN_FILE_NAME)
    }
}

#[derive(Debug, Deserialize)]
struct InvoicePage {
    #[serde(rename = "Items", default)]
    items: Vec<Invoice>,
}

#[derive(Debug, Deserialize)]
struct AttachmentList {
    #[serde(rename = "Attachments", default)]
    attachments: Option<Vec<Attachment>>,
}

pub fn parse_company_files(data: &str) -> Result<Vec<CompanyFile>, MyobError> {
    let files: Vec<CompanyFile> = serde_json::from_str(data)?;
    debug!("Parsed {} company files", files.len());
    Ok(files)
}

pub fn parse_invoices(data: &str) -> Result<Vec<Invoice>, MyobError> {
    let page: InvoicePage = serde_json::from_str(data)?;
    debug!("Parsed {} invoices", page.items.len());
    Ok(page.items)
}

pub fn parse_attachments(data: &str) -> Result<Vec<Attachment>, MyobError> {
    let list: AttachmentList = serde_json::from_str(data)?;
    let attachments = list.attachments.unwrap_or_default();
    debug!("Parsed {} attachments", attachments.len());
    Ok(attachments)
}
