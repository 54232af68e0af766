use crate::error::{ApiError, MyobError};
use crate::models::{Attachment, Invoice, parse_attachments, parse_company_files, parse_invoices};
use crate::query::QueryParams;
use chrono::NaiveDate;
use log::{debug, error, info};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client as HttpClient, Method, StatusCode};
use serde_json::Value;
use std::path::Path;

/// Company-file listing used to discover the per-account API root.
pub const DISCOVERY_URL: &str = "https://api.myob.com/accountright/";

const API_KEY_HEADER: &str = "x-myobapi-key";
const API_VERSION_HEADER: &str = "x-myobapi-version";
const API_VERSION: &str = "v2";

/// Status and body text of a completed request.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

#[derive(Debug, Clone)]
pub struct Client {
    http: HttpClient,
    download: HttpClient,
    api_url: String,
}

impl Client {
    /// Authenticate against the public AccountRight endpoint and bind to the
    /// first company file it lists.
    pub async fn connect(
        client_id: impl AsRef<str>,
        access_token: impl AsRef<str>,
    ) -> Result<Self, MyobError> {
        Self::connect_to(DISCOVERY_URL, client_id, access_token).await
    }

    /// Like [`Client::connect`], with an explicit discovery URL (useful for
    /// tests or proxies).
    pub async fn connect_to(
        discovery_url: &str,
        client_id: impl AsRef<str>,
        access_token: impl AsRef<str>,
    ) -> Result<Self, MyobError> {
        let headers = auth_headers(client_id.as_ref(), access_token.as_ref())?;
        let http = HttpClient::builder().default_headers(headers).build()?;
        // Attachment URIs are pre-signed; they get no credentials.
        let download = HttpClient::builder().build()?;

        let mut client = Self {
            http,
            download,
            api_url: String::new(),
        };
        client.api_url = client.discover_api_url(discovery_url).await?;
        info!("Using API URL: {}", client.api_url);
        Ok(client)
    }

    /// Root URI of the selected company file.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Fetch all bills dated within `[start 00:00:00, end 23:59:59]`, newest
    /// first. A rejected request yields an empty list.
    pub async fn get_invoices_between_dates(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Invoice>, MyobError> {
        let url = format!("{}/Purchase/Bill", self.api_url);
        let query = QueryParams::new()
            .param(
                "$filter",
                format!(
                    "Date ge datetime'{}T00:00:00' and Date le datetime'{}T23:59:59'",
                    start.format("%Y-%m-%d"),
                    end.format("%Y-%m-%d")
                ),
            )
            .param("$orderby", "Date desc");

        info!("Searching for invoices between {} and {}", start, end);
        let response = self.send_request(Method::GET, &url, &query, None).await?;
        if !response.is_success() {
            error!("Failed to get invoices");
            return Ok(Vec::new());
        }

        let invoices = parse_invoices(&response.body)?;
        info!(
            "Found {} invoices between {} and {}",
            invoices.len(),
            start,
            end
        );
        Ok(invoices)
    }

    /// List attachment metadata for one bill. A rejected request yields an
    /// empty list.
    pub async fn get_invoice_attachments(
        &self,
        invoice_uid: &str,
    ) -> Result<Vec<Attachment>, MyobError> {
        info!("Getting attachments for invoice UID: {}", invoice_uid);
        let url = format!(
            "{}/Purchase/Bill/Service/{}/Attachment",
            self.api_url, invoice_uid
        );
        let response = self
            .send_request(Method::GET, &url, &QueryParams::new(), None)
            .await?;
        if !response.is_success() {
            error!("Failed to get attachments");
            return Ok(Vec::new());
        }
        parse_attachments(&response.body)
    }

    /// Fetch `file_uri` without credentials and write the payload to
    /// `save_path`, replacing any existing file.
    ///
    /// The whole payload is received before the file is created, so a failed
    /// fetch leaves nothing on disk.
    pub async fn download_attachment(
        &self,
        file_uri: &str,
        save_path: &Path,
    ) -> Result<(), MyobError> {
        info!("Downloading attachment from: {}", file_uri);
        let response = self.download.get(file_uri).send().await?;
        let status = response.status();
        debug!("Received status {}", status);
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::DownloadFailed { status, body }.into());
        }

        let payload = response.bytes().await?;
        tokio::fs::write(save_path, &payload).await?;
        info!("Successfully saved attachment to {}", save_path.display());
        Ok(())
    }

    /// Issue an authenticated request and hand back status and body without
    /// judging the status.
    pub async fn send_request(
        &self,
        method: Method,
        url: &str,
        query: &QueryParams,
        body: Option<&Value>,
    ) -> Result<RawResponse, MyobError> {
        let url = query.apply_to(url);
        let mut request = self.http.request(method.clone(), &url);
        if let Some(body) = body {
            request = request.body(serde_json::to_string(body)?);
        }

        info!("Making {} request to: {}", method, url);
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        info!("Response status code: {}", status.as_u16());
        if status.is_success() {
            info!("Request successful");
        } else {
            error!("Response text: {}", body);
        }
        Ok(RawResponse { status, body })
    }

    async fn discover_api_url(&self, discovery_url: &str) -> Result<String, MyobError> {
        let response = self
            .send_request(Method::GET, discovery_url, &QueryParams::new(), None)
            .await?;
        handle_status(response.status)?;

        let files = parse_company_files(&response.body)?;
        debug!("Discovery listed {} company files", files.len());
        files
            .into_iter()
            .next()
            .map(|file| file.uri)
            .ok_or(MyobError::NoAccounts)
    }
}

fn auth_headers(client_id: &str, access_token: &str) -> Result<HeaderMap, MyobError> {
    if client_id.is_empty() {
        return Err(MyobError::InvalidParameter("client id must not be empty"));
    }
    if access_token.is_empty() {
        return Err(MyobError::InvalidParameter("access token must not be empty"));
    }

    let mut bearer = HeaderValue::from_str(&format!("Bearer {access_token}"))
        .map_err(|_| MyobError::InvalidParameter("access token is not a valid header value"))?;
    bearer.set_sensitive(true);
    let api_key = HeaderValue::from_str(client_id)
        .map_err(|_| MyobError::InvalidParameter("client id is not a valid header value"))?;

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, bearer);
    headers.insert(HeaderName::from_static(API_KEY_HEADER), api_key);
    headers.insert(
        HeaderName::from_static(API_VERSION_HEADER),
        HeaderValue::from_static(API_VERSION),
    );
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(headers)
}

fn handle_status(status: StatusCode) -> Result<(), MyobError> {
    if status.is_success() {
        return Ok(());
    }
    let api_error = match status {
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
        StatusCode::FORBIDDEN => ApiError::Forbidden,
        StatusCode::NOT_FOUND => ApiError::NotFound,
        _ => ApiError::UnexpectedStatus(status),
    };
    Err(MyobError::Api(api_error))
}
