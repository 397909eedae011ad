// src/client.rs

use async_trait::async_trait;
use reqwest::{multipart, Client};
use std::time::Instant;

use crate::config::{BackendConfig, BackendCredentials};
use crate::errors::{ClientError, Result};
use crate::models::{
    ClassificationResult, ClassifyResponse, LoginResponse, UploadAnalysis, UploadResponse, UploadedFile,
};

pub const CLASSIFY_FAILED: &str = "Failed to classify question";
pub const UPLOAD_FAILED: &str = "Failed to process file";

/// Report formats the backend can produce for the latest upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Pdf,
    Xlsx,
    Csv,
}

impl ReportFormat {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pdf" => Some(ReportFormat::Pdf),
            "xlsx" => Some(ReportFormat::Xlsx),
            "csv" => Some(ReportFormat::Csv),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReportFormat::Pdf => "pdf",
            ReportFormat::Xlsx => "xlsx",
            ReportFormat::Csv => "csv",
        }
    }
}

/// A downloaded report, passed through to the browser untouched.
#[derive(Debug, Clone)]
pub struct ReportDownload {
    pub status: u16,
    pub content_type: Option<String>,
    pub content_disposition: Option<String>,
    pub body: Vec<u8>,
}

/// The classification backend as seen by the client.
#[async_trait]
pub trait ClassificationBackend: Send + Sync {
    /// Classifies one already-validated question.
    async fn classify(&self, question: &str) -> Result<ClassificationResult>;

    /// Uploads a validated spreadsheet; returns the backend's analysis.
    async fn upload_report(&self, file: &UploadedFile) -> Result<UploadAnalysis>;

    /// Fetches the report for the most recent upload.
    async fn download_report(&self, format: ReportFormat) -> Result<ReportDownload>;

    /// Opens a backend session.
    async fn login(&self, credentials: &BackendCredentials) -> Result<()>;
}

/// Talks to the backend over HTTP, keeping its session cookie.
pub struct HttpBackend {
    client: Client,
    config: BackendConfig,
}

impl HttpBackend {
    pub fn new(config: BackendConfig) -> Result<Self> {
        let mut builder = Client::builder().cookie_store(true);
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        Ok(Self { client: builder.build()?, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base.trim_end_matches('/'), path)
    }

    async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp
            .text()
            .await
            .unwrap_or_else(|_| "Could not read error body".to_string());
        Err(ClientError::ApiError { status: status.as_u16(), body })
    }
}

/// Turns a raw `/classify` reply into a result or an error.
pub fn interpret_classify(resp: ClassifyResponse) -> Result<ClassificationResult> {
    if !resp.success {
        return Err(ClientError::Rejected(resp.error.unwrap_or_else(|| CLASSIFY_FAILED.to_string())));
    }
    let missing = |field: &str| ClientError::UnexpectedResponse(format!("classify response missing `{}`", field));
    Ok(ClassificationResult {
        level: resp.level.ok_or_else(|| missing("level"))?,
        description: resp.description.ok_or_else(|| missing("description"))?,
        question: resp.question.ok_or_else(|| missing("question"))?,
        color: resp.color.unwrap_or_default(),
    })
}

/// Turns a raw `/upload_report` reply into an analysis or an error.
pub fn interpret_upload(resp: UploadResponse) -> Result<UploadAnalysis> {
    if !resp.success {
        return Err(ClientError::Rejected(resp.error.unwrap_or_else(|| UPLOAD_FAILED.to_string())));
    }
    resp.analysis
        .ok_or_else(|| ClientError::UnexpectedResponse("upload response missing `analysis`".to_string()))
}

#[async_trait]
impl ClassificationBackend for HttpBackend {
    async fn classify(&self, question: &str) -> Result<ClassificationResult> {
        let url = self.url("/classify");
        log::debug!("POST {}", url);

        let start = Instant::now();
        let resp = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "question": question }))
            .send()
            .await?;
        log::info!("classify responded {} in {}ms", resp.status(), start.elapsed().as_millis());

        // The backend reports application errors in the JSON body, so a
        // non-2xx reply is only fatal when the body is not that JSON.
        let status = resp.status();
        let body = resp.bytes().await?;
        match serde_json::from_slice::<ClassifyResponse>(&body) {
            Ok(parsed) => interpret_classify(parsed),
            Err(_) if !status.is_success() => Err(ClientError::ApiError {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn upload_report(&self, file: &UploadedFile) -> Result<UploadAnalysis> {
        let url = self.url("/upload_report");
        log::debug!("POST {} ({} bytes)", url, file.size());

        let mime = mime_guess::from_path(&file.name).first_or_octet_stream();
        let part = multipart::Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(mime.as_ref())?;
        let form = multipart::Form::new().part("file", part);

        let start = Instant::now();
        let resp = self.client.post(&url).multipart(form).send().await?;
        log::info!("upload_report responded {} in {}ms", resp.status(), start.elapsed().as_millis());

        let status = resp.status();
        let body = resp.bytes().await?;
        match serde_json::from_slice::<UploadResponse>(&body) {
            Ok(parsed) => interpret_upload(parsed),
            Err(_) if !status.is_success() => Err(ClientError::ApiError {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn download_report(&self, format: ReportFormat) -> Result<ReportDownload> {
        let url = self.url(&format!("/download_report/{}", format.as_str()));
        log::debug!("GET {}", url);

        let resp = self.client.get(&url).send().await?;
        let header = |name: reqwest::header::HeaderName| {
            resp.headers().get(name).and_then(|v| v.to_str().ok()).map(str::to_string)
        };
        let content_type = header(reqwest::header::CONTENT_TYPE);
        let content_disposition = header(reqwest::header::CONTENT_DISPOSITION);
        let status = resp.status().as_u16();
        let body = resp.bytes().await?.to_vec();

        Ok(ReportDownload { status, content_type, content_disposition, body })
    }

    async fn login(&self, credentials: &BackendCredentials) -> Result<()> {
        let url = self.url("/login");
        let resp = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "email": credentials.email, "password": credentials.password }))
            .send()
            .await?;
        let parsed: LoginResponse = Self::check_status(resp).await?.json().await?;
        if parsed.success {
            log::info!("Logged in to classification backend as {}", credentials.email);
            Ok(())
        } else {
            Err(ClientError::Rejected(parsed.message.unwrap_or_else(|| "Login failed".to_string())))
        }
    }
}
