// src/api/handlers/download.rs
use actix_web::{http::header, http::StatusCode, web, HttpResponse, Result};
use serde_json::json;

use crate::api::AppState;
use crate::client::ReportFormat;

/// GET /download_report/{format} - passes the backend's report straight
/// through so the browser treats it as an ordinary download.
pub async fn download_report(state: web::Data<AppState>, format: web::Path<String>) -> Result<HttpResponse> {
    let Some(format) = ReportFormat::parse(&format) else {
        return Ok(HttpResponse::NotFound().json(json!({ "error": "Unknown report format" })));
    };

    match state.controller.download(format).await {
        Ok(report) => {
            let status = StatusCode::from_u16(report.status).unwrap_or(StatusCode::BAD_GATEWAY);
            let mut resp = HttpResponse::build(status);
            if let Some(content_type) = report.content_type {
                resp.insert_header((header::CONTENT_TYPE, content_type));
            }
            if let Some(disposition) = report.content_disposition {
                resp.insert_header((header::CONTENT_DISPOSITION, disposition));
            }
            Ok(resp.body(report.body))
        }
        Err(e) => {
            log::error!("Report download failed: {}", e);
            Ok(HttpResponse::BadGateway().json(json!({ "error": "Failed to download report" })))
        }
    }
}
