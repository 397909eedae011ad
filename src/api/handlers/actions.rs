// src/api/handlers/actions.rs
use actix_multipart::Multipart;
use actix_web::{http::header, web, HttpResponse, Result};
use futures::TryStreamExt;
use serde::Deserialize;

use crate::api::AppState;
use crate::controller::{Submission, UploadSource};
use crate::models::UploadedFile;

#[derive(Deserialize)]
pub struct ClassifyForm {
    #[serde(default)]
    pub question: String,
}

#[derive(Deserialize)]
pub struct UploadQuery {
    #[serde(default)]
    pub source: Option<String>,
}

fn back_to_page() -> HttpResponse {
    redirect("/")
}

fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther().insert_header((header::LOCATION, location.to_string())).finish()
}

/// Waits for the submission so the redirected page shows its outcome. A
/// superseded submission ends cancelled, which is not an error here.
async fn settle(submission: Submission) {
    if let Err(e) = submission.handle.await {
        if !e.is_cancelled() {
            log::error!("Submission {} task failed: {}", submission.ticket.id, e);
        }
    }
}

/// POST /actions/tab/{key}
pub async fn switch_tab(state: web::Data<AppState>, key: web::Path<String>) -> Result<HttpResponse> {
    state.controller.switch_tab(&key).await;
    Ok(back_to_page())
}

/// POST /actions/classify
pub async fn classify(state: web::Data<AppState>, form: web::Form<ClassifyForm>) -> Result<HttpResponse> {
    // Validation failures are already in the notification banner.
    if let Ok(submission) = state.controller.submit_question(&form.question).await {
        settle(submission).await;
        if state.controller.snapshot().await.classification_visible {
            return Ok(redirect("/#resultSection"));
        }
    }
    Ok(back_to_page())
}

/// POST /actions/example/{level}
pub async fn fill_example(state: web::Data<AppState>, level: web::Path<String>) -> Result<HttpResponse> {
    if let Err(e) = state.controller.fill_example(&level).await {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({ "error": e.to_string() })));
    }
    Ok(back_to_page())
}

/// Reads the `file` part. Bytes past `limit + 1` are dropped; that is
/// enough for the size check to reject the file.
async fn read_file_part(mut payload: Multipart, limit: u64) -> Result<Option<UploadedFile>> {
    while let Some(mut field) = payload.try_next().await? {
        if field.name() != Some("file") {
            while field.try_next().await?.is_some() {}
            continue;
        }
        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string)
            .unwrap_or_default();

        let cap = usize::try_from(limit.saturating_add(1)).unwrap_or(usize::MAX);
        let mut bytes = Vec::new();
        while let Some(chunk) = field.try_next().await? {
            let room = cap.saturating_sub(bytes.len());
            bytes.extend_from_slice(&chunk[..chunk.len().min(room)]);
        }

        if filename.is_empty() {
            return Ok(None);
        }
        return Ok(Some(UploadedFile::new(filename, bytes)));
    }
    Ok(None)
}

/// POST /actions/upload?source=browse|drop|input
pub async fn upload(
    state: web::Data<AppState>,
    query: web::Query<UploadQuery>,
    payload: Multipart,
) -> Result<HttpResponse> {
    let source = UploadSource::parse(query.source.as_deref().unwrap_or("input"));
    let Some(file) = read_file_part(payload, state.config.upload.max_bytes).await? else {
        // Nothing chosen: nothing to do.
        return Ok(back_to_page());
    };

    if let Ok(submission) = state.controller.submit_file(file, source).await {
        settle(submission).await;
        if state.controller.snapshot().await.upload_visible {
            return Ok(redirect("/#fileResultSection"));
        }
    }
    Ok(back_to_page())
}
