// src/api/handlers/page.rs
use actix_web::{web, HttpResponse, Result};
use crate::api::AppState;

/// GET / - the whole client, rendered from current state
pub async fn index(state: web::Data<AppState>) -> Result<HttpResponse> {
    let page = state.controller.render_page().await;
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(format!("<!DOCTYPE html>\n{}", page.to_html())))
}

/// GET /api/v1/state - JSON snapshot of the client state
pub async fn get_state(state: web::Data<AppState>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.controller.snapshot().await))
}
