// src/api/handlers/levels.rs
use actix_web::{HttpResponse, Result};
use serde::Serialize;
use crate::taxonomy::TaxonomyLevel;

#[derive(Serialize)]
pub struct LevelInfo {
    pub code: String,
    pub name: &'static str,
    pub description: &'static str,
    pub color: &'static str,
}

/// GET /api/levels - the six taxonomy levels, lowest first
pub async fn get_levels() -> Result<HttpResponse> {
    let levels: Vec<LevelInfo> = TaxonomyLevel::ALL
        .iter()
        .map(|level| LevelInfo {
            code: level.code(),
            name: level.name(),
            description: level.description(),
            color: level.color(),
        })
        .collect();
    Ok(HttpResponse::Ok().json(levels))
}
