// src/api/routes.rs
use actix_web::web;
use super::handlers;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(handlers::index))
        .route("/ws", web::get().to(handlers::ws_handler))
        .route("/static/{path:.*}", web::get().to(handlers::static_asset))
        .route("/download_report/{format}", web::get().to(handlers::download_report))
        .route("/api/levels", web::get().to(handlers::get_levels))
        .service(
            web::scope("/actions")
                .route("/tab/{key}", web::post().to(handlers::switch_tab))
                .route("/classify", web::post().to(handlers::classify))
                .route("/upload", web::post().to(handlers::upload))
                .route("/example/{level}", web::post().to(handlers::fill_example))
        )
        .service(
            web::scope("/api/v1")
                .route("/health", web::get().to(handlers::health_check))
                .route("/state", web::get().to(handlers::get_state))
        );
}
