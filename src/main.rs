use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use bloomscope::api::handlers::WsBroker;
use bloomscope::api::{configure_routes, AppState};
use bloomscope::client::HttpBackend;
use bloomscope::{banner, config};
use std::sync::Arc;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    banner::print_banner();

    if let Err(e) = dotenvy::dotenv() {
        eprintln!("⚠️  Warning: Could not load .env file: {}", e);
    }

    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let app_config = match config::AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Failed to load configuration: {}", e);
            return Err(std::io::Error::other(e.to_string()));
        }
    };

    let backend = HttpBackend::new(app_config.backend.clone())
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    let state = AppState::new(app_config, Arc::new(backend));
    state.controller.connect().await;

    let broker = WsBroker::new();
    actix_web::rt::spawn(broker.clone().pump(state.controller.subscribe()));

    let (host, port) = (state.config.host.clone(), state.config.port);
    log::info!("Classification backend: {}", state.config.backend.api_base);
    println!("🚀 Starting server...");
    println!("📊 Client available at http://{}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(web::Data::new(broker.clone()))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .configure(configure_routes)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
