//! # Homeroom Binary
//!
//! The entry point that assembles the application based on compile-time
//! features: one backend plugin serves both the store and auth ports.

use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use hr_api::handlers::AppState;
use hr_api::middleware;

#[cfg(feature = "backend-rest")]
use hr_backend_rest::RestBackend;

#[cfg(all(feature = "store-memory", not(feature = "backend-rest")))]
use hr_store_memory::MemoryBackend;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    #[cfg(feature = "backend-rest")]
    let backend = {
        let base = std::env::var("BACKEND_URL").expect("BACKEND_URL must be set");
        let key = std::env::var("BACKEND_ANON_KEY").expect("BACKEND_ANON_KEY must be set");
        Arc::new(RestBackend::new(base, key))
    };

    #[cfg(all(feature = "store-memory", not(feature = "backend-rest")))]
    let backend = Arc::new(MemoryBackend::new());

    let state = web::Data::new(AppState {
        store: backend.clone(),
        auth: backend,
    });

    let bind = std::env::var("HOMEROOM_BIND").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
    let static_dir =
        std::env::var("HOMEROOM_STATIC").unwrap_or_else(|_| "./static".to_string());

    log::info!("Homeroom listening on http://{bind}");

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::standard_middleware())
            .service(actix_files::Files::new("/static", static_dir.clone()))
            .configure(hr_api::configure_routes)
    })
    .bind(bind)?
    .run()
    .await
}
