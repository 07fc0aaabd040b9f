mod api_docs;
mod config;
mod controllers;
mod error;
mod models;
mod routes;
mod services;
mod shared_state;

use std::net::SocketAddr;

use axum::{Router, response::Html, routing::get};
use tower_http::services::ServeDir;
use utoipa::OpenApi;
use utoipa_scalar::Scalar;

use crate::api_docs::ApiDoc;
use crate::config::Config;
use crate::routes::simulation_routes::api_routes;
use crate::shared_state::{AppState, SharedState};

#[tokio::main]
async fn main() {
    // 1. Load configuration
    let config = match Config::load("config.json") {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config.json: {}", e);
            return;
        }
    };
    if let Err(e) = config.plant.validate() {
        eprintln!("Invalid plant defaults in config.json: {}", e);
        return;
    }
    println!(
        "Configuration loaded: site ({:.4}, {:.4}) year {} | {} kWp, DC/AC {:.2}",
        config.site.latitude,
        config.site.longitude,
        config.site.year,
        config.plant.dc_capacity_kwp,
        config.plant.dc_ac_ratio
    );

    // 2. Initialize shared state (series cache)
    let state = AppState::new(config.pvgis.cache_ttl_s);
    let server_port = config.server.port;
    let shared = SharedState {
        app: state,
        config,
    };

    // 3. Start Axum HTTP server
    let app = Router::new()
        .nest("/api", api_routes(shared))
        .route(
            "/scalar",
            get(|| async { Html(Scalar::new(ApiDoc::openapi()).to_html()) }),
        )
        .fallback_service(ServeDir::new("static"));

    let addr = SocketAddr::from(([0, 0, 0, 0], server_port));
    println!("API Server listening on http://{}", addr);
    println!("Scalar UI: http://{}/scalar", addr);

    axum_server::bind(addr)
        .serve(app.into_make_service())
        .await
        .unwrap();
}
