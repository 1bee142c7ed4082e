use std::sync::Arc;

use anyhow::Result;
use axum::{
    http::{header, HeaderValue},
    routing::{get, post},
    Router,
};
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use platemap_common::Config;
use platemap_engine::RecordStore;
use relay_client::{Relay, RelayClient};

mod components;
mod links;
mod pages;
mod rest;

pub struct AppState {
    pub store: RecordStore,
    pub relay: Option<Box<dyn Relay>>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("platemap_api=info".parse()?)
                .add_directive("platemap_engine=info".parse()?),
        )
        .init();

    let config = Config::from_env();

    // A broken or missing dataset is surfaced once and the server keeps
    // running with an empty store — never a crashed state.
    let store = match std::fs::read_to_string(&config.dataset_path) {
        Ok(raw) => match RecordStore::from_geojson(&raw) {
            Ok(store) => store,
            Err(e) => {
                warn!(error = %e, "dataset parse failed, starting with an empty store");
                RecordStore::default()
            }
        },
        Err(e) => {
            warn!(error = %e, path = %config.dataset_path, "dataset read failed, starting with an empty store");
            RecordStore::default()
        }
    };

    let relay: Option<Box<dyn Relay>> = match &config.anthropic_api_key {
        Some(key) => Some(Box::new(RelayClient::new(key, &config.relay_model))),
        None => {
            info!("no relay key configured, chat panel disabled");
            None
        }
    };

    let state = Arc::new(AppState { store, relay });

    let app = Router::new()
        .route("/", get(pages::map_page))
        .route("/api/places", get(rest::api_places))
        .route("/api/projection", get(rest::api_projection))
        .route("/api/chat", post(rest::api_chat))
        .with_state(state)
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        );

    let addr = format!("{}:{}", config.web_host, config.web_port);
    info!("Platemap starting on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
