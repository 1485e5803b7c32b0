use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::Method;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum_server::tls_rustls::RustlsConfig;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{error, info, warn};
use tracing_subscriber::FmtSubscriber;

use crate::config::{Config, StoreKind};
use crate::database::DocumentStore;
use crate::database::auth::StoreAuth;
use crate::database::memory::MemoryStore;
use crate::database::postgres::PgDocumentStore;
use crate::endpoints::AppState;
use crate::scoring::HttpScorer;

mod config;
mod database;
mod endpoints;
mod error;
mod model;
mod scoring;
mod security;

const OK_JSON: &str = r#"{ "message": "OK" }"#;

const MAX_BODY_BYTES: usize = 1024 * 1024;

#[tokio::main]
async fn main() {
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return;
        }
    };

    // Begin logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.level())
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Could not install the log subscriber: {e}");
        return;
    }

    // Open the document store, aborting start-up if it is unreachable
    let store: Arc<dyn DocumentStore> = match config.store {
        StoreKind::Memory => {
            warn!("Using the in-memory store; nothing survives a restart");
            Arc::new(MemoryStore::new())
        }
        StoreKind::Postgres => {
            let (name, pass) = match Config::database_credentials() {
                Ok(credentials) => credentials,
                Err(e) => {
                    error!("{e}");
                    return;
                }
            };
            match PgDocumentStore::connect(&config.database, &name, &pass).await {
                Ok(store) => Arc::new(store),
                Err(e) => {
                    error!("{e}");
                    return;
                }
            }
        }
    };

    info!("Database initialized");

    let scorer = match HttpScorer::new(
        &config.scoring.endpoint,
        Duration::from_secs(config.scoring.timeout_secs),
    ) {
        Ok(scorer) => scorer,
        Err(e) => {
            error!("{e}");
            return;
        }
    };

    let state = AppState {
        auth: Arc::new(StoreAuth::new(store.clone(), config.session_hours)),
        scorer: Arc::new(scorer),
        store,
    };

    // Allow GET, POST, PUT, and OPTIONS from any origin, with the session and content-type headers
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_origin(AllowOrigin::any());

    let app = endpoints::router(state)
        .layer(cors)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES));

    let addr = match config.bind.parse::<SocketAddr>() {
        Ok(addr) => addr,
        Err(e) => {
            error!("Invalid bind address {}: {e}", config.bind);
            return;
        }
    };

    let served = match &config.tls {
        Some(tls) => {
            // Another provider may already be installed; either one will do
            let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

            let rustls_config = match RustlsConfig::from_pem_file(&tls.cert, &tls.key).await {
                Ok(rustls_config) => rustls_config,
                Err(e) => {
                    error!("Could not load certificate: {e}");
                    return;
                }
            };

            info!("Serving on https://{addr}");
            axum_server::bind_rustls(addr, rustls_config)
                .serve(app.into_make_service())
                .await
        }
        None => {
            info!("Serving on http://{addr}");
            axum_server::bind(addr)
                .serve(app.into_make_service())
                .await
        }
    };

    if let Err(e) = served {
        error!("Server stopped: {e}");
    }
}
