//! Backend for the Aarambh bootcamp site.
//!
//! # Overview
//! - Public landing page fetches the site config and renders the registration form from it
//! - Visitors submit the form, the server checks it against the same schema and stores it
//! - Admins edit the config section by section and manage the registrations
//!
//!
//!
//! # Routes
//!
//! Public
//! - `GET /healthz`
//! - `GET /api/config`: full site config, created with defaults on first read
//! - `POST /api/register`: `201` with the record, `400` with every validation message, `409` on a known email, `403` when closed
//!
//! Admin (`Authorization: Bearer <token>`, see [`auth`])
//! - `PUT /api/config`: whole document
//! - `PUT /api/config/{form-fields,schedule,curriculum,site-info,bonus-benefits,contact-info}`: one section
//! - `GET /api/register?search=&status=&page=&limit=`
//! - `GET /api/register/stats`
//! - `GET /api/register/{id}`, `PATCH /api/register/{id}/status`, `DELETE /api/register/{id}`
//!
//!
//!
//! # Notes
//!
//! ## Sections
//! List sections (`formFields`, `schedule`, `curriculum`, `bonusBenefits`) are replaced whole and must
//! carry `order` values `0..n-1` with unique field names. Object sections (`siteInfo`, `contactInfo`)
//! merge the sent keys over the stored ones.
//!
//! ## Storage
//! Redis when `REDIS_URL` is set, memory otherwise. See [`database`] for the key layout.
//!
//!
//!
//! # Setup
//!
//! Environment
//! - `RUST_PORT` (default `1111`)
//! - `REDIS_URL`, `REDIS_PREFIX` (default `aarambh`)
//! - `ADMIN_TOKEN_SECRET`, read from `/run/secrets/ADMIN_TOKEN_SECRET` first
//! - `RUST_LOG` for log filtering
//!
//! View current docs.
//! ```sh
//! cargo doc --open
//! ```
use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    http::{
        Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::{get, patch, post, put},
};

use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;

use config::Config;
use routes::*;
use state::State;

pub fn build_router(state: Arc<State>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(state.config.cors_max_age_secs));

    let api = Router::new()
        .route("/config", get(config_handler).put(replace_config_handler))
        .route("/config/form-fields", put(form_fields_handler))
        .route("/config/schedule", put(schedule_handler))
        .route("/config/curriculum", put(curriculum_handler))
        .route("/config/site-info", put(site_info_handler))
        .route("/config/bonus-benefits", put(bonus_benefits_handler))
        .route("/config/contact-info", put(contact_info_handler))
        .route("/register", post(register_handler).get(registrations_handler))
        .route("/register/stats", get(stats_handler))
        .route(
            "/register/{id}",
            get(registration_handler).delete(delete_registration_handler),
        )
        .route("/register/{id}/status", patch(status_handler));

    Router::new()
        .route("/healthz", get(health_handler))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

pub async fn start_server() -> anyhow::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Loading config...");
    let config = Config::load()?;

    info!("Initializing state...");
    let state = State::new(config).await?;

    info!("Starting server...");
    let address = format!("0.0.0.0:{}", state.config.port);
    let app = build_router(state);

    info!("Binding to {address}");
    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
