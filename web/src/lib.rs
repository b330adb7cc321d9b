use axum::http::{header, HeaderValue, Method};
use domain::gateway::Gateways;
use log::*;
use sea_orm::DatabaseConnection;
use service::config::Config;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

mod controller;
mod error;
mod extractors;
pub mod router;

pub use error::{Error, Result};

// Router state: infrastructure from `service` plus the external service gateways.
// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    service_state: service::AppState,
    pub gateways: Gateways,
}

impl AppState {
    pub fn new(service_state: service::AppState, gateways: Gateways) -> Self {
        Self {
            service_state,
            gateways,
        }
    }

    pub fn db_conn_ref(&self) -> &DatabaseConnection {
        self.service_state.db_conn_ref()
    }

    pub fn config(&self) -> &Config {
        &self.service_state.config
    }
}

pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let config = app_state.config().clone();
    let interface = config.interface.as_deref().unwrap_or("127.0.0.1");
    let host = format!("{interface}:{}", config.port);
    let server_url: SocketAddr = host.parse().map_err(|e| {
        error!("Invalid listen address {host}: {e}");
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    let allowed_origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    let cors_layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::ACCEPT, header::CONTENT_TYPE])
        .allow_credentials(true)
        .allow_origin(allowed_origins);

    info!("Server starting... listening for connections on http://{host}");

    let listener = TcpListener::bind(server_url).await?;
    axum::serve(listener, router::define_routes(app_state).layer(cors_layer)).await
}
