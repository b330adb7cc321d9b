use domain::gateway::Gateways;
use log::{error, info, warn};
use migration::{Migrator, MigratorTrait};
use service::{config::Config, logging::Logger};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let config = Config::new();
    Logger::init_logger(&config as &Config);

    info!(
        "Starting meeting tasks API in {} mode [{}]...",
        config.runtime_env(),
        config.database_url()
    );

    let db = match service::init_database(&config).await {
        Ok(db) => Arc::new(db),
        Err(e) => {
            error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = Migrator::up(db.as_ref(), None).await {
        error!("Failed to apply database migrations: {e}");
        std::process::exit(1);
    }

    let gateways = match Gateways::from_config(&config) {
        Ok(gateways) => gateways,
        Err(e) => {
            error!("Failed to initialize external service clients: {e}");
            std::process::exit(1);
        }
    };

    if !gateways.verify_analysis_credentials().await {
        warn!("Transcript processing will fail until the analysis credentials are fixed");
    }

    if gateways.identity.is_none() {
        warn!("No identity provider configured, transcript requests cannot be authenticated");
    }

    let service_state = service::AppState::new(config, &db);
    let app_state = web::AppState::new(service_state, gateways);

    if let Err(e) = web::init_server(app_state).await {
        error!("Server stopped: {e}");
        std::process::exit(1);
    }
}
