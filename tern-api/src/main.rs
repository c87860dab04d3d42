use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tern_api::{app, gateway::HttpConfirmationGateway, AppState};
use tern_core::booking::BookingWorkflow;
use tern_core::identity::IdentityResolver;
use tern_core::query::QueryService;
use tern_core::store::TravelStore;
use tern_store::{DbClient, SqliteTravelStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tern_api=debug,tern_core=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = tern_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Tern API on port {}", config.server.port);

    let db = DbClient::new(&config.database.url)
        .await
        .expect("Failed to connect to travel database");
    let store: Arc<dyn TravelStore> = Arc::new(SqliteTravelStore::new(db.pool.clone()));

    let identity = IdentityResolver::new(config.identity.passenger_override.clone());
    if config.identity.passenger_override.is_some() {
        tracing::warn!("Passenger identity override configured; all calls act as that passenger");
    }

    let gateway = HttpConfirmationGateway::new(
        config.confirmation.url.clone(),
        Duration::from_secs(config.confirmation.timeout_seconds),
    )
    .expect("Failed to build confirmation client");

    let state = AppState {
        queries: Arc::new(QueryService::new(store.clone(), identity.clone())),
        bookings: Arc::new(BookingWorkflow::new(store, Arc::new(gateway), identity)),
    };

    let app = app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
