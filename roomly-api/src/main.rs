use std::net::SocketAddr;
use std::sync::Arc;

use roomly_api::{app, state::{AppState, AuthConfig}};
use roomly_core::BookingService;
use roomly_store::{DbClient, PgBookingRepository, PgRoomRepository, PgTicketRepository};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roomly_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = roomly_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Roomly API on port {}", config.server.port);

    let db = DbClient::new(&config.database.url)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");

    let bookings = BookingService::new(
        Arc::new(PgRoomRepository::new(db.pool.clone())),
        Arc::new(PgBookingRepository::new(db.pool.clone())),
        Arc::new(PgTicketRepository::new(db.pool.clone())),
    );

    let app_state = AppState {
        bookings: Arc::new(bookings),
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
