use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wayfare_api::{app, state::AuthConfig, AppState};
use wayfare_booking::BookingWorkflow;
use wayfare_core::repository::{
    AdminStore, AgentStore, BookingStore, LocationStore, PackageStore, RequestStore, TravelerStore,
};
use wayfare_notify::SmtpMailer;
use wayfare_store::{
    DbClient, PgAdminStore, PgAgentStore, PgBookingStore, PgLocationStore, PgPackageStore,
    PgRequestStore, PgTravelerStore,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wayfare_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = wayfare_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Wayfare API on port {}", config.server.port);

    let db = DbClient::new(&config.database.url, config.database.max_connections)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");

    let admins: Arc<dyn AdminStore> = Arc::new(PgAdminStore::new(db.pool.clone()));
    let travelers: Arc<dyn TravelerStore> = Arc::new(PgTravelerStore::new(db.pool.clone()));
    let agents: Arc<dyn AgentStore> = Arc::new(PgAgentStore::new(db.pool.clone()));
    let locations: Arc<dyn LocationStore> = Arc::new(PgLocationStore::new(db.pool.clone()));
    let packages: Arc<dyn PackageStore> = Arc::new(PgPackageStore::new(db.pool.clone()));
    let bookings: Arc<dyn BookingStore> = Arc::new(PgBookingStore::new(db.pool.clone()));
    let requests: Arc<dyn RequestStore> = Arc::new(PgRequestStore::new(db.pool.clone()));

    let mailer = Arc::new(SmtpMailer::new(
        config.email.host.clone(),
        config.email.port,
        config.email.user.clone(),
        config.email.password.clone(),
        config.email.from_address.clone(),
        config.email.from_name.clone(),
        config.frontend.url.clone(),
    ));

    let workflow = Arc::new(BookingWorkflow::new(
        packages.clone(),
        travelers.clone(),
        bookings.clone(),
        mailer.clone(),
        config.booking.temp_password_length,
    ));

    let app_state = AppState {
        admins,
        travelers,
        agents,
        locations,
        packages,
        bookings,
        requests,
        workflow,
        mailer,
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    tracing::info!("Shutting down, draining connection pool");
    db.close().await;
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
