use std::net::SocketAddr;
use std::sync::Arc;

use crm_cloud::{LocalStorage, S3Settings, S3Storage};
use crm_core::service::CustomerService;
use crm_core::storage::{ObjectStorage, StorageBackendType};
use crm_db::store::PgCustomerStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crm_api::auth::password::Argon2Hasher;
use crm_api::config::{ServerConfig, StorageConfig};
use crm_api::router::build_app_router;
use crm_api::seed;
use crm_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crm_api=debug,crm_core=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = crm_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    crm_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    crm_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Object storage ---
    let storage = build_storage(&config.storage).await;
    tracing::info!(
        backend = config.storage.backend.label(),
        bucket = %config.storage.customer_bucket,
        "Object storage ready"
    );

    // --- Customer service ---
    let customers = Arc::new(CustomerService::new(
        Arc::new(PgCustomerStore::new(pool)),
        storage,
        Arc::new(Argon2Hasher),
        config.storage.customer_bucket.clone(),
    ));

    if config.seed_random_customer {
        seed::seed_random_customer(&customers)
            .await
            .expect("Failed to seed random customer");
    }

    // --- App state ---
    let state = AppState {
        customers,
        config: Arc::new(config.clone()),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Construct the configured [`ObjectStorage`] backend.
async fn build_storage(config: &StorageConfig) -> Arc<dyn ObjectStorage> {
    match config.backend {
        StorageBackendType::S3 => {
            let settings = S3Settings {
                region: config.region.clone(),
                endpoint: config.endpoint.clone(),
            };
            Arc::new(S3Storage::connect(&settings).await)
        }
        StorageBackendType::Local => Arc::new(LocalStorage::new(&config.local_root)),
    }
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
