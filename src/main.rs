use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use dotenv::dotenv;
use payrail_server::auth::handlers::{login, me, register};
use payrail_server::{health, AppError, AppState, InMemoryCounterStore, PgUserStore, Settings};
use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[actix_web::main]
async fn main() -> payrail_server::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();

    // Load configuration; signing misconfiguration is fatal before we bind
    let config = Settings::new()?;
    config.validate().map_err(AppError::from)?;
    info!("Configuration loaded successfully");

    // Lazily connecting store: the server starts (and reports itself
    // not-ready) even when the database is down
    let store = PgUserStore::connect_lazy(&config.database.url, config.database.max_connections)?;
    let pool = store.pool();
    if let Err(e) = sqlx::migrate!().run(pool.as_ref()).await {
        warn!("Skipping migrations, database not reachable: {}", e);
    }

    // Process-wide window counters: empty now, discarded at process exit
    let counters = Arc::new(InMemoryCounterStore::new());
    let state = AppState::new(config.clone(), Arc::new(store), counters.clone())?;
    let state = web::Data::new(state);

    // Periodically drop counters for keys that went quiet
    let sweep_counters = counters.clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(60)).await;
            sweep_counters.cleanup().await;
        }
    });

    let listener = TcpListener::bind(format!("{}:{}", config.server.host, config.server.port))?;
    info!("Starting server at {}:{}", config.server.host, config.server.port);

    let workers = config.server.workers as usize;
    let cors_settings = config.cors.clone();

    HttpServer::new(move || {
        let cors = if cors_settings.enabled {
            let cors_config = Cors::default();

            let cors_config = if cors_settings.allow_any_origin {
                cors_config
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
            } else {
                cors_config
                    .allowed_origin("http://localhost:8080")
                    .allowed_origin("http://127.0.0.1:8080")
                    .allowed_methods(vec!["GET", "POST"])
                    .allowed_headers(vec!["Authorization", "Content-Type"])
                    .supports_credentials()
            };

            cors_config.max_age(cors_settings.max_age as usize)
        } else {
            Cors::default()
        };

        App::new()
            .wrap(cors)
            .app_data(state.clone())
            .route("/health", web::get().to(health::health))
            .route("/health/ready", web::get().to(health::ready))
            .route("/health/live", web::get().to(health::live))
            .route("/auth/register", web::post().to(register))
            .route("/auth/login", web::post().to(login))
            .route("/auth/me", web::get().to(me))
    })
    .listen(listener)?
    .workers(workers)
    .run()
    .await
    .map_err(|e| AppError::InternalError(e.to_string()))?;

    Ok(())
}
