use btc_converter_api::database::{
    establish_connection_pool, run_migrations, PriceRepository, PriceRepositoryImpl,
};
use btc_converter_api::{
    create_router, AppConfig, AppState, CoinGeckoFetcher, ConversionService, PriceFetcher,
    PriceIngestor, PriceUpdateJob, PriceUpdateScheduler,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file (if present)
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "btc_converter_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();

    // The price store is required: without it nothing can be served
    tracing::info!("🗄️  Initializing PostgreSQL connection...");
    let pool = match establish_connection_pool(&config.database) {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("❌ Failed to establish database connection: {}", e);
            return Err(e.into());
        }
    };

    let applied = run_migrations(&pool)?;
    tracing::info!("✅ Database ready ({} migrations applied)", applied);

    let pool_clone = pool.clone();
    let repository = Arc::new(PriceRepositoryImpl::new(move || pool_clone.get_conn()))
        as Arc<dyn PriceRepository>;

    let fetcher = Arc::new(CoinGeckoFetcher::new(&config.price_feed)?) as Arc<dyn PriceFetcher>;
    tracing::info!("📡 Price feed: {} ({})", fetcher.name(), config.price_feed.base_url);

    let ingestor = Arc::new(PriceIngestor::new(
        fetcher,
        repository.clone(),
        config.ingestion.retry_policy(),
    ));
    let price_job = PriceUpdateJob::new(ingestor);

    // Serve reads even if the schedule cannot start
    let scheduler =
        match PriceUpdateScheduler::start(price_job.clone(), config.ingestion.update_interval()).await {
            Ok(scheduler) => Some(scheduler),
            Err(e) => {
                tracing::error!("❌ Failed to start price scheduler: {}", e);
                tracing::warn!("⚠️  Server will start without price updates");
                None
            }
        };

    let state = AppState::new(
        Arc::new(ConversionService::new(repository)),
        scheduler.as_ref().map(|s| s.job().clone()),
    );
    let app = create_router(state);

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("🚀 BTC Converter API running on http://{}", addr);
    tracing::info!("📊 Health check: http://{}/api/health", addr);
    tracing::info!("💰 Latest price: http://{}/api/prices/latest", addr);
    tracing::info!("📚 Swagger UI: http://{}/api/docs", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(scheduler) = scheduler {
        if let Err(e) = scheduler.shutdown().await {
            tracing::error!("❌ Price scheduler shutdown failed: {}", e);
        }
    }

    tracing::info!("👋 Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("❌ Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("🛑 Shutdown signal received");
}
