use std::{net::SocketAddr, sync::Arc};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use devjourney_server::{
    build_router, config, db, services::{insight::DeepSeekInsights, seed}, AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Optional .env file; real environment variables win
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "devjourney_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = config::Config::from_env();

    // Initialize database
    let db = db::Database::connect(&config.database_url).await?;
    db.run_migrations().await?;

    if config.seed_demo_data {
        let seeded = seed::seed_projects(&db).await?;
        tracing::info!(seeded, "showcase seed step finished");
    }

    if config.ai.api_key.is_empty() {
        tracing::warn!("DEEPSEEK_API_KEY is not set; AI insights will return the fallback text");
    }
    let insights = DeepSeekInsights::new(&config.ai)?;

    // Build application state
    let state = AppState {
        db,
        config: config.clone(),
        insights: Arc::new(insights),
    };

    let app = build_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
