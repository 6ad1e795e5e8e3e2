use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use trip_api_server::app::build_router;
use trip_api_server::config::Settings;
use trip_api_server::database::{DbPool, GroupStore, Repository};
use trip_api_server::logging;
use trip_api_server::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let settings = Settings::load()?;

    // Held until shutdown so the file writer flushes
    let _log_guard = logging::init(&settings.logging)?;
    info!("🚀 Starting trip API server...");
    info!("✅ Configuration loaded");

    let db_pool = DbPool::new(&settings.database).await?;
    db_pool.migrate().await?;
    info!("✅ Database connection established, migrations applied");

    let store: Arc<dyn GroupStore> = Arc::new(Repository::new(db_pool));

    let addr = settings.bind_address();
    let state = Arc::new(AppState::new(settings, store)?);
    let app = build_router(state);

    info!("🎯 Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
