use expense_settlement::api;
use expense_settlement::config::CONFIG;
use expense_settlement::{InMemoryStorage, SettlementService};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&CONFIG.log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    info!("Loaded {:?}", *CONFIG);

    let service = Arc::new(SettlementService::new(InMemoryStorage::new(), &CONFIG));
    let app = api::app(service, &CONFIG);

    let addr: SocketAddr = format!("{}:{}", CONFIG.host, CONFIG.port).parse()?;
    info!("Server running at http://{}{}", addr, CONFIG.api_prefix);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
