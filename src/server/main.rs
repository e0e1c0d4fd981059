use std::sync::Arc;

use todo_store::adapters::HttpServer;
use todo_store::config::ServerConfig;
use todo_store::storage::sqlite::SqliteTodoStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .init();

    let config = ServerConfig::from_env();
    let store = SqliteTodoStore::connect(&config.database_url).await?;
    let server = HttpServer::new(Arc::new(store), &format!("0.0.0.0:{}", config.port)).await?;
    server.run().await
}
