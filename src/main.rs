use std::net::SocketAddr;

use novelry::{make_router, run_app};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("novelry=info")),
        )
        .init();

    let addr = std::env::var("BIND_ADDR")
        .ok()
        .and_then(|addr| addr.parse().ok())
        .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 3001)));
    let db_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:novelry.db".to_string());

    let router = make_router();
    if let Err(error) = run_app(router, addr, &db_url).await {
        tracing::error!("server error: {error}");
    }
}
