use warung::{
    db,
    repositories::{SqliteProductRepository, SqliteUserRepository},
    routes,
    services::{ProductService, UserService},
    AppState,
};

use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warung=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database connection
    let pool = db::create_pool().await?;

    // Run migrations
    sqlx::migrate!("./migrations").run(&pool).await?;

    // Initialize repositories
    let user_repository = Arc::new(SqliteUserRepository::new(pool.clone()));
    let product_repository = Arc::new(SqliteProductRepository::new(pool.clone()));

    // Initialize services
    let user_service = Arc::new(UserService::new(user_repository.clone()));
    let product_service = Arc::new(ProductService::new(product_repository, user_repository));

    let state = AppState {
        user_service,
        product_service,
        pool: pool.clone(),
    };

    let app = routes::router(state);

    // Start server
    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = std::env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse::<u16>()?;

    let addr = SocketAddr::from((host.parse::<std::net::IpAddr>()?, port));

    tracing::info!("Server running on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
