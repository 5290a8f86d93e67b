use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use bookclub::{
    AppState,
    auth::ensure_admin,
    cache::{KeyValueCache, MemoryCache, RedisCache},
    config::{Config, StorageBackend},
    database::{BookStore, MemoryBookStore, MemoryUserStore, PgBookStore, PgUserStore, UserStore},
    routes,
};
use sqlx::Executor;
use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置
    let config = Config::from_env().expect("Failed to load configuration");

    #[cfg(debug_assertions)]
    tracing::info!("Running in debug mode with CORS enabled");

    #[cfg(not(debug_assertions))]
    tracing::info!("Running in production mode with CORS disabled");

    let (users, books, cache): (Arc<dyn UserStore>, Arc<dyn BookStore>, Arc<dyn KeyValueCache>) =
        match config.storage_backend {
            StorageBackend::Postgres => {
                let database_url = config.database_url.as_deref().unwrap_or_default();
                let redis_url = config.redis_url.as_deref().unwrap_or_default();

                // 设置数据库连接池
                let pool = PgPoolOptions::new()
                    .max_connections(config.db_max_connections)
                    .acquire_timeout(config.io_timeout())
                    .after_connect(|conn, _meta| {
                        Box::pin(async move {
                            conn.execute("SET application_name = 'bookclub';").await?;
                            Ok(())
                        })
                    })
                    .connect(database_url)
                    .await
                    .expect("Failed to connect to Postgres");
                tracing::info!("Database connected");

                // 设置 Redis 客户端
                let redis_client =
                    redis::Client::open(redis_url).expect("Failed to create Redis client");
                tracing::info!("Redis client initialized");

                (
                    Arc::new(PgUserStore::new(pool.clone())) as Arc<dyn UserStore>,
                    Arc::new(PgBookStore::new(pool)) as Arc<dyn BookStore>,
                    Arc::new(RedisCache::new(Arc::new(redis_client))) as Arc<dyn KeyValueCache>,
                )
            }
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage, data is lost on restart");
                (
                    Arc::new(MemoryUserStore::new()) as Arc<dyn UserStore>,
                    Arc::new(MemoryBookStore::new()) as Arc<dyn BookStore>,
                    Arc::new(MemoryCache::new()) as Arc<dyn KeyValueCache>,
                )
            }
        };

    if let (Some(username), Some(password)) = (&config.admin_username, &config.admin_password) {
        ensure_admin(users.as_ref(), username, password, config.bcrypt_cost)
            .await
            .expect("Failed to bootstrap admin account");
    }

    // 设置应用状态
    let state = AppState::new(config, users, books, cache);
    let app = routes::create_router(state.clone());

    // 启动服务器
    let addr = SocketAddr::new(
        state.config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        state.config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Failed to start server");

    tracing::info!("Server exited gracefully");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutting down server...");
}
