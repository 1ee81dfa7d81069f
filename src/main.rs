use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use letterboxd_guard::{
    AppState,
    cache::{CounterBackend, MemoryCounterStore, RedisCounterStore},
    config::Config,
    infrastructure::clock::{Clock, SystemClock},
    router::create_router,
};
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
    let config = Config::from_env().expect("Failed to load configuration (AUTH_SECRET is required)");

    if config.debug_mode {
        tracing::warn!("DEBUG_MODE is on, rate limiting of privileged requests is disabled");
    }

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // 选择限流计数器存储
    let store = match &config.redis_url {
        Some(url) => {
            let client = redis::Client::open(url.as_str()).expect("Failed to create Redis client");
            tracing::info!("Using Redis rate limit store");
            CounterBackend::Redis(RedisCounterStore::new(Arc::new(client)))
        }
        None => {
            tracing::warn!("REDIS_URL not set, using in-memory rate limit store");
            CounterBackend::Memory(MemoryCounterStore::new(clock.clone()))
        }
    };

    let state = AppState::new(config.clone(), store, clock);
    let router = create_router(state);

    // 根据编译模式决定是否添加CORS
    #[cfg(debug_assertions)]
    let router = {
        tracing::debug!("Adding CORS layer for development mode");
        router.layer(tower_http::cors::CorsLayer::permissive())
    };

    // 启动服务器
    let addr = SocketAddr::new(
        config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        router,
    )
    .await
    .expect("Failed to start server");
}
