use axum::{routing::{get, post}, Router};
use freight_quote_matcher::{api, create_pool, AppConfig, QuoteMatchService, QuoteMatcher};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 本地时间格式，RUST_LOG 未设置时默认 info
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置
    let config = AppConfig::load()?;
    info!("Starting server with config: {:?}", config);

    // 创建数据库连接池
    let pool = create_pool(&config.database).await?;
    info!("Database pool created");

    let matcher = Arc::new(QuoteMatcher::new(config.matching.to_options()));
    info!("Matching options: {:?}", matcher.options());
    let service = Arc::new(QuoteMatchService::new(
        pool,
        matcher.clone(),
        config.matching.candidate_limit,
    ));

    let db_routes = Router::new()
        .route("/api/match/batch", post(api::batch_match))
        .route("/api/match/export", post(api::export_matches))
        .with_state(service);

    let inline_routes = Router::new()
        .route("/api/match/evaluate", post(api::evaluate))
        .with_state(matcher);

    let app = Router::new()
        .route("/health", get(api::health_check))
        .merge(db_routes)
        .merge(inline_routes)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()));

    // 启动服务器
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  POST /api/match/batch     - match stored quotes, optionally persist");
    info!("  POST /api/match/evaluate  - match inline records (no database)");
    info!("  POST /api/match/export    - matches for one quote as CSV");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
