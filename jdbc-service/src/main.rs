//! JDBC 数据源注册服务
//!
//! 提供数据源注册功能，包括：
//! - 配置校验与凭据解析
//! - 服务记录的发布、查询与撤销
//! - 客户端解析与连接测试

mod handlers;
mod routes;
mod state;

use anyhow::Context;
use axum::{routing::get, Json, Router};
use common::config::{load_dotenv, AppConfig};
use state::AppState;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;

const SERVICE_NAME: &str = "jdbc-service";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "JDBC 注册服务 API",
        version = "0.1.0",
        description = "JDBC 数据源服务注册微服务"
    ),
    paths(
        handlers::register_record,
        handlers::list_records,
        handlers::get_record,
        handlers::delete_registration,
        handlers::test_record,
        handlers::health_check,
    ),
    components(schemas(
        common::models::ConnectionConfig,
        common::models::RecordItem,
        common::models::RecordType,
        common::models::RecordStatus,
        handlers::ConnectionTestResult,
        handlers::HealthResponse,
    )),
    tags(
        (name = "records", description = "服务记录端点"),
        (name = "health", description = "健康检查端点")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    // 初始化日志追踪
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // 加载配置
    let config = AppConfig::load_with_service(SERVICE_NAME);

    let state = AppState::new(config.clone())
        .await
        .context("failed to initialise registry (check REGISTRY_BACKEND / REDIS_URL)")?;

    // 启动时注册环境变量中声明的数据源
    if let Some(data_source) = config.startup_data_source.clone() {
        let record = state
            .service
            .register(data_source)
            .await
            .context("startup data source registration failed")?;
        info!(service = %record.name, registration = ?record.registration, "Startup data source registered");
    }

    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    info!(service = SERVICE_NAME, address = %addr, "启动服务");

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("绑定地址失败: {}", addr))?;
    axum::serve(listener, app).await.context("服务启动失败")?;
    Ok(())
}

fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(routes::router())
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(cors),
        )
        .with_state(state)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
