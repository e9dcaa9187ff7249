//! Handler模块

use std::time::{Duration, Instant};

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use common::errors::AppError;
use common::models::connection::ConnectionConfig;
use common::models::record::RecordItem;
use common::response::ApiResponse;
use jdbc_service::get_client_named;

use crate::state::AppState;

/// 注册数据源：校验配置、解析凭据并发布服务记录
#[utoipa::path(
    post,
    path = "/api/records",
    tag = "records",
    request_body = ConnectionConfig,
    responses(
        (status = 200, description = "记录已发布", body = ApiResponse<RecordItem>),
        (status = 400, description = "缺少必填字段"),
        (status = 502, description = "凭据解析失败")
    )
)]
pub async fn register_record(
    State(state): State<AppState>,
    Json(config): Json<ConnectionConfig>,
) -> Result<Json<ApiResponse<RecordItem>>, AppError> {
    let start = Instant::now();
    let deadline = Duration::from_secs(state.config.registration_timeout_secs);

    let record = tokio::time::timeout(deadline, state.service.register(config))
        .await
        .map_err(|_| {
            AppError::Timeout(format!(
                "registration did not finish within {}s",
                deadline.as_secs()
            ))
        })??;

    Ok(Json(
        ApiResponse::ok_with_service(RecordItem::from(record), &state.config.service_name)
            .with_duration(start.elapsed().as_millis() as u64),
    ))
}

/// 列出已发布的服务记录
#[utoipa::path(
    get,
    path = "/api/records",
    tag = "records",
    responses(
        (status = 200, description = "记录列表", body = ApiResponse<Vec<RecordItem>>)
    )
)]
pub async fn list_records(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<RecordItem>>>, AppError> {
    let records = state.service.registry().records().await?;
    let data = records.into_iter().map(RecordItem::from).collect();
    Ok(Json(ApiResponse::ok_with_service(data, &state.config.service_name)))
}

/// 根据服务名获取记录
#[utoipa::path(
    get,
    path = "/api/records/{name}",
    tag = "records",
    params(
        ("name" = String, Path, description = "服务名称")
    ),
    responses(
        (status = 200, description = "记录详情", body = ApiResponse<RecordItem>),
        (status = 404, description = "记录未找到")
    )
)]
pub async fn get_record(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<RecordItem>>, AppError> {
    let record = state.service.registry().lookup(&name).await?;
    Ok(Json(ApiResponse::ok_with_service(
        RecordItem::from(record),
        &state.config.service_name,
    )))
}

/// 根据注册 ID 撤销发布
#[utoipa::path(
    delete,
    path = "/api/registrations/{id}",
    tag = "records",
    params(
        ("id" = String, Path, description = "注册 ID")
    ),
    responses(
        (status = 200, description = "记录已撤销", body = ApiResponse<bool>),
        (status = 404, description = "注册未找到")
    )
)]
pub async fn delete_registration(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<bool>>, AppError> {
    state.service.registry().unpublish(&id).await?;
    tracing::info!(registration = %id, "Record unpublished");
    Ok(Json(ApiResponse::ok_with_service(true, &state.config.service_name)))
}

/// 解析客户端并测试数据库连接
#[utoipa::path(
    get,
    path = "/api/records/{name}/test",
    tag = "records",
    params(
        ("name" = String, Path, description = "服务名称")
    ),
    responses(
        (status = 200, description = "连接测试结果", body = ApiResponse<ConnectionTestResult>),
        (status = 404, description = "记录未找到")
    )
)]
pub async fn test_record(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<ConnectionTestResult>>, AppError> {
    let client = get_client_named(state.service.registry().as_ref(), &name).await?;

    let result = match client.ping().await {
        Ok(latency) => ConnectionTestResult {
            name,
            driver: client.driver().to_string(),
            success: true,
            latency_ms: Some(latency.as_millis() as u64),
            error: None,
        },
        Err(e) => ConnectionTestResult {
            name,
            driver: client.driver().to_string(),
            success: false,
            latency_ms: None,
            error: Some(e.to_string()),
        },
    };
    client.close().await;

    Ok(Json(ApiResponse::ok_with_service(result, &state.config.service_name)))
}

/// 健康检查端点
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "health",
    responses(
        (status = 200, description = "服务运行正常", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let (status, records) = match state.service.registry().records().await {
        Ok(records) => ("healthy", records.len()),
        Err(e) => {
            tracing::warn!(error = %e, "Registry unreachable during health check");
            ("degraded", 0)
        }
    };

    Json(HealthResponse {
        status: status.to_string(),
        service: state.config.service_name.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
        records,
    })
}

/// 连接测试结果
#[derive(Serialize, ToSchema)]
pub struct ConnectionTestResult {
    /// 服务名称
    pub name: String,
    /// 数据库类型
    pub driver: String,
    /// 测试是否成功
    pub success: bool,
    /// 连接延迟（毫秒）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    /// 错误信息（如果测试失败）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// 健康检查响应
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// 服务状态
    pub status: String,
    /// 服务名称
    pub service: String,
    /// 服务版本
    pub version: String,
    /// 当前时间戳
    pub timestamp: DateTime<Utc>,
    /// 已发布记录数
    pub records: usize,
}
