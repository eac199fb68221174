//! HTTP 中间件
//! 应用状态、请求追踪与关联 ID

use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::error::{ErrorDetail, ErrorMeta, ErrorResponse};
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

/// 应用状态
///
/// 服务使用 Arc 包装,多个请求共享同一实例,Clone 成本低廉。
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::AppConfig,
    pub db: sqlx::PgPool,
    pub sessions: Arc<dyn crate::session::SessionStore>,
    pub auth_service: Arc<crate::services::AuthService>,
}

/// 请求关联 ID
///
/// 取自 `x-correlation-id` 请求头,缺失时生成新值;签发的令牌会记录
/// 签发请求的关联 ID。
#[derive(Debug, Clone)]
pub struct CorrelationId(pub String);

/// 请求追踪中间件
/// 为每个请求建立 span 并记录指标
pub async fn request_tracking_middleware(mut req: Request, next: Next) -> Response {
    let correlation_id = extract_or_generate_correlation_id(req.headers());

    let method = req.method().to_string();
    let method_for_metrics = req.method().to_string();
    let uri = req.uri().to_string();

    let span = tracing::info_span!(
        "http_request",
        correlation_id = %correlation_id,
        method = %method,
        uri = %uri,
    );

    req.extensions_mut()
        .insert(CorrelationId(correlation_id.clone()));

    async move {
        let start = Instant::now();

        let response = next.run(req).await;

        let elapsed = start.elapsed();

        // 指标标签使用静态字符串
        let status = response.status().as_u16();
        let method_name = match method_for_metrics.as_str() {
            "GET" => "GET",
            "POST" => "POST",
            "PUT" => "PUT",
            "DELETE" => "DELETE",
            "PATCH" => "PATCH",
            _ => "UNKNOWN",
        };
        let status_code = match status {
            200 => "200",
            201 => "201",
            204 => "204",
            400 => "400",
            401 => "401",
            403 => "403",
            404 => "404",
            409 => "409",
            500 => "500",
            503 => "503",
            _ => "other",
        };

        metrics::counter!("http_requests_total", "method" => method_name, "status" => status_code)
            .increment(1);
        metrics::histogram!("http_request_duration_seconds").record(elapsed.as_secs_f64());

        tracing::info!(
            method = %method,
            uri = %uri,
            status = status,
            elapsed_ms = elapsed.as_millis(),
            "Request completed"
        );

        // 错误响应体回填本请求的关联 ID
        let mut response = response;
        if let Some(meta) = response.extensions().get::<ErrorMeta>().cloned() {
            let status = response.status();
            response = (
                status,
                Json(ErrorResponse {
                    error: ErrorDetail {
                        code: meta.code,
                        message: meta.message,
                        correlation_id: correlation_id.clone(),
                    },
                }),
            )
                .into_response();
        }

        if let Ok(value) = correlation_id.parse() {
            response.headers_mut().insert("x-correlation-id", value);
        }

        response
    }
    .instrument(span)
    .await
}

/// 从请求头中提取或生成关联 ID
fn extract_or_generate_correlation_id(headers: &HeaderMap) -> String {
    headers
        .get("x-correlation-id")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}
