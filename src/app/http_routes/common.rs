use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Json, Query};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};

// ==========================================
// 公共工具：错误映射、阻塞调用、请求体解析
// ==========================================

/// 错误响应（返回给前端）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// 错误代码
    pub code: String,

    /// 错误消息
    pub message: String,

    /// 详细信息（可选）
    pub details: Option<serde_json::Value>,
}

/// HTTP 层错误包装，状态码取自 ApiError
#[derive(Debug)]
pub struct HttpError(pub ApiError);

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        Self(err)
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(code = err.code(), "请求失败: {}", err);
        } else {
            tracing::debug!(code = err.code(), "请求被拒绝: {}", err);
        }

        let body = ErrorResponse {
            code: err.code().to_string(),
            message: err.to_string(),
            details: err.details(),
        };
        (status, Json(body)).into_response()
    }
}

/// 在阻塞线程池中执行同步 API 调用
///
/// 任务 panic 时作用域已在展开过程中回滚，这里只负责转成 500
pub(super) async fn run_blocking<T, F>(f: F) -> Result<T, HttpError>
where
    F: FnOnce() -> ApiResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| HttpError(ApiError::InternalError(format!("后台任务失败: {}", e))))?
        .map_err(HttpError)
}

/// 请求体解析失败统一转为 INVALID_INPUT
pub(super) fn parse_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, HttpError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| HttpError(ApiError::InvalidInput(rejection.body_text())))
}

/// 查询参数解析失败统一转为 INVALID_INPUT
pub(super) fn parse_query<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, HttpError> {
    query
        .map(|Query(value)| value)
        .map_err(|rejection| HttpError(ApiError::InvalidInput(rejection.body_text())))
}

/// 健康检查
pub(super) async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "name": crate::APP_NAME,
        "version": crate::VERSION,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_status_follows_api_error() {
        let resp = HttpError(ApiError::NotFound("维保记录(id=x)不存在".to_string())).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = HttpError(ApiError::InsufficientStock {
            stock_id: "s1".to_string(),
            name: "bolt".to_string(),
            requested: 5,
            available: 3,
        })
        .into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = HttpError(ApiError::DatabaseError("disk".to_string())).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_run_blocking_maps_panic_to_internal_error() {
        let result: Result<(), HttpError> = run_blocking(|| panic!("boom")).await;
        let err = result.expect_err("panic 应转为错误");
        assert_eq!(err.0.code(), "INTERNAL_ERROR");
    }
}
