use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rulekeeper_core::RuleError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// API 错误类型
#[derive(Debug, Error)]
pub enum ApiError {
    /// 规则未找到
    #[error("Rule not found: {0}")]
    RuleNotFound(i64),

    /// 校验错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 批量创建中止
    #[error("Batch aborted at line {line} after {created} rule(s): {message}")]
    BatchAborted {
        line: usize,
        created: usize,
        message: String,
        validation: bool,
    },

    /// 数据库错误
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// 请求错误
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::RuleNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::ValidationError(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::BatchAborted { validation: true, .. } => StatusCode::BAD_REQUEST,
            ApiError::BatchAborted { .. } | ApiError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }

        let body = match &self {
            ApiError::BatchAborted { line, created, .. } => json!({
                "error": self.to_string(),
                "status": status.as_u16(),
                "line": line,
                "created": created,
            }),
            _ => json!({
                "error": self.to_string(),
                "status": status.as_u16(),
            }),
        };

        (status, Json(body)).into_response()
    }
}

// 从 rulekeeper_core::RuleError 转换
impl From<RuleError> for ApiError {
    fn from(err: RuleError) -> Self {
        match err {
            RuleError::NotFound(id) => ApiError::RuleNotFound(id),
            RuleError::Validation { .. } => ApiError::ValidationError(err.to_string()),
            RuleError::Store(db_err) => ApiError::DatabaseError(db_err.to_string()),
            RuleError::BatchAborted {
                line,
                created,
                source,
            } => ApiError::BatchAborted {
                line,
                created,
                validation: source.root_cause().is_validation(),
                message: source.to_string(),
            },
        }
    }
}

// 请求体、查询参数、路径参数解析失败统一返回 JSON 错误体
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
