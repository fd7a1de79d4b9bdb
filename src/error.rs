use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::reporting::ReportedError;

/// 应用统一错误类型
///
/// 所有处理器都返回 `Result<_, AppError>`，由 [`IntoResponse`] 统一转换为 JSON 错误响应，
/// 不在处理器内部就地拼装错误体。
#[derive(Error, Debug, utoipa::ToSchema)]
pub enum AppError {
    /// 请求体或上传文件超出限制
    #[error("{0}")]
    PayloadTooLarge(String),

    /// 请求体无法解析（multipart / JSON）
    #[error("{0}")]
    BadRequest(String),

    /// 缺少必需的文件字段
    #[error("Missing file field: {0}")]
    MissingField(String),

    /// 出现了未预期的文件字段（或同名文件字段重复）
    #[error("Unexpected field: {0}")]
    UnexpectedField(String),

    /// 上游媒体服务返回错误或网络失败
    #[error("{0}")]
    UpstreamFailure(String),

    /// 上游媒体服务请求超时
    #[error("{0}")]
    UpstreamTimeout(String),

    /// 业务校验失败（例如除数为零）
    #[error("{0}")]
    Domain(String),

    /// 内部服务器错误
    #[error("{0}")]
    Internal(String),
}

/// 对外错误响应体。
///
/// `message` 为调用方可直接展示的文本；`code` 为稳定错误码，用于程序化处理。
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    /// 人类可读的错误信息
    #[schema(example = "File too large. Max 20MB")]
    pub message: String,

    /// 稳定的错误码
    #[schema(example = "PAYLOAD_TOO_LARGE")]
    pub code: String,

    /// 可选：请求追踪 ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::MissingField(_) => StatusCode::BAD_REQUEST,
            AppError::UnexpectedField(_) => StatusCode::BAD_REQUEST,
            // 上游失败沿用 500，与既有客户端约定保持一致
            AppError::UpstreamFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Domain(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn stable_code(&self) -> &'static str {
        match self {
            AppError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::MissingField(_) => "MISSING_FILE",
            AppError::UnexpectedField(_) => "UNEXPECTED_FIELD",
            AppError::UpstreamFailure(_) => "UPSTREAM_ERROR",
            AppError::UpstreamTimeout(_) => "UPSTREAM_TIMEOUT",
            AppError::Domain(_) => "DOMAIN_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.stable_code();
        let message = self.to_string();

        let body = ErrorBody {
            message: message.clone(),
            code: code.to_string(),
            request_id: crate::request_id::current_request_id(),
        };

        let mut res = (status, Json(body)).into_response();
        // 交给错误上报中间件读取，避免它再去解析响应体
        res.extensions_mut().insert(ReportedError { code, message });
        res
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(rejection.body_text())
        } else {
            AppError::BadRequest(rejection.body_text())
        }
    }
}
