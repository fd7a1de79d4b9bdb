//! 错误上报
//!
//! 进程启动时按 `error_reporting` 配置构建一次 [`ErrorReporter`]，之后只读共享。
//! 上报通道为结构化日志（target = `error_report`），不落盘、不外发。
//!
//! - 5xx 响应：由 [`error_reporting_middleware`] 统一上报，错误详情取自响应扩展里的 [`ReportedError`]
//! - panic：由 `CatchPanicLayer` + [`panic_response`] 转成 500，并同样附带 [`ReportedError`]
//! - 请求追踪：按 `traces_sample_rate` 采样，以 debug 级别输出

use std::any::Any;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    Json,
    extract::{MatchedPath, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use rand::Rng;

use crate::config::ErrorReportingConfig;
use crate::error::ErrorBody;

/// panic 时对外返回的固定文案
pub const UNHANDLED_FAULT_MESSAGE: &str = "Internal Server Error";

/// 附在错误响应上的上报详情
#[derive(Debug, Clone)]
pub struct ReportedError {
    /// 稳定错误码
    pub code: &'static str,
    /// 详细信息（panic 时为 panic 文本，不直接返回给调用方）
    pub message: String,
}

/// 错误上报器
#[derive(Debug, Clone)]
pub struct ErrorReporter {
    enabled: bool,
    environment: Arc<str>,
    traces_sample_rate: f64,
}

impl ErrorReporter {
    pub fn new(cfg: &ErrorReportingConfig) -> Self {
        Self {
            enabled: cfg.enabled,
            environment: Arc::from(cfg.environment.as_str()),
            traces_sample_rate: cfg.traces_sample_rate.clamp(0.0, 1.0),
        }
    }

    /// 本次请求是否输出追踪日志
    pub fn should_sample_trace(&self) -> bool {
        if !self.enabled || self.traces_sample_rate <= 0.0 {
            return false;
        }
        if self.traces_sample_rate >= 1.0 {
            return true;
        }
        rand::thread_rng().gen_bool(self.traces_sample_rate)
    }

    fn report(&self, ctx: &RequestContext, status: StatusCode, reported: Option<&ReportedError>) {
        if !self.enabled {
            return;
        }
        let (code, message) = reported
            .map(|r| (r.code, r.message.as_str()))
            .unwrap_or(("UNKNOWN", ""));
        tracing::error!(
            target: "error_report",
            environment = %self.environment,
            request_id = ctx.request_id.as_deref().unwrap_or("-"),
            method = %ctx.method,
            path = %ctx.path,
            status = status.as_u16(),
            code,
            detail = message,
            "server error reported"
        );
    }
}

struct RequestContext {
    method: String,
    path: String,
    request_id: Option<String>,
}

/// 错误上报中间件：需挂在 request_id 中间件之内、CatchPanicLayer 之外
pub async fn error_reporting_middleware(
    State(reporter): State<ErrorReporter>,
    req: Request,
    next: Next,
) -> Response {
    let started = Instant::now();
    let ctx = RequestContext {
        method: req.method().to_string(),
        path: req
            .extensions()
            .get::<MatchedPath>()
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| req.uri().path().to_string()),
        request_id: crate::request_id::current_request_id(),
    };
    let sampled = reporter.should_sample_trace();

    let res = next.run(req).await;
    let status = res.status();

    if status.is_server_error() {
        reporter.report(&ctx, status, res.extensions().get::<ReportedError>());
    }

    if sampled {
        tracing::debug!(
            target: "error_report::trace",
            request_id = ctx.request_id.as_deref().unwrap_or("-"),
            method = %ctx.method,
            path = %ctx.path,
            status = status.as_u16(),
            duration_ms = started.elapsed().as_millis() as u64,
            "request trace"
        );
    }

    res
}

/// `CatchPanicLayer::custom` 的回调：把 panic 转成统一的 500 JSON 响应
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic payload".to_string()
    };

    let body = ErrorBody {
        message: UNHANDLED_FAULT_MESSAGE.to_string(),
        code: "UNHANDLED_FAULT".to_string(),
        request_id: crate::request_id::current_request_id(),
    };
    let mut res = (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response();
    res.extensions_mut().insert(ReportedError {
        code: "UNHANDLED_FAULT",
        message: detail,
    });
    res
}

#[cfg(test)]
mod tests {
    use super::{ErrorReporter, ReportedError, panic_response};
    use crate::config::ErrorReportingConfig;
    use axum::http::StatusCode;

    #[test]
    fn sampling_respects_bounds() {
        let always = ErrorReporter::new(&ErrorReportingConfig::default());
        assert!(always.should_sample_trace());

        let never = ErrorReporter::new(&ErrorReportingConfig {
            traces_sample_rate: 0.0,
            ..ErrorReportingConfig::default()
        });
        assert!(!never.should_sample_trace());

        let disabled = ErrorReporter::new(&ErrorReportingConfig {
            enabled: false,
            ..ErrorReportingConfig::default()
        });
        assert!(!disabled.should_sample_trace());
    }

    #[test]
    fn panic_response_keeps_detail_out_of_body() {
        let res = panic_response(Box::new("kaboom"));
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let reported = res
            .extensions()
            .get::<ReportedError>()
            .expect("missing ReportedError");
        assert_eq!(reported.code, "UNHANDLED_FAULT");
        assert_eq!(reported.message, "kaboom");
    }
}
