use axum::extract::FromRequest;

use crate::error::AppError;

/// 与 `axum::Json` 相同，但解析失败时走 [`AppError`]，保证错误体始终为统一 JSON 格式
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
