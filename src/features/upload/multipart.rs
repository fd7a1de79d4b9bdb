use axum::body::Bytes;
use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::StatusCode;

use crate::error::AppError;

use super::models::{FALLBACK_MIME_TYPE, IncomingUpload};

/// `/upload` 路由请求体上限 = 文件上限 + multipart 边界/头部开销
pub const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// 文件超限时对外返回的固定文案（按 MiB 取整展示）
pub fn too_large_message(max_file_size: usize) -> String {
    format!("File too large. Max {}MB", max_file_size / (1024 * 1024))
}

fn map_multipart_error(err: MultipartError, max_file_size: usize) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(too_large_message(max_file_size))
    } else {
        AppError::BadRequest(err.body_text())
    }
}

/// 读取 multipart 请求体，取出唯一的文件字段并整体缓冲到内存。
///
/// - 没有 filename 的纯文本字段一律忽略（包括与目标字段同名的）
/// - 其他名字的文件字段、或目标字段重复出现 => `UnexpectedField`
/// - 文件按块累计大小，超过 `max_file_size` 立即中止 => `PayloadTooLarge`
/// - 目标字段缺失 => `MissingField`
pub async fn read_single_file(
    multipart: &mut Multipart,
    field_name: &str,
    max_file_size: usize,
) -> Result<IncomingUpload, AppError> {
    let mut found: Option<IncomingUpload> = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| map_multipart_error(e, max_file_size))?
    {
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let name = field.name().unwrap_or_default().to_string();
        if name != field_name || found.is_some() {
            return Err(AppError::UnexpectedField(name));
        }

        let mime_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| FALLBACK_MIME_TYPE.to_string());

        let mut buf: Vec<u8> = Vec::new();
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| map_multipart_error(e, max_file_size))?
        {
            if buf.len() + chunk.len() > max_file_size {
                tracing::warn!(
                    field = %name,
                    received = buf.len() + chunk.len(),
                    max_file_size,
                    "文件超出大小限制，已中止读取"
                );
                return Err(AppError::PayloadTooLarge(too_large_message(max_file_size)));
            }
            buf.extend_from_slice(&chunk);
        }

        found = Some(IncomingUpload {
            field_name: name,
            file_name: Some(file_name),
            mime_type,
            bytes: Bytes::from(buf),
        });
    }

    found.ok_or_else(|| AppError::MissingField(field_name.to_string()))
}
