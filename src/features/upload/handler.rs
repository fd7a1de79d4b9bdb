//! 上传转发 API 处理模块（features/upload）
use axum::{
    Router,
    extract::{DefaultBodyLimit, Multipart, State, multipart::MultipartRejection},
    response::Json,
    routing::post,
};
use serde_json::Value;

use crate::config::UploadConfig;
use crate::error::{AppError, ErrorBody};
use crate::state::AppState;

use super::models::DataUri;
use super::multipart::{MULTIPART_OVERHEAD, read_single_file};

#[utoipa::path(
    post,
    path = "/upload",
    summary = "上传文件并转存到媒体服务",
    description = "接收 multipart 字段 `my_file`（≤20MiB，任意 MIME），编码为 base64 data-URI 后提交给媒体服务（resource_type=auto），原样返回其 JSON 结果。",
    request_body(
        content_type = "multipart/form-data",
        description = "单个文件字段 `my_file`"
    ),
    responses(
        (status = 200, description = "媒体服务返回的资源描述（原样透传）", body = serde_json::Value),
        (status = 400, description = "multipart 解析失败 / 缺少文件字段 / 多余文件字段", body = ErrorBody),
        (status = 413, description = "文件超出大小限制", body = ErrorBody),
        (status = 500, description = "媒体服务调用失败", body = ErrorBody),
        (status = 504, description = "媒体服务响应超时", body = ErrorBody)
    ),
    tag = "Upload"
)]
pub async fn upload_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Value>, AppError> {
    let mut multipart = multipart.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let limits = &state.config.upload;

    let upload = read_single_file(&mut multipart, &limits.field_name, limits.max_file_size).await?;
    tracing::info!(
        file_name = upload.file_name.as_deref().unwrap_or("-"),
        mime_type = %upload.mime_type,
        size = upload.len(),
        "收到上传文件，开始转发"
    );

    let data_uri = DataUri::encode(&upload);
    // 编码完成后原始缓冲即可释放，避免外呼期间同时持有两份数据
    drop(upload);

    let result = state.media.upload(&data_uri).await.inspect_err(|e| {
        tracing::warn!(code = e.stable_code(), error = %e, "媒体服务上传失败");
    })?;

    let public_id = result
        .get("public_id")
        .and_then(Value::as_str)
        .unwrap_or("-");
    tracing::info!(public_id, "媒体服务上传成功");
    Ok(Json(result))
}

pub fn create_upload_router(limits: &UploadConfig) -> Router<AppState> {
    Router::<AppState>::new().route(
        "/upload",
        post(upload_file).layer(DefaultBodyLimit::max(
            limits.max_file_size.saturating_add(MULTIPART_OVERHEAD),
        )),
    )
}
