use crate::config::AppConfig;
use crate::error::AppError;

/// 执行启动检查
///
/// 1. 校验配置（媒体服务凭据、大小上限、采样率）
/// 2. 输出关键运行参数，便于排查部署问题（不输出 secret）
pub fn run_startup_checks(config: &AppConfig) -> Result<(), AppError> {
    tracing::info!("🔍 开始执行启动检查...");

    config
        .validate()
        .map_err(|e| AppError::Internal(format!("配置校验失败: {e}")))?;

    tracing::info!(
        cloud_name = %config.media.cloud_name,
        upload_url = %config.media.upload_url(),
        timeout_secs = config.media.timeout_secs,
        "✅ 媒体服务配置就绪"
    );
    tracing::info!(
        field = %config.upload.field_name,
        max_file_size = config.upload.max_file_size,
        body_limit = config.upload.body_limit,
        "✅ 上传限制"
    );
    if config.error_reporting.enabled {
        tracing::info!(
            environment = %config.error_reporting.environment,
            traces_sample_rate = config.error_reporting.traces_sample_rate,
            debug_route = config.error_reporting.debug_route,
            "✅ 错误上报已启用"
        );
    } else {
        tracing::warn!("错误上报已关闭，5xx 与 panic 不会输出 error_report 事件");
    }

    tracing::info!("✅ 启动检查完成");
    Ok(())
}
