use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::features::health::handler::health_check,
        crate::features::upload::handler::upload_file,
        crate::features::conversion::handler::calculate_conversion_rate,
        crate::features::debug::handler::debug_sentry,
    ),
    components(schemas(
        crate::error::ErrorBody,
        crate::features::health::HealthResponse,
        crate::features::conversion::ConversionRateRequest,
        crate::features::conversion::ConversionRateResponse,
    )),
    tags(
        (
            name = "Upload",
            description = "上传转发：multipart 文件编码为 data-URI 后交给媒体服务存储。"
        ),
        (name = "Conversion", description = "转化率计算演示。"),
        (name = "Debug", description = "错误上报演练（可通过配置关闭）。"),
        (name = "Health", description = "健康检查：服务探活。"),
    ),
    info(
        title = "Upload Relay API",
        version = env!("CARGO_PKG_VERSION"),
        description = "媒体上传转发服务（Axum + utoipa）。错误响应统一为 `{message, code, requestId?}`。"
    )
)]
pub struct ApiDoc;
