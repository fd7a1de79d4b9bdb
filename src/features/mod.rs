/// 上传转发（multipart -> data-URI -> 媒体服务）
pub mod upload;

/// 转化率计算演示端点
pub mod conversion;

/// 健康检查
pub mod health;

/// 错误上报演练端点
pub mod debug;
