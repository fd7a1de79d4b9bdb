use serde::{Deserialize, Serialize};
use serde_json::Number;

/// 转化率计算请求
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct ConversionRateRequest {
    /// 转化数
    #[schema(value_type = f64, example = 50)]
    pub conversions: Number,
    /// 访客数（不能为 0）
    #[schema(value_type = f64, example = 200)]
    pub visitors: Number,
}

/// 转化率计算结果；`conversions`/`visitors` 原样回显
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConversionRateResponse {
    #[schema(value_type = f64, example = 50)]
    pub conversions: Number,
    #[schema(value_type = f64, example = 200)]
    pub visitors: Number,
    /// 百分比，固定两位小数
    #[schema(example = "25.00")]
    pub conversion_rate: String,
    #[schema(example = "Conversion rate: 25.00%")]
    pub message: String,
}
