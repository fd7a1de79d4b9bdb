use axum::{Router, response::Json, routing::post};
use serde_json::Number;

use crate::error::{AppError, ErrorBody};
use crate::extract::AppJson;
use crate::state::AppState;

use super::models::{ConversionRateRequest, ConversionRateResponse};

/// 足以精确展开任意 f64 小数部分的位数（最小次正规数有 1074 位小数）
const EXACT_FRACTION_DIGITS: usize = 1074;

/// 计算转化率百分比（两位小数）
pub fn conversion_rate(conversions: f64, visitors: f64) -> Result<String, AppError> {
    if visitors == 0.0 {
        return Err(AppError::Domain("Visitors cannot be zero".to_string()));
    }
    Ok(to_fixed_2(conversions / visitors * 100.0))
}

/// 按 ECMAScript `Number.prototype.toFixed(2)` 的规则格式化。
///
/// 在二进制精确值上取最近的两位小数，恰好居中时取绝对值较大者；
/// 非有限值输出 `Infinity` / `-Infinity` / `NaN`，绝对值 ≥ 1e21 时改用指数形式。
pub fn to_fixed_2(x: f64) -> String {
    if x.is_nan() {
        return "NaN".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if x.abs() >= 1e21 {
        return exponential(x);
    }

    let sign = if x < 0.0 { "-" } else { "" };
    let exact = format!("{:.*}", EXACT_FRACTION_DIGITS, x.abs());
    let (int_part, frac_part) = exact.split_once('.').unwrap_or((exact.as_str(), ""));
    let frac = frac_part.as_bytes();
    let digit = |i: usize| frac.get(i).map_or(0, |b| u128::from(b - b'0'));

    // |x| < 1e21，放大 100 倍后仍在 u128 范围内
    let mut hundredths = int_part.parse::<u128>().unwrap_or(0) * 100 + digit(0) * 10 + digit(1);
    if digit(2) >= 5 {
        hundredths += 1;
    }
    format!("{sign}{}.{:02}", hundredths / 100, hundredths % 100)
}

/// `1e21` => `1e+21`，与 JS 的数字字符串形式一致
fn exponential(x: f64) -> String {
    let s = format!("{x:e}");
    match s.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
        _ => s,
    }
}

fn as_f64(field: &str, n: &Number) -> Result<f64, AppError> {
    n.as_f64()
        .ok_or_else(|| AppError::BadRequest(format!("`{field}` is not a representable number")))
}

#[utoipa::path(
    post,
    path = "/api/calculate-conversion-rate",
    summary = "计算转化率",
    description = "conversionRate = conversions / visitors * 100，保留两位小数。visitors 为 0 时返回 500。",
    request_body = ConversionRateRequest,
    responses(
        (status = 200, description = "计算成功", body = ConversionRateResponse),
        (status = 400, description = "请求体不是合法 JSON 或字段缺失", body = ErrorBody),
        (status = 500, description = "visitors 为 0", body = ErrorBody)
    ),
    tag = "Conversion"
)]
pub async fn calculate_conversion_rate(
    AppJson(req): AppJson<ConversionRateRequest>,
) -> Result<Json<ConversionRateResponse>, AppError> {
    let rate = conversion_rate(
        as_f64("conversions", &req.conversions)?,
        as_f64("visitors", &req.visitors)?,
    )?;

    Ok(Json(ConversionRateResponse {
        message: format!("Conversion rate: {rate}%"),
        conversion_rate: rate,
        conversions: req.conversions,
        visitors: req.visitors,
    }))
}

pub fn create_conversion_router() -> Router<AppState> {
    Router::<AppState>::new().route(
        "/api/calculate-conversion-rate",
        post(calculate_conversion_rate),
    )
}
