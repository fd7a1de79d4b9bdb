use std::time::Duration;

use reqwest::StatusCode;
use serde_json::Value;
use sha1::{Digest, Sha1};

use crate::config::MediaConfig;
use crate::error::AppError;

use super::models::DataUri;

/// 不参与签名的参数
const UNSIGNED_PARAMS: [&str; 4] = ["file", "api_key", "resource_type", "cloud_name"];

/// 媒体存储服务客户端（上传 API）。
///
/// 进程内只构建一次并通过 `AppState` 共享；内部 `reqwest::Client` 自带连接池，且设置了请求超时。
#[derive(Clone)]
pub struct MediaClient {
    client: reqwest::Client,
    upload_url: String,
    api_key: String,
    api_secret: String,
    timeout: Duration,
}

impl MediaClient {
    pub fn new(cfg: &MediaConfig) -> Result<Self, AppError> {
        let timeout = cfg.timeout_duration();
        let client = reqwest::Client::builder()
            .user_agent(concat!("upload-relay/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("初始化 HTTP Client 失败: {e}")))?;

        Ok(Self {
            client,
            upload_url: cfg.upload_url(),
            api_key: cfg.api_key.clone(),
            api_secret: cfg.api_secret.clone(),
            timeout,
        })
    }

    /// 上传一个 data-URI，返回上游 JSON 描述（原样透传，不做解析）
    pub async fn upload(&self, data_uri: &DataUri) -> Result<Value, AppError> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = sign_params(&[("timestamp", timestamp.as_str())], &self.api_secret);
        let file = data_uri.to_string();

        let form = [
            ("file", file.as_str()),
            ("api_key", self.api_key.as_str()),
            ("timestamp", timestamp.as_str()),
            ("signature", signature.as_str()),
        ];

        let resp = self
            .client
            .post(&self.upload_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = resp.status();
        let body = resp
            .bytes()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        if !status.is_success() {
            return Err(AppError::UpstreamFailure(upstream_error_message(
                status, &body,
            )));
        }

        serde_json::from_slice(&body).map_err(|e| {
            AppError::UpstreamFailure(format!("Media service returned invalid JSON: {e}"))
        })
    }

    fn map_transport_error(&self, err: reqwest::Error) -> AppError {
        if err.is_timeout() {
            AppError::UpstreamTimeout(format!(
                "Media service did not respond within {}s",
                self.timeout.as_secs()
            ))
        } else {
            AppError::UpstreamFailure(err.to_string())
        }
    }
}

/// 计算上传签名：签名参数按 key 排序后以 `k=v&k=v` 拼接，末尾追加 secret，取 SHA-1 十六进制。
///
/// 空值参数与 [`UNSIGNED_PARAMS`] 不参与签名。
pub fn sign_params(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut signed: Vec<&(&str, &str)> = params
        .iter()
        .filter(|(k, v)| !v.is_empty() && !UNSIGNED_PARAMS.contains(k))
        .collect();
    signed.sort_by(|a, b| a.0.cmp(b.0));

    let joined = signed
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha1::new();
    hasher.update(joined.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// 上游错误体形如 `{"error":{"message":"..."}}`；取不到时退化为状态码描述
fn upstream_error_message(status: StatusCode, body: &[u8]) -> String {
    serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| format!("Media service responded with HTTP {}", status.as_u16()))
}
