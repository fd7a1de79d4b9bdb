use std::fmt;

use axum::body::Bytes;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// 未声明 Content-Type 的文件部分按 multipart 的默认类型处理
pub const FALLBACK_MIME_TYPE: &str = "text/plain";

/// 已完整读入内存的上传文件（仅在单个请求内存活）
#[derive(Debug, Clone)]
pub struct IncomingUpload {
    /// multipart 字段名
    pub field_name: String,
    /// 客户端提供的文件名（可能缺失）
    pub file_name: Option<String>,
    /// 声明的 MIME 类型
    pub mime_type: String,
    /// 文件内容
    pub bytes: Bytes,
}

impl IncomingUpload {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// `data:<mime>;base64,<payload>` 形式的编码载荷
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    pub mime_type: String,
    /// 标准 base64（带填充）
    pub payload: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DataUriError {
    #[error("missing `data:` scheme")]
    MissingScheme,
    #[error("missing `;base64,` marker")]
    NotBase64,
    #[error("invalid base64 payload: {0}")]
    Decode(String),
}

impl DataUri {
    pub fn encode(upload: &IncomingUpload) -> Self {
        Self {
            mime_type: upload.mime_type.clone(),
            payload: STANDARD.encode(&upload.bytes),
        }
    }

    pub fn parse(raw: &str) -> Result<Self, DataUriError> {
        let rest = raw.strip_prefix("data:").ok_or(DataUriError::MissingScheme)?;
        let (mime_type, payload) = rest.split_once(";base64,").ok_or(DataUriError::NotBase64)?;
        Ok(Self {
            mime_type: mime_type.to_string(),
            payload: payload.to_string(),
        })
    }

    pub fn decode_bytes(&self) -> Result<Vec<u8>, DataUriError> {
        STANDARD
            .decode(&self.payload)
            .map_err(|e| DataUriError::Decode(e.to_string()))
    }
}

impl fmt::Display for DataUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data:{};base64,{}", self.mime_type, self.payload)
    }
}
