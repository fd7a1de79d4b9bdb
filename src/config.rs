use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 单个上传文件的默认上限：20 MiB
pub const DEFAULT_MAX_FILE_SIZE: usize = 20 * 1024 * 1024;

/// 配置文件路径覆盖变量
const CONFIG_PATH_ENV: &str = "UPLOAD_RELAY_CONFIG";

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 监听地址
    pub host: String,
    /// 监听端口
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别（RUST_LOG 优先）
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// 上传配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// multipart 中文件字段名
    pub field_name: String,
    /// 单个文件最大字节数
    pub max_file_size: usize,
    /// 其他请求体（JSON 等）的最大字节数
    pub body_limit: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            field_name: "my_file".to_string(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            body_limit: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

/// 媒体存储服务配置
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// 上传 API 基地址（不含 cloud_name）
    pub base_url: String,
    /// 账户名（CLOUD_NAME）
    pub cloud_name: String,
    /// API Key（API_KEY）
    pub api_key: String,
    /// API Secret（API_SECRET）
    pub api_secret: String,
    /// 资源类型提示，默认交给上游自动识别
    pub resource_type: String,
    /// 单次上游请求超时（秒）
    pub timeout_secs: u64,
}

impl MediaConfig {
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// 上传端点：`{base_url}/{cloud_name}/{resource_type}/upload`
    pub fn upload_url(&self) -> String {
        format!(
            "{}/{}/{}/upload",
            self.base_url.trim_end_matches('/'),
            self.cloud_name,
            self.resource_type
        )
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.cloudinary.com/v1_1".to_string(),
            cloud_name: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
            resource_type: "auto".to_string(),
            timeout_secs: 60,
        }
    }
}

// 手写 Debug，避免 api_secret 出现在日志里
impl std::fmt::Debug for MediaConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaConfig")
            .field("base_url", &self.base_url)
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"***")
            .field("resource_type", &self.resource_type)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// CORS 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// 是否启用 CORS
    pub enabled: bool,
    /// 允许的 Origin 列表（支持 "*" 表示任意）
    pub allowed_origins: Vec<String>,
    /// 允许的方法列表（支持 "*" 表示任意）
    pub allowed_methods: Vec<String>,
    /// 允许的请求头列表（支持 "*" 表示任意）
    pub allowed_headers: Vec<String>,
    /// 预检缓存时间（秒）
    pub max_age_secs: Option<u64>,
}

impl Default for CorsConfig {
    /// 默认放开所有来源
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_origins: vec!["*".to_string()],
            allowed_methods: vec!["*".to_string()],
            allowed_headers: vec!["*".to_string()],
            max_age_secs: None,
        }
    }
}

/// 错误上报配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorReportingConfig {
    /// 是否上报 5xx 与 panic
    pub enabled: bool,
    /// 环境标识，随上报事件输出
    pub environment: String,
    /// 请求追踪采样率（0.0 ~ 1.0）
    pub traces_sample_rate: f64,
    /// 是否挂载 `/debug-sentry` 故障演练端点
    pub debug_route: bool,
}

impl Default for ErrorReportingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            environment: "production".to_string(),
            traces_sample_rate: 1.0,
            debug_route: true,
        }
    }
}

/// 优雅退出配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShutdownConfig {
    /// 优雅退出超时时间（秒）
    pub timeout_secs: u64,
}

impl ShutdownConfig {
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

/// 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub upload: UploadConfig,
    pub media: MediaConfig,
    pub cors: CorsConfig,
    pub error_reporting: ErrorReportingConfig,
    pub shutdown: ShutdownConfig,
}

impl AppConfig {
    /// 从配置文件（可选）与进程环境变量加载配置
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Some(&Self::config_path()), std::env::vars())
    }

    /// 按给定的配置文件与环境变量集合构建配置。
    ///
    /// 覆盖顺序：默认值 < 配置文件 < `APP__SECTION__KEY` < `CLOUD_NAME`/`API_KEY`/`API_SECRET`。
    pub fn load_from<I>(path: Option<&Path>, vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: HashMap<String, String> = vars.into_iter().collect();

        let mut builder = ConfigBuilder::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }

        let builder = builder
            // 例如：APP__SERVER__PORT=8080、APP__MEDIA__TIMEOUT_SECS=30
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .source(Some(vars.clone())),
            )
            .set_override_option("media.cloud_name", vars.get("CLOUD_NAME").cloned())?
            .set_override_option("media.api_key", vars.get("API_KEY").cloned())?
            .set_override_option("media.api_secret", vars.get("API_SECRET").cloned())?
            .build()?;

        builder.try_deserialize()
    }

    /// 启动前校验：凭据必须齐全，数值必须合理
    pub fn validate(&self) -> Result<(), ConfigError> {
        let media = &self.media;
        for (name, value) in [
            ("media.cloud_name (CLOUD_NAME)", &media.cloud_name),
            ("media.api_key (API_KEY)", &media.api_key),
            ("media.api_secret (API_SECRET)", &media.api_secret),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Message(format!("缺少媒体服务凭据: {name}")));
            }
        }
        if media.timeout_secs == 0 {
            return Err(ConfigError::Message(
                "media.timeout_secs 必须大于 0".to_string(),
            ));
        }
        if self.upload.max_file_size == 0 {
            return Err(ConfigError::Message(
                "upload.max_file_size 必须大于 0".to_string(),
            ));
        }
        if self.upload.field_name.trim().is_empty() {
            return Err(ConfigError::Message(
                "upload.field_name 不能为空".to_string(),
            ));
        }
        let rate = self.error_reporting.traces_sample_rate;
        if !(0.0..=1.0).contains(&rate) {
            return Err(ConfigError::Message(format!(
                "error_reporting.traces_sample_rate 超出范围 [0, 1]: {rate}"
            )));
        }
        Ok(())
    }

    /// 配置文件路径：`UPLOAD_RELAY_CONFIG`，未设置时为 `config.toml`
    pub fn config_path() -> PathBuf {
        std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.toml"))
    }

    /// 获取服务器监听地址
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
