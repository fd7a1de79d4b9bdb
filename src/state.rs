use std::sync::Arc;

use crate::config::AppConfig;
use crate::features::upload::MediaClient;
use crate::reporting::ErrorReporter;

/// 聚合的应用共享状态（启动后只读）
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub media: Arc<MediaClient>,
    pub reporter: ErrorReporter,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self, crate::AppError> {
        let media = MediaClient::new(&config.media)?;
        let reporter = ErrorReporter::new(&config.error_reporting);
        Ok(Self {
            config: Arc::new(config),
            media: Arc::new(media),
            reporter,
        })
    }
}
