//! 日志系统初始化

use infrastructure_common::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::level_filters::LevelFilter;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

static LOGGING_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// 日志配置
///
/// `RUST_LOG` 环境变量存在时优先于 `level`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: String,
    /// 是否显示目标
    pub show_target: bool,
    /// 是否显示线程ID
    pub show_thread_ids: bool,
    /// 是否显示文件名
    pub show_file: bool,
    /// 是否显示行号
    pub show_line_number: bool,
    /// 是否使用 JSON 格式
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            show_target: true,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// 创建开发环境日志配置
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            show_target: true,
            show_thread_ids: true,
            show_file: true,
            show_line_number: true,
            json_format: false,
        }
    }

    /// 创建生产环境日志配置
    pub fn production() -> Self {
        Self {
            level: "info".to_string(),
            show_target: false,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
            json_format: true,
        }
    }

    /// 设置日志级别
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// 解析后的级别
    pub fn level_filter(&self) -> Result<LevelFilter, ConfigurationError> {
        LevelFilter::from_str(self.level.trim())
            .map_err(|_| ConfigurationError::settings(format!("无效的日志级别: {}", self.level)))
    }

    /// 构建过滤器：`RUST_LOG` 优先，否则使用配置的级别
    pub fn env_filter(&self) -> Result<EnvFilter, ConfigurationError> {
        let level = self.level_filter()?;
        Ok(EnvFilter::builder()
            .with_default_directive(level.into())
            .from_env_lossy())
    }

    /// 安装全局订阅者
    ///
    /// 返回是否由本次调用完成安装；已安装过（包括由其他代码安装）时返回 `Ok(false)`。
    pub fn try_init(&self) -> Result<bool, ConfigurationError> {
        let filter = self.env_filter()?;
        if LOGGING_INITIALIZED.swap(true, Ordering::SeqCst) {
            return Ok(false);
        }

        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(self.show_target)
            .with_thread_ids(self.show_thread_ids)
            .with_file(self.show_file)
            .with_line_number(self.show_line_number);

        let installed = if self.json_format {
            subscriber.json().try_init()
        } else {
            subscriber.try_init()
        };

        match installed {
            Ok(()) => {
                info!("日志系统初始化完成: level = {}", self.level);
                Ok(true)
            }
            Err(error) => {
                debug!("已存在全局日志订阅者, 跳过初始化: {}", error);
                Ok(false)
            }
        }
    }
}
