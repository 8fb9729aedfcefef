//! 日志模块 - 控制台输出与按天滚动的日志文件

use crate::config::{read_section, write_section};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// 日志配置，保存在 config.json 的 "log" 节
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogConfig {
    /// 是否写日志文件
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// 日志级别: "error", "warn", "info", "debug", "trace"
    #[serde(default = "default_level")]
    pub level: String,
    /// 保留的日志文件个数（每天一个）
    #[serde(default = "default_retain_files")]
    pub retain_files: usize,
}

fn default_enabled() -> bool {
    true
}

fn default_level() -> String {
    "info".to_string()
}

fn default_retain_files() -> usize {
    7
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            level: default_level(),
            retain_files: default_retain_files(),
        }
    }
}

impl LogConfig {
    pub fn load(config_dir: &Path) -> Self {
        read_section(config_dir, "log")
            .and_then(|value| serde_json::from_value::<LogConfig>(value).ok())
            .unwrap_or_default()
    }

    pub fn save(&self, config_dir: &Path) -> io::Result<()> {
        write_section(config_dir, "log", serde_json::to_value(self)?)
    }

    /// 将配置的日志级别转换为 tracing Level
    pub fn tracing_level(&self) -> tracing::Level {
        match self.level.to_lowercase().as_str() {
            "error" => tracing::Level::ERROR,
            "warn" => tracing::Level::WARN,
            "debug" => tracing::Level::DEBUG,
            "trace" => tracing::Level::TRACE,
            _ => tracing::Level::INFO,
        }
    }

    /// 日志过滤器：RUST_LOG 优先，其次为配置级别
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::builder()
            .with_default_directive(self.tracing_level().into())
            .from_env_lossy()
            .add_directive("hyper=warn".parse().expect("valid directive"))
            .add_directive("reqwest=warn".parse().expect("valid directive"))
    }
}

/// 创建按天滚动的日志文件写入器
pub fn file_appender(log_dir: &Path, config: &LogConfig) -> Result<RollingFileAppender, InitError> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("dashboard")
        .filename_suffix("log")
        .max_log_files(config.retain_files.max(1))
        .build(log_dir)
}

/// 初始化全局日志，返回的 guard 需要保持到程序退出
///
/// 日志文件创建失败时只输出到控制台。
pub fn init_logging(log_dir: &Path, verbose: bool) -> Option<WorkerGuard> {
    let mut config = LogConfig::load(log_dir);
    if verbose {
        config.level = "debug".to_string();
    }

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false);

    let appender = if config.enabled {
        match file_appender(log_dir, &config) {
            Ok(appender) => Some(appender),
            Err(e) => {
                eprintln!("无法创建日志文件: {}", e);
                None
            }
        }
    } else {
        None
    };

    let (file_layer, guard) = match appender {
        Some(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let _ = tracing_subscriber::registry()
        .with(config.env_filter())
        .with(console_layer)
        .with(file_layer)
        .try_init();

    guard
}
