//! 客户端配置模块

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 轮询周期下限（秒）
pub const MIN_POLL_INTERVAL_SECS: u64 = 1;
/// 轮询周期上限（秒），一天
pub const MAX_POLL_INTERVAL_SECS: u64 = 86_400;
/// 服务器允许的单次日志条数上限
pub const MAX_LOG_LIMIT: u32 = 100;

/// 客户端配置，保存在 config.json 的 "client" 节
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    /// 服务器地址
    #[serde(default = "default_server_url")]
    pub server_url: String,
    /// 常驻轮询周期（秒）
    #[serde(default = "default_ambient_interval")]
    pub ambient_interval_secs: u64,
    /// 监控期间的快速轮询周期（秒）
    #[serde(default = "default_monitoring_interval")]
    pub monitoring_interval_secs: u64,
    /// 单次请求超时（秒）
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// 每次拉取的日志条数
    #[serde(default = "default_log_limit")]
    pub log_limit: u32,
}

fn default_server_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_ambient_interval() -> u64 {
    5
}

fn default_monitoring_interval() -> u64 {
    3
}

fn default_request_timeout() -> u64 {
    10
}

fn default_log_limit() -> u32 {
    50
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            ambient_interval_secs: default_ambient_interval(),
            monitoring_interval_secs: default_monitoring_interval(),
            request_timeout_secs: default_request_timeout(),
            log_limit: default_log_limit(),
        }
    }
}

impl ClientConfig {
    /// 从配置文件加载，文件缺失或损坏时使用默认值
    pub fn load(config_dir: &Path) -> Self {
        read_section(config_dir, "client")
            .and_then(|value| serde_json::from_value::<ClientConfig>(value).ok())
            .unwrap_or_default()
    }

    /// 保存到配置文件（保留其他节）
    pub fn save(&self, config_dir: &Path) -> io::Result<()> {
        write_section(config_dir, "client", serde_json::to_value(self)?)
    }

    pub fn ambient_interval(&self) -> Duration {
        clamp_interval(self.ambient_interval_secs)
    }

    pub fn monitoring_interval(&self) -> Duration {
        clamp_interval(self.monitoring_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// 日志条数限制在 1..=100
    pub fn effective_log_limit(&self) -> u32 {
        self.log_limit.clamp(1, MAX_LOG_LIMIT)
    }
}

/// 将秒数转换为轮询周期，限制在 [下限, 上限] 之间
pub fn clamp_interval(secs: u64) -> Duration {
    Duration::from_secs(secs.clamp(MIN_POLL_INTERVAL_SECS, MAX_POLL_INTERVAL_SECS))
}

/// 读取 config.json 中的某一节
pub(crate) fn read_section(config_dir: &Path, key: &str) -> Option<serde_json::Value> {
    let content = fs::read_to_string(config_dir.join("config.json")).ok()?;
    let mut config = serde_json::from_str::<serde_json::Value>(&content).ok()?;
    config.get_mut(key).map(serde_json::Value::take)
}

/// 写入 config.json 中的某一节
pub(crate) fn write_section(
    config_dir: &Path,
    key: &str,
    value: serde_json::Value,
) -> io::Result<()> {
    fs::create_dir_all(config_dir)?;
    let config_file = config_dir.join("config.json");

    let mut config: serde_json::Value = if config_file.exists() {
        let content = fs::read_to_string(&config_file)?;
        serde_json::from_str(&content).unwrap_or_else(|_| serde_json::json!({}))
    } else {
        serde_json::json!({})
    };
    if !config.is_object() {
        config = serde_json::json!({});
    }

    config[key] = value;

    fs::write(&config_file, serde_json::to_string_pretty(&config)?)
}

/// 默认配置目录
pub fn default_config_dir() -> PathBuf {
    let base = if cfg!(target_os = "windows") {
        std::env::var("APPDATA").ok().map(PathBuf::from)
    } else if cfg!(target_os = "macos") {
        std::env::var("HOME")
            .ok()
            .map(|h| PathBuf::from(h).join("Library").join("Application Support"))
    } else {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var("HOME")
                    .ok()
                    .map(|h| PathBuf::from(h).join(".config"))
            })
    };

    base.map(|p| p.join("fileguard"))
        .unwrap_or_else(|| PathBuf::from(".fileguard"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig::load(dir.path());
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.ambient_interval(), Duration::from_secs(5));
        assert_eq!(config.monitoring_interval(), Duration::from_secs(3));
    }

    #[test]
    fn test_save_keeps_other_sections() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("config.json"),
            r#"{"log": {"level": "debug"}}"#,
        )
        .unwrap();

        let config = ClientConfig {
            server_url: "http://10.0.0.2:5000".to_string(),
            ambient_interval_secs: 8,
            ..Default::default()
        };
        config.save(dir.path()).unwrap();

        let content = fs::read_to_string(dir.path().join("config.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["log"]["level"], "debug");
        assert_eq!(value["client"]["ambientIntervalSecs"], 8);

        assert_eq!(ClientConfig::load(dir.path()), config);
    }

    #[test]
    fn test_partial_section_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("config.json"),
            r#"{"client": {"monitoringIntervalSecs": 0, "logLimit": 500}}"#,
        )
        .unwrap();

        let config = ClientConfig::load(dir.path());
        assert_eq!(config.server_url, "http://127.0.0.1:5000");
        assert_eq!(config.monitoring_interval(), Duration::from_secs(1));
        assert_eq!(config.effective_log_limit(), 100);
    }

    #[test]
    fn test_huge_interval_is_capped() {
        let config = ClientConfig {
            ambient_interval_secs: u64::MAX,
            ..Default::default()
        };
        assert_eq!(
            config.ambient_interval(),
            Duration::from_secs(MAX_POLL_INTERVAL_SECS)
        );
    }
}
