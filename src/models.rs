//! 仪表盘领域数据

use serde::{Deserialize, Serialize};

/// 待上传文件路径（队列内唯一，按加入顺序排列）
pub type PendingFile = String;

/// 已受保护的文件（服务器快照中的一条）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtectedFile {
    pub id: String,
    pub original_path: String,
    pub filename: String,
    pub size_bytes: u64,
    pub status: String,
}

/// 后端三个子系统的健康状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemStatus {
    pub server_online: bool,
    pub firebase_connected: bool,
    pub encryption_ready: bool,
}

impl SystemStatus {
    /// 标记服务器不可达，其余字段保留最后一次已知值
    pub fn unreachable(self) -> Self {
        Self {
            server_online: false,
            ..self
        }
    }
}

/// 监控状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitoringState {
    pub is_running: bool,
    pub protected_file_count: u32,
}

/// 安全日志类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogType {
    Violation,
    Restore,
    Warning,
    Info,
    Error,
}

impl std::fmt::Display for LogType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogType::Violation => write!(f, "violation"),
            LogType::Restore => write!(f, "restore"),
            LogType::Warning => write!(f, "warning"),
            LogType::Info => write!(f, "info"),
            LogType::Error => write!(f, "error"),
        }
    }
}

impl From<&str> for LogType {
    fn from(s: &str) -> Self {
        match s {
            "violation" => LogType::Violation,
            "restore" => LogType::Restore,
            "warning" => LogType::Warning,
            "error" => LogType::Error,
            _ => LogType::Info,
        }
    }
}

/// 一条安全日志
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    #[serde(rename = "type")]
    pub kind: LogType,
    pub message: String,
}

/// 日志去重键：(timestamp, type, message) 相同即视为同一事件
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LogKey {
    timestamp: String,
    kind: LogType,
    message: String,
}

impl LogEntry {
    pub fn new(timestamp: impl Into<String>, kind: LogType, message: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            kind,
            message: message.into(),
        }
    }

    pub fn key(&self) -> LogKey {
        LogKey {
            timestamp: self.timestamp.clone(),
            kind: self.kind,
            message: self.message.clone(),
        }
    }

    /// 解析服务器的 ISO 时间戳（无时区），失败返回 None
    pub fn parsed_time(&self) -> Option<chrono::NaiveDateTime> {
        chrono::NaiveDateTime::parse_from_str(&self.timestamp, "%Y-%m-%dT%H:%M:%S%.f").ok()
    }
}
