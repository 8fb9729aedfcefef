//! File Guardian API 的 JSON 结构

use crate::models::{LogEntry, LogType, MonitoringState, ProtectedFile, SystemStatus};
use serde::Deserialize;

/// 失败响应: {success: false, error, error_code}
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_code: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct FirebaseSection {
    pub connected: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct EncryptionSection {
    pub key_loaded: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct MonitoringSection {
    pub is_running: bool,
    pub protected_file_count: u32,
}

/// GET /api/status
#[derive(Debug, Deserialize)]
pub(crate) struct StatusBody {
    #[serde(default)]
    pub firebase: FirebaseSection,
    #[serde(default)]
    pub encryption: EncryptionSection,
}

impl From<StatusBody> for SystemStatus {
    fn from(body: StatusBody) -> Self {
        SystemStatus {
            // 能拿到响应即说明服务器在线
            server_online: true,
            firebase_connected: body.firebase.connected,
            encryption_ready: body.encryption.key_loaded,
        }
    }
}

/// files 数组中的一行
#[derive(Debug, Deserialize)]
pub(crate) struct FileRow {
    pub doc_id: String,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub original_path: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub file_size: u64,
}

impl From<FileRow> for ProtectedFile {
    fn from(row: FileRow) -> Self {
        ProtectedFile {
            id: row.doc_id,
            original_path: row.original_path,
            filename: row.filename,
            size_bytes: row.file_size,
            status: row.status,
        }
    }
}

/// GET /api/files
#[derive(Debug, Deserialize)]
pub(crate) struct FilesBody {
    #[serde(default)]
    pub files: Vec<FileRow>,
}

/// POST /api/files/upload
#[derive(Debug, Deserialize)]
pub(crate) struct UploadBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub doc_id: Option<String>,
    #[serde(default)]
    pub auto_protected: bool,
}

/// POST /api/monitoring/start
#[derive(Debug, Deserialize)]
pub(crate) struct StartBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub protected_count: u32,
}

/// GET /api/monitoring/status
pub(crate) type MonitoringStatusBody = MonitoringSection;

impl From<MonitoringStatusBody> for MonitoringState {
    fn from(body: MonitoringStatusBody) -> Self {
        MonitoringState {
            is_running: body.is_running,
            protected_file_count: body.protected_file_count,
        }
    }
}

/// 只关心 message 的响应
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct MessageBody {
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LogRow {
    #[serde(default)]
    pub timestamp: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub message: String,
}

impl From<LogRow> for LogEntry {
    fn from(row: LogRow) -> Self {
        LogEntry {
            timestamp: row.timestamp,
            kind: LogType::from(row.kind.as_str()),
            message: row.message,
        }
    }
}

/// GET /api/logs（服务器按最新在前返回）
#[derive(Debug, Deserialize)]
pub(crate) struct LogsBody {
    #[serde(default)]
    pub logs: Vec<LogRow>,
}
