//! 测试用的远程服务与界面替身

use crate::core::LogUpdate;
use crate::error::{ClientError, ClientResult};
use crate::gateway::{HealthInfo, MonitoringStarted, RemoteGateway, UploadReceipt};
use crate::models::{LogEntry, LogType, MonitoringState, PendingFile, ProtectedFile, SystemStatus};
use crate::presenter::{NoticeLevel, Presenter};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

pub(crate) fn online() -> SystemStatus {
    SystemStatus {
        server_online: true,
        firebase_connected: true,
        encryption_ready: true,
    }
}

pub(crate) fn entry(timestamp: &str, message: &str) -> LogEntry {
    LogEntry::new(timestamp, LogType::Violation, message)
}

/// 内存中的服务器
pub(crate) struct MockGateway {
    pub status: Mutex<ClientResult<SystemStatus>>,
    pub files: Mutex<Vec<ProtectedFile>>,
    pub logs: Mutex<ClientResult<Vec<LogEntry>>>,
    pub monitoring: Mutex<MonitoringState>,
    pub start_error: Mutex<Option<ClientError>>,
    pub stop_error: Mutex<Option<ClientError>>,
    pub failing_uploads: Mutex<HashSet<String>>,
    pub upload_delay: Mutex<Duration>,
    pub start_delay: Mutex<Duration>,
    /// 查询监控状态时先取值再等待，用于模拟过期响应
    pub monitoring_delay: Mutex<Duration>,
    calls: Mutex<Vec<String>>,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self {
            status: Mutex::new(Ok(online())),
            files: Mutex::new(Vec::new()),
            logs: Mutex::new(Ok(Vec::new())),
            monitoring: Mutex::new(MonitoringState::default()),
            start_error: Mutex::new(None),
            stop_error: Mutex::new(None),
            failing_uploads: Mutex::new(HashSet::new()),
            upload_delay: Mutex::new(Duration::ZERO),
            start_delay: Mutex::new(Duration::ZERO),
            monitoring_delay: Mutex::new(Duration::ZERO),
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl MockGateway {
    pub fn set_logs(&self, logs: Vec<LogEntry>) {
        *self.logs.lock().unwrap() = Ok(logs);
    }

    pub fn set_status(&self, status: ClientResult<SystemStatus>) {
        *self.status.lock().unwrap() = status;
    }

    pub fn fail_upload(&self, path: &str) {
        self.failing_uploads.lock().unwrap().insert(path.to_string());
    }

    /// 以 `prefix` 开头的调用次数
    pub fn count(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

#[async_trait]
impl RemoteGateway for MockGateway {
    async fn check_health(&self) -> ClientResult<HealthInfo> {
        self.record("health");
        Ok(HealthInfo {
            status: "healthy".to_string(),
            message: "mock".to_string(),
            version: "0.0.0".to_string(),
        })
    }

    async fn fetch_status(&self) -> ClientResult<SystemStatus> {
        self.record("status");
        self.status.lock().unwrap().clone()
    }

    async fn fetch_files(&self) -> ClientResult<Vec<ProtectedFile>> {
        self.record("files");
        Ok(self.files.lock().unwrap().clone())
    }

    async fn upload_file(&self, path: &str) -> ClientResult<UploadReceipt> {
        self.record(format!("upload:{}", path));
        let delay = *self.upload_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if self.failing_uploads.lock().unwrap().contains(path) {
            return Err(ClientError::rejected("加密失败", Some("E_ENCRYPT".to_string())));
        }

        let mut files = self.files.lock().unwrap();
        let id = format!("doc{}", files.len() + 1);
        files.push(ProtectedFile {
            id: id.clone(),
            original_path: path.to_string(),
            filename: path.rsplit('/').next().unwrap_or(path).to_string(),
            size_bytes: 2048,
            status: "protected".to_string(),
        });
        Ok(UploadReceipt {
            message: "ok".to_string(),
            doc_id: Some(id),
            auto_protected: false,
        })
    }

    async fn delete_file(&self, id: &str) -> ClientResult<String> {
        self.record(format!("delete:{}", id));
        let mut files = self.files.lock().unwrap();
        let before = files.len();
        files.retain(|f| f.id != id);
        if files.len() == before {
            return Err(ClientError::rejected("文件不存在", Some("E_NOT_FOUND".to_string())));
        }
        Ok("已删除".to_string())
    }

    async fn start_monitoring(&self) -> ClientResult<MonitoringStarted> {
        self.record("start");
        let delay = *self.start_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if let Some(e) = self.start_error.lock().unwrap().clone() {
            return Err(e);
        }
        let count = self.files.lock().unwrap().len() as u32;
        *self.monitoring.lock().unwrap() = MonitoringState {
            is_running: true,
            protected_file_count: count,
        };
        Ok(MonitoringStarted {
            message: "监控已启动".to_string(),
            protected_count: count,
        })
    }

    async fn stop_monitoring(&self) -> ClientResult<String> {
        self.record("stop");
        if let Some(e) = self.stop_error.lock().unwrap().clone() {
            return Err(e);
        }
        self.monitoring.lock().unwrap().is_running = false;
        Ok("监控已停止".to_string())
    }

    async fn fetch_monitoring_status(&self) -> ClientResult<MonitoringState> {
        self.record("monitoring");
        let state = *self.monitoring.lock().unwrap();
        let delay = *self.monitoring_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(state)
    }

    async fn fetch_logs(&self) -> ClientResult<Vec<LogEntry>> {
        self.record("logs");
        self.logs.lock().unwrap().clone()
    }

    async fn clear_logs(&self) -> ClientResult<String> {
        self.record("clear_logs");
        *self.logs.lock().unwrap() = Ok(Vec::new());
        Ok("日志已清空".to_string())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// 界面事件
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum UiEvent {
    Pending(Vec<PendingFile>),
    Protected(usize),
    Logs(LogUpdate),
    Status(SystemStatus),
    Monitoring(MonitoringState),
    MonitoringPending(bool),
    Notice(NoticeLevel, String),
}

/// 记录全部界面调用
#[derive(Default)]
pub(crate) struct RecordingPresenter {
    events: Mutex<Vec<UiEvent>>,
}

impl RecordingPresenter {
    pub fn events(&self) -> Vec<UiEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn log_updates(&self) -> Vec<LogUpdate> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                UiEvent::Logs(update) => Some(update),
                _ => None,
            })
            .collect()
    }

    pub fn last_status(&self) -> Option<SystemStatus> {
        self.events().into_iter().rev().find_map(|e| match e {
            UiEvent::Status(status) => Some(status),
            _ => None,
        })
    }

    pub fn notices(&self) -> Vec<(NoticeLevel, String)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                UiEvent::Notice(level, message) => Some((level, message)),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    fn push(&self, event: UiEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl Presenter for RecordingPresenter {
    fn render_pending_list(&self, queue: &[PendingFile]) {
        self.push(UiEvent::Pending(queue.to_vec()));
    }

    fn render_protected_list(&self, files: &[ProtectedFile]) {
        self.push(UiEvent::Protected(files.len()));
    }

    fn render_logs(&self, update: &LogUpdate) {
        assert!(update.requires_render(), "Unchanged 不应传给界面");
        self.push(UiEvent::Logs(update.clone()));
    }

    fn render_status(&self, status: &SystemStatus) {
        self.push(UiEvent::Status(*status));
    }

    fn render_monitoring_status(&self, state: &MonitoringState) {
        self.push(UiEvent::Monitoring(*state));
    }

    fn set_monitoring_pending(&self, pending: bool) {
        self.push(UiEvent::MonitoringPending(pending));
    }

    fn notify(&self, level: NoticeLevel, message: &str) {
        self.push(UiEvent::Notice(level, message.to_string()));
    }
}
