pub mod http;
mod wire;

use crate::error::ClientResult;
use crate::models::{LogEntry, MonitoringState, ProtectedFile, SystemStatus};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use http::HttpGateway;

/// 健康检查结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthInfo {
    pub status: String,
    pub message: String,
    pub version: String,
}

/// 单个文件上传成功的回执
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    pub message: String,
    pub doc_id: Option<String>,
    pub auto_protected: bool,
}

/// 监控启动结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitoringStarted {
    pub message: String,
    pub protected_count: u32,
}

/// 远程服务接口
///
/// 预期内的失败（网络不可达、服务器拒绝）都以 `Err(ClientError)` 返回，
/// 实现不得 panic。
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    async fn check_health(&self) -> ClientResult<HealthInfo>;

    /// 读取系统健康状态
    async fn fetch_status(&self) -> ClientResult<SystemStatus>;

    /// 读取受保护文件快照
    async fn fetch_files(&self) -> ClientResult<Vec<ProtectedFile>>;

    /// 加密并存储单个文件
    async fn upload_file(&self, path: &str) -> ClientResult<UploadReceipt>;

    /// 删除受保护文件，返回服务器消息
    async fn delete_file(&self, id: &str) -> ClientResult<String>;

    async fn start_monitoring(&self) -> ClientResult<MonitoringStarted>;

    async fn stop_monitoring(&self) -> ClientResult<String>;

    async fn fetch_monitoring_status(&self) -> ClientResult<MonitoringState>;

    /// 读取日志，按时间先后排列（最新的在最后）
    async fn fetch_logs(&self) -> ClientResult<Vec<LogEntry>>;

    /// 清空服务器端日志
    async fn clear_logs(&self) -> ClientResult<String>;

    /// 获取服务名称（用于日志）
    fn name(&self) -> &str;
}
