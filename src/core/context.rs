//! 各组件共享的运行上下文

use super::log_sync::{LogSyncEngine, LogUpdate, MergeMode};
use super::state::StateStore;
use crate::error::{ClientError, ClientResult};
use crate::gateway::RemoteGateway;
use crate::models::{MonitoringState, SystemStatus};
use crate::presenter::Presenter;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// 远程服务、界面和两份可变状态
///
/// 远程调用期间不持有锁；拿到结果后加锁修改并在锁内渲染，
/// 保证同一份状态的修改与渲染顺序一致。
pub struct SyncContext {
    pub(crate) gateway: Arc<dyn RemoteGateway>,
    pub(crate) presenter: Arc<dyn Presenter>,
    pub(crate) state: Mutex<StateStore>,
    pub(crate) logs: Mutex<LogSyncEngine>,
}

impl SyncContext {
    pub fn new(gateway: Arc<dyn RemoteGateway>, presenter: Arc<dyn Presenter>) -> Self {
        Self {
            gateway,
            presenter,
            state: Mutex::new(StateStore::new()),
            logs: Mutex::new(LogSyncEngine::new()),
        }
    }

    /// 刷新系统状态
    ///
    /// 临时错误保留最后一次已知状态；服务器拒绝时标记为不可达。
    pub async fn refresh_status(&self) -> ClientResult<SystemStatus> {
        match self.gateway.fetch_status().await {
            Ok(status) => {
                let mut state = self.state.lock().await;
                state.set_status(status);
                self.presenter.render_status(&status);
                Ok(status)
            }
            Err(e @ ClientError::Rejected { .. }) => {
                let mut state = self.state.lock().await;
                state.mark_unreachable();
                self.presenter.render_status(&state.status());
                Err(e)
            }
            Err(e) => {
                debug!("状态刷新失败，保留旧状态: {}", e);
                Err(e)
            }
        }
    }

    /// 刷新受保护文件快照（整体替换）
    pub async fn refresh_files(&self) -> ClientResult<usize> {
        let files = self.gateway.fetch_files().await?;
        let count = files.len();

        let mut state = self.state.lock().await;
        state.set_protected(files);
        self.presenter.render_protected_list(state.protected());

        Ok(count)
    }

    /// 拉取日志并合并，只有需要渲染时才通知界面
    pub async fn refresh_logs(&self, mode: MergeMode) -> ClientResult<LogUpdate> {
        let batch = self.gateway.fetch_logs().await?;

        let mut logs = self.logs.lock().await;
        let update = logs.merge(batch, mode);
        if update.requires_render() {
            self.presenter.render_logs(&update);
        }

        Ok(update)
    }

    /// 日志已在服务器端清空
    pub async fn logs_cleared(&self) {
        let mut logs = self.logs.lock().await;
        let update = logs.merge(Vec::new(), MergeMode::Full);
        self.presenter.render_logs(&update);
    }

    pub(crate) async fn set_monitoring(&self, monitoring: MonitoringState) {
        let mut state = self.state.lock().await;
        state.set_monitoring(monitoring);
        self.presenter.render_monitoring_status(&monitoring);
    }

    /// 只更新状态，由随后的监控状态刷新负责渲染
    pub(crate) async fn store_monitoring(&self, monitoring: MonitoringState) {
        self.state.lock().await.set_monitoring(monitoring);
    }

    pub(crate) async fn render_pending(&self) {
        let state = self.state.lock().await;
        self.presenter.render_pending_list(state.pending());
    }

    pub async fn snapshot(&self) -> StateStore {
        self.state.lock().await.clone()
    }
}
