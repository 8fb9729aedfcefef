//! 仪表盘：组合各组件并提供界面命令

use crate::config::ClientConfig;
use crate::core::{
    validate_doc_id, validate_pending_path, BatchReport, BatchUploadWorkflow, LogUpdate,
    MergeMode, PollingCoordinator, StateStore, SyncContext, TimerKind,
};
use crate::error::ClientResult;
use crate::gateway::{MonitoringStarted, RemoteGateway};
use crate::presenter::{NoticeLevel, Presenter};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// 仪表盘实例，每个实例拥有独立的状态与定时器
pub struct Dashboard {
    ctx: Arc<SyncContext>,
    polling: Arc<PollingCoordinator>,
    uploads: BatchUploadWorkflow,
}

impl Dashboard {
    pub fn new(
        gateway: Arc<dyn RemoteGateway>,
        presenter: Arc<dyn Presenter>,
        config: &ClientConfig,
    ) -> Self {
        let ctx = Arc::new(SyncContext::new(gateway, presenter));
        let polling = Arc::new(PollingCoordinator::new(
            ctx.clone(),
            config.ambient_interval(),
            config.monitoring_interval(),
        ));
        let uploads = BatchUploadWorkflow::new(ctx.clone());

        Self {
            ctx,
            polling,
            uploads,
        }
    }

    /// 首次加载全部数据并启动常驻轮询
    ///
    /// 单项加载失败只记录日志，不影响其余项和轮询启动。
    pub async fn init(&self) {
        info!("连接服务: {}", self.ctx.gateway.name());

        match self.ctx.gateway.check_health().await {
            Ok(health) => info!("服务在线: {} (v{})", health.message, health.version),
            Err(e) => warn!("健康检查失败: {}", e),
        }

        let (status, files, monitoring, logs) = tokio::join!(
            self.ctx.refresh_status(),
            self.ctx.refresh_files(),
            self.polling.refresh_monitoring(),
            self.ctx.refresh_logs(MergeMode::Full),
        );
        if let Err(e) = status {
            warn!("加载系统状态失败: {}", e);
        }
        if let Err(e) = files {
            warn!("加载文件列表失败: {}", e);
        }
        if let Err(e) = monitoring {
            warn!("加载监控状态失败: {}", e);
        }
        if let Err(e) = logs {
            warn!("加载日志失败: {}", e);
        }

        self.ctx.render_pending().await;
        self.polling.start().await;
    }

    /// 加入待上传队列，返回是否新加入
    pub async fn add_pending_file(&self, path: &str) -> ClientResult<bool> {
        let path = match validate_pending_path(path) {
            Ok(p) => p,
            Err(e) => {
                self.ctx.presenter.notify(NoticeLevel::Warning, &e.to_string());
                return Err(e);
            }
        };

        let mut state = self.ctx.state.lock().await;
        let added = state.add_pending(&path);
        if added {
            self.ctx.presenter.render_pending_list(state.pending());
        } else {
            self.ctx
                .presenter
                .notify(NoticeLevel::Info, &format!("文件已在队列中: {}", path));
        }
        Ok(added)
    }

    pub async fn remove_pending_file(&self, path: &str) -> bool {
        let mut state = self.ctx.state.lock().await;
        let removed = state.remove_pending(path);
        if removed {
            self.ctx.presenter.render_pending_list(state.pending());
        }
        removed
    }

    pub async fn clear_pending_files(&self) {
        let mut state = self.ctx.state.lock().await;
        state.clear_pending();
        self.ctx.presenter.render_pending_list(state.pending());
    }

    /// 上传全部待上传文件
    pub async fn request_upload_all(&self) -> ClientResult<BatchReport> {
        match self.uploads.run().await {
            Ok(report) => {
                if report.error_count == 0 {
                    self.ctx.presenter.notify(
                        NoticeLevel::Success,
                        &format!("{} 个文件上传成功", report.success_count),
                    );
                } else {
                    self.ctx.presenter.notify(
                        NoticeLevel::Warning,
                        &format!(
                            "{} 个成功, {} 个失败",
                            report.success_count, report.error_count
                        ),
                    );
                }
                Ok(report)
            }
            Err(e) => {
                self.ctx.presenter.notify(NoticeLevel::Warning, &e.to_string());
                Err(e)
            }
        }
    }

    pub async fn request_start_monitoring(&self) -> ClientResult<MonitoringStarted> {
        self.ctx.presenter.set_monitoring_pending(true);

        match self.polling.start_monitoring().await {
            Ok(started) => {
                self.ctx.presenter.notify(NoticeLevel::Success, &started.message);
                self.after_monitoring_transition().await;
                Ok(started)
            }
            Err(e) => {
                self.ctx.presenter.set_monitoring_pending(false);
                self.ctx.presenter.notify(NoticeLevel::Error, &e.to_string());
                Err(e)
            }
        }
    }

    pub async fn request_stop_monitoring(&self) -> ClientResult<String> {
        self.ctx.presenter.set_monitoring_pending(true);

        match self.polling.stop_monitoring().await {
            Ok(message) => {
                self.ctx.presenter.notify(NoticeLevel::Success, &message);
                self.after_monitoring_transition().await;
                Ok(message)
            }
            Err(e) => {
                self.ctx.presenter.set_monitoring_pending(false);
                self.ctx.presenter.notify(NoticeLevel::Error, &e.to_string());
                Err(e)
            }
        }
    }

    /// 启停成功后刷新一次监控状态和日志，结束按钮等待状态
    async fn after_monitoring_transition(&self) {
        let (monitoring, logs) = tokio::join!(
            self.polling.refresh_monitoring(),
            self.ctx.refresh_logs(MergeMode::Incremental),
        );
        if let Err(e) = monitoring {
            warn!("刷新监控状态失败: {}", e);
            let current = self.ctx.state.lock().await.monitoring();
            self.ctx.presenter.render_monitoring_status(&current);
        }
        if let Err(e) = logs {
            warn!("刷新日志失败: {}", e);
        }
    }

    /// 清空服务器端日志
    pub async fn request_clear_logs(&self) -> ClientResult<()> {
        match self.ctx.gateway.clear_logs().await {
            Ok(message) => {
                self.ctx.logs_cleared().await;
                self.ctx.presenter.notify(NoticeLevel::Success, &message);
                Ok(())
            }
            Err(e) => {
                self.ctx.presenter.notify(NoticeLevel::Error, &e.to_string());
                Err(e)
            }
        }
    }

    /// 删除一个受保护文件
    pub async fn request_delete_file(&self, id: &str) -> ClientResult<()> {
        let result = match validate_doc_id(id) {
            Ok(()) => self.ctx.gateway.delete_file(id).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(message) => {
                self.ctx.presenter.notify(NoticeLevel::Success, &message);
                let (files, status) =
                    tokio::join!(self.ctx.refresh_files(), self.ctx.refresh_status());
                if let Err(e) = files {
                    warn!("删除后刷新文件列表失败: {}", e);
                }
                if let Err(e) = status {
                    warn!("删除后刷新状态失败: {}", e);
                }
                Ok(())
            }
            Err(e) => {
                self.ctx.presenter.notify(NoticeLevel::Error, &e.to_string());
                Err(e)
            }
        }
    }

    /// 手动刷新日志；`MergeMode::Full` 为强制全量刷新
    pub async fn refresh_logs(&self, mode: MergeMode) -> ClientResult<LogUpdate> {
        self.ctx.refresh_logs(mode).await
    }

    pub async fn refresh_files(&self) -> ClientResult<usize> {
        self.ctx.refresh_files().await
    }

    pub async fn set_polling_interval(&self, kind: TimerKind, period: Duration) -> Duration {
        self.polling.set_polling_interval(kind, period).await
    }

    pub fn polling(&self) -> &Arc<PollingCoordinator> {
        &self.polling
    }

    pub fn is_uploading(&self) -> bool {
        self.uploads.is_running()
    }

    /// 当前状态的副本
    pub async fn snapshot(&self) -> StateStore {
        self.ctx.snapshot().await
    }

    /// 停止全部轮询（应用关闭时调用）
    pub async fn teardown(&self) {
        info!("正在停止仪表盘...");
        self.polling.teardown().await;
        info!("仪表盘已停止");
    }
}
