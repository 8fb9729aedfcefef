//! 界面通知接口
//!
//! 核心只通过这里把状态交给界面层，具体渲染方式由实现决定。

use crate::core::LogUpdate;
use crate::models::{MonitoringState, PendingFile, ProtectedFile, SystemStatus};
use tracing::{error, info, warn};

/// 提示级别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// 界面层
pub trait Presenter: Send + Sync {
    fn render_pending_list(&self, queue: &[PendingFile]);

    fn render_protected_list(&self, files: &[ProtectedFile]);

    /// 只会收到需要渲染的更新，`LogUpdate::Unchanged` 不会传到这里
    fn render_logs(&self, update: &LogUpdate);

    fn render_status(&self, status: &SystemStatus);

    /// 渲染监控状态，同时结束监控按钮的等待状态
    fn render_monitoring_status(&self, state: &MonitoringState);

    /// 监控按钮进入等待状态
    fn set_monitoring_pending(&self, pending: bool);

    /// 用户提示（直接命令的结果）
    fn notify(&self, level: NoticeLevel, message: &str);
}

/// 把界面事件输出到 tracing 的实现，供命令行使用
#[derive(Debug, Default)]
pub struct TracingPresenter;

impl Presenter for TracingPresenter {
    fn render_pending_list(&self, queue: &[PendingFile]) {
        info!("待上传 {} 个文件", queue.len());
        for path in queue {
            info!("  · {}", path);
        }
    }

    fn render_protected_list(&self, files: &[ProtectedFile]) {
        info!("受保护文件 {} 个", files.len());
        for file in files {
            info!(
                "  · {} ({} KB, {}) [{}]",
                file.filename,
                file.size_bytes / 1024,
                file.status,
                file.id
            );
        }
    }

    fn render_logs(&self, update: &LogUpdate) {
        match update {
            LogUpdate::Empty => info!("暂无安全日志"),
            LogUpdate::Unchanged => {}
            LogUpdate::Prepend(entries) | LogUpdate::Replace(entries) => {
                // 新的在前，倒序输出让终端里保持时间顺序
                for entry in entries.iter().rev() {
                    let time = entry
                        .parsed_time()
                        .map(|t| t.format("%H:%M:%S").to_string())
                        .unwrap_or_else(|| entry.timestamp.clone());
                    info!("[{}] {:<9} {}", time, entry.kind, entry.message);
                }
            }
        }
    }

    fn render_status(&self, status: &SystemStatus) {
        info!(
            "服务器: {} | 云存储: {} | 加密: {}",
            on_off(status.server_online),
            on_off(status.firebase_connected),
            on_off(status.encryption_ready)
        );
    }

    fn render_monitoring_status(&self, state: &MonitoringState) {
        info!(
            "监控: {} | 受保护 {} 个",
            if state.is_running { "运行中" } else { "已停止" },
            state.protected_file_count
        );
    }

    fn set_monitoring_pending(&self, _pending: bool) {}

    fn notify(&self, level: NoticeLevel, message: &str) {
        match level {
            NoticeLevel::Success | NoticeLevel::Info => info!("{}", message),
            NoticeLevel::Warning => warn!("{}", message),
            NoticeLevel::Error => error!("{}", message),
        }
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "正常"
    } else {
        "离线"
    }
}
