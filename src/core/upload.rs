//! 批量上传
//!
//! 开始时复制一份待上传队列，之后对队列的增删不影响本批次。
//! 单个文件失败只计数，不中断批次；全部处理完后才从队列中移除已上传的路径，
//! 然后刷新受保护文件列表和系统状态。

use super::context::SyncContext;
use crate::error::{ClientError, ClientResult};
use crate::models::PendingFile;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 批量上传报告
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub success_count: usize,
    pub error_count: usize,
    pub uploaded: Vec<PendingFile>,
    pub errors: Vec<String>,
}

/// 批量上传流程
pub struct BatchUploadWorkflow {
    ctx: Arc<SyncContext>,
    in_progress: Arc<AtomicBool>,
}

impl BatchUploadWorkflow {
    pub fn new(ctx: Arc<SyncContext>) -> Self {
        Self {
            ctx,
            in_progress: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_running(&self) -> bool {
        self.in_progress.load(Ordering::SeqCst)
    }

    /// 上传当前队列中的全部文件
    pub async fn run(&self) -> ClientResult<BatchReport> {
        if self.in_progress.swap(true, Ordering::SeqCst) {
            return Err(ClientError::Busy("批量上传".to_string()));
        }
        let flag = self.in_progress.clone();
        scopeguard::defer! {
            flag.store(false, Ordering::SeqCst);
        }

        let snapshot = self.ctx.state.lock().await.pending_snapshot();
        if snapshot.is_empty() {
            return Err(ClientError::Validation("没有待上传的文件".to_string()));
        }

        info!("开始批量上传 {} 个文件", snapshot.len());

        let mut uploaded = Vec::new();
        let mut errors = Vec::new();

        for path in snapshot {
            match self.ctx.gateway.upload_file(&path).await {
                Ok(receipt) => {
                    debug!("  上传完成: {} {}", path, receipt.message);
                    uploaded.push(path);
                }
                Err(e) => {
                    warn!("  上传失败: {}: {}", path, e);
                    errors.push(format!("{}: {}", path, e));
                }
            }
        }

        if !uploaded.is_empty() {
            let mut state = self.ctx.state.lock().await;
            state.remove_pending_all(&uploaded);
            self.ctx.presenter.render_pending_list(state.pending());
        }

        // 受保护数量可能已变化
        let (files, status) = tokio::join!(self.ctx.refresh_files(), self.ctx.refresh_status());
        if let Err(e) = files {
            debug!("上传后刷新文件列表失败: {}", e);
        }
        if let Err(e) = status {
            debug!("上传后刷新状态失败: {}", e);
        }

        info!(
            "批量上传结束: 成功 {}, 失败 {}",
            uploaded.len(),
            errors.len()
        );

        Ok(BatchReport {
            success_count: uploaded.len(),
            error_count: errors.len(),
            uploaded,
            errors,
        })
    }
}
