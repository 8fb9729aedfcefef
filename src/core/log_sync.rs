//! 安全日志增量合并
//!
//! 服务器每次返回完整的日志窗口，这里用 (timestamp, type, message) 去重，
//! 只把没见过的条目交给界面。去重集合在会话内不做淘汰，
//! 只在日志被清空或强制全量刷新时重置。

use crate::models::{LogEntry, LogKey};
use std::collections::HashSet;

/// 合并模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMode {
    /// 只返回新条目
    Incremental,
    /// 重建去重集合并整体重绘
    Full,
}

/// 一次合并的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogUpdate {
    /// 没有新条目，界面不应做任何改动
    Unchanged,
    /// 新条目，最新在前；作为一个整体插入到列表顶部
    Prepend(Vec<LogEntry>),
    /// 整体重绘，最新在前
    Replace(Vec<LogEntry>),
    /// 服务器没有任何日志，显示空状态
    Empty,
}

impl LogUpdate {
    /// 是否需要触发界面渲染
    pub fn requires_render(&self) -> bool {
        !matches!(self, LogUpdate::Unchanged)
    }

    pub fn entries(&self) -> &[LogEntry] {
        match self {
            LogUpdate::Prepend(entries) | LogUpdate::Replace(entries) => entries,
            LogUpdate::Unchanged | LogUpdate::Empty => &[],
        }
    }
}

/// 日志同步引擎
#[derive(Debug, Default)]
pub struct LogSyncEngine {
    seen: HashSet<LogKey>,
}

impl LogSyncEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// 合并一批日志（批内按时间先后，最新在最后）
    pub fn merge(&mut self, batch: Vec<LogEntry>, mode: MergeMode) -> LogUpdate {
        if batch.is_empty() {
            // 区分“没有新日志”和“根本没有日志”
            self.seen.clear();
            return LogUpdate::Empty;
        }

        match mode {
            MergeMode::Full => {
                self.seen = batch.iter().map(LogEntry::key).collect();
                let mut entries = batch;
                entries.reverse();
                LogUpdate::Replace(entries)
            }
            MergeMode::Incremental => {
                let mut fresh: Vec<LogEntry> = batch
                    .into_iter()
                    .filter(|entry| self.seen.insert(entry.key()))
                    .collect();

                if fresh.is_empty() {
                    return LogUpdate::Unchanged;
                }

                fresh.reverse();
                LogUpdate::Prepend(fresh)
            }
        }
    }

    pub fn seen_len(&self) -> usize {
        self.seen.len()
    }
}
