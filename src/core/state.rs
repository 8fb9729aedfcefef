//! 仪表盘状态存储
//!
//! 持有待上传队列、受保护文件快照、系统状态和监控状态，不做任何 I/O。
//! 所有操作同步完成，重复或不存在的输入按空操作处理。

use crate::models::{MonitoringState, PendingFile, ProtectedFile, SystemStatus};

#[derive(Debug, Default, Clone)]
pub struct StateStore {
    pending: Vec<PendingFile>,
    protected: Vec<ProtectedFile>,
    status: SystemStatus,
    monitoring: MonitoringState,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 加入待上传队列，已存在时返回 false
    pub fn add_pending(&mut self, path: &str) -> bool {
        if self.pending.iter().any(|p| p == path) {
            return false;
        }
        self.pending.push(path.to_string());
        true
    }

    /// 移除第一个匹配项，不存在时返回 false
    pub fn remove_pending(&mut self, path: &str) -> bool {
        match self.pending.iter().position(|p| p == path) {
            Some(index) => {
                self.pending.remove(index);
                true
            }
            None => false,
        }
    }

    /// 批量移除（用于上传完成后的对账）
    pub fn remove_pending_all(&mut self, paths: &[PendingFile]) -> usize {
        let before = self.pending.len();
        self.pending.retain(|p| !paths.contains(p));
        before - self.pending.len()
    }

    pub fn clear_pending(&mut self) {
        self.pending.clear();
    }

    pub fn pending(&self) -> &[PendingFile] {
        &self.pending
    }

    /// 待上传队列的独立副本
    pub fn pending_snapshot(&self) -> Vec<PendingFile> {
        self.pending.clone()
    }

    pub fn set_protected(&mut self, files: Vec<ProtectedFile>) {
        self.protected = files;
    }

    pub fn protected(&self) -> &[ProtectedFile] {
        &self.protected
    }

    pub fn set_status(&mut self, status: SystemStatus) {
        self.status = status;
    }

    /// 服务器不可达：只把 server_online 置为 false
    pub fn mark_unreachable(&mut self) {
        self.status = self.status.unreachable();
    }

    pub fn status(&self) -> SystemStatus {
        self.status
    }

    pub fn set_monitoring(&mut self, monitoring: MonitoringState) {
        self.monitoring = monitoring;
    }

    pub fn monitoring(&self) -> MonitoringState {
        self.monitoring
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_pending_is_idempotent() {
        let mut store = StateStore::new();
        assert!(store.add_pending("a.txt"));
        assert!(store.add_pending("b.txt"));
        assert!(!store.add_pending("a.txt"));
        assert_eq!(store.pending(), ["a.txt", "b.txt"]);
    }

    #[test]
    fn test_remove_then_readd_moves_to_end() {
        let mut store = StateStore::new();
        store.add_pending("a");
        store.add_pending("b");
        store.add_pending("c");
        assert!(store.remove_pending("a"));
        assert!(!store.remove_pending("a"));
        store.add_pending("a");
        assert_eq!(store.pending(), ["b", "c", "a"]);
    }

    #[test]
    fn test_random_sequence_never_duplicates() {
        let mut store = StateStore::new();
        let ops = [
            ("add", "x"),
            ("add", "y"),
            ("add", "x"),
            ("remove", "y"),
            ("add", "z"),
            ("remove", "missing"),
            ("add", "y"),
            ("remove", "x"),
            ("add", "z"),
        ];
        for (op, path) in ops {
            if op == "add" {
                store.add_pending(path);
            } else {
                store.remove_pending(path);
            }
            let mut seen = std::collections::HashSet::new();
            assert!(store.pending().iter().all(|p| seen.insert(p.clone())));
        }
        assert_eq!(store.pending(), ["z", "y"]);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut store = StateStore::new();
        store.add_pending("a");
        let snapshot = store.pending_snapshot();
        store.add_pending("b");
        store.clear_pending();
        assert_eq!(snapshot, ["a"]);
        assert!(store.pending().is_empty());
    }

    #[test]
    fn test_remove_pending_all_leaves_others() {
        let mut store = StateStore::new();
        for p in ["a", "b", "c", "d"] {
            store.add_pending(p);
        }
        let removed = store.remove_pending_all(&["a".to_string(), "c".to_string(), "x".to_string()]);
        assert_eq!(removed, 2);
        assert_eq!(store.pending(), ["b", "d"]);
    }

    #[test]
    fn test_mark_unreachable() {
        let mut store = StateStore::new();
        store.set_status(SystemStatus {
            server_online: true,
            firebase_connected: true,
            encryption_ready: false,
        });
        store.mark_unreachable();
        assert_eq!(
            store.status(),
            SystemStatus {
                server_online: false,
                firebase_connected: true,
                encryption_ready: false,
            }
        );
    }
}
