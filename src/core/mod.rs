pub mod context;
pub mod log_sync;
pub mod polling;
pub mod state;
pub mod upload;
pub mod validation;

pub use context::SyncContext;
pub use log_sync::{LogSyncEngine, LogUpdate, MergeMode};
pub use polling::{PollingCoordinator, TimerKind};
pub use state::StateStore;
pub use upload::{BatchReport, BatchUploadWorkflow};
pub use validation::{validate_doc_id, validate_pending_path};
