pub mod config;
pub mod core;
pub mod dashboard;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod models;
pub mod presenter;

#[cfg(test)]
pub(crate) mod testing;

pub use config::ClientConfig;
pub use core::{BatchReport, LogUpdate, MergeMode, TimerKind};
pub use dashboard::Dashboard;
pub use error::{ClientError, ClientResult};
pub use gateway::{HttpGateway, RemoteGateway};
pub use models::{LogEntry, LogType, MonitoringState, PendingFile, ProtectedFile, SystemStatus};
pub use presenter::{NoticeLevel, Presenter, TracingPresenter};
