//! 客户端错误类型

use thiserror::Error;

/// 客户端统一错误
///
/// 远程调用、输入校验和命令互斥都归入这一种返回形态，
/// 调用方按变体决定是否提示用户。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// 网络不可达、超时或被限流，下一次轮询会自然重试
    #[error("无法连接服务器: {0}")]
    Transient(String),

    /// 服务器返回 success=false，message 为服务器原文
    #[error("{message}")]
    Rejected {
        message: String,
        code: Option<String>,
    },

    /// 输入不合法，未发出任何请求
    #[error("输入无效: {0}")]
    Validation(String),

    /// 同类命令正在执行
    #[error("操作正在进行中: {0}")]
    Busy(String),

    /// 响应格式不符或其他意外故障
    #[error("意外错误: {0}")]
    Unexpected(String),
}

impl ClientError {
    pub fn rejected(message: impl Into<String>, code: Option<String>) -> Self {
        ClientError::Rejected {
            message: message.into(),
            code,
        }
    }

    /// 是否属于可由下一次轮询恢复的临时错误
    pub fn is_transient(&self) -> bool {
        matches!(self, ClientError::Transient(_))
    }

    pub fn is_rejection(&self) -> bool {
        matches!(self, ClientError::Rejected { .. })
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
