//! 命令输入校验
//!
//! 校验失败时不发出任何请求，也不修改状态。

use crate::error::{ClientError, ClientResult};
use regex::Regex;
use std::sync::LazyLock;

const MAX_DOC_ID_LENGTH: usize = 100;

static DOC_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("valid doc id pattern"));

/// 校验待上传路径，返回去掉首尾空白后的路径
pub fn validate_pending_path(path: &str) -> ClientResult<String> {
    let trimmed = path.trim();

    if trimmed.is_empty() {
        return Err(ClientError::Validation("文件路径不能为空".to_string()));
    }

    if trimmed.contains('\0') || trimmed.contains('\n') || trimmed.contains('\r') {
        return Err(ClientError::Validation("文件路径包含控制字符".to_string()));
    }

    Ok(trimmed.to_string())
}

/// 校验受保护文件的文档 ID
pub fn validate_doc_id(id: &str) -> ClientResult<()> {
    if id.is_empty() {
        return Err(ClientError::Validation("文档 ID 不能为空".to_string()));
    }

    if id.len() > MAX_DOC_ID_LENGTH {
        return Err(ClientError::Validation(format!(
            "文档 ID 过长 ({} > {})",
            id.len(),
            MAX_DOC_ID_LENGTH
        )));
    }

    if !DOC_ID_PATTERN.is_match(id) {
        return Err(ClientError::Validation("文档 ID 格式无效".to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_path_is_trimmed() {
        assert_eq!(
            validate_pending_path("  C:\\docs\\report.pdf ").unwrap(),
            "C:\\docs\\report.pdf"
        );
    }

    #[test]
    fn test_pending_path_rejects_blank_and_control_chars() {
        assert!(matches!(
            validate_pending_path("   "),
            Err(ClientError::Validation(_))
        ));
        assert!(validate_pending_path("a\nb").is_err());
        assert!(validate_pending_path("a\0b").is_err());
    }

    #[test]
    fn test_doc_id_rules() {
        assert!(validate_doc_id("a1B2_c-3").is_ok());
        assert!(validate_doc_id("").is_err());
        assert!(validate_doc_id("../etc").is_err());
        assert!(validate_doc_id(&"x".repeat(101)).is_err());
        assert!(validate_doc_id(&"x".repeat(100)).is_ok());
    }
}
