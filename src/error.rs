//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义应用级统一的 `AppError` 枚举，批量生成与命令行入口都返回它，
//! 替代分散的 `.map_err(|e| e.to_string())` 与 `expect()`。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为 `SynthError` 与 `std::io::Error` 提供 `From` 转换，无需手动 map。

use crate::synthesis::SynthError;

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 合成流水线错误（采样 / 着色 / 排版）
    #[error("{0}")]
    Synthesis(#[from] SynthError),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),

    /// 输出目录不可用
    #[error("存储目录不可用: {0}")]
    Storage(String),

    /// 图片或标签编码失败
    #[error("编码失败: {0}")]
    Encode(String),

    /// 并行 worker 创建或执行失败
    #[error("worker 错误: {0}")]
    Worker(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthesis_errors_convert_transparently() {
        let err: AppError = SynthError::BlankGlyph("A".to_string()).into();
        assert!(matches!(err, AppError::Synthesis(SynthError::BlankGlyph(_))));
        assert_eq!(
            err.to_string(),
            SynthError::BlankGlyph("A".to_string()).to_string()
        );
    }

    #[test]
    fn encode_error_names_the_failure() {
        let err = AppError::Encode("labels.json".to_string());
        assert_eq!(err.to_string(), "编码失败: labels.json");
    }
}
