//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 使用单一错误枚举承载合成链路中的所有失败来源，避免字符串拼接式错误处理。
//! 通过 `thiserror` 保持人类可读错误，同时让调用侧可按分支匹配。
//!
//! 注意两类“非错误”情形不在此枚举中：
//! - 字符素材缺失：由 `GlyphStore::lookup` 返回 `None`，采样阶段直接跳过。
//! - 画布放不下剩余字符：属于排版截断，只记录日志并缩短标签。

/// 验证码合成统一错误类型。
///
/// 该类型会在批量生成层被上转为 `AppError`。
#[derive(Debug, thiserror::Error)]
pub enum SynthError {
    #[error("字形格式错误：{0}")]
    InvalidGlyphFormat(String),

    #[error("空白字形：{0}")]
    BlankGlyph(String),

    #[error("文件错误：{0}")]
    FileSystem(String),

    #[error("解码错误：{0}")]
    Decode(String),

    #[error("缩放错误：{0}")]
    Resize(String),

    #[error("配置错误：{0}")]
    InvalidConfig(String),
}

