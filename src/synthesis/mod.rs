//! # 验证码合成模块（synthesis）
//!
//! ## 设计思路
//!
//! 该模块将“字符采样 → 着色 → 画布排版 → 噪声叠加”按职责拆分为多个子模块，
//! 避免单文件膨胀与耦合。
//!
//! - `store`：素材库抽象，缺失素材以 `None` 表达
//! - `sampler`：标签字符、颜色、字形采样与墨迹包围盒裁剪
//! - `colorizer`：灰度字形 → 半透明 RGBA 图层
//! - `transform`：缩放、扩展旋转、alpha 蒙版贴图
//! - `compositor`：画布、字符排版与三层噪声
//! - `handler`：编排整条合成流水线
//! - `config/error`：配置与错误
//!
//! ## 新同事快速上手
//!
//! ```text
//! CaptchaSynthesizer::synthesize
//!    ├─ sampler.rs（字符 / 颜色 / 字形，缺素材跳过）
//!    ├─ colorizer.rs（逐字形着色）
//!    ├─ compositor.rs（建画布 + 排版截断）
//!    │    └─ transform.rs（缩放 / 旋转 / 贴图）
//!    └─ compositor.rs（像素 → 线 → 圆 噪声）
//!    ↓
//! Captcha { image, label }
//! ```
//!
//! ## 分层职责建议
//!
//! - 默认参数与取值校验优先改 `config.rs`
//! - 流程顺序变更优先改 `handler.rs`
//! - 单阶段行为分别改 `sampler/colorizer/compositor/transform`

mod colorizer;
mod compositor;
mod config;
mod error;
mod handler;
mod sampler;
mod store;
mod transform;

pub use colorizer::{DEFAULT_ALPHA_PERCENT, colorize};
pub use compositor::{Canvas, GlyphRegion, PlacementReport};
pub use config::{NoiseParams, PlacementParams, SynthesisConfig};
pub use error::SynthError;
pub use handler::{Captcha, CaptchaSynthesizer};
pub use sampler::{BoundingBox, GlyphSampler, SampledGlyph, stroke_bounding_box};
pub use store::{DirGlyphStore, GlyphStore, MemoryGlyphStore};
pub use transform::{TRANSPARENT_WHITE, paste_with_alpha_mask, rotate_expand, scale_layer};
