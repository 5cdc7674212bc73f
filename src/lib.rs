//! # 验证码训练集合成工具 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  命令行 (main.rs, clap)                   │
//! │        sample：单张验证码     dataset：批量训练集         │
//! └───────┬──────────────────────────────────────────────────┘
//!         ↓ Result<T, AppError>
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↓                                                  │
//! │  ┌─ error ────── AppError (统一错误类型)                  │
//! │  │                                                       │
//! │  ├─ dataset ──── rayon 并行 worker + labels.json          │
//! │  │                                                       │
//! │  └─ synthesis ── 单张验证码合成流水线                      │
//! │      ├─ store       字形素材库 (目录 / 内存)              │
//! │      ├─ sampler     字符·颜色·字形采样 + 墨迹裁剪          │
//! │      ├─ colorizer   灰度 → 半透明 RGBA                     │
//! │      ├─ compositor  画布排版 + 像素/线/圆噪声              │
//! │      └─ handler     CaptchaSynthesizer 编排               │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError`，批量生成与命令行的返回类型 |
//! | [`dataset`] | 多 worker 并行生成图片并汇总标签映射 |
//! | [`synthesis`] | 从字形素材合成 (图像, 标签) 对 |

pub mod dataset;
pub mod error;
pub mod synthesis;
