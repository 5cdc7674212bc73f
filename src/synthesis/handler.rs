//! # 核心编排模块
//!
//! ## 设计思路
//!
//! `CaptchaSynthesizer` 只负责流程编排，不关心素材来自磁盘还是内存。
//! 处理链路固定为：
//! 1. 抽取字符数与标签字符
//! 2. 抽取字形（缺素材的字符被跳过）
//! 3. 按“跳过前”的字符数抽取颜色，再显式截断到字形数量
//! 4. 着色 → 建画布 → 排版（可能再次截断）
//! 5. 按固定顺序叠加噪声
//! 6. 标签截断到实际贴上的字符数
//!
//! ## 实现思路
//!
//! - 随机源由合成器独占，固定种子时整条链路可完全复现。
//! - 单次合成使用调用方给定的配置（或合成器默认配置），合成中途不读取外部状态。
//! - 记录 `sample/place/noise/total` 阶段耗时，便于批量生成时定位瓶颈。

use std::time::Instant;

use image::{Rgb, RgbaImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::colorizer::colorize;
use super::compositor::{Canvas, PlacementReport};
use super::sampler::GlyphSampler;
use super::{GlyphStore, SynthError, SynthesisConfig};

/// 单次合成的输出：画布图像与等长标签。
#[derive(Debug, Clone)]
pub struct Captcha {
    pub image: RgbaImage,
    pub label: Vec<char>,
}

impl Captcha {
    /// 标签拼接为字符串。
    pub fn label_string(&self) -> String {
        self.label.iter().collect()
    }
}

/// 验证码合成器。
pub struct CaptchaSynthesizer<S, R = StdRng> {
    sampler: GlyphSampler<S>,
    config: SynthesisConfig,
    rng: R,
}

impl<S: GlyphStore> CaptchaSynthesizer<S, StdRng> {
    /// 使用系统熵源创建合成器。
    ///
    /// # 示例
    /// ```rust,ignore
    /// use captcha_synth::synthesis::{CaptchaSynthesizer, DirGlyphStore, SynthesisConfig};
    ///
    /// let mut synth = CaptchaSynthesizer::new(DirGlyphStore::new("mnist_chars"), SynthesisConfig::default())?;
    /// let captcha = synth.synthesize()?;
    /// captcha.image.save("captcha.png")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(store: S, config: SynthesisConfig) -> Result<Self, SynthError> {
        Self::with_rng(store, config, StdRng::from_os_rng())
    }

    /// 使用固定种子创建合成器，相同种子与素材下输出逐字节一致。
    pub fn with_seed(store: S, config: SynthesisConfig, seed: u64) -> Result<Self, SynthError> {
        Self::with_rng(store, config, StdRng::seed_from_u64(seed))
    }
}

impl<S: GlyphStore, R: Rng> CaptchaSynthesizer<S, R> {
    pub fn with_rng(store: S, config: SynthesisConfig, rng: R) -> Result<Self, SynthError> {
        config.validate()?;
        Ok(Self {
            sampler: GlyphSampler::new(store),
            config,
            rng,
        })
    }

    pub fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    /// 按合成器默认配置生成一张验证码。
    pub fn synthesize(&mut self) -> Result<Captcha, SynthError> {
        let config = self.config.clone();
        self.run(&config)
    }

    /// 按单次覆盖的配置生成一张验证码。
    pub fn synthesize_with(&mut self, config: &SynthesisConfig) -> Result<Captcha, SynthError> {
        config.validate()?;
        self.run(config)
    }

    fn run(&mut self, config: &SynthesisConfig) -> Result<Captcha, SynthError> {
        let total_start = Instant::now();
        let rng = &mut self.rng;

        let sample_start = Instant::now();
        let num_chars = rng.random_range(config.num_char_range.0..=config.num_char_range.1);
        let alphabet = config.allowed_characters();
        let characters = self.sampler.sample_characters(rng, num_chars, &alphabet);
        let glyphs = self
            .sampler
            .sample_glyphs(rng, &characters, config.glyphs_per_character)?;

        // 颜色按跳过前的字符数抽取，随后截断到实际字形数
        let mut colors = self.sampler.sample_colors(rng, num_chars);
        colors.truncate(glyphs.len());
        let glyphs = &glyphs[..glyphs.len().min(colors.len())];

        let mut label = Vec::with_capacity(glyphs.len());
        let mut layers = Vec::with_capacity(glyphs.len());
        for (glyph, color) in glyphs.iter().zip(&colors) {
            layers.push(colorize(&glyph.bitmap, *color, config.alpha_percent)?);
            label.push(glyph.character);
        }
        let sample_elapsed = sample_start.elapsed();

        let place_start = Instant::now();
        let [r, g, b] = config.background_color;
        let canvas = Canvas::new(config.canvas_size, Rgb([r, g, b]), config.background_alpha)?;
        let (canvas, report): (Canvas, PlacementReport) =
            canvas.place_characters(rng, &layers, &config.placement_params());
        let place_elapsed = place_start.elapsed();

        let noise_start = Instant::now();
        let canvas = canvas.add_all_noise(rng, &config.noise_params());
        let noise_elapsed = noise_start.elapsed();

        label.truncate(report.placed);

        log::debug!(
            "✅ 验证码合成完成 - label={} sampled={} placed={} \
             sample={}ms place={}ms noise={}ms total={}ms",
            label.iter().collect::<String>(),
            num_chars,
            report.placed,
            sample_elapsed.as_millis(),
            place_elapsed.as_millis(),
            noise_elapsed.as_millis(),
            total_start.elapsed().as_millis()
        );

        Ok(Captcha {
            image: canvas.into_image(),
            label,
        })
    }
}
