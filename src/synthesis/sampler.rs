//! # 字符与字形采样模块
//!
//! ## 设计思路
//!
//! 采样阶段负责三件互相独立的事：
//! 1. 按字母表（去掉排除集）有放回地抽取标签字符
//! 2. 为每个字符抽取一个非纯白的随机颜色
//! 3. 从素材库为每个字符抽取字形，并裁剪到墨迹包围盒
//!
//! ## 实现思路
//!
//! 字形采样的输出携带其来源字符，缺失素材的字符会被整体跳过，
//! 调用方据此得到与图像严格对齐的标签序列，无需再按下标猜测对应关系。

use image::{DynamicImage, GrayImage, Rgb};
use rand::Rng;
use rand::seq::IndexedRandom;

use super::{GlyphStore, SynthError};

/// 墨迹包围盒，`right` / `bottom` 为开区间。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl BoundingBox {
    pub fn width(&self) -> u32 {
        self.right - self.left
    }

    pub fn height(&self) -> u32 {
        self.bottom - self.top
    }
}

/// 已裁剪的字形及其来源字符。
#[derive(Debug, Clone)]
pub struct SampledGlyph {
    pub character: char,
    pub bitmap: DynamicImage,
}

/// 字形采样器。
pub struct GlyphSampler<S> {
    store: S,
}

impl<S: GlyphStore> GlyphSampler<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// 有放回地抽取 `count` 个大写字母。
    ///
    /// `alphabet` 为空时返回空序列。
    pub fn sample_characters<R: Rng>(
        &self,
        rng: &mut R,
        count: usize,
        alphabet: &[char],
    ) -> Vec<char> {
        (0..count)
            .filter_map(|_| alphabet.choose(&mut *rng).copied())
            .collect()
    }

    /// 抽取 `count` 个随机颜色，纯白会被重新抽取。
    pub fn sample_colors<R: Rng>(&self, rng: &mut R, count: usize) -> Vec<Rgb<u8>> {
        (0..count)
            .map(|_| loop {
                let color = Rgb([rng.random::<u8>(), rng.random::<u8>(), rng.random::<u8>()]);
                if color != Rgb([255, 255, 255]) {
                    break color;
                }
            })
            .collect()
    }

    /// 为每个字符不放回地抽取 `k` 份素材并裁剪到墨迹包围盒。
    ///
    /// 没有素材的字符被跳过，因此返回长度可能小于 `characters.len() * k`，
    /// 顺序与输入字符的相对顺序一致。
    pub fn sample_glyphs<R: Rng>(
        &self,
        rng: &mut R,
        characters: &[char],
        k: usize,
    ) -> Result<Vec<SampledGlyph>, SynthError> {
        let mut sampled = Vec::with_capacity(characters.len() * k);

        for &character in characters {
            let character = character.to_ascii_uppercase();
            let Some(assets) = self.store.lookup(character)? else {
                log::warn!("⚠️ 字符 {} 没有可用素材，已跳过", character);
                continue;
            };

            for asset in assets.choose_multiple(&mut *rng, k.min(assets.len())) {
                let raw = self.store.load(asset)?;
                let bitmap = crop_to_stroke(&raw, character)?;
                sampled.push(SampledGlyph { character, bitmap });
            }
        }

        Ok(sampled)
    }
}

/// 计算灰度图中所有 `< 255` 像素的最小包围盒。
///
/// 没有任何墨迹像素时返回 `BlankGlyph`。
pub fn stroke_bounding_box(image: &GrayImage) -> Result<BoundingBox, SynthError> {
    let mut bounds: Option<BoundingBox> = None;

    for (x, y, pixel) in image.enumerate_pixels() {
        if pixel.0[0] == 255 {
            continue;
        }
        let b = bounds.get_or_insert(BoundingBox {
            left: x,
            top: y,
            right: x + 1,
            bottom: y + 1,
        });
        b.left = b.left.min(x);
        b.top = b.top.min(y);
        b.right = b.right.max(x + 1);
        b.bottom = b.bottom.max(y + 1);
    }

    bounds.ok_or_else(|| {
        SynthError::BlankGlyph(format!(
            "{}x{} 位图中没有墨迹像素",
            image.width(),
            image.height()
        ))
    })
}

/// 按墨迹包围盒裁剪原始素材。
///
/// 包围盒总在灰度视图上计算；非灰度素材保留原格式，由着色阶段报告格式错误。
fn crop_to_stroke(raw: &DynamicImage, character: char) -> Result<DynamicImage, SynthError> {
    let bbox = match raw {
        DynamicImage::ImageLuma8(gray) => stroke_bounding_box(gray),
        other => stroke_bounding_box(&other.to_luma8()),
    }
    .map_err(|e| match e {
        SynthError::BlankGlyph(msg) => SynthError::BlankGlyph(format!("字符 {}：{}", character, msg)),
        other => other,
    })?;

    Ok(raw.crop_imm(bbox.left, bbox.top, bbox.width(), bbox.height()))
}
