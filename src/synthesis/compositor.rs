//! # 画布合成模块
//!
//! ## 设计思路
//!
//! `Canvas` 持有一张固定尺寸的 RGBA 画布，每个合成步骤都以值的形式接收画布并返回新状态，
//! 调用链上不存在“中途转换色彩模式”的分支：画布从创建起就是 RGBA。
//!
//! ## 实现思路
//!
//! - 排版：水平游标从 `[max/2, max*2]` 中随机起步，逐个字符缩放、旋转、纵向随机偏移后贴图，
//!   游标前进 `旋转后宽度 - 随机偏移`；放不下时截断剩余字符。
//! - 噪声：像素噪点 → 干扰线 → 干扰圆，顺序固定，后绘制的图层覆盖先绘制的。
//! - 所有随机性都来自调用方传入的 `Rng`，固定种子即可复现。

use image::{Rgb, Rgba, RgbaImage};
use imageproc::drawing::{draw_hollow_circle_mut, draw_line_segment_mut};
use rand::Rng;

use super::transform::{paste_with_alpha_mask, rotate_expand, scale_layer};
use super::{NoiseParams, PlacementParams, SynthError};

/// 一个已贴上画布的字符所占区域（旋转后外接矩形，坐标可越出画布）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphRegion {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

impl GlyphRegion {
    pub fn contains(&self, x: u32, y: u32) -> bool {
        let (x, y) = (i64::from(x), i64::from(y));
        x >= self.x
            && y >= self.y
            && x < self.x + i64::from(self.width)
            && y < self.y + i64::from(self.height)
    }
}

/// 排版结果：实际贴上的字符数与各自区域。
#[derive(Debug, Clone, Default)]
pub struct PlacementReport {
    pub placed: usize,
    pub regions: Vec<GlyphRegion>,
}

/// 固定尺寸的 RGBA 画布。
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    image: RgbaImage,
}

impl Canvas {
    /// 创建纯色背景画布。
    pub fn new(size: (u32, u32), background: Rgb<u8>, alpha: u8) -> Result<Self, SynthError> {
        let (width, height) = size;
        if width == 0 || height == 0 {
            return Err(SynthError::InvalidConfig(format!(
                "画布尺寸不能为空：{}x{}",
                width, height
            )));
        }

        let [r, g, b] = background.0;
        Ok(Self {
            image: RgbaImage::from_pixel(width, height, Rgba([r, g, b, alpha])),
        })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// 依次把着色后的字符贴到画布上。
    ///
    /// 起始游标取自 `[x_max / 2, x_max * 2]`（向下取整，端点乱序时自动交换）。
    /// 每贴完一个非末尾字符，若游标已越过 `画布宽度 - 当前字符宽度`，
    /// 剩余字符全部丢弃，`PlacementReport::placed` 即实际贴上的数量。
    pub fn place_characters<R: Rng>(
        mut self,
        rng: &mut R,
        glyphs: &[RgbaImage],
        params: &PlacementParams,
    ) -> (Self, PlacementReport) {
        let (canvas_width, canvas_height) = self.dimensions();
        let (offset_min, offset_max) = params.x_offset_range;

        // 起点区间不对称，沿用训练集一直使用的取值方式
        let start_a = i64::from(offset_max).div_euclid(2);
        let start_b = i64::from(offset_max) * 2;
        let mut x = rng.random_range(start_a.min(start_b)..=start_a.max(start_b));

        let mut report = PlacementReport {
            placed: glyphs.len(),
            regions: Vec::with_capacity(glyphs.len()),
        };

        for (i, glyph) in glyphs.iter().enumerate() {
            let scale = uniform(rng, params.scale_range);
            let resized = scale_layer(glyph, scale);

            let angle = uniform(rng, params.rotate_range);
            let rotated = rotate_expand(&resized, angle);
            let (rotated_width, rotated_height) = rotated.dimensions();

            let max_y = (i64::from(canvas_height) - i64::from(rotated_height)).max(1);
            let y = rng.random_range(0..=max_y);

            paste_with_alpha_mask(&mut self.image, &rotated, x, y);
            report.regions.push(GlyphRegion {
                x,
                y,
                width: rotated_width,
                height: rotated_height,
            });

            x += i64::from(rotated_width) - i64::from(rng.random_range(offset_min..=offset_max));

            let is_last = i + 1 == glyphs.len();
            if !is_last && x >= i64::from(canvas_width) - i64::from(rotated_width) {
                report.placed = i + 1;
                log::debug!(
                    "✂️ 画布宽度不足，截断字符：{} -> {}",
                    glyphs.len(),
                    report.placed
                );
                break;
            }
        }

        (self, report)
    }

    /// 随机覆盖 `round(width * height * density)` 个像素（有放回，可能重复命中）。
    pub fn add_pixel_noise<R: Rng>(mut self, rng: &mut R, density: f64) -> Self {
        let (width, height) = self.dimensions();
        let count = (f64::from(width) * f64::from(height) * density).round() as u64;

        for _ in 0..count {
            let x = rng.random_range(0..width);
            let y = rng.random_range(0..height);
            let color = random_opaque(rng);
            self.image.put_pixel(x, y, color);
        }

        self
    }

    /// 绘制随机数量的干扰线，端点在画布内均匀分布。
    pub fn add_line_noise<R: Rng>(
        mut self,
        rng: &mut R,
        count_range: (u32, u32),
        width: u32,
    ) -> Self {
        let (canvas_width, canvas_height) = self.dimensions();
        let count = rng.random_range(count_range.0..=count_range.1);

        for _ in 0..count {
            let x1 = rng.random_range(0..canvas_width);
            let y1 = rng.random_range(0..canvas_height);
            let x2 = rng.random_range(0..canvas_width);
            let y2 = rng.random_range(0..canvas_height);
            let color = random_opaque(rng);

            draw_thick_line(
                &mut self.image,
                (x1 as f32, y1 as f32),
                (x2 as f32, y2 as f32),
                width,
                color,
            );
        }

        self
    }

    /// 绘制随机数量的空心干扰圆，圆心可落在画布边缘上，圆周可越出画布。
    pub fn add_circle_noise<R: Rng>(
        mut self,
        rng: &mut R,
        count_range: (u32, u32),
        diameter_range: (u32, u32),
        width: u32,
    ) -> Self {
        let (canvas_width, canvas_height) = self.dimensions();
        let count = rng.random_range(count_range.0..=count_range.1);

        for _ in 0..count {
            let center_x = rng.random_range(0..=canvas_width) as i32;
            let center_y = rng.random_range(0..=canvas_height) as i32;
            let diameter = rng.random_range(diameter_range.0..=diameter_range.1);
            let color = random_opaque(rng);

            draw_ring(
                &mut self.image,
                (center_x, center_y),
                (diameter / 2) as i32,
                width,
                color,
            );
        }

        self
    }

    /// 按固定顺序叠加全部噪声：像素 → 线 → 圆。
    pub fn add_all_noise<R: Rng>(self, rng: &mut R, params: &NoiseParams) -> Self {
        self.add_pixel_noise(rng, params.density)
            .add_line_noise(rng, params.line_range, params.brush_width)
            .add_circle_noise(
                rng,
                params.circle_range,
                params.circle_diameter_range,
                params.brush_width,
            )
    }
}

fn uniform<R: Rng>(rng: &mut R, range: (f32, f32)) -> f32 {
    range.0 + (range.1 - range.0) * rng.random::<f32>()
}

fn random_opaque<R: Rng>(rng: &mut R) -> Rgba<u8> {
    Rgba([rng.random(), rng.random(), rng.random(), 255])
}

/// 宽度大于 1 时，沿法线方向以半像素步长铺设平行线段。
fn draw_thick_line(
    image: &mut RgbaImage,
    start: (f32, f32),
    end: (f32, f32),
    width: u32,
    color: Rgba<u8>,
) {
    let (dx, dy) = (end.0 - start.0, end.1 - start.1);
    let length = (dx * dx + dy * dy).sqrt();
    if width <= 1 || length == 0.0 {
        draw_line_segment_mut(image, start, end, color);
        return;
    }

    let (nx, ny) = (-dy / length, dx / length);
    let half = (width as f32 - 1.0) / 2.0;
    for step in 0..(2 * width - 1) {
        let offset = -half + step as f32 * 0.5;
        draw_line_segment_mut(
            image,
            (start.0 + nx * offset, start.1 + ny * offset),
            (end.0 + nx * offset, end.1 + ny * offset),
            color,
        );
    }
}

/// 圆环向内加粗。
fn draw_ring(image: &mut RgbaImage, center: (i32, i32), radius: i32, width: u32, color: Rgba<u8>) {
    for inset in 0..width as i32 {
        let r = radius - inset;
        if r < 0 {
            break;
        }
        draw_hollow_circle_mut(image, center, r, color);
    }
}
