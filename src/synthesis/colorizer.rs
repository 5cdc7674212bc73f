//! # 着色模块
//!
//! 把单通道灰度字形转换为半透明 RGBA 图层：颜色决定色相，
//! 笔画深浅决定不透明度，纯白背景完全透明。

use image::{DynamicImage, Rgb, Rgba, RgbaImage};

use super::SynthError;

/// 默认墨迹透明度系数。
pub const DEFAULT_ALPHA_PERCENT: f64 = 0.65;

/// 将灰度字形着色为 RGBA 图层。
///
/// `alpha = (255 - gray) * alpha_percent`，截断取整。
/// 非 `Luma8` 输入返回 `InvalidGlyphFormat`。
///
/// # 示例
/// ```rust,ignore
/// use captcha_synth::synthesis::colorize;
/// use image::{DynamicImage, GrayImage, Luma, Rgb};
///
/// let glyph = DynamicImage::ImageLuma8(GrayImage::from_pixel(2, 2, Luma([0])));
/// let layer = colorize(&glyph, Rgb([200, 10, 10]), 0.65)?;
/// assert_eq!(layer.get_pixel(0, 0).0, [200, 10, 10, 165]);
/// # Ok::<(), captcha_synth::synthesis::SynthError>(())
/// ```
pub fn colorize(
    glyph: &DynamicImage,
    color: Rgb<u8>,
    alpha_percent: f64,
) -> Result<RgbaImage, SynthError> {
    let DynamicImage::ImageLuma8(gray) = glyph else {
        return Err(SynthError::InvalidGlyphFormat(format!(
            "着色需要单通道灰度图，实际为 {:?}",
            glyph.color()
        )));
    };

    let [r, g, b] = color.0;
    Ok(RgbaImage::from_fn(gray.width(), gray.height(), |x, y| {
        let ink = 255 - gray.get_pixel(x, y).0[0];
        let alpha = (f64::from(ink) * alpha_percent) as u8;
        Rgba([r, g, b, alpha])
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, RgbImage};

    fn gradient_glyph() -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_fn(16, 8, |x, y| Luma([(x * 16 + y) as u8])))
    }

    #[test]
    fn alpha_tracks_stroke_darkness() {
        let mut gray = GrayImage::from_pixel(3, 1, Luma([255]));
        gray.put_pixel(0, 0, Luma([0]));
        gray.put_pixel(1, 0, Luma([155]));

        let glyph = DynamicImage::ImageLuma8(gray);
        let layer = colorize(&glyph, Rgb([10, 20, 30]), DEFAULT_ALPHA_PERCENT)
            .expect("gray glyph colorizes");

        assert_eq!(layer.get_pixel(0, 0).0, [10, 20, 30, 165]);
        assert_eq!(layer.get_pixel(1, 0).0, [10, 20, 30, 65]);
        assert_eq!(layer.get_pixel(2, 0).0, [10, 20, 30, 0]);
    }

    #[test]
    fn full_alpha_percent_keeps_full_ink() {
        let gray = GrayImage::from_pixel(1, 1, Luma([0]));
        let layer = colorize(&DynamicImage::ImageLuma8(gray), Rgb([1, 2, 3]), 1.0)
            .expect("gray glyph colorizes");
        assert_eq!(layer.get_pixel(0, 0).0[3], 255);
    }

    #[test]
    fn rejects_non_gray_input() {
        let rgb = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([0, 0, 0])));
        let result = colorize(&rgb, Rgb([0, 0, 0]), DEFAULT_ALPHA_PERCENT);
        assert!(matches!(result, Err(SynthError::InvalidGlyphFormat(_))));
    }

    #[test]
    fn colorize_is_pure() {
        let glyph = gradient_glyph();
        let first = colorize(&glyph, Rgb([90, 180, 45]), 0.5).expect("colorizes");
        let second = colorize(&glyph, Rgb([90, 180, 45]), 0.5).expect("colorizes");

        assert_eq!(first.dimensions(), (16, 8));
        assert_eq!(first.into_raw(), second.into_raw());
    }
}
