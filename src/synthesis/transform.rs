//! # 几何变换模块
//!
//! ## 设计思路
//!
//! 字符排版需要三种基础变换：缩放、带扩展的旋转、按 alpha 蒙版贴图。
//! 它们都是 `RgbaImage -> RgbaImage` 的纯函数，画布合成阶段只负责随机参数与游标。
//!
//! ## 实现思路
//!
//! 1. 缩放优先走 `fast_image_resize`（Lanczos3 卷积），失败时回退 `image::imageops::resize`
//! 2. 旋转先扩展到能容纳旋转后内容的尺寸，再用 `imageproc` 绕中心旋转，空白处填透明白
//! 3. 贴图按字形自身 alpha 逐通道混合，超出画布的部分直接裁掉

use fast_image_resize as fr;
use image::imageops::FilterType;
use image::{Rgba, RgbaImage};
use imageproc::geometric_transformations::{Interpolation, rotate_about_center};

use super::SynthError;

/// 旋转后新增区域的填充色：透明白。
pub const TRANSPARENT_WHITE: Rgba<u8> = Rgba([255, 255, 255, 0]);

/// 按比例缩放图层，目标尺寸取整后至少为 1x1。
pub fn scale_layer(layer: &RgbaImage, scale: f32) -> RgbaImage {
    let (width, height) = layer.dimensions();
    let target_width = ((width as f32 * scale) as u32).max(1);
    let target_height = ((height as f32 * scale) as u32).max(1);

    if (target_width, target_height) == (width, height) {
        return layer.clone();
    }

    match resize_with_fast_image_resize(layer, target_width, target_height) {
        Ok(resized) => resized,
        Err(err) => {
            log::warn!("⚠️ fast_image_resize 缩放失败，回退 image::imageops::resize：{}", err);
            image::imageops::resize(layer, target_width, target_height, FilterType::Lanczos3)
        }
    }
}

fn resize_with_fast_image_resize(
    layer: &RgbaImage,
    target_width: u32,
    target_height: u32,
) -> Result<RgbaImage, SynthError> {
    let (src_width, src_height) = layer.dimensions();

    let src_image = fr::images::Image::from_vec_u8(
        src_width,
        src_height,
        layer.as_raw().clone(),
        fr::PixelType::U8x4,
    )
    .map_err(|e| SynthError::Resize(format!("构建源图像缓冲失败：{}", e)))?;

    let mut dst_image = fr::images::Image::new(target_width, target_height, fr::PixelType::U8x4);

    let mut resizer = fr::Resizer::new();
    let options = fr::ResizeOptions::new()
        .resize_alg(fr::ResizeAlg::Convolution(fr::FilterType::Lanczos3));

    resizer
        .resize(&src_image, &mut dst_image, Some(&options))
        .map_err(|e| SynthError::Resize(format!("fast_image_resize 执行失败：{}", e)))?;

    RgbaImage::from_raw(target_width, target_height, dst_image.into_vec())
        .ok_or_else(|| SynthError::Resize("fast_image_resize 输出缓冲长度异常".to_string()))
}

/// 旋转后能完整容纳内容的尺寸。
fn expanded_size(width: u32, height: u32, angle_deg: f32) -> (u32, u32) {
    let (sin, cos) = angle_deg.to_radians().sin_cos();
    let (sin, cos) = (sin.abs() as f64, cos.abs() as f64);
    let (w, h) = (width as f64, height as f64);

    // 吸收浮点误差，避免整数尺寸被多进一位；误差随边长增长
    let tolerance = 1e-6 * (w + h).max(1.0);
    let extent = |v: f64| ((v - tolerance).ceil() as u32).max(1);
    (extent(w * cos + h * sin), extent(w * sin + h * cos))
}

/// 逆时针旋转 `angle_deg` 度并扩展画幅，内容不被裁切。
pub fn rotate_expand(layer: &RgbaImage, angle_deg: f32) -> RgbaImage {
    if angle_deg.rem_euclid(360.0) == 0.0 {
        return layer.clone();
    }

    let (width, height) = layer.dimensions();
    let (out_width, out_height) = expanded_size(width, height, angle_deg);

    // 旋转前的工作区必须同时容纳原图与结果
    let work_width = width.max(out_width);
    let work_height = height.max(out_height);
    let mut work = RgbaImage::from_pixel(work_width, work_height, TRANSPARENT_WHITE);
    image::imageops::replace(
        &mut work,
        layer,
        i64::from((work_width - width) / 2),
        i64::from((work_height - height) / 2),
    );

    // imageproc 以顺时针为正
    let rotated = rotate_about_center(
        &work,
        -angle_deg.to_radians(),
        Interpolation::Nearest,
        TRANSPARENT_WHITE,
    );

    if (work_width, work_height) == (out_width, out_height) {
        return rotated;
    }

    image::imageops::crop_imm(
        &rotated,
        (work_width - out_width) / 2,
        (work_height - out_height) / 2,
        out_width,
        out_height,
    )
    .to_image()
}

/// 以 `layer` 自身 alpha 作为蒙版贴到画布 `(x, y)` 处。
///
/// 四个通道都按 `dst * (255 - a) + src * a` 混合并四舍五入除以 255。
/// 允许负坐标，越界部分被裁掉。
pub fn paste_with_alpha_mask(canvas: &mut RgbaImage, layer: &RgbaImage, x: i64, y: i64) {
    let (canvas_width, canvas_height) = canvas.dimensions();

    for (lx, ly, src) in layer.enumerate_pixels() {
        let mask = src.0[3];
        if mask == 0 {
            continue;
        }

        let cx = x + i64::from(lx);
        let cy = y + i64::from(ly);
        if cx < 0 || cy < 0 || cx >= i64::from(canvas_width) || cy >= i64::from(canvas_height) {
            continue;
        }

        let dst = canvas.get_pixel_mut(cx as u32, cy as u32);
        for channel in 0..4 {
            dst.0[channel] = blend_channel(dst.0[channel], src.0[channel], mask);
        }
    }
}

fn blend_channel(dst: u8, src: u8, mask: u8) -> u8 {
    let mask = u32::from(mask);
    let value = u32::from(dst) * (255 - mask) + u32::from(src) * mask + 128;
    (((value >> 8) + value) >> 8) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, pixel: Rgba<u8>) -> RgbaImage {
        RgbaImage::from_pixel(width, height, pixel)
    }

    #[test]
    fn scale_layer_rounds_down_and_keeps_minimum() {
        let layer = solid(20, 10, Rgba([0, 0, 0, 255]));

        assert_eq!(scale_layer(&layer, 1.5).dimensions(), (30, 15));
        assert_eq!(scale_layer(&layer, 0.5).dimensions(), (10, 5));
        assert_eq!(scale_layer(&layer, 0.01).dimensions(), (1, 1));
    }

    #[test]
    fn scale_layer_identity_is_exact_copy() {
        let layer = RgbaImage::from_fn(5, 7, |x, y| Rgba([x as u8, y as u8, 9, 200]));
        assert_eq!(scale_layer(&layer, 1.0), layer);
    }

    #[test]
    fn rotate_zero_keeps_image() {
        let layer = RgbaImage::from_fn(6, 4, |x, y| Rgba([x as u8, y as u8, 0, 255]));
        assert_eq!(rotate_expand(&layer, 0.0), layer);
    }

    #[test]
    fn rotate_quarter_turn_swaps_dimensions() {
        let layer = solid(20, 8, Rgba([10, 10, 10, 255]));
        assert_eq!(rotate_expand(&layer, 90.0).dimensions(), (8, 20));
        assert_eq!(rotate_expand(&layer, -90.0).dimensions(), (8, 20));
    }

    #[test]
    fn quarter_turn_of_long_strip_keeps_exact_extent() {
        for width in [100, 200, 500, 2000] {
            let layer = solid(width, 8, Rgba([10, 10, 10, 255]));
            assert_eq!(expanded_size(width, 8, 90.0), (8, width));
            assert_eq!(rotate_expand(&layer, 90.0).dimensions(), (8, width));
        }
    }

    #[test]
    fn rotate_expands_to_fit_corners() {
        let layer = solid(20, 20, Rgba([10, 10, 10, 255]));
        let rotated = rotate_expand(&layer, 45.0);

        // 20 * (cos45 + sin45) ≈ 28.28
        assert_eq!(rotated.dimensions(), (29, 29));
        assert_eq!(rotated.get_pixel(0, 0).0, TRANSPARENT_WHITE.0);
        assert_eq!(rotated.get_pixel(14, 14).0, [10, 10, 10, 255]);
    }

    #[test]
    fn rotate_thin_bar_shrinks_width() {
        let layer = solid(40, 2, Rgba([0, 0, 0, 255]));
        let (w, h) = rotate_expand(&layer, 60.0).dimensions();
        assert!(w < 40);
        assert!(h > 2);
    }

    #[test]
    fn paste_transparent_layer_is_noop() {
        let mut canvas = solid(10, 10, Rgba([255, 255, 255, 200]));
        let before = canvas.clone();
        paste_with_alpha_mask(&mut canvas, &solid(4, 4, Rgba([0, 0, 0, 0])), 2, 2);
        assert_eq!(canvas, before);
    }

    #[test]
    fn paste_opaque_layer_overwrites() {
        let mut canvas = solid(10, 10, Rgba([255, 255, 255, 255]));
        paste_with_alpha_mask(&mut canvas, &solid(2, 2, Rgba([1, 2, 3, 255])), 3, 4);

        assert_eq!(canvas.get_pixel(3, 4).0, [1, 2, 3, 255]);
        assert_eq!(canvas.get_pixel(4, 5).0, [1, 2, 3, 255]);
        assert_eq!(canvas.get_pixel(5, 5).0, [255, 255, 255, 255]);
    }

    #[test]
    fn paste_blends_by_mask() {
        let mut canvas = solid(1, 1, Rgba([255, 255, 255, 255]));
        paste_with_alpha_mask(&mut canvas, &solid(1, 1, Rgba([0, 0, 0, 128])), 0, 0);

        // 255 * 127 / 255 ≈ 127，alpha 通道 255*127 + 128*128 ≈ 191
        assert_eq!(canvas.get_pixel(0, 0).0, [127, 127, 127, 191]);
    }

    #[test]
    fn paste_clips_outside_canvas() {
        let mut canvas = solid(4, 4, Rgba([255, 255, 255, 255]));
        paste_with_alpha_mask(&mut canvas, &solid(3, 3, Rgba([0, 0, 0, 255])), -2, 3);

        assert_eq!(canvas.dimensions(), (4, 4));
        assert_eq!(canvas.get_pixel(0, 3).0, [0, 0, 0, 255]);
        assert_eq!(canvas.get_pixel(1, 3).0, [255, 255, 255, 255]);
        assert_eq!(canvas.get_pixel(0, 2).0, [255, 255, 255, 255]);
    }
}
