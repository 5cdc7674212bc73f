//! # 配置模块
//!
//! ## 设计思路
//!
//! 将所有“可调策略”集中到 `SynthesisConfig`，保证每次合成的行为可观测、可调整、可测试。
//! 默认值与最初用于训练集生成的参数保持一致。
//!
//! ## 实现思路
//!
//! - `Default` 提供可直接用于生成训练集的配置。
//! - `validate` 在合成前集中做区间与取值校验，合成阶段不再重复判断。
//! - `from_json_file` 支持从 JSON 文件覆盖部分字段，缺省字段回落到默认值。
//! - `placement_params` / `noise_params` 将配置拆成画布合成阶段所需的参数视图。

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{DEFAULT_ALPHA_PERCENT, SynthError};

/// 验证码合成配置。
///
/// 字段覆盖了字符采样、着色、排版与噪声四个阶段。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    /// 每张验证码的字符数区间（闭区间）。
    pub num_char_range: (usize, usize),
    /// 不参与采样的字母（大小写不敏感）。
    pub exclude_chars: Vec<char>,
    /// 画布尺寸 `(width, height)`。
    pub canvas_size: (u32, u32),
    /// 画布背景色（RGB）。
    pub background_color: [u8; 3],
    /// 画布背景透明度。
    pub background_alpha: u8,
    /// 像素噪声密度：噪点数量 = `round(width * height * density)`。
    pub noise_density: f64,
    /// 干扰线数量区间（闭区间）。
    pub num_line_range: (u32, u32),
    /// 干扰圆数量区间（闭区间）。
    pub num_circle_range: (u32, u32),
    /// 干扰圆直径区间（闭区间）。
    pub circle_diameter_range: (u32, u32),
    /// 字符旋转角度区间（度，正值为逆时针）。
    pub rotate_range: (f32, f32),
    /// 字符缩放比例区间。
    pub scale_range: (f32, f32),
    /// 相邻字符的水平偏移区间，正值产生重叠，负值产生间隙。
    pub x_offset_range: (i32, i32),
    /// 干扰线与干扰圆的笔画宽度。
    pub brush_width: u32,
    /// 着色时墨迹透明度系数。
    pub alpha_percent: f64,
    /// 每个字符采样的字形数量（不放回）。
    pub glyphs_per_character: usize,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            num_char_range: (4, 5),
            exclude_chars: vec!['J', 'S', 'Q'],
            canvas_size: (160, 50),
            background_color: [255, 255, 255],
            background_alpha: 255,
            noise_density: 0.05,
            num_line_range: (3, 8),
            num_circle_range: (3, 8),
            circle_diameter_range: (5, 60),
            rotate_range: (-20.0, 20.0),
            scale_range: (0.9, 1.1),
            x_offset_range: (-15, 15),
            brush_width: 1,
            alpha_percent: DEFAULT_ALPHA_PERCENT,
            glyphs_per_character: 1,
        }
    }
}

/// 字符排版参数。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementParams {
    pub rotate_range: (f32, f32),
    pub scale_range: (f32, f32),
    pub x_offset_range: (i32, i32),
}

impl Default for PlacementParams {
    fn default() -> Self {
        SynthesisConfig::default().placement_params()
    }
}

/// 噪声叠加参数。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseParams {
    pub density: f64,
    pub line_range: (u32, u32),
    pub circle_range: (u32, u32),
    pub circle_diameter_range: (u32, u32),
    pub brush_width: u32,
}

impl NoiseParams {
    /// 不产生任何噪声的参数组合。
    pub fn none() -> Self {
        Self {
            density: 0.0,
            line_range: (0, 0),
            circle_range: (0, 0),
            circle_diameter_range: (0, 0),
            brush_width: 1,
        }
    }
}

impl Default for NoiseParams {
    fn default() -> Self {
        SynthesisConfig::default().noise_params()
    }
}

impl SynthesisConfig {
    /// 从 JSON 文件加载配置并校验。
    ///
    /// # 示例
    /// ```rust,ignore
    /// use captcha_synth::synthesis::SynthesisConfig;
    ///
    /// let config = SynthesisConfig::from_json_file("synth.json")?;
    /// # Ok::<(), captcha_synth::synthesis::SynthError>(())
    /// ```
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SynthError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            SynthError::FileSystem(format!("读取配置文件 '{}' 失败：{}", path.display(), e))
        })?;

        let config: Self = serde_json::from_str(&content)
            .map_err(|e| SynthError::InvalidConfig(format!("解析配置文件失败：{}", e)))?;
        config.validate()?;

        Ok(config)
    }

    /// 去除排除集后的可采样字母表（大写，按字母序）。
    pub fn allowed_characters(&self) -> Vec<char> {
        ('A'..='Z')
            .filter(|c| {
                !self
                    .exclude_chars
                    .iter()
                    .any(|excluded| excluded.to_ascii_uppercase() == *c)
            })
            .collect()
    }

    pub fn placement_params(&self) -> PlacementParams {
        PlacementParams {
            rotate_range: self.rotate_range,
            scale_range: self.scale_range,
            x_offset_range: self.x_offset_range,
        }
    }

    pub fn noise_params(&self) -> NoiseParams {
        NoiseParams {
            density: self.noise_density,
            line_range: self.num_line_range,
            circle_range: self.num_circle_range,
            circle_diameter_range: self.circle_diameter_range,
            brush_width: self.brush_width,
        }
    }

    /// 校验所有字段取值。
    ///
    /// 合成阶段依赖这里的保证：区间有序、画布非空、比例落在合法范围内。
    pub fn validate(&self) -> Result<(), SynthError> {
        check_range("num_char_range", self.num_char_range)?;
        check_range("num_line_range", self.num_line_range)?;
        check_range("num_circle_range", self.num_circle_range)?;
        check_range("circle_diameter_range", self.circle_diameter_range)?;
        check_range("x_offset_range", self.x_offset_range)?;
        check_float_range("rotate_range", self.rotate_range)?;
        check_float_range("scale_range", self.scale_range)?;

        if self.canvas_size.0 == 0 || self.canvas_size.1 == 0 {
            return Err(SynthError::InvalidConfig(format!(
                "canvas_size 不能为空：{}x{}",
                self.canvas_size.0, self.canvas_size.1
            )));
        }
        if self.scale_range.0 <= 0.0 {
            return Err(SynthError::InvalidConfig("scale_range 必须为正数".to_string()));
        }
        if !(0.0..=1.0).contains(&self.noise_density) {
            return Err(SynthError::InvalidConfig("noise_density 必须在 0~1 之间".to_string()));
        }
        if !(0.0..=1.0).contains(&self.alpha_percent) {
            return Err(SynthError::InvalidConfig("alpha_percent 必须在 0~1 之间".to_string()));
        }
        if self.brush_width == 0 {
            return Err(SynthError::InvalidConfig("brush_width 不能为 0".to_string()));
        }
        if self.glyphs_per_character == 0 {
            return Err(SynthError::InvalidConfig("glyphs_per_character 不能为 0".to_string()));
        }
        if self.allowed_characters().is_empty() {
            return Err(SynthError::InvalidConfig("exclude_chars 排除了全部字母".to_string()));
        }

        Ok(())
    }
}

fn check_range<T>(name: &str, range: (T, T)) -> Result<(), SynthError>
where
    T: PartialOrd + std::fmt::Debug,
{
    if range.0 > range.1 {
        return Err(SynthError::InvalidConfig(format!(
            "{} 下界不能大于上界：{:?}",
            name, range
        )));
    }
    Ok(())
}

fn check_float_range(name: &str, range: (f32, f32)) -> Result<(), SynthError> {
    if !range.0.is_finite() || !range.1.is_finite() {
        return Err(SynthError::InvalidConfig(format!("{} 必须为有限值：{:?}", name, range)));
    }
    check_range(name, range)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        SynthesisConfig::default()
            .validate()
            .expect("default config should be valid");
    }

    #[test]
    fn default_alpha_matches_colorizer_default() {
        assert_eq!(SynthesisConfig::default().alpha_percent, DEFAULT_ALPHA_PERCENT);
    }

    #[test]
    fn allowed_characters_skip_excluded_letters() {
        let config = SynthesisConfig {
            exclude_chars: vec!['j', 'S', 'Q'],
            ..SynthesisConfig::default()
        };
        let allowed = config.allowed_characters();

        assert_eq!(allowed.len(), 23);
        assert!(!allowed.contains(&'J'));
        assert!(!allowed.contains(&'S'));
        assert!(!allowed.contains(&'Q'));
        assert!(allowed.contains(&'A'));
    }

    #[test]
    fn rejects_unordered_ranges() {
        let config = SynthesisConfig {
            num_line_range: (8, 3),
            ..SynthesisConfig::default()
        };
        assert!(matches!(config.validate(), Err(SynthError::InvalidConfig(_))));

        let config = SynthesisConfig {
            rotate_range: (20.0, -20.0),
            ..SynthesisConfig::default()
        };
        assert!(matches!(config.validate(), Err(SynthError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_out_of_range_values() {
        let cases = [
            SynthesisConfig {
                canvas_size: (0, 50),
                ..SynthesisConfig::default()
            },
            SynthesisConfig {
                noise_density: 1.5,
                ..SynthesisConfig::default()
            },
            SynthesisConfig {
                alpha_percent: -0.1,
                ..SynthesisConfig::default()
            },
            SynthesisConfig {
                scale_range: (0.0, 1.0),
                ..SynthesisConfig::default()
            },
            SynthesisConfig {
                brush_width: 0,
                ..SynthesisConfig::default()
            },
            SynthesisConfig {
                exclude_chars: ('A'..='Z').collect(),
                ..SynthesisConfig::default()
            },
        ];

        for config in cases {
            assert!(
                matches!(config.validate(), Err(SynthError::InvalidConfig(_))),
                "config should be rejected: {:?}",
                config
            );
        }
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: SynthesisConfig =
            serde_json::from_str(r#"{ "num_char_range": [3, 3], "canvas_size": [200, 60] }"#)
                .expect("partial config should parse");

        assert_eq!(config.num_char_range, (3, 3));
        assert_eq!(config.canvas_size, (200, 60));
        assert_eq!(config.noise_density, 0.05);
        assert_eq!(config.exclude_chars, vec!['J', 'S', 'Q']);
    }

    #[test]
    fn noise_params_none_disables_every_layer() {
        let params = NoiseParams::none();
        assert_eq!(params.density, 0.0);
        assert_eq!(params.line_range, (0, 0));
        assert_eq!(params.circle_range, (0, 0));
    }
}
