//! # 字形素材库模块
//!
//! ## 设计思路
//!
//! 素材库只需要回答两个问题：某个字符有哪些素材、如何把一份素材读成位图。
//! “目录不存在 / 目录为空”统一表现为 `lookup` 返回 `None`，由采样阶段按约定跳过，
//! 不再用异常或存在性判断驱动控制流。
//!
//! ## 实现思路
//!
//! - `DirGlyphStore`：磁盘目录 `root/{字符}/*.png`，文件名排序后返回，保证固定种子可复现。
//! - `MemoryGlyphStore`：内存素材池，便于测试与预加载场景。
//! - 为 `&S` 提供透传实现，多个并行 worker 可共享同一个素材库。

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use image::DynamicImage;

use super::SynthError;

/// 字形素材库抽象。
pub trait GlyphStore {
    /// 单份素材的句柄。
    type Asset;

    /// 查询某个字符的全部素材。
    ///
    /// 字符会被转换为大写；没有任何素材时返回 `Ok(None)`。
    fn lookup(&self, character: char) -> Result<Option<Vec<Self::Asset>>, SynthError>;

    /// 读取一份素材为位图（未裁剪）。
    fn load(&self, asset: &Self::Asset) -> Result<DynamicImage, SynthError>;
}

impl<S: GlyphStore + ?Sized> GlyphStore for &S {
    type Asset = S::Asset;

    fn lookup(&self, character: char) -> Result<Option<Vec<Self::Asset>>, SynthError> {
        (**self).lookup(character)
    }

    fn load(&self, asset: &Self::Asset) -> Result<DynamicImage, SynthError> {
        (**self).load(asset)
    }
}

/// 基于目录树的素材库：`root/{CHARACTER}/*.png`。
#[derive(Debug, Clone)]
pub struct DirGlyphStore {
    root: PathBuf,
}

impl DirGlyphStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 列出素材根目录下的所有字符子目录（大写单字符目录名）。
    pub fn available_characters(&self) -> Result<Vec<char>, SynthError> {
        let entries = fs::read_dir(&self.root).map_err(|e| {
            SynthError::FileSystem(format!("读取素材目录 '{}' 失败：{}", self.root.display(), e))
        })?;

        let mut characters: Vec<char> = entries
            .flatten()
            .filter(|entry| entry.path().is_dir())
            .filter_map(|entry| {
                let name = entry.file_name();
                let mut chars = name.to_str()?.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if c.is_ascii_uppercase() => Some(c),
                    _ => None,
                }
            })
            .collect();
        characters.sort_unstable();

        Ok(characters)
    }
}

impl GlyphStore for DirGlyphStore {
    type Asset = PathBuf;

    fn lookup(&self, character: char) -> Result<Option<Vec<PathBuf>>, SynthError> {
        let char_dir = self.root.join(character.to_ascii_uppercase().to_string());
        if !char_dir.is_dir() {
            return Ok(None);
        }

        let entries = fs::read_dir(&char_dir).map_err(|e| {
            SynthError::FileSystem(format!("读取字符目录 '{}' 失败：{}", char_dir.display(), e))
        })?;

        let mut assets: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "png"))
            .collect();

        if assets.is_empty() {
            return Ok(None);
        }

        // read_dir 的顺序依赖文件系统
        assets.sort();
        Ok(Some(assets))
    }

    fn load(&self, asset: &PathBuf) -> Result<DynamicImage, SynthError> {
        let bytes = fs::read(asset).map_err(|e| {
            SynthError::FileSystem(format!("读取素材 '{}' 失败：{}", asset.display(), e))
        })?;

        image::load_from_memory(&bytes).map_err(|e| {
            SynthError::Decode(format!("素材 '{}' 解码失败：{}", asset.display(), e))
        })
    }
}

/// 内存素材库。
#[derive(Debug, Clone, Default)]
pub struct MemoryGlyphStore {
    pool: BTreeMap<char, Vec<DynamicImage>>,
}

impl MemoryGlyphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 为字符追加一份素材。
    pub fn insert(&mut self, character: char, glyph: DynamicImage) {
        self.pool
            .entry(character.to_ascii_uppercase())
            .or_default()
            .push(glyph);
    }

    pub fn with_glyph(mut self, character: char, glyph: DynamicImage) -> Self {
        self.insert(character, glyph);
        self
    }
}

impl GlyphStore for MemoryGlyphStore {
    type Asset = DynamicImage;

    fn lookup(&self, character: char) -> Result<Option<Vec<DynamicImage>>, SynthError> {
        Ok(self
            .pool
            .get(&character.to_ascii_uppercase())
            .filter(|glyphs| !glyphs.is_empty())
            .cloned())
    }

    fn load(&self, asset: &DynamicImage) -> Result<DynamicImage, SynthError> {
        Ok(asset.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn blank_glyph() -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_pixel(4, 4, Luma([255])))
    }

    #[test]
    fn memory_store_normalizes_case() {
        let store = MemoryGlyphStore::new().with_glyph('a', blank_glyph());

        let found = store.lookup('A').expect("lookup should not fail");
        assert_eq!(found.map(|assets| assets.len()), Some(1));

        let lower = store.lookup('a').expect("lookup should not fail");
        assert!(lower.is_some());
    }

    #[test]
    fn memory_store_missing_character_is_none() {
        let store = MemoryGlyphStore::new().with_glyph('A', blank_glyph());
        assert!(store.lookup('B').expect("lookup should not fail").is_none());
    }

    #[test]
    fn dir_store_missing_root_character_is_none() {
        let store = DirGlyphStore::new(std::env::temp_dir().join("captcha-synth-no-such-root"));
        assert!(store.lookup('A').expect("lookup should not fail").is_none());
    }

    #[test]
    fn borrowed_store_forwards_lookup() {
        fn asset_count<S: GlyphStore>(store: S, character: char) -> usize {
            store
                .lookup(character)
                .expect("lookup should not fail")
                .map_or(0, |assets| assets.len())
        }

        let store = MemoryGlyphStore::new()
            .with_glyph('K', blank_glyph())
            .with_glyph('K', blank_glyph());
        assert_eq!(asset_count(&store, 'k'), 2);
        assert_eq!(asset_count(&store, 'Z'), 0);
    }
}
