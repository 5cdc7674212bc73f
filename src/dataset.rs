//! 训练集批量生成模块
//!
//! # 设计思路
//!
//! 多个 worker 各自持有独立的合成器与随机流，互不共享可变状态；
//! 唯一的汇总物是 `{文件名: 标签}` 映射，各 worker 写入的键互不相交，
//! 全部完成后一次性写出 `labels.json`。
//!
//! # 实现思路
//!
//! - 使用 `rayon` 线程池按 worker 数并行，每个 worker 顺序生成若干张。
//! - 指定种子时 worker `i` 使用 `seed + i`，整批输出可复现；否则各自取系统熵。
//! - 图片写入 `output/imgs/input_{worker}_{item}.png`，标签写入 `output/labels.json`。

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::error::AppError;
use crate::synthesis::{CaptchaSynthesizer, GlyphStore, SynthesisConfig};

/// 批量生成参数。
#[derive(Debug, Clone)]
pub struct DatasetOptions {
    /// 并行 worker 数。
    pub workers: usize,
    /// 每个 worker 生成的样本数。
    pub items_per_worker: usize,
    /// 输出根目录。
    pub output_dir: PathBuf,
    /// 基础随机种子。
    pub seed: Option<u64>,
}

impl Default for DatasetOptions {
    fn default() -> Self {
        Self {
            workers: 4,
            items_per_worker: 5,
            output_dir: PathBuf::from("train_set"),
            seed: None,
        }
    }
}

/// 批量生成结果。
#[derive(Debug, Clone)]
pub struct DatasetSummary {
    pub images_dir: PathBuf,
    pub labels_path: PathBuf,
    /// 文件名 → 标签。
    pub labels: BTreeMap<String, String>,
}

/// 并行生成训练集并写出标签映射。
///
/// # 示例
/// ```rust,ignore
/// use captcha_synth::dataset::{generate_dataset, DatasetOptions};
/// use captcha_synth::synthesis::{DirGlyphStore, SynthesisConfig};
///
/// let store = DirGlyphStore::new("mnist_chars");
/// let summary = generate_dataset(&store, &SynthesisConfig::default(), &DatasetOptions::default())?;
/// println!("{} 张", summary.labels.len());
/// # Ok::<(), captcha_synth::error::AppError>(())
/// ```
pub fn generate_dataset<S>(
    store: &S,
    config: &SynthesisConfig,
    options: &DatasetOptions,
) -> Result<DatasetSummary, AppError>
where
    S: GlyphStore + Sync,
{
    if options.workers == 0 {
        return Err(AppError::Worker("workers 不能为 0".to_string()));
    }
    config.validate()?;

    let images_dir = options.output_dir.join("imgs");
    fs::create_dir_all(&images_dir).map_err(|e| {
        AppError::Storage(format!("创建图片目录 '{}' 失败: {}", images_dir.display(), e))
    })?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.workers)
        .build()
        .map_err(|e| AppError::Worker(format!("创建线程池失败: {}", e)))?;

    let per_worker: Vec<Vec<(String, String)>> = pool.install(|| {
        (0..options.workers)
            .into_par_iter()
            .map(|worker_id| run_worker(store, config, options, worker_id, &images_dir))
            .collect::<Result<Vec<_>, AppError>>()
    })?;

    let labels: BTreeMap<String, String> = per_worker.into_iter().flatten().collect();

    let labels_path = options.output_dir.join("labels.json");
    let content = serde_json::to_string(&labels)
        .map_err(|e| AppError::Encode(format!("序列化标签失败: {}", e)))?;
    fs::write(&labels_path, content)?;

    log::info!(
        "✅ 训练集生成完成 - workers={} items={} labels={}",
        options.workers,
        labels.len(),
        labels_path.display()
    );

    Ok(DatasetSummary {
        images_dir,
        labels_path,
        labels,
    })
}

fn run_worker<S>(
    store: &S,
    config: &SynthesisConfig,
    options: &DatasetOptions,
    worker_id: usize,
    images_dir: &Path,
) -> Result<Vec<(String, String)>, AppError>
where
    S: GlyphStore + Sync,
{
    let mut synth = match options.seed {
        Some(seed) => {
            let worker_seed = seed.wrapping_add(worker_id as u64);
            CaptchaSynthesizer::with_seed(store, config.clone(), worker_seed)?
        }
        None => CaptchaSynthesizer::new(store, config.clone())?,
    };

    let mut entries = Vec::with_capacity(options.items_per_worker);
    for item in 0..options.items_per_worker {
        let captcha = synth.synthesize()?;

        let file_name = format!("input_{}_{}.png", worker_id, item);
        let file_path = images_dir.join(&file_name);
        captcha.image.save(&file_path).map_err(|e| {
            AppError::Encode(format!("保存图片 '{}' 失败: {}", file_path.display(), e))
        })?;

        entries.push((file_name, captcha.label_string()));
    }

    log::info!("worker {} 完成 {} 张", worker_id, entries.len());
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthesis::MemoryGlyphStore;

    #[test]
    fn zero_workers_is_rejected() {
        let options = DatasetOptions {
            workers: 0,
            ..DatasetOptions::default()
        };
        let store = MemoryGlyphStore::new();
        let result = generate_dataset(&store, &SynthesisConfig::default(), &options);
        assert!(matches!(result, Err(AppError::Worker(_))));
    }

    #[test]
    fn invalid_config_is_rejected_before_writing() {
        let output_dir = std::env::temp_dir().join(format!(
            "captcha-synth-invalid-{}",
            std::process::id()
        ));
        let options = DatasetOptions {
            output_dir: output_dir.clone(),
            ..DatasetOptions::default()
        };
        let config = SynthesisConfig {
            brush_width: 0,
            ..SynthesisConfig::default()
        };

        let result = generate_dataset(&MemoryGlyphStore::new(), &config, &options);
        assert!(matches!(result, Err(AppError::Synthesis(_))));
        assert!(!output_dir.exists());
    }
}
