//! # 验证码训练集合成工具 — 命令行入口
//!
//! 本文件仅负责日志初始化、参数解析与子命令分发。
//! 合成逻辑分布在各子模块中，详见 `lib.rs` 架构文档。
//!
//! ```bash
//! captcha-synth sample --glyphs mnist_chars --output captcha.png --seed 12
//! captcha-synth dataset --glyphs mnist_chars --output train_set --workers 4 --per-worker 5
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use captcha_synth::dataset::{DatasetOptions, generate_dataset};
use captcha_synth::error::AppError;
use captcha_synth::synthesis::{CaptchaSynthesizer, DirGlyphStore, SynthesisConfig};

#[derive(Parser)]
#[command(name = "captcha-synth")]
#[command(about = "Synthesize labeled captcha images from handwritten glyph pools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a single captcha and print its label.
    Sample(SampleArgs),
    /// Render a training set with parallel workers and write labels.json.
    Dataset(DatasetArgs),
}

#[derive(Args)]
struct CommonArgs {
    /// Glyph pool root containing one directory per uppercase character.
    #[arg(long, default_value = "mnist_chars")]
    glyphs: PathBuf,

    /// JSON file overriding synthesis defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed; omit for OS entropy.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args)]
struct SampleArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Output PNG path.
    #[arg(long, default_value = "captcha.png")]
    output: PathBuf,
}

#[derive(Args)]
struct DatasetArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Output directory; images go to `imgs/`, labels to `labels.json`.
    #[arg(long, default_value = "train_set")]
    output: PathBuf,

    /// Number of parallel workers.
    #[arg(long, default_value_t = 4)]
    workers: usize,

    /// Captchas generated by each worker.
    #[arg(long, default_value_t = 5)]
    per_worker: usize,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Sample(args) => run_sample(args),
        Command::Dataset(args) => run_dataset(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(common: &CommonArgs) -> Result<SynthesisConfig, AppError> {
    match &common.config {
        Some(path) => Ok(SynthesisConfig::from_json_file(path)?),
        None => Ok(SynthesisConfig::default()),
    }
}

fn run_sample(args: SampleArgs) -> Result<(), AppError> {
    let config = load_config(&args.common)?;
    let store = DirGlyphStore::new(&args.common.glyphs);

    let mut synth = match args.common.seed {
        Some(seed) => CaptchaSynthesizer::with_seed(store, config, seed)?,
        None => CaptchaSynthesizer::new(store, config)?,
    };

    let captcha = synth.synthesize()?;
    captcha.image.save(&args.output).map_err(|e| {
        AppError::Encode(format!("保存图片 '{}' 失败: {}", args.output.display(), e))
    })?;

    log::info!("已写出 {}", args.output.display());
    println!("{}", captcha.label_string());
    Ok(())
}

fn run_dataset(args: DatasetArgs) -> Result<(), AppError> {
    let config = load_config(&args.common)?;
    let store = DirGlyphStore::new(&args.common.glyphs);

    let available = store.available_characters()?;
    log::info!(
        "素材库 {} 共 {} 个字符目录",
        store.root().display(),
        available.len()
    );

    let options = DatasetOptions {
        workers: args.workers,
        items_per_worker: args.per_worker,
        output_dir: args.output,
        seed: args.common.seed,
    };

    let summary = generate_dataset(&store, &config, &options)?;
    println!(
        "{} images in {}, labels in {}",
        summary.labels.len(),
        summary.images_dir.display(),
        summary.labels_path.display()
    );
    Ok(())
}
