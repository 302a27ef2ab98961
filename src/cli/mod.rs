//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数。核心逻辑只消费解析后的 `Config`，
//! 不会重新解析参数。
//!
//! ## 参数分组
//! - 方向: `-z` / `-d` / `-t`
//! - 输出: `-c`, `-s`, `-f`, `-k`
//! - 遍历: `-r`
//! - 压缩等级: `-l N` 或 `-1` ... `-9`
//! - 并行度: `--cores`
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 由 `models/config.rs` 转换为不可变配置

use clap::{Args, Parser};
use std::path::PathBuf;

/// bzbatch - 批量 bzip2 压缩 / 解压工具
#[derive(Parser, Debug, Default)]
#[command(name = "bzbatch")]
#[command(version)]
#[command(
    about = "Compress or uncompress FILEs (by default, compress FILEs in-place)",
    long_about = None
)]
#[command(after_help = "With no FILE, or when FILE is -, read standard input.")]
pub struct Cli {
    /// Files or directories to process
    pub files: Vec<PathBuf>,

    /// Compress file(s) (default)
    #[arg(short = 'z', long, default_value_t = false)]
    pub compress: bool,

    /// Decompress; see also -c and -k
    #[arg(short, long, default_value_t = false)]
    pub decompress: bool,

    /// Test compressed file integrity
    #[arg(short, long, default_value_t = false)]
    pub test: bool,

    /// Write on standard output, keep original files unchanged
    #[arg(short = 'c', long, default_value_t = false)]
    pub stdout: bool,

    /// Use provided suffix on compressed files [default: bz2]
    #[arg(short, long)]
    pub suffix: Option<String>,

    /// Force overwrite of output file
    #[arg(short, long, default_value_t = false)]
    pub force: bool,

    /// Keep original files unchanged
    #[arg(short, long, default_value_t = false)]
    pub keep: bool,

    /// Descend into directories
    #[arg(short, long, default_value_t = false)]
    pub recursive: bool,

    /// Report compression ratio and per-file progress
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Compression level (1 = fastest, 9 = best)
    #[arg(short, long)]
    pub level: Option<u32>,

    #[command(flatten)]
    pub presets: LevelPresets,

    /// Number of files processed in parallel (0 = all cores)
    #[arg(long, env = "BZBATCH_CORES")]
    pub cores: Option<usize>,
}

/// `-1` ... `-9` 压缩等级快捷参数
#[derive(Args, Debug, Default)]
pub struct LevelPresets {
    /// Set block size to 100k
    #[arg(short = '1', long = "fast", default_value_t = false)]
    pub fast: bool,

    /// Set block size to 200k
    #[arg(short = '2', default_value_t = false)]
    pub level_2: bool,

    /// Set block size to 300k
    #[arg(short = '3', default_value_t = false)]
    pub level_3: bool,

    /// Set block size to 400k
    #[arg(short = '4', default_value_t = false)]
    pub level_4: bool,

    /// Set block size to 500k
    #[arg(short = '5', default_value_t = false)]
    pub level_5: bool,

    /// Set block size to 600k
    #[arg(short = '6', default_value_t = false)]
    pub level_6: bool,

    /// Set block size to 700k
    #[arg(short = '7', default_value_t = false)]
    pub level_7: bool,

    /// Set block size to 800k
    #[arg(short = '8', default_value_t = false)]
    pub level_8: bool,

    /// Set block size to 900k (default)
    #[arg(short = '9', long = "best", default_value_t = false)]
    pub best: bool,
}

impl LevelPresets {
    /// 返回被设置的最小快捷等级
    pub fn level(&self) -> Option<u32> {
        [
            self.fast,
            self.level_2,
            self.level_3,
            self.level_4,
            self.level_5,
            self.level_6,
            self.level_7,
            self.level_8,
            self.best,
        ]
        .iter()
        .position(|&set| set)
        .map(|i| i as u32 + 1)
    }
}
