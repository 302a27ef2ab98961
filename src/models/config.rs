//! # 运行配置
//!
//! 由命令行参数一次性构建的不可变配置，在整个批处理期间只读共享。
//!
//! ## 依赖关系
//! - 由 `cli/` 的 `Cli` 构建
//! - 被 `pipeline/` 和 `batch/` 使用

use crate::cli::Cli;
use crate::error::{BzError, Result};
use crate::models::source::Source;

/// 默认后缀
pub const DEFAULT_SUFFIX: &str = "bz2";

/// 默认压缩等级（900k 块）
pub const DEFAULT_LEVEL: u32 = 9;

/// `--cores` 允许的最大值
pub const MAX_CORES: usize = 32;

/// 处理方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// 压缩
    Compress,
    /// 解压
    Decompress,
    /// 解压并丢弃，仅校验完整性
    Test,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Compress => write!(f, "compress"),
            Direction::Decompress => write!(f, "decompress"),
            Direction::Test => write!(f, "test"),
        }
    }
}

/// 输出目标
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    /// 写到标准输出
    Stdout,
    /// 根据后缀推导输出文件路径
    DerivedFile,
}

/// 不可变运行配置
#[derive(Debug, Clone)]
pub struct Config {
    pub direction: Direction,
    pub destination: Destination,
    pub suffix: String,
    pub force: bool,
    pub keep: bool,
    pub recursive: bool,
    pub verbose: bool,
    /// 压缩等级 1-9
    pub level: u32,
    /// 并行处理的顶层参数数量
    pub jobs: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            direction: Direction::Compress,
            destination: Destination::DerivedFile,
            suffix: DEFAULT_SUFFIX.to_string(),
            force: false,
            keep: false,
            recursive: false,
            verbose: false,
            level: DEFAULT_LEVEL,
            jobs: 1,
        }
    }
}

impl Config {
    /// 从命令行参数构建并校验配置
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let direction = if cli.test {
            Direction::Test
        } else if cli.decompress {
            Direction::Decompress
        } else {
            Direction::Compress
        };

        let level = cli.level.or_else(|| cli.presets.level()).unwrap_or(DEFAULT_LEVEL);
        if !(1..=9).contains(&level) {
            return Err(invalid("invalid compression level: must be between 1 and 9"));
        }

        let jobs = match cli.cores {
            None | Some(0) => num_cpus::get(),
            Some(n) if n <= MAX_CORES => n,
            Some(_) => return Err(invalid("invalid number of cores: must be between 1 and 32")),
        };

        if cli.stdout {
            if cli.suffix.is_some() {
                return Err(invalid("stdout set, suffix not used"));
            }
            if cli.force {
                return Err(invalid("stdout set, force not used"));
            }
            if cli.keep {
                return Err(invalid("stdout set, keep is redundant"));
            }
        }

        let reads_stdin = Source::from_args(&cli.files).contains(&Source::Stdin);
        if reads_stdin && cli.suffix.is_some() {
            return Err(invalid("reading from stdin, suffix not needed"));
        }

        let destination = if cli.stdout {
            Destination::Stdout
        } else {
            Destination::DerivedFile
        };

        let suffix = cli
            .suffix
            .clone()
            .unwrap_or_else(|| DEFAULT_SUFFIX.to_string());
        if destination == Destination::DerivedFile && direction != Direction::Test && suffix.is_empty()
        {
            return Err(invalid("suffix can't be an empty string"));
        }

        Ok(Config {
            direction,
            destination,
            suffix,
            force: cli.force,
            keep: cli.keep,
            recursive: cli.recursive,
            verbose: cli.verbose,
            level,
            jobs,
        })
    }

    /// 是否会在成功后删除源文件
    pub fn removes_source(&self) -> bool {
        self.destination == Destination::DerivedFile
            && self.direction != Direction::Test
            && !self.keep
    }
}

fn invalid(msg: &str) -> BzError {
    BzError::InvalidConfiguration(msg.to_string())
}
