//! # 命令执行模块
//!
//! 将解析后的命令行参数转换为配置，运行批处理并打印报告。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `models/`, `batch/`, `codec/`
//! - 子模块: report

pub mod report;

use crate::batch::BatchRunner;
use crate::cli::Cli;
use crate::codec::Bzip2Codec;
use crate::error::Result;
use crate::models::{Config, Source};

/// 执行批处理；返回是否所有文件都成功
///
/// 配置错误在任何文件被处理前返回 `Err`。
pub fn run(cli: Cli) -> Result<bool> {
    let config = Config::from_cli(&cli)?;
    let sources = Source::from_args(&cli.files);

    let runner = BatchRunner::new(&config, &Bzip2Codec, sources)?;
    let report = runner.run();

    report::print_report(&config, &report);
    Ok(report.is_success())
}
