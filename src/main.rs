//! # bzbatch - 批量 bzip2 压缩 / 解压工具
//!
//! 将每个输入文件（或标准输入）经 bzip2 编解码器处理后写到派生的
//! 输出文件或标准输出，可选删除原文件。
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (配置构建与结果报告)
//!   │     └── batch/     (参数展开、单文件任务、并行执行)
//!   │           └── pipeline/  (路径推导、冲突检查、流式处理)
//!   │                 └── codec/     (bzip2 编解码)
//!   ├── models/     (配置与结果模型)
//!   ├── utils/      (输出与进度条)
//!   └── error.rs    (错误处理)
//! ```

mod batch;
mod cli;
mod codec;
mod commands;
mod error;
mod models;
mod pipeline;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    match commands::run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            utils::output::print_error(&e.detail());
            std::process::exit(1);
        }
    }
}
