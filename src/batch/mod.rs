//! # 批量处理模块
//!
//! 将命令行参数展开为文件任务并并行执行。
//!
//! ## 功能
//! - 参数展开：单文件 / 目录递归遍历 (`traversal`)
//! - 单文件状态机 (`job`)
//! - 并行执行与结果汇总 (`runner`)
//!
//! ## 依赖关系
//! - 被 `commands/` 使用
//! - 使用 `rayon` 进行并行处理
//! - 使用 `walkdir` 遍历目录

pub mod job;
pub mod runner;
pub mod traversal;

pub use runner::{BatchReport, BatchRunner};
