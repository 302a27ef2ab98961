//! # 数据模型模块
//!
//! 定义运行配置、输入源和单文件处理结果。
//!
//! ## 依赖关系
//! - 被 `pipeline/`, `batch/` 和 `commands/` 使用
//! - 子模块: config, source, outcome

pub mod config;
pub mod outcome;
pub mod source;

pub use config::{Config, Destination, Direction};
pub use outcome::{ByteCounts, Outcome, Status};
pub use source::Source;
