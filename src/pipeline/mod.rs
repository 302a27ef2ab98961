//! # 流水线模块
//!
//! 单个文件从输入到输出的全部步骤。
//!
//! ## 功能
//! - 输出路径推导与输入校验 (`resolve`)
//! - 输出冲突检查 (`collision`)
//! - 有界字节管道 (`pipe`)
//! - 生产者 / 消费者流式处理 (`stream`)
//!
//! ## 依赖关系
//! - 被 `batch/job.rs` 使用
//! - 使用 `codec/`, `models/`

pub mod collision;
pub mod pipe;
pub mod resolve;
pub mod stream;

pub use collision::check_collision;
pub use resolve::{check_source, resolve_output, skip_reason};
pub use stream::{Mode, StreamError, StreamPipeline};
