//! # 编解码能力接口
//!
//! 流水线只通过 `Codec` trait 使用压缩算法，具体的块格式和校验
//! 由实现负责。
//!
//! ## 功能
//! - 压缩：包装字节输出端，完成后报告输入 / 输出字节数
//! - 解压：包装字节输入端，数据损坏时返回 `InvalidData` / `InvalidInput`
//!   / `UnexpectedEof` 类 I/O 错误
//!
//! ## 依赖关系
//! - 被 `pipeline/stream.rs` 使用
//! - 子模块: bzip2

pub mod bzip2;

pub use self::bzip2::Bzip2Codec;

use crate::models::ByteCounts;
use std::io::{self, Read, Write};

/// 流式压缩写入端
pub trait Encoder: Write + Send {
    /// 写出剩余数据和流尾，返回累计字节数
    fn finish(self: Box<Self>) -> io::Result<ByteCounts>;
}

/// 流式编解码能力
pub trait Codec: Send + Sync {
    /// 在 `sink` 之上创建压缩写入端
    fn encoder(&self, sink: Box<dyn Write + Send>, level: u32) -> Box<dyn Encoder>;

    /// 在 `source` 之上创建解压读取端
    fn decoder(&self, source: Box<dyn Read + Send>) -> Box<dyn Read + Send>;
}
