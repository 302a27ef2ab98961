//! # 流式处理流水线
//!
//! 将一个字节输入端经编解码器连接到一个字节输出端。生产者在独立线程上
//! 读取输入（压缩方向同时编码），消费者在调用线程上读取管道（解码方向
//! 同时解码）并写入输出端。两者通过有界管道交接，互相形成背压。
//!
//! ## 错误语义
//! - 生产者失败时以错误关闭管道，消费者读到该错误
//! - 消费者失败时其错误为最终结果；否则采用生产者的错误
//!
//! ## 依赖关系
//! - 使用 `codec/` 的 `Codec` trait
//! - 使用 `pipeline/pipe.rs`
//! - 被 `batch/job.rs` 调用

use super::pipe::{self, PipeReader, PipeWriter, CHUNK_SIZE};
use crate::codec::Codec;
use crate::models::{ByteCounts, Direction};

use std::io::{self, Read, Write};
use std::thread;

/// 编解码模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// 压缩
    Encode { level: u32 },
    /// 解压
    Decode,
    /// 解压并丢弃输出
    Verify,
}

impl Mode {
    pub fn for_direction(direction: Direction, level: u32) -> Self {
        match direction {
            Direction::Compress => Mode::Encode { level },
            Direction::Decompress => Mode::Decode,
            Direction::Test => Mode::Verify,
        }
    }

    fn decodes(self) -> bool {
        !matches!(self, Mode::Encode { .. })
    }
}

/// 流水线错误，区分输入侧与输出侧
#[derive(Debug)]
pub enum StreamError {
    /// 读取输入、编码或解码失败
    Source(io::Error),
    /// 写入输出失败
    Sink(io::Error),
}

/// 单次使用的流式流水线
pub struct StreamPipeline<'a> {
    codec: &'a dyn Codec,
    mode: Mode,
}

impl<'a> StreamPipeline<'a> {
    pub fn new(codec: &'a dyn Codec, mode: Mode) -> Self {
        Self { codec, mode }
    }

    /// 运行流水线直到输入耗尽或任一侧失败
    ///
    /// 返回压缩方向的字节数统计；`Verify` 模式下 `sink` 不会被写入。
    pub fn run(
        &self,
        source: Box<dyn Read + Send>,
        sink: Box<dyn Write + Send>,
    ) -> Result<Option<ByteCounts>, StreamError> {
        let (writer, reader) = pipe::pipe();

        thread::scope(|scope| {
            let producer = scope.spawn(move || self.produce(source, writer));
            let consumed = self.consume(reader, sink);
            let produced = producer
                .join()
                .unwrap_or_else(|_| Err(io::Error::new(io::ErrorKind::Other, "producer panicked")));

            match (consumed, produced) {
                (Err(e), _) => Err(e),
                (Ok(()), Err(e)) => Err(StreamError::Source(e)),
                (Ok(()), Ok(counts)) => Ok(counts),
            }
        })
    }

    /// 解码并丢弃，只校验完整性
    pub fn verify(&self, source: Box<dyn Read + Send>) -> Result<(), StreamError> {
        self.run(source, Box::new(io::sink())).map(|_| ())
    }

    fn produce(
        &self,
        mut source: Box<dyn Read + Send>,
        writer: PipeWriter,
    ) -> io::Result<Option<ByteCounts>> {
        let closer = writer.closer();

        let result = match self.mode {
            Mode::Encode { level } => {
                let mut encoder = self.codec.encoder(Box::new(writer), level);
                if let Err(e) = io::copy(&mut source, &mut encoder) {
                    // 编码器析构时会写出流尾，必须先让错误进入管道
                    closer.fail(duplicate(&e));
                    return Err(e);
                }
                encoder.finish().map(Some)
            }
            Mode::Decode | Mode::Verify => {
                let mut writer = writer;
                io::copy(&mut source, &mut writer)
                    .and_then(|_| writer.flush())
                    .map(|_| None)
            }
        };

        if let Err(e) = &result {
            closer.fail(duplicate(e));
        }
        result
    }

    fn consume(
        &self,
        reader: PipeReader,
        sink: Box<dyn Write + Send>,
    ) -> Result<(), StreamError> {
        let mut input: Box<dyn Read + Send> = if self.mode.decodes() {
            self.codec.decoder(Box::new(reader))
        } else {
            Box::new(reader)
        };
        let mut sink: Box<dyn Write + Send> = match self.mode {
            Mode::Verify => Box::new(io::sink()),
            _ => sink,
        };

        let mut buf = vec![0u8; CHUNK_SIZE];
        loop {
            let n = match input.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(StreamError::Source(e)),
            };
            sink.write_all(&buf[..n]).map_err(StreamError::Sink)?;
        }
        sink.flush().map_err(StreamError::Sink)
    }
}

fn duplicate(e: &io::Error) -> io::Error {
    io::Error::new(e.kind(), e.to_string())
}
