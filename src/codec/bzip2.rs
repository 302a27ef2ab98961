//! # bzip2 编解码实现
//!
//! 基于 `bzip2` crate。解压使用 `MultiBzDecoder`，
//! 多个拼接的 bzip2 流（例如多次 `-c` 输出追加到同一文件）按一个流解出。

use super::{Codec, Encoder};
use crate::models::ByteCounts;

use bzip2::read::MultiBzDecoder;
use bzip2::write::BzEncoder;
use bzip2::Compression;
use std::io::{self, Read, Write};

/// bzip2 编解码器
#[derive(Debug, Clone, Copy, Default)]
pub struct Bzip2Codec;

struct Bzip2Encoder {
    inner: BzEncoder<Box<dyn Write + Send>>,
}

impl Write for Bzip2Encoder {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl Encoder for Bzip2Encoder {
    fn finish(self: Box<Self>) -> io::Result<ByteCounts> {
        let mut inner = self.inner;
        inner.try_finish()?;
        let counts = ByteCounts {
            bytes_in: inner.total_in(),
            bytes_out: inner.total_out(),
        };
        let mut sink = inner.finish()?;
        sink.flush()?;
        Ok(counts)
    }
}

impl Codec for Bzip2Codec {
    fn encoder(&self, sink: Box<dyn Write + Send>, level: u32) -> Box<dyn Encoder> {
        Box::new(Bzip2Encoder {
            inner: BzEncoder::new(sink, Compression::new(level.clamp(1, 9))),
        })
    }

    fn decoder(&self, source: Box<dyn Read + Send>) -> Box<dyn Read + Send> {
        Box::new(MultiBzDecoder::new(source))
    }
}
