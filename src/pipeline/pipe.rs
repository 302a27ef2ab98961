//! # 有界字节管道
//!
//! 生产者与消费者之间的交接通道，基于 `std::sync::mpsc::sync_channel`。
//! 通道满时生产者阻塞，通道空且未关闭时消费者阻塞。
//!
//! ## 关闭语义
//! - 所有写端（`PipeWriter` 和 `PipeCloser`）都被丢弃：读端看到 EOF
//! - `PipeCloser::fail`：读端在读完此前的数据后收到该错误

use std::io::{self, Read, Write};
use std::mem;
use std::sync::mpsc::{sync_channel, Receiver, SyncSender};

/// 单个数据块大小
pub const CHUNK_SIZE: usize = 64 * 1024;

/// 通道中最多排队的数据块数量
pub const PIPE_DEPTH: usize = 4;

type Message = io::Result<Vec<u8>>;

/// 创建一对管道端点
pub fn pipe() -> (PipeWriter, PipeReader) {
    let (tx, rx) = sync_channel(PIPE_DEPTH);
    (
        PipeWriter {
            tx,
            buf: Vec::with_capacity(CHUNK_SIZE),
        },
        PipeReader {
            rx,
            chunk: Vec::new(),
            pos: 0,
        },
    )
}

/// 管道写端。缓冲区在 `flush` 或填满时发送；未 flush 的数据在丢弃时不发送
pub struct PipeWriter {
    tx: SyncSender<Message>,
    buf: Vec<u8>,
}

impl PipeWriter {
    /// 获取可携带错误关闭管道的句柄
    pub fn closer(&self) -> PipeCloser {
        PipeCloser {
            tx: self.tx.clone(),
        }
    }

    fn send_buf(&mut self) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        let chunk = mem::replace(&mut self.buf, Vec::with_capacity(CHUNK_SIZE));
        self.tx.send(Ok(chunk)).map_err(|_| broken_pipe())
    }
}

impl Write for PipeWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        if data.is_empty() {
            return Ok(0);
        }
        let n = data.len().min(CHUNK_SIZE - self.buf.len());
        self.buf.extend_from_slice(&data[..n]);
        if self.buf.len() == CHUNK_SIZE {
            self.send_buf()?;
        }
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.send_buf()
    }
}

/// 携带错误关闭管道的句柄
pub struct PipeCloser {
    tx: SyncSender<Message>,
}

impl PipeCloser {
    /// 以错误关闭管道。读端已关闭时静默忽略
    pub fn fail(self, err: io::Error) {
        let _ = self.tx.send(Err(err));
    }
}

/// 管道读端
pub struct PipeReader {
    rx: Receiver<Message>,
    chunk: Vec<u8>,
    pos: usize,
}

impl Read for PipeReader {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if out.is_empty() {
            return Ok(0);
        }
        while self.pos >= self.chunk.len() {
            match self.rx.recv() {
                Ok(Ok(chunk)) => {
                    self.chunk = chunk;
                    self.pos = 0;
                }
                Ok(Err(e)) => return Err(e),
                Err(_) => return Ok(0),
            }
        }
        let n = out.len().min(self.chunk.len() - self.pos);
        out[..n].copy_from_slice(&self.chunk[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

fn broken_pipe() -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, "read end of pipe closed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_transfers_across_threads() {
        let (mut writer, mut reader) = pipe();
        let data: Vec<u8> = (0..(CHUNK_SIZE * 10 + 17)).map(|i| (i % 251) as u8).collect();
        let expected = data.clone();

        let producer = thread::spawn(move || {
            writer.write_all(&data).unwrap();
            writer.flush().unwrap();
        });

        let mut received = Vec::new();
        reader.read_to_end(&mut received).unwrap();
        producer.join().unwrap();
        assert_eq!(received, expected);
    }

    #[test]
    fn test_error_observed_after_data() {
        let (mut writer, mut reader) = pipe();
        let closer = writer.closer();

        let producer = thread::spawn(move || {
            writer.write_all(b"partial").unwrap();
            writer.flush().unwrap();
            drop(writer);
            closer.fail(io::Error::new(io::ErrorKind::Other, "source vanished"));
        });

        let mut buf = [0u8; 7];
        reader.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"partial");

        let err = reader.read(&mut buf).unwrap_err();
        assert_eq!(err.to_string(), "source vanished");
        producer.join().unwrap();
    }

    #[test]
    fn test_writer_sees_closed_reader() {
        let (mut writer, reader) = pipe();
        drop(reader);
        writer.write_all(b"data").unwrap();
        let err = writer.flush().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_unflushed_data_is_not_sent() {
        let (mut writer, mut reader) = pipe();
        writer.write_all(b"pending").unwrap();
        drop(writer);

        let mut received = Vec::new();
        reader.read_to_end(&mut received).unwrap();
        assert!(received.is_empty());
    }
}
