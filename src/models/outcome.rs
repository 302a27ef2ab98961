//! # 单文件处理结果
//!
//! 每个 FileJob 产生且只产生一个 `Outcome`，生成后不再修改，
//! 由 `batch/runner.rs` 汇总为批处理结果。

use crate::error::{BzError, ErrorKind};
use crate::models::source::Source;
use std::path::PathBuf;

/// 压缩前后的字节数（仅压缩方向提供）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ByteCounts {
    pub bytes_in: u64,
    pub bytes_out: u64,
}

impl ByteCounts {
    /// bzip2 -v 风格的压缩率报告
    pub fn ratio_report(&self) -> String {
        if self.bytes_in == 0 || self.bytes_out == 0 {
            return "no data compressed.".to_string();
        }
        let bytes_in = self.bytes_in as f64;
        let bytes_out = self.bytes_out as f64;
        format!(
            "{:6.3}:1, {:6.3} bits/byte, {:5.2}% saved, {} in, {} out.",
            bytes_in / bytes_out,
            8.0 * bytes_out / bytes_in,
            100.0 * (1.0 - bytes_out / bytes_in),
            self.bytes_in,
            self.bytes_out
        )
    }
}

/// 处理状态
#[derive(Debug)]
pub enum Status {
    /// 处理成功
    Done,
    /// 跳过（递归遍历中不适用于当前方向的文件）
    Skipped(String),
    /// 处理失败
    Failed(BzError),
}

/// 单文件处理结果
#[derive(Debug)]
pub struct Outcome {
    pub source: Source,
    /// 输出路径（标准输出或校验模式为 None）
    pub output: Option<PathBuf>,
    pub status: Status,
    pub counts: Option<ByteCounts>,
}

impl Outcome {
    pub fn done(source: Source, output: Option<PathBuf>, counts: Option<ByteCounts>) -> Self {
        Outcome {
            source,
            output,
            status: Status::Done,
            counts,
        }
    }

    pub fn skipped(source: Source, reason: impl Into<String>) -> Self {
        Outcome {
            source,
            output: None,
            status: Status::Skipped(reason.into()),
            counts: None,
        }
    }

    pub fn failed(source: Source, output: Option<PathBuf>, error: BzError) -> Self {
        Outcome {
            source,
            output,
            status: Status::Failed(error),
            counts: None,
        }
    }

    /// 成功或跳过都视为 ok
    pub fn is_ok(&self) -> bool {
        !matches!(self.status, Status::Failed(_))
    }

    pub fn error(&self) -> Option<&BzError> {
        match &self.status {
            Status::Failed(e) => Some(e),
            _ => None,
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error().map(BzError::kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_report() {
        let counts = ByteCounts {
            bytes_in: 1000,
            bytes_out: 250,
        };
        let report = counts.ratio_report();
        assert!(report.starts_with(" 4.000:1"));
        assert!(report.contains("2.000 bits/byte"));
        assert!(report.contains("75.00% saved"));
        assert!(report.ends_with("1000 in, 250 out."));
    }

    #[test]
    fn test_ratio_report_empty_input() {
        assert_eq!(ByteCounts::default().ratio_report(), "no data compressed.");
    }

    #[test]
    fn test_outcome_status() {
        let ok = Outcome::skipped(Source::Stdin, "already compressed");
        assert!(ok.is_ok());
        assert!(ok.error().is_none());

        let failed = Outcome::failed(
            Source::File(PathBuf::from("x")),
            None,
            BzError::SourceNotFound {
                path: "x".to_string(),
            },
        );
        assert!(!failed.is_ok());
        assert_eq!(failed.error_kind(), Some(ErrorKind::SourceNotFound));
    }
}
