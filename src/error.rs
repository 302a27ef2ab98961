//! # 统一错误处理模块
//!
//! 定义 bzbatch 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 错误分层
//! - 配置错误 (`InvalidConfiguration`)：在任何文件被处理之前终止整个运行
//! - 单文件错误：在 FileJob 边界被捕获并转换为 `Outcome`，不会影响其他文件
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use std::fmt;
use std::io;
use thiserror::Error;

/// bzbatch 统一错误类型
#[derive(Error, Debug)]
pub enum BzError {
    // ─────────────────────────────────────────────────────────────
    // 配置错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    // ─────────────────────────────────────────────────────────────
    // 路径解析 / 冲突检查
    // ─────────────────────────────────────────────────────────────
    #[error("File {path} doesn't have suffix .{suffix}")]
    SuffixMismatch { path: String, suffix: String },

    #[error("Output file {path} exists, use --force to overwrite")]
    OutputExists { path: String },

    #[error("Output file {path} exists and is not a regular file")]
    OutputNotRegularFile { path: String },

    #[error("{path} is a directory, use --recursive to descend into it")]
    DirectoryNotRecursed { path: String },

    #[error("File not found: {path}")]
    SourceNotFound { path: String },

    #[error("{path} is a directory, not a regular file")]
    SourceIsDirectory { path: String },

    // ─────────────────────────────────────────────────────────────
    // 数据流错误
    // ─────────────────────────────────────────────────────────────
    #[error("Corrupted file or format error in {path}")]
    TransformFailure {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("I/O error on {path}")]
    IoFailure {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to remove source file {path}")]
    SourceRemovalFailure {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// 错误种类标签，用于汇总报告和测试断言
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidConfiguration,
    SuffixMismatch,
    OutputExists,
    OutputNotRegularFile,
    DirectoryNotRecursed,
    SourceNotFound,
    SourceIsDirectory,
    TransformFailure,
    IoFailure,
    SourceRemovalFailure,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::InvalidConfiguration => "invalid-configuration",
            ErrorKind::SuffixMismatch => "suffix-mismatch",
            ErrorKind::OutputExists => "output-exists",
            ErrorKind::OutputNotRegularFile => "output-not-regular",
            ErrorKind::DirectoryNotRecursed => "directory-not-recursed",
            ErrorKind::SourceNotFound => "source-not-found",
            ErrorKind::SourceIsDirectory => "source-is-directory",
            ErrorKind::TransformFailure => "transform-failure",
            ErrorKind::IoFailure => "io-failure",
            ErrorKind::SourceRemovalFailure => "source-removal-failure",
        };
        f.write_str(name)
    }
}

impl BzError {
    /// 返回错误种类标签
    pub fn kind(&self) -> ErrorKind {
        match self {
            BzError::InvalidConfiguration(_) => ErrorKind::InvalidConfiguration,
            BzError::SuffixMismatch { .. } => ErrorKind::SuffixMismatch,
            BzError::OutputExists { .. } => ErrorKind::OutputExists,
            BzError::OutputNotRegularFile { .. } => ErrorKind::OutputNotRegularFile,
            BzError::DirectoryNotRecursed { .. } => ErrorKind::DirectoryNotRecursed,
            BzError::SourceNotFound { .. } => ErrorKind::SourceNotFound,
            BzError::SourceIsDirectory { .. } => ErrorKind::SourceIsDirectory,
            BzError::TransformFailure { .. } => ErrorKind::TransformFailure,
            BzError::IoFailure { .. } => ErrorKind::IoFailure,
            BzError::SourceRemovalFailure { .. } => ErrorKind::SourceRemovalFailure,
        }
    }

    /// 完整错误信息（包含底层 I/O 原因）
    pub fn detail(&self) -> String {
        match self {
            BzError::TransformFailure { source, .. }
            | BzError::IoFailure { source, .. }
            | BzError::SourceRemovalFailure { source, .. } => format!("{}: {}", self, source),
            _ => self.to_string(),
        }
    }

    /// 将数据流中的 I/O 错误按种类归类：数据完整性问题归为 `TransformFailure`
    pub fn from_stream(path: &str, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::InvalidData
            | io::ErrorKind::InvalidInput
            | io::ErrorKind::UnexpectedEof => BzError::TransformFailure {
                path: path.to_string(),
                source,
            },
            _ => BzError::IoFailure {
                path: path.to_string(),
                source,
            },
        }
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, BzError>;
