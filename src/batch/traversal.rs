//! # 参数展开
//!
//! 将单个命令行参数展开为惰性的文件序列。
//!
//! ## 规则
//! - 标准输入标记：原样产出
//! - 非目录路径（包括不存在的路径）：原样产出，由 FileJob 报告错误
//! - 目录且未开启递归：产出一个 `DirectoryNotRecursed` 错误
//! - 目录且开启递归：按文件名排序深度优先遍历，只产出普通文件；
//!   遍历中的错误就地产出一次，不中断后续遍历
//!
//! ## 依赖关系
//! - 被 `batch/runner.rs` 调用
//! - 使用 `walkdir` 遍历目录

use crate::error::BzError;
use crate::models::Source;

use std::fs;
use std::io;
use walkdir::WalkDir;

/// 待执行的文件任务输入
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobInput {
    pub source: Source,
    /// 是否来自递归遍历
    pub walked: bool,
}

/// 展开过程中的错误，归属于具体的路径
#[derive(Debug)]
pub struct WalkFailure {
    pub source: Source,
    pub error: BzError,
}

enum Inner {
    Single(Option<Result<JobInput, WalkFailure>>),
    Walk(walkdir::IntoIter),
}

/// 单个参数的惰性展开，只能消费一次
pub struct Traversal {
    inner: Inner,
}

impl Traversal {
    pub fn new(source: Source, recursive: bool) -> Self {
        let path = match &source {
            Source::Stdin => None,
            Source::File(path) => Some(path.clone()),
        };
        let Some(path) = path else {
            return Self::single(Ok(JobInput {
                source,
                walked: false,
            }));
        };

        match fs::metadata(&path) {
            Ok(meta) if meta.is_dir() => {
                if recursive {
                    Traversal {
                        inner: Inner::Walk(WalkDir::new(&path).sort_by_file_name().into_iter()),
                    }
                } else {
                    Self::single(Err(WalkFailure {
                        source,
                        error: BzError::DirectoryNotRecursed {
                            path: path.display().to_string(),
                        },
                    }))
                }
            }
            _ => Self::single(Ok(JobInput { source, walked: false })),
        }
    }

    fn single(item: Result<JobInput, WalkFailure>) -> Self {
        Traversal {
            inner: Inner::Single(Some(item)),
        }
    }
}

impl Iterator for Traversal {
    type Item = Result<JobInput, WalkFailure>;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.inner {
            Inner::Single(item) => item.take(),
            Inner::Walk(iter) => loop {
                match iter.next()? {
                    Ok(entry) if entry.file_type().is_file() => {
                        return Some(Ok(JobInput {
                            source: Source::File(entry.into_path()),
                            walked: true,
                        }))
                    }
                    Ok(_) => continue,
                    Err(err) => {
                        let path = err.path().map(|p| p.to_path_buf()).unwrap_or_default();
                        let failure = WalkFailure {
                            error: BzError::IoFailure {
                                path: path.display().to_string(),
                                source: io::Error::from(err),
                            },
                            source: Source::File(path),
                        };
                        return Some(Err(failure));
                    }
                }
            },
        }
    }
}
