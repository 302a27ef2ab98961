//! # 单文件任务
//!
//! 每个输入文件的处理状态机：
//!
//! ```text
//! Pending → Resolving → Skipped
//!                     → Failed
//!                     → Piping → Finalizing → Done
//!                              → Failed     → Failed
//! ```
//!
//! - Resolving 阶段的任何错误都发生在读取数据之前，源文件保持不变
//! - Piping 失败时已创建的输出文件不会被删除
//! - Finalizing 阶段删除源文件，删除失败记为 `SourceRemovalFailure`
//!
//! ## 依赖关系
//! - 使用 `pipeline/` 完成路径推导、冲突检查和数据流
//! - 被 `batch/runner.rs` 调用

use crate::codec::Codec;
use crate::error::{BzError, Result};
use crate::models::{ByteCounts, Config, Destination, Direction, Outcome, Source};
use crate::pipeline::{
    check_collision, check_source, resolve_output, skip_reason, Mode, StreamError, StreamPipeline,
};

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// 任务生命周期状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Resolving,
    Skipped,
    Piping,
    Finalizing,
    Done,
    Failed,
}

/// 单文件任务
pub struct FileJob<'a> {
    source: Source,
    /// 是否来自递归遍历（而非命令行直接给出）
    walked: bool,
    output: Option<PathBuf>,
    state: JobState,
    config: &'a Config,
    codec: &'a dyn Codec,
}

impl<'a> FileJob<'a> {
    pub fn new(source: Source, walked: bool, config: &'a Config, codec: &'a dyn Codec) -> Self {
        Self {
            source,
            walked,
            output: None,
            state: JobState::Pending,
            config,
            codec,
        }
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    /// 执行任务直到终止状态，返回唯一的处理结果
    pub fn run(&mut self) -> Outcome {
        self.state = JobState::Resolving;
        match self.resolve() {
            Ok(None) => {}
            Ok(Some(reason)) => {
                self.state = JobState::Skipped;
                return Outcome::skipped(self.source.clone(), reason);
            }
            Err(e) => return self.fail(e),
        }

        self.state = JobState::Piping;
        let counts = match self.pipe() {
            Ok(counts) => counts,
            Err(e) => return self.fail(e),
        };

        self.state = JobState::Finalizing;
        if let Err(e) = self.finalize() {
            return self.fail(e);
        }

        self.state = JobState::Done;
        Outcome::done(self.source.clone(), self.output.clone(), counts)
    }

    fn fail(&mut self, error: BzError) -> Outcome {
        self.state = JobState::Failed;
        Outcome::failed(self.source.clone(), self.output.clone(), error)
    }

    /// 校验输入、推导输出路径并检查冲突；返回 Some 表示跳过
    fn resolve(&mut self) -> Result<Option<String>> {
        let path = match &self.source {
            Source::Stdin => {
                if self.config.destination == Destination::DerivedFile
                    && self.config.direction != Direction::Test
                {
                    return Err(BzError::InvalidConfiguration(
                        "reading from stdin, can write only to stdout".to_string(),
                    ));
                }
                return Ok(None);
            }
            Source::File(path) => path.clone(),
        };

        check_source(&path)?;

        if self.walked {
            if let Some(reason) = skip_reason(&path, self.config.direction, &self.config.suffix) {
                return Ok(Some(reason));
            }
        }

        self.output = resolve_output(
            &path,
            self.config.direction,
            &self.config.suffix,
            self.config.destination,
        )?;

        if let Some(output) = &self.output {
            check_collision(output, self.config.force)?;
        }
        Ok(None)
    }

    /// 打开输入输出句柄并运行流水线；句柄由流水线线程持有，在所有路径上释放
    fn pipe(&self) -> Result<Option<ByteCounts>> {
        let input: Box<dyn Read + Send> = match &self.source {
            Source::Stdin => Box::new(io::stdin()),
            Source::File(path) => Box::new(open_source(path)?),
        };

        let pipeline = StreamPipeline::new(
            self.codec,
            Mode::for_direction(self.config.direction, self.config.level),
        );
        let source_name = self.source.to_string();

        if self.config.direction == Direction::Test {
            return pipeline
                .verify(input)
                .map(|_| None)
                .map_err(|e| stream_error(&source_name, "(verify)", e));
        }

        let (sink, sink_name): (Box<dyn Write + Send>, String) = match &self.output {
            Some(output) => (
                Box::new(BufWriter::new(create_output(output)?)),
                output.display().to_string(),
            ),
            None => (Box::new(BufWriter::new(io::stdout())), "(stdout)".to_string()),
        };

        pipeline
            .run(input, sink)
            .map_err(|e| stream_error(&source_name, &sink_name, e))
    }

    fn finalize(&self) -> Result<()> {
        match &self.source {
            Source::File(path) if self.config.removes_source() => {
                fs::remove_file(path).map_err(|e| BzError::SourceRemovalFailure {
                    path: path.display().to_string(),
                    source: e,
                })
            }
            _ => Ok(()),
        }
    }
}

fn stream_error(source: &str, sink: &str, err: StreamError) -> BzError {
    match err {
        StreamError::Source(e) => BzError::from_stream(source, e),
        StreamError::Sink(e) => BzError::IoFailure {
            path: sink.to_string(),
            source: e,
        },
    }
}

fn open_source(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            BzError::SourceNotFound {
                path: path.display().to_string(),
            }
        } else {
            BzError::IoFailure {
                path: path.display().to_string(),
                source: e,
            }
        }
    })
}

/// 创建新的输出文件；冲突检查之后又出现的同名文件不会被覆盖
fn create_output(path: &Path) -> Result<File> {
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| {
            if e.kind() == io::ErrorKind::AlreadyExists {
                BzError::OutputExists {
                    path: path.display().to_string(),
                }
            } else {
                BzError::IoFailure {
                    path: path.display().to_string(),
                    source: e,
                }
            }
        })
}
