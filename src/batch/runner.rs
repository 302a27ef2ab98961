//! # 批量执行器
//!
//! 并行执行所有顶层参数的文件任务并汇总结果。
//!
//! ## 功能
//! - 基于 rayon 线程池，按顶层参数并行；同一参数展开出的文件顺序执行
//! - 结果按参数原始顺序（目录内按遍历顺序）返回
//! - 单个任务失败不影响其他任务
//! - 输出到标准输出时只使用一个工作线程，避免多个流交错
//! - 启动前校验参数互不重叠：不重复、递归时不嵌套、推导出的输出不是另一个参数
//!
//! ## 依赖关系
//! - 被 `commands/mod.rs` 调用
//! - 使用 `batch/traversal.rs` 展开参数，`batch/job.rs` 执行任务
//! - 使用 `utils/progress.rs` 创建进度条

use super::job::{FileJob, JobState};
use super::traversal::Traversal;
use crate::codec::Codec;
use crate::error::{BzError, Result};
use crate::models::{Config, Destination, Direction, Outcome, Source, Status};
use crate::pipeline::resolve_output;
use crate::utils::progress;

use indicatif::ProgressBar;
use rayon::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// 批量处理结果
#[derive(Debug, Default)]
pub struct BatchReport {
    /// 按参数顺序排列的全部结果
    pub outcomes: Vec<Outcome>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.count(|s| matches!(s, Status::Done))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, Status::Skipped(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, Status::Failed(_)))
    }

    /// 所有结果都成功（或跳过）
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    /// 失败的结果
    pub fn failures(&self) -> impl Iterator<Item = &Outcome> {
        self.outcomes.iter().filter(|o| !o.is_ok())
    }

    fn count(&self, pred: impl Fn(&Status) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }
}

/// 批量执行器
pub struct BatchRunner<'a> {
    config: &'a Config,
    codec: &'a dyn Codec,
    sources: Vec<Source>,
    pool: rayon::ThreadPool,
}

impl<'a> BatchRunner<'a> {
    /// 创建执行器并校验输入；失败时不会启动任何任务
    pub fn new(config: &'a Config, codec: &'a dyn Codec, sources: Vec<Source>) -> Result<Self> {
        let sources = if sources.is_empty() {
            vec![Source::Stdin]
        } else {
            sources
        };

        if sources.contains(&Source::Stdin)
            && config.destination == Destination::DerivedFile
            && config.direction != Direction::Test
        {
            return Err(BzError::InvalidConfiguration(
                "reading from stdin, can write only to stdout".to_string(),
            ));
        }

        check_distinct(config, &sources)?;

        let jobs = if config.destination == Destination::Stdout {
            1
        } else {
            config.jobs.max(1)
        };

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .map_err(|e| {
                BzError::InvalidConfiguration(format!("failed to start worker pool: {}", e))
            })?;

        Ok(Self {
            config,
            codec,
            sources,
            pool,
        })
    }

    /// 处理所有参数，返回按参数顺序排列的结果
    pub fn run(&self) -> BatchReport {
        let pb = if self.config.verbose {
            progress::create_progress_bar(self.sources.len() as u64, "Processing")
        } else {
            ProgressBar::hidden()
        };

        let per_argument: Vec<Vec<Outcome>> = self.pool.install(|| {
            self.sources
                .par_iter()
                .map(|source| {
                    let outcomes = self.run_argument(source, &pb);
                    pb.inc(1);
                    outcomes
                })
                .collect()
        });

        pb.finish_and_clear();

        BatchReport {
            outcomes: per_argument.into_iter().flatten().collect(),
        }
    }

    /// 顺序执行单个参数展开出的所有文件
    fn run_argument(&self, source: &Source, pb: &ProgressBar) -> Vec<Outcome> {
        Traversal::new(source.clone(), self.config.recursive)
            .map(|item| match item {
                Ok(input) => {
                    pb.set_message(input.source.to_string());
                    let mut job = FileJob::new(input.source, input.walked, self.config, self.codec);
                    let outcome = job.run();
                    debug_assert!(matches!(
                        job.state(),
                        JobState::Done | JobState::Failed | JobState::Skipped
                    ));
                    outcome
                }
                Err(failure) => Outcome::failed(failure.source, None, failure.error),
            })
            .collect()
    }
}

/// 保证任意两个任务的输入输出路径互不相同
///
/// - 同一路径不能出现两次
/// - 递归时，参数不能位于另一个目录参数之下
/// - 参数推导出的输出路径不能是另一个参数
fn check_distinct(config: &Config, sources: &[Source]) -> Result<()> {
    if sources.iter().filter(|s| **s == Source::Stdin).count() > 1 {
        return Err(invalid(format!("{} given more than once", Source::Stdin)));
    }

    let paths: Vec<(&Path, PathBuf)> = sources
        .iter()
        .filter_map(|source| match source {
            Source::File(path) => Some((path.as_path(), canonical(path))),
            Source::Stdin => None,
        })
        .collect();

    let mut seen = HashSet::new();
    for (path, key) in &paths {
        if !seen.insert(key) {
            return Err(invalid(format!("{} given more than once", path.display())));
        }
    }

    if config.recursive {
        for (dir, dir_key) in paths.iter().filter(|(_, key)| key.is_dir()) {
            let nested = paths
                .iter()
                .find(|(_, key)| key != dir_key && key.starts_with(dir_key));
            if let Some((path, _)) = nested {
                return Err(invalid(format!(
                    "{} is inside directory {}",
                    path.display(),
                    dir.display()
                )));
            }
        }
    }

    for (path, _) in &paths {
        let output = resolve_output(path, config.direction, &config.suffix, config.destination);
        let Ok(Some(output)) = output else {
            continue;
        };
        let output_key = canonical(&output);
        if let Some((other, _)) = paths.iter().find(|(_, key)| *key == output_key) {
            return Err(invalid(format!(
                "output of {} would replace {}",
                path.display(),
                other.display()
            )));
        }
    }
    Ok(())
}

/// 规范化路径；路径不存在时规范化其父目录
fn canonical(path: &Path) -> PathBuf {
    if let Ok(resolved) = fs::canonicalize(path) {
        return resolved;
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => {
            let parent = if parent.as_os_str().is_empty() {
                Path::new(".")
            } else {
                parent
            };
            fs::canonicalize(parent)
                .map(|p| p.join(name))
                .unwrap_or_else(|_| path.to_path_buf())
        }
        _ => path.to_path_buf(),
    }
}

fn invalid(msg: String) -> BzError {
    BzError::InvalidConfiguration(msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Bzip2Codec;
    use crate::error::ErrorKind;
    use std::path::{Path, PathBuf};

    fn compress_config() -> Config {
        Config {
            jobs: 4,
            ..Config::default()
        }
    }

    fn files(paths: &[&Path]) -> Vec<Source> {
        paths.iter().map(|p| Source::File(p.to_path_buf())).collect()
    }

    fn run(config: &Config, sources: Vec<Source>) -> BatchReport {
        BatchRunner::new(config, &Bzip2Codec, sources).unwrap().run()
    }

    fn encode_fresh(data: &[u8], level: u32) -> Vec<u8> {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("fresh");
        fs::write(&src, data).unwrap();
        let config = Config {
            level,
            ..Config::default()
        };
        let report = run(&config, files(&[&src]));
        assert!(report.is_success());
        fs::read(dir.path().join("fresh.bz2")).unwrap()
    }

    #[test]
    fn test_mixed_existing_and_missing() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let missing = dir.path().join("missing.txt");
        fs::write(&a, b"alpha").unwrap();

        let report = run(&compress_config(), files(&[&a, &missing]));

        assert_eq!(report.outcomes.len(), 2);
        assert!(report.outcomes[0].is_ok());
        assert_eq!(
            report.outcomes[0].output.as_deref(),
            Some(dir.path().join("a.txt.bz2").as_path())
        );
        assert_eq!(
            report.outcomes[1].error_kind(),
            Some(ErrorKind::SourceNotFound)
        );
        assert!(!report.is_success());
        assert_eq!(report.failed(), 1);
        assert!(!a.exists());
        assert!(dir.path().join("a.txt.bz2").exists());
    }

    #[test]
    fn test_outcomes_follow_argument_order() {
        let dir = tempfile::tempdir().unwrap();
        let paths: Vec<PathBuf> = (0..12).map(|i| dir.path().join(format!("f{:02}", i))).collect();
        for (i, p) in paths.iter().enumerate() {
            fs::write(p, vec![b'x'; 1000 * (12 - i)]).unwrap();
        }

        let sources: Vec<Source> = paths.iter().map(|p| Source::File(p.clone())).collect();
        let report = run(&compress_config(), sources.clone());

        let reported: Vec<Source> = report.outcomes.iter().map(|o| o.source.clone()).collect();
        assert_eq!(reported, sources);
        assert_eq!(report.succeeded(), 12);
    }

    #[test]
    fn test_keep_runs_are_repeatable() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("doc.txt");
        let content = b"repeatable content ".repeat(300);
        fs::write(&src, &content).unwrap();
        let out = dir.path().join("doc.txt.bz2");

        let config = Config {
            keep: true,
            ..compress_config()
        };
        assert!(run(&config, files(&[&src])).is_success());
        let first = fs::read(&out).unwrap();

        let config = Config {
            keep: true,
            force: true,
            ..compress_config()
        };
        assert!(run(&config, files(&[&src])).is_success());
        assert_eq!(fs::read(&out).unwrap(), first);
        assert_eq!(fs::read(&src).unwrap(), content);
    }

    #[test]
    fn test_existing_output_without_force_is_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.txt");
        let out = dir.path().join("a.txt.bz2");
        fs::write(&src, b"new").unwrap();
        fs::write(&out, b"old bytes").unwrap();

        let report = run(&compress_config(), files(&[&src]));
        assert_eq!(report.outcomes[0].error_kind(), Some(ErrorKind::OutputExists));
        assert_eq!(fs::read(&out).unwrap(), b"old bytes");
        assert!(src.exists());
    }

    #[test]
    fn test_force_replaces_output_completely() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.txt");
        let out = dir.path().join("a.txt.bz2");
        let content = b"replacement".repeat(50);
        fs::write(&src, &content).unwrap();
        fs::write(&out, vec![0xAA; 100_000]).unwrap();

        let config = Config {
            force: true,
            ..compress_config()
        };
        assert!(run(&config, files(&[&src])).is_success());
        assert_eq!(fs::read(&out).unwrap(), encode_fresh(&content, 9));
    }

    #[test]
    fn test_directory_without_recursion_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join("a.txt"), b"a").unwrap();

        let report = run(&compress_config(), files(&[&sub]));
        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(
            report.outcomes[0].error_kind(),
            Some(ErrorKind::DirectoryNotRecursed)
        );
        let entries: Vec<_> = fs::read_dir(&sub).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_recursive_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("tree");
        fs::create_dir_all(root.join("x/y")).unwrap();
        fs::write(root.join("one.txt"), b"one").unwrap();
        fs::write(root.join("x/two.txt"), b"two").unwrap();
        fs::write(root.join("x/y/three.txt"), b"three").unwrap();

        let config = Config {
            recursive: true,
            ..compress_config()
        };
        let report = run(&config, files(&[&root]));
        assert!(report.is_success());
        assert_eq!(report.succeeded(), 3);
        for name in ["one.txt.bz2", "x/two.txt.bz2", "x/y/three.txt.bz2"] {
            assert!(root.join(name).is_file(), "{} missing", name);
        }

        let config = Config {
            recursive: true,
            direction: Direction::Decompress,
            ..compress_config()
        };
        let report = run(&config, files(&[&root]));
        assert!(report.is_success());
        assert_eq!(report.succeeded(), 3);
        assert_eq!(fs::read(root.join("x/y/three.txt")).unwrap(), b"three");
        assert!(!root.join("x/two.txt.bz2").exists());
    }

    #[test]
    fn test_recursive_skips_already_compressed() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("tree");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("a.txt"), b"a").unwrap();
        fs::write(root.join("b.bz2"), b"b").unwrap();

        let config = Config {
            recursive: true,
            ..compress_config()
        };
        let report = run(&config, files(&[&root]));
        assert!(report.is_success());
        assert_eq!(report.outcomes.len(), 2);
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.skipped(), 1);
        assert!(!root.join("b.bz2.bz2").exists());
    }

    #[test]
    fn test_stdin_requires_stdout() {
        let config = compress_config();
        let err = BatchRunner::new(&config, &Bzip2Codec, vec![]).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);

        let config = Config {
            direction: Direction::Test,
            ..compress_config()
        };
        assert!(BatchRunner::new(&config, &Bzip2Codec, vec![Source::Stdin]).is_ok());
    }

    #[test]
    fn test_duplicate_arguments_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.txt");
        fs::write(&a, b"a").unwrap();
        let dotted = dir.path().join(".").join("a.txt");

        let config = compress_config();
        let err = BatchRunner::new(&config, &Bzip2Codec, files(&[&a, &dotted]))
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);
        assert!(a.exists());
    }

    #[test]
    fn test_failure_does_not_cancel_siblings() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("bad.bz2");
        let good_src = dir.path().join("good");
        fs::write(&bad, b"garbage, not bzip2").unwrap();
        fs::write(&good_src, b"good data").unwrap();
        fs::write(dir.path().join("good.bz2"), encode_fresh(b"good data", 9)).unwrap();
        fs::remove_file(&good_src).unwrap();
        let good = dir.path().join("good.bz2");

        let config = Config {
            direction: Direction::Decompress,
            ..compress_config()
        };
        let report = run(&config, files(&[&bad, &good]));
        assert_eq!(
            report.outcomes[0].error_kind(),
            Some(ErrorKind::TransformFailure)
        );
        assert!(report.outcomes[1].is_ok());
        assert_eq!(fs::read(&good_src).unwrap(), b"good data");
        assert_eq!(report.failures().count(), 1);
    }

    #[test]
    fn test_file_inside_recursive_directory_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("tree");
        fs::create_dir_all(root.join("sub")).unwrap();
        let inner = root.join("sub/a.txt");
        fs::write(&inner, b"a").unwrap();

        let config = Config {
            recursive: true,
            ..compress_config()
        };
        for sources in [files(&[&root, &inner]), files(&[&root, &root.join("sub")])] {
            let err = BatchRunner::new(&config, &Bzip2Codec, sources).err().unwrap();
            assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);
        }
        assert_eq!(fs::read(&inner).unwrap(), b"a");

        // 不递归时目录参数不会展开，不存在重叠
        assert!(BatchRunner::new(&compress_config(), &Bzip2Codec, files(&[&root, &inner])).is_ok());
    }

    #[test]
    fn test_output_colliding_with_another_argument_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a");
        let packed = dir.path().join("a.bz2");
        fs::write(&a, b"plain").unwrap();
        fs::write(&packed, encode_fresh(b"earlier", 9)).unwrap();

        let config = Config {
            force: true,
            ..compress_config()
        };
        let err = BatchRunner::new(&config, &Bzip2Codec, files(&[&a, &packed]))
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);
        assert_eq!(fs::read(&a).unwrap(), b"plain");
        assert_eq!(fs::read(&packed).unwrap(), encode_fresh(b"earlier", 9));

        let config = Config {
            direction: Direction::Decompress,
            force: true,
            ..compress_config()
        };
        let err = BatchRunner::new(&config, &Bzip2Codec, files(&[&packed, &a]))
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);
    }
}
