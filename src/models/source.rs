//! # 输入源
//!
//! 区分真实文件路径和标准输入标记 (`-` 或空参数列表)。

use std::fmt;
use std::path::{Path, PathBuf};

/// 标准输入的命令行标记
pub const STDIN_MARK: &str = "-";

/// 单个待处理输入
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Source {
    /// 标准输入
    Stdin,
    /// 文件系统路径
    File(PathBuf),
}

impl Source {
    /// 将单个命令行参数转换为输入源
    pub fn from_arg(arg: &Path) -> Self {
        if arg == Path::new(STDIN_MARK) {
            Source::Stdin
        } else {
            Source::File(arg.to_path_buf())
        }
    }

    /// 将参数列表转换为输入源；空列表表示标准输入
    pub fn from_args(args: &[PathBuf]) -> Vec<Source> {
        if args.is_empty() {
            return vec![Source::Stdin];
        }
        args.iter().map(|a| Source::from_arg(a)).collect()
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Stdin => write!(f, "(stdin)"),
            Source::File(p) => write!(f, "{}", p.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_args() {
        assert_eq!(Source::from_args(&[]), vec![Source::Stdin]);

        let sources = Source::from_args(&[PathBuf::from("-"), PathBuf::from("a.txt")]);
        assert_eq!(sources[0], Source::Stdin);
        assert_eq!(sources[1], Source::File(PathBuf::from("a.txt")));
        assert_eq!(sources[1].to_string(), "a.txt");
    }
}
