//! # 输出路径推导
//!
//! 由输入路径、方向、后缀和输出目标推导输出文件路径。纯函数，
//! 不访问文件系统（`check_source` 除外）。
//!
//! ## 规则
//! - 压缩：`<source>.<suffix>`
//! - 解压：去掉末尾的 `.<suffix>`，文件名不以其结尾或去掉后为空则报错
//! - 标准输出 / 校验模式：没有输出路径
//!
//! 后缀按文件名的原始字节匹配（unix），非 UTF-8 文件名可以正常往返。

use crate::error::{BzError, Result};
use crate::models::{Destination, Direction};

use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// 推导输出路径
pub fn resolve_output(
    source: &Path,
    direction: Direction,
    suffix: &str,
    destination: Destination,
) -> Result<Option<PathBuf>> {
    if destination == Destination::Stdout || direction == Direction::Test {
        return Ok(None);
    }

    if suffix.is_empty() {
        return Err(BzError::InvalidConfiguration(
            "suffix can't be an empty string".to_string(),
        ));
    }

    match direction {
        Direction::Compress => {
            let mut name = OsString::from(source.as_os_str());
            name.push(".");
            name.push(suffix);
            Ok(Some(PathBuf::from(name)))
        }
        _ => strip_suffix(source, suffix).map(Some),
    }
}

fn strip_suffix(source: &Path, suffix: &str) -> Result<PathBuf> {
    source
        .file_name()
        .and_then(|name| strip_name_suffix(name, suffix))
        .map(|base| source.with_file_name(base))
        .ok_or_else(|| BzError::SuffixMismatch {
            path: source.display().to_string(),
            suffix: suffix.to_string(),
        })
}

/// 去掉文件名末尾的 `.<suffix>`；不匹配或剩余部分为空时返回 None
#[cfg(unix)]
fn strip_name_suffix(name: &OsStr, suffix: &str) -> Option<OsString> {
    use std::os::unix::ffi::OsStrExt;

    let dotted = format!(".{}", suffix);
    name.as_bytes()
        .strip_suffix(dotted.as_bytes())
        .filter(|base| !base.is_empty())
        .map(|base| OsStr::from_bytes(base).to_os_string())
}

#[cfg(not(unix))]
fn strip_name_suffix(name: &OsStr, suffix: &str) -> Option<OsString> {
    let dotted = format!(".{}", suffix);
    name.to_str()?
        .strip_suffix(&dotted)
        .filter(|base| !base.is_empty())
        .map(OsString::from)
}

/// 是否带有 `.<suffix>` 后缀
pub fn has_suffix(path: &Path, suffix: &str) -> bool {
    !suffix.is_empty()
        && path
            .file_name()
            .and_then(|name| strip_name_suffix(name, suffix))
            .is_some()
}

/// 递归遍历得到的文件是否应当跳过，返回跳过原因
pub fn skip_reason(path: &Path, direction: Direction, suffix: &str) -> Option<String> {
    if suffix.is_empty() {
        return None;
    }
    match (direction, has_suffix(path, suffix)) {
        (Direction::Compress, true) => Some(format!("already has .{} suffix", suffix)),
        (Direction::Decompress | Direction::Test, false) => {
            Some(format!("unknown suffix, expected .{}", suffix))
        }
        _ => None,
    }
}

/// 校验输入是存在的普通文件
///
/// 不跟随符号链接。目录报 `SourceIsDirectory`；符号链接、FIFO、设备等
/// 其他类型报 `IoFailure`，不会被读取或删除。
pub fn check_source(path: &Path) -> Result<()> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => Err(BzError::SourceIsDirectory {
            path: path.display().to_string(),
        }),
        Ok(meta) if !meta.file_type().is_file() => Err(BzError::IoFailure {
            path: path.display().to_string(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"),
        }),
        Ok(_) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(BzError::SourceNotFound {
            path: path.display().to_string(),
        }),
        Err(e) => Err(BzError::IoFailure {
            path: path.display().to_string(),
            source: e,
        }),
    }
}
