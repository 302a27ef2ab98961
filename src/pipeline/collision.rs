//! # 输出冲突检查
//!
//! 决定已存在的输出路径能否被覆盖。覆盖时先删除旧文件再创建新文件，
//! 不会原地截断，因此后续流水线失败不会留下新旧混合的内容。

use crate::error::{BzError, Result};

use std::fs;
use std::io;
use std::path::Path;

/// 检查输出路径，必要时删除已存在的普通文件
pub fn check_collision(output: &Path, force: bool) -> Result<()> {
    let meta = match fs::symlink_metadata(output) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => {
            return Err(BzError::IoFailure {
                path: output.display().to_string(),
                source: e,
            })
        }
    };

    // 符号链接、目录、设备文件一律不覆盖
    if !meta.file_type().is_file() {
        return Err(BzError::OutputNotRegularFile {
            path: output.display().to_string(),
        });
    }

    if !force {
        return Err(BzError::OutputExists {
            path: output.display().to_string(),
        });
    }

    fs::remove_file(output).map_err(|e| BzError::IoFailure {
        path: output.display().to_string(),
        source: e,
    })
}
