//! # 美化输出工具
//!
//! 提供统一的终端输出样式。标准输出可能承载压缩数据，
//! 所有提示信息一律写到标准错误。
//!
//! ## 依赖关系
//! - 被 `commands/` 模块使用
//! - 使用 `colored` crate

use colored::Colorize;

/// 打印成功消息
pub fn print_success(msg: &str) {
    eprintln!("{} {}", "[OK]".green().bold(), msg);
}

/// 打印错误消息
pub fn print_error(msg: &str) {
    eprintln!("{} {}", "[ERR]".red().bold(), msg);
}

/// 打印警告消息
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", "[WARN]".yellow().bold(), msg);
}

/// 打印跳过消息
pub fn print_skip(msg: &str) {
    eprintln!("{} {}", "[SKIP]".dimmed(), msg);
}

/// 打印完成消息
pub fn print_done(msg: &str) {
    eprintln!("{} {}", "[DONE]".green().bold(), msg);
}

/// 打印 `源 -> 目标` 形式的转换结果
pub fn print_conversion(from: &str, to: &str, detail: &str) {
    eprintln!(
        "{} {} {} {} {}",
        "[OK]".green().bold(),
        from.dimmed(),
        "->".cyan(),
        to,
        detail
    );
}
