//! # 结果报告
//!
//! 将批处理结果打印为人类可读的信息。失败总是打印；
//! 成功和跳过的文件只在 `--verbose` 下打印（校验模式的 `OK` 除外）。
//!
//! ## 依赖关系
//! - 被 `commands/mod.rs` 调用
//! - 使用 `utils/output.rs`，失败汇总使用 `tabled`

use crate::batch::BatchReport;
use crate::models::{Config, Direction, Outcome, Status};
use crate::utils::output;

use tabled::{Table, Tabled};

/// 失败汇总表的行
#[derive(Debug, Clone, Tabled)]
struct FailureRow {
    #[tabled(rename = "File")]
    file: String,
    #[tabled(rename = "Error")]
    kind: String,
    #[tabled(rename = "Message")]
    message: String,
}

/// 打印全部结果
pub fn print_report(config: &Config, report: &BatchReport) {
    for outcome in &report.outcomes {
        print_outcome(config, outcome);
    }

    if report.is_success() {
        if config.verbose {
            output::print_done(&format!(
                "{}: {} file(s) processed ({} skipped)",
                config.direction,
                report.succeeded(),
                report.skipped()
            ));
        }
        return;
    }

    if report.outcomes.len() > 1 {
        let rows: Vec<FailureRow> = report.failures().filter_map(failure_row).collect();
        eprintln!("\n{}", Table::new(&rows));
    }
    output::print_warning(&format!(
        "{} of {} file(s) failed",
        report.failed(),
        report.outcomes.len()
    ));
}

fn print_outcome(config: &Config, outcome: &Outcome) {
    let source = outcome.source.to_string();
    match &outcome.status {
        Status::Done if config.direction == Direction::Test => {
            output::print_success(&format!("{}: OK", source));
        }
        Status::Done if config.verbose => {
            let target = outcome
                .output
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(stdout)".to_string());
            let detail = outcome
                .counts
                .map(|c| c.ratio_report())
                .unwrap_or_else(|| "done".to_string());
            output::print_conversion(&source, &target, &detail);
        }
        Status::Done => {}
        Status::Skipped(reason) => {
            if config.verbose {
                output::print_skip(&format!("{}: {}", source, reason));
            }
        }
        Status::Failed(e) => output::print_error(&format!("{}: {}", source, e.detail())),
    }
}

fn failure_row(outcome: &Outcome) -> Option<FailureRow> {
    let kind = outcome.error_kind()?;
    outcome.error().map(|e| FailureRow {
        file: outcome.source.to_string(),
        kind: kind.to_string(),
        message: e.detail(),
    })
}
