//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `parsers/`, `sas/`, `batch/`, `utils/`
//! - 子模块: simulate, pr

pub mod pr;
pub mod simulate;

use crate::batch::BatchResult;
use crate::cli::Commands;
use crate::error::{Result, SasError};
use crate::utils::output;

use std::fs;
use std::path::Path;

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Simulate(args) => simulate::execute(args),
        Commands::Pr(args) => pr::execute(args),
    }
}

/// 确保输出目录存在
pub(crate) fn ensure_output_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| SasError::FileWriteError {
        path: dir.display().to_string(),
        source: e,
    })
}

/// 打印批量处理统计
pub(crate) fn report_batch(result: &BatchResult) {
    output::print_separator();
    output::print_success(&format!(
        "Batch complete: {} files, {} success, {} skipped, {} failed",
        result.total(),
        result.success,
        result.skipped,
        result.failed
    ));

    if !result.failures.is_empty() {
        output::print_warning("Failed files:");
        for (path, err) in result.failures.iter().take(10) {
            output::print_error(&format!("  {}: {}", path, err));
        }
        if result.failures.len() > 10 {
            output::print_warning(&format!("  ... and {} more", result.failures.len() - 10));
        }
    }
}
