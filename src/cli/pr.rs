//! # pr 子命令 CLI 定义
//!
//! 只计算对距离分布 p(r) 与 Rg。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/pr.rs`

use crate::cli::{InputArgs, PlotFormat, PrOptions};

use clap::Args;

/// pr 子命令参数
#[derive(Args, Debug, Clone)]
pub struct PrArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub pr: PrOptions,

    /// Keep self pairs (r = 0) in the histogram, for diagnostics
    #[arg(long, default_value_t = false)]
    pub self_terms: bool,

    /// Plot format for p(r)
    #[arg(long, value_enum, default_value = "none")]
    pub plot: PlotFormat,
}
