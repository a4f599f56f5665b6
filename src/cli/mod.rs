//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `simulate`: 由点云计算 p(r)、S_eff(q) 与 I(q)
//! - `pr`: 只计算 p(r) 与 Rg
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: simulate, pr

pub mod pr;
pub mod simulate;

use crate::sas::constants::DEFAULT_PR_POINTS;

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// pointsas - 点云模型的理论小角散射计算
#[derive(Parser)]
#[command(name = "pointsas")]
#[command(version)]
#[command(
    about = "Theoretical small-angle scattering from 3-D point-cloud models",
    long_about = None
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Simulate p(r), S_eff(q) and I(q) for point-cloud model files
    Simulate(simulate::SimulateArgs),

    /// Compute the pair distance distribution p(r) and Rg only
    Pr(pr::PrArgs),
}

/// 输入文件与批量处理参数（两个子命令共用）
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Input: point-cloud file (.dat, .txt, .xyzp, .csv) or directory of such files
    pub input: PathBuf,

    /// Output directory
    #[arg(short, long, default_value = "pointsas_out")]
    pub output: PathBuf,

    /// Comma-separated glob patterns for batch mode
    #[arg(short, long, default_value = "*.dat,*.txt,*.xyzp,*.csv")]
    pub pattern: String,

    /// Recurse into subdirectories (batch mode)
    #[arg(short, long, default_value_t = false)]
    pub recursive: bool,

    /// Number of parallel jobs (0 = auto)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,

    /// Overwrite existing output files
    #[arg(long, default_value_t = false)]
    pub overwrite: bool,

    /// Total particle volume in Å³ (overrides '# volume:' in the input file)
    #[arg(long)]
    pub volume: Option<f64>,
}

/// p(r) 直方图参数（两个子命令共用）
#[derive(Args, Debug, Clone)]
pub struct PrOptions {
    /// Number of p(r) histogram bins
    #[arg(long, default_value_t = DEFAULT_PR_POINTS)]
    pub pr_points: usize,

    /// Relative polydispersity (Gaussian width of the size distribution, >= 0)
    #[arg(long, default_value_t = 0.0)]
    pub polydispersity: f64,
}

/// 图像输出格式
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum PlotFormat {
    /// No plots
    None,
    /// PNG image
    #[default]
    Png,
    /// SVG vector image
    Svg,
}

impl std::fmt::Display for PlotFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlotFormat::None => write!(f, "none"),
            PlotFormat::Png => write!(f, "png"),
            PlotFormat::Svg => write!(f, "svg"),
        }
    }
}
