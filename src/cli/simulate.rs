//! # simulate 子命令 CLI 定义
//!
//! 由点云文件计算理论散射曲线。所有默认值取自 `sas::constants`。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/simulate.rs`

use crate::cli::{InputArgs, PlotFormat, PrOptions};
use crate::sas::constants::{
    DEFAULT_CONC, DEFAULT_FRAC_AGGR, DEFAULT_N_AGGR, DEFAULT_QMAX, DEFAULT_QMIN, DEFAULT_QPOINTS,
    DEFAULT_R_EFF, DEFAULT_R_HS,
};

use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// 结构因子类型
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum StructureKind {
    /// No structure factor, S(q) = 1
    #[default]
    None,
    /// Percus-Yevick hard spheres
    #[value(alias = "hardsphere")]
    Hs,
    /// Fractal aggregates
    #[value(alias = "aggr")]
    Aggregation,
}

impl std::fmt::Display for StructureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StructureKind::None => write!(f, "none"),
            StructureKind::Hs => write!(f, "hs"),
            StructureKind::Aggregation => write!(f, "aggregation"),
        }
    }
}

/// simulate 子命令参数
#[derive(Args, Debug, Clone)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub pr: PrOptions,

    // ─────────────────────────────────────────────────────────────
    // q 网格
    // ─────────────────────────────────────────────────────────────
    /// Minimum q (Å⁻¹) of the uniform grid
    #[arg(long, default_value_t = DEFAULT_QMIN)]
    pub qmin: f64,

    /// Maximum q (Å⁻¹) of the uniform grid
    #[arg(long, default_value_t = DEFAULT_QMAX)]
    pub qmax: f64,

    /// Number of points of the uniform grid
    #[arg(long, default_value_t = DEFAULT_QPOINTS)]
    pub qpoints: usize,

    /// Explicit q values, e.g. "0.01, 0.02 0.05" (replaces the uniform grid)
    #[arg(long = "q", value_name = "LIST", conflicts_with = "q_file")]
    pub q_values: Option<String>,

    /// Read q values from the first column of a text file
    #[arg(long, value_name = "FILE")]
    pub q_file: Option<PathBuf>,

    // ─────────────────────────────────────────────────────────────
    // 结构因子
    // ─────────────────────────────────────────────────────────────
    /// Structure factor model
    #[arg(long, value_enum, default_value = "none")]
    pub structure: StructureKind,

    /// Volume fraction; scales I(0) and sets the hard-sphere packing
    #[arg(long, default_value_t = DEFAULT_CONC)]
    pub conc: f64,

    /// Hard-sphere radius (Å)
    #[arg(long, default_value_t = DEFAULT_R_HS)]
    pub r_hs: f64,

    /// Effective radius of one particle in an aggregate (Å)
    #[arg(long, default_value_t = DEFAULT_R_EFF)]
    pub r_eff: f64,

    /// Number of particles per aggregate
    #[arg(long, default_value_t = DEFAULT_N_AGGR)]
    pub n_aggr: usize,

    /// Fraction of particles in aggregates (0-1)
    #[arg(long, default_value_t = DEFAULT_FRAC_AGGR)]
    pub frac: f64,

    /// Interface roughness σ_r (Å); 0 disables the damping
    #[arg(long, default_value_t = 0.0)]
    pub sigma_r: f64,

    // ─────────────────────────────────────────────────────────────
    // 输出
    // ─────────────────────────────────────────────────────────────
    /// Model name used in output file names (single file mode; default: file stem)
    #[arg(long)]
    pub name: Option<String>,

    /// Also write q, Pq, S_eff, I as CSV
    #[arg(long, default_value_t = false)]
    pub csv: bool,

    /// Plot format for p(r) and I(q)
    #[arg(long, value_enum, default_value = "png")]
    pub plot: PlotFormat,

    /// Also write a PDB file of the point cloud for visualisation
    #[arg(long, default_value_t = false)]
    pub pdb: bool,
}
