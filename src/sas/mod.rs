//! # 小角散射计算模块
//!
//! 由点云模型计算理论小角散射强度 I(q)。
//!
//! ## 子模块
//! - `constants`: 默认参数与稳定性常数
//! - `math`: sinc 与 linspace
//! - `histogram`: 加权直方图与多分散积分
//! - `pair_distribution`: 对距离分布 p(r) 与 Rg
//! - `decoupling`: 零阶振幅 A00 与解耦近似
//! - `structure`: 结构因子 (None / HS / Aggregation)
//! - `theoretical`: P(q), I(0), I(q)
//! - `qsampling`: q 网格
//! - `calculator`: 完整计算流程
//! - `export`: 数据导出
//! - `plot`: 图表生成
//!
//! ## 依赖关系
//! - 被 `commands/` 使用
//! - 使用 `models/`

pub mod calculator;
pub mod constants;
pub mod decoupling;
pub mod export;
pub mod histogram;
pub mod math;
pub mod pair_distribution;
pub mod plot;
pub mod qsampling;
pub mod structure;
pub mod theoretical;

#[cfg(test)]
pub(crate) mod testing;

pub use calculator::ScatteringCalculator;
pub use decoupling::StructureDecouplingApprox;
pub use pair_distribution::WeightedPairDistribution;
pub use qsampling::QSampling;
pub use structure::StructureFactor;
pub use theoretical::TheoreticalIntensity;
