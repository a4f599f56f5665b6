//! # 数据模型模块
//!
//! 定义点云、计算参数与散射结果的数据模型。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `sas/` 和 `commands/` 使用
//! - 子模块: point_cloud, system, scattering

pub mod point_cloud;
pub mod scattering;
pub mod system;

pub use point_cloud::{PointCloud, Subunit};
pub use scattering::{PairDistribution, TheoreticalScattering};
pub use system::{ModelSystem, SimulationParameters};
