//! # 数值常量与默认参数
//!
//! 散射计算中使用的全部默认值与稳定性常数。
//! 数值与既有验证数据保持一致，修改会改变绝对强度标度。
//!
//! ## 依赖关系
//! - 被 `sas/` 各子模块和 `cli/` 默认参数使用
//! - 无外部依赖

/// p(r) 直方图默认 bin 数
pub const DEFAULT_PR_POINTS: usize = 100;

/// 多分散积分中的尺寸采样点数
pub const POLYDISPERSITY_SAMPLES: usize = 10;

/// 多分散积分范围：1 ± WIDTH·σ
pub const POLYDISPERSITY_WIDTH: f64 = 3.0;

/// r_max 相对最大距离的余量
pub const R_MAX_MARGIN: f64 = 1.05;

/// 解耦近似中 Beta(q) 分子分母的稳定项
pub const DECOUPLING_EPS: f64 = 1e-3;

/// I0 为零时的替代值
pub const I0_FLOOR: f64 = 1e-5;

/// I0 经验标度，使默认参数下 I(0) 约为 1
pub const I0_SCALE: f64 = 1e-4;

/// 默认 q 采样
pub const DEFAULT_QMIN: f64 = 0.001;
pub const DEFAULT_QMAX: f64 = 0.5;
pub const DEFAULT_QPOINTS: usize = 400;

/// 默认体积分数
pub const DEFAULT_CONC: f64 = 0.02;

/// 硬球结构因子默认半径（Å）
pub const DEFAULT_R_HS: f64 = 50.0;

/// 聚集结构因子默认参数
pub const DEFAULT_R_EFF: f64 = 50.0;
pub const DEFAULT_N_AGGR: usize = 80;
pub const DEFAULT_FRAC_AGGR: f64 = 0.1;

/// A = 2·R_HS·q 小于该值时使用 Percus–Yevick 级数展开
pub const HS_SERIES_CUTOFF: f64 = 0.1;
