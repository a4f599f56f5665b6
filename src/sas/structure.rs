//! # 结构因子
//!
//! 三种理想结构因子 S(q)，通过 `StructureDecouplingApprox` 组合为 S_eff(q)：
//! - `None`: S(q) = 1
//! - `HardSphere`: Percus–Yevick 硬球闭合
//! - `Aggregation`: 维数为 2 的分形聚集体，按聚集分数与非聚集部分线性混合
//!
//! ## 公式（硬球，A = 2·R_HS·q，η 为体积分数）
//! ```text
//! a = (1+2η)²/(1-η)⁴,  b = -6η(1+η/2)²/(1-η)⁴,  c = η·a/2
//! G(A) = a·fa/A² + b·fb/A³ + c·fc/A⁵
//! S_HS = 1 / (1 + 24η·G(A)/A)
//! ```
//! A 很小时直接求值存在严重的消去误差，改用级数展开；
//! A → 0 的极限为可压缩性关系 (1-η)⁴/(1+2η)²。
//!
//! ## 参考
//! - Kinning & Thomas, Macromolecules 17, 1712 (1984)
//!
//! ## 依赖关系
//! - 被 `sas/calculator.rs` 调用
//! - 使用 `sas/decoupling.rs`

use crate::error::{Result, SasError};
use crate::sas::constants::{
    DEFAULT_CONC, DEFAULT_FRAC_AGGR, DEFAULT_N_AGGR, DEFAULT_R_EFF, DEFAULT_R_HS,
    HS_SERIES_CUTOFF,
};
use crate::sas::decoupling::StructureDecouplingApprox;

/// 结构因子选择
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum StructureFactor {
    /// 无结构因子，S(q) = 1
    #[default]
    None,
    /// Percus–Yevick 硬球
    HardSphere {
        /// 体积分数 η
        conc: f64,
        /// 硬球半径（Å）
        r_hs: f64,
    },
    /// 分形聚集体
    Aggregation {
        /// 单颗粒有效半径（Å）
        r_eff: f64,
        /// 每个聚集体中的颗粒数
        n_aggr: usize,
        /// 处于聚集态的物质分数
        frac: f64,
    },
}

impl std::fmt::Display for StructureFactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StructureFactor::None => write!(f, "None"),
            StructureFactor::HardSphere { conc, r_hs } => {
                write!(f, "HS (conc = {}, R_HS = {} Å)", conc, r_hs)
            }
            StructureFactor::Aggregation {
                r_eff,
                n_aggr,
                frac,
            } => write!(
                f,
                "Aggregation (R_eff = {} Å, N_aggr = {}, frac = {})",
                r_eff, n_aggr, frac
            ),
        }
    }
}

impl StructureFactor {
    /// 按名称与参数列表构造，缺失参数取默认值
    ///
    /// - `None`
    /// - `HS`: [conc, r_hs]
    /// - `Aggregation`: [r_eff, n_aggr, frac]
    pub fn from_name(name: &str, params: &[f64]) -> Result<Self> {
        let param = |i: usize, default: f64| params.get(i).copied().unwrap_or(default);

        let sf = match name.trim().to_lowercase().as_str() {
            "none" | "" => StructureFactor::None,
            "hs" | "hardsphere" | "hard-sphere" | "hard_sphere" => StructureFactor::HardSphere {
                conc: param(0, DEFAULT_CONC),
                r_hs: param(1, DEFAULT_R_HS),
            },
            "aggregation" | "aggr" => {
                let n_aggr = param(1, DEFAULT_N_AGGR as f64);
                if n_aggr < 1.0 || n_aggr.fract() != 0.0 {
                    return Err(SasError::invalid_parameter(
                        "N_aggr",
                        format!("must be a positive integer, got {}", n_aggr),
                    ));
                }
                StructureFactor::Aggregation {
                    r_eff: param(0, DEFAULT_R_EFF),
                    n_aggr: n_aggr as usize,
                    frac: param(2, DEFAULT_FRAC_AGGR),
                }
            }
            other => {
                return Err(SasError::invalid_parameter(
                    "structure factor",
                    format!("unknown type '{}' (expected None, HS or Aggregation)", other),
                ))
            }
        };
        sf.validate()?;
        Ok(sf)
    }

    /// 参数合法性检查
    pub fn validate(&self) -> Result<()> {
        match *self {
            StructureFactor::None => Ok(()),
            StructureFactor::HardSphere { conc, r_hs } => {
                if !conc.is_finite() || !(0.0..1.0).contains(&conc) {
                    return Err(SasError::invalid_parameter(
                        "conc",
                        format!("hard-sphere volume fraction must be in [0, 1), got {}", conc),
                    ));
                }
                if !r_hs.is_finite() || r_hs < 0.0 {
                    return Err(SasError::invalid_parameter(
                        "R_HS",
                        format!("must be >= 0, got {}", r_hs),
                    ));
                }
                Ok(())
            }
            StructureFactor::Aggregation {
                r_eff,
                n_aggr,
                frac,
            } => {
                if !frac.is_finite() || !(0.0..=1.0).contains(&frac) {
                    return Err(SasError::invalid_parameter(
                        "fracs_aggr",
                        format!("must be in [0, 1], got {}", frac),
                    ));
                }
                if n_aggr == 0 {
                    return Err(SasError::invalid_parameter("N_aggr", "must be at least 1"));
                }
                if !r_eff.is_finite() || r_eff < 0.0 {
                    return Err(SasError::invalid_parameter(
                        "R_eff",
                        format!("must be >= 0, got {}", r_eff),
                    ));
                }
                Ok(())
            }
        }
    }

    /// 理想结构因子 S(q)
    pub fn ideal(&self, q: &[f64]) -> Vec<f64> {
        match *self {
            StructureFactor::None => vec![1.0; q.len()],
            StructureFactor::HardSphere { conc, r_hs } => hard_sphere(q, conc, r_hs),
            StructureFactor::Aggregation { r_eff, n_aggr, .. } => aggregation(q, r_eff, n_aggr),
        }
    }

    /// 有效结构因子 S_eff(q)
    pub fn structure_eff(
        &self,
        approx: &StructureDecouplingApprox,
        pq: &[f64],
    ) -> Result<Vec<f64>> {
        self.validate()?;
        let q = approx.q();
        if pq.len() != q.len() {
            return Err(SasError::shape_mismatch("P(q)", q.len(), pq.len()));
        }

        match *self {
            StructureFactor::None => Ok(vec![1.0; q.len()]),
            StructureFactor::HardSphere { .. } => approx.decoupling_approx(pq, &self.ideal(q)),
            StructureFactor::Aggregation { frac, .. } => {
                let s_full = approx.decoupling_approx(pq, &self.ideal(q))?;
                Ok(s_full
                    .into_iter()
                    .map(|s| (1.0 - frac) + frac * s)
                    .collect())
            }
        }
    }
}

/// Percus–Yevick 硬球结构因子
pub fn hard_sphere(q: &[f64], conc: f64, r_hs: f64) -> Vec<f64> {
    if conc == 0.0 {
        return vec![1.0; q.len()];
    }
    let eta = conc;
    let denom = (1.0 - eta).powi(4);
    let a = (1.0 + 2.0 * eta).powi(2) / denom;
    let b = -6.0 * eta * (1.0 + eta / 2.0).powi(2) / denom;
    let c = eta * a / 2.0;

    q.iter()
        .map(|&qi| {
            let big_a = 2.0 * r_hs * qi;
            let g_over_a = if big_a.abs() < HS_SERIES_CUTOFF {
                hs_g_over_a_series(big_a, a, b, c)
            } else {
                hs_g_over_a(big_a, a, b, c)
            };
            1.0 / (1.0 + 24.0 * eta * g_over_a)
        })
        .collect()
}

/// G(A)/A 直接求值
fn hs_g_over_a(x: f64, a: f64, b: f64, c: f64) -> f64 {
    let (sin, cos) = x.sin_cos();
    let x2 = x * x;
    let fa = sin - x * cos;
    let fb = 2.0 * x * sin + (2.0 - x2) * cos - 2.0;
    let fc = -x2 * x2 * cos + 4.0 * ((3.0 * x2 - 6.0) * cos + (x2 * x - 6.0 * x) * sin + 6.0);
    let g = a * fa / x2 + b * fb / (x2 * x) + c * fc / (x2 * x2 * x);
    g / x
}

/// G(A)/A 的小 A 展开，截断到 A⁴
fn hs_g_over_a_series(x: f64, a: f64, b: f64, c: f64) -> f64 {
    let x2 = x * x;
    let x4 = x2 * x2;
    a * (1.0 / 3.0 - x2 / 30.0 + x4 / 840.0)
        + b * (1.0 / 4.0 - x2 / 36.0 + x4 / 960.0)
        + c * (1.0 / 6.0 - x2 / 48.0 + x4 / 1200.0)
}

/// 分形聚集结构因子（维数 2）
pub fn aggregation(q: &[f64], r_eff: f64, n_aggr: usize) -> Vec<f64> {
    let n = n_aggr as f64;
    q.iter()
        .map(|&qi| {
            let qr = qi * r_eff;
            1.0 + (n - 1.0) / (1.0 + qr * qr * n / 3.0)
        })
        .collect()
}
