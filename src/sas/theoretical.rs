//! # 理论散射强度
//!
//! 将 p(r) 经 Debye 型直方图变换得到形状因子 P(q) 与 I(0)，
//! 再与有效结构因子和界面粗糙度组合为 I(q)。
//!
//! ## 公式
//! ```text
//! P(q)  = Σᵢ p(rᵢ)·sinc(q·rᵢ) / Σᵢ p(rᵢ)
//! I(0)  = Σᵢ p(rᵢ) · conc · V · 1e-4
//! I(q)  = P(q) · S_eff(q) · exp(-(q·σ_r)²/2)
//! ```
//!
//! ## 依赖关系
//! - 被 `sas/calculator.rs` 调用
//! - 使用 `rayon` 对 q 并行求和

use crate::error::{Result, SasError};
use crate::sas::constants::{I0_FLOOR, I0_SCALE};
use crate::sas::math::sinc;

use rayon::prelude::*;

/// 理论散射强度计算器
pub struct TheoreticalIntensity<'a> {
    q: &'a [f64],
}

impl<'a> TheoreticalIntensity<'a> {
    pub fn new(q: &'a [f64]) -> Self {
        Self { q }
    }

    /// 计算 (I0, P(q))
    pub fn calc_pq(
        &self,
        r: &[f64],
        pr: &[f64],
        conc: f64,
        volume_total: f64,
    ) -> Result<(f64, Vec<f64>)> {
        if r.len() != pr.len() {
            return Err(SasError::shape_mismatch("p(r)", r.len(), pr.len()));
        }
        if !conc.is_finite() || conc < 0.0 {
            return Err(SasError::invalid_parameter(
                "conc",
                format!("concentration must be >= 0, got {}", conc),
            ));
        }

        let mut i0: f64 = pr.iter().sum();
        let pq_raw: Vec<f64> = self
            .q
            .par_iter()
            .map(|&q| r.iter().zip(pr).map(|(ri, pi)| pi * sinc(q * ri)).sum())
            .collect();

        // 归一化使 P(0) = 1
        if i0 == 0.0 {
            i0 = I0_FLOOR;
        } else if i0 < 0.0 {
            i0 = i0.abs();
        }
        let pq: Vec<f64> = pq_raw.into_iter().map(|p| p / i0).collect();

        i0 *= conc * volume_total * I0_SCALE;

        Ok((i0, pq))
    }

    /// 计算 I(q) = P(q)·S_eff(q)，σ_r > 0 时乘以界面粗糙度因子
    pub fn calc_iq(&self, pq: &[f64], s_eff: &[f64], sigma_r: f64) -> Result<Vec<f64>> {
        let nq = self.q.len();
        if pq.len() != nq {
            return Err(SasError::shape_mismatch("P(q)", nq, pq.len()));
        }
        if s_eff.len() != nq {
            return Err(SasError::shape_mismatch("S_eff(q)", nq, s_eff.len()));
        }
        if !sigma_r.is_finite() || sigma_r < 0.0 {
            return Err(SasError::invalid_parameter(
                "sigma_r",
                format!("interface roughness must be >= 0, got {}", sigma_r),
            ));
        }

        let mut iq: Vec<f64> = pq.iter().zip(s_eff).map(|(p, s)| p * s).collect();
        if sigma_r > 0.0 {
            for (i, &q) in iq.iter_mut().zip(self.q) {
                let qs = q * sigma_r;
                *i *= (-qs * qs / 2.0).exp();
            }
        }
        Ok(iq)
    }
}
