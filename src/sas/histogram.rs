//! # 加权对距离直方图
//!
//! 将对距离与对比度权重分箱为 p(r)，并可选地对尺寸多分散做数值积分。
//!
//! ## 算法
//! - r_max = max(dist)·1.05；多分散时 r_max = max(dist)·(1+3σ)·1.05
//! - `Nbins` 个等宽 bin 覆盖 [0, r_max]，最后一个 bin 包含右端点
//! - 多分散：尺寸因子 d 在 1 ± 3σ 上取 10 点，
//!   h(r) = Σ h_d(r)·w(d)·d⁶ / Σ w(d)·d⁶，w(d) = exp(-((1-d)/σ)²/2)
//!
//! ## 依赖关系
//! - 被 `sas/pair_distribution.rs` 调用
//! - 使用 `rayon` 并行累加

use crate::error::{Result, SasError};
use crate::sas::constants::{POLYDISPERSITY_SAMPLES, POLYDISPERSITY_WIDTH, R_MAX_MARGIN};
use crate::sas::math::linspace;

use rayon::prelude::*;

/// 每个并行任务处理的对数
const CHUNK: usize = 1 << 16;

/// 分箱结果
#[derive(Debug, Clone)]
pub struct Histogram {
    /// bin 中心
    pub r: Vec<f64>,
    /// 每个 bin 的加权和
    pub values: Vec<f64>,
    pub r_max: f64,
    pub dr: f64,
}

/// 直方图分箱器
#[derive(Debug, Clone, Copy)]
pub struct HistogramBinner {
    nbins: usize,
    polydispersity: f64,
}

impl HistogramBinner {
    /// 创建分箱器，`nbins > 0` 且 `polydispersity >= 0`
    pub fn new(nbins: usize, polydispersity: f64) -> Result<Self> {
        if nbins == 0 {
            return Err(SasError::invalid_parameter(
                "Nbins",
                "number of p(r) bins must be positive",
            ));
        }
        if !polydispersity.is_finite() || polydispersity < 0.0 {
            return Err(SasError::invalid_parameter(
                "polydispersity",
                format!("must be a finite value >= 0, got {}", polydispersity),
            ));
        }
        Ok(Self {
            nbins,
            polydispersity,
        })
    }

    /// 由最大对距离求直方图上限
    pub fn r_max(&self, max_dist: f64) -> f64 {
        if self.polydispersity == 0.0 {
            max_dist * R_MAX_MARGIN
        } else {
            let d_max = max_dist * (1.0 + POLYDISPERSITY_WIDTH * self.polydispersity);
            d_max * R_MAX_MARGIN
        }
    }

    /// 多分散积分的尺寸因子
    pub fn size_factors(&self) -> Vec<f64> {
        let half = POLYDISPERSITY_WIDTH * self.polydispersity;
        linspace(1.0 - half, 1.0 + half, POLYDISPERSITY_SAMPLES)
    }

    /// 尺寸因子 d 的高斯权重
    fn size_weight(&self, d: f64) -> f64 {
        let x = (1.0 - d) / self.polydispersity;
        (-x * x / 2.0).exp()
    }

    /// 对 `dist` 以 `weights` 加权分箱
    pub fn bin(&self, dist: &[f32], weights: &[f64]) -> Result<Histogram> {
        if weights.len() != dist.len() {
            return Err(SasError::shape_mismatch(
                "pair contrasts",
                dist.len(),
                weights.len(),
            ));
        }
        if dist.is_empty() {
            return Err(SasError::EmptyModel(
                "no pair distances to histogram".to_string(),
            ));
        }

        let max_dist = dist
            .par_iter()
            .copied()
            .reduce(|| 0.0_f32, f32::max) as f64;
        let r_max = self.r_max(max_dist);
        if !(r_max > 0.0) || !r_max.is_finite() {
            return Err(SasError::DegenerateHistogram(format!(
                "maximum pair distance is {}, histogram range would be empty",
                max_dist
            )));
        }
        let dr = r_max / self.nbins as f64;

        let values = if self.polydispersity == 0.0 {
            weighted_histogram(dist, weights, 1.0, self.nbins, r_max)
        } else {
            let mut acc = vec![0.0; self.nbins];
            let mut norm = 0.0;
            for d in self.size_factors() {
                let vol = d * d * d;
                let factor = self.size_weight(d) * vol * vol;
                let h = weighted_histogram(dist, weights, d, self.nbins, r_max);
                for (a, v) in acc.iter_mut().zip(&h) {
                    *a += v * factor;
                }
                norm += factor;
            }
            for a in acc.iter_mut() {
                *a /= norm;
            }
            acc
        };

        let r = (0..self.nbins).map(|i| i as f64 * dr + dr / 2.0).collect();

        Ok(Histogram {
            r,
            values,
            r_max,
            dr,
        })
    }
}

/// 加权直方图，距离先乘以 `scale`；落在 [0, r_max] 以外的值忽略
fn weighted_histogram(
    dist: &[f32],
    weights: &[f64],
    scale: f64,
    nbins: usize,
    r_max: f64,
) -> Vec<f64> {
    let inv_dr = nbins as f64 / r_max;

    dist.par_chunks(CHUNK)
        .zip(weights.par_chunks(CHUNK))
        .fold(
            || vec![0.0; nbins],
            |mut acc, (d, w)| {
                for (&di, &wi) in d.iter().zip(w) {
                    if let Some(idx) = bin_index(di as f64 * scale, inv_dr, r_max, nbins) {
                        acc[idx] += wi;
                    }
                }
                acc
            },
        )
        .reduce(
            || vec![0.0; nbins],
            |mut a, b| {
                for (x, y) in a.iter_mut().zip(b) {
                    *x += y;
                }
                a
            },
        )
}

#[inline]
fn bin_index(x: f64, inv_dr: f64, r_max: f64, nbins: usize) -> Option<usize> {
    if !(0.0..=r_max).contains(&x) {
        return None;
    }
    Some(((x * inv_dr) as usize).min(nbins - 1))
}
