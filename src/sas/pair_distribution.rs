//! # 对比度加权对距离分布 p(r)
//!
//! 由点云计算全部有序点对 (i, j) 的距离与对比度乘积，分箱得到 p(r)、
//! 归一化 p(r) 与回转半径 Rg。
//!
//! ## 算法概述
//! 1. 计算 N² 个对距离（含 i = j 的自距离 0），以 f32 存储
//! 2. 计算 N² 个对比度权重 p_i·p_j
//! 3. 去除自距离后加权分箱（见 `sas/histogram.rs`）
//! 4. pr_norm = pr / max(pr)，随后 pr /= N²
//!
//! ## 依赖关系
//! - 被 `sas/calculator.rs` 和 `commands/pr.rs` 调用
//! - 使用 `sas/histogram.rs` 分箱
//! - 使用 `rayon` 按行并行计算距离矩阵

use crate::error::{Result, SasError};
use crate::models::{PairDistribution, Subunit};
use crate::sas::histogram::{Histogram, HistogramBinner};
use crate::sas::math::max_value;

use rayon::prelude::*;

/// 点云的加权对距离分布计算器
pub struct WeightedPairDistribution<'a> {
    points: &'a Subunit,
}

impl<'a> WeightedPairDistribution<'a> {
    pub fn new(points: &'a Subunit) -> Self {
        Self { points }
    }

    /// 点数
    pub fn n_points(&self) -> usize {
        self.points.len()
    }

    /// 全部有序点对的欧氏距离，行优先展平为 N² 向量
    pub fn calc_all_dist(&self) -> Vec<f32> {
        let n = self.points.len();
        let (x, y, z) = (&self.points.x, &self.points.y, &self.points.z);
        let mut dist = vec![0.0_f32; n * n];
        if n == 0 {
            return dist;
        }

        dist.par_chunks_mut(n).enumerate().for_each(|(i, row)| {
            let (xi, yi, zi) = (x[i], y[i], z[i]);
            for (j, d) in row.iter_mut().enumerate() {
                let dx = xi - x[j];
                let dy = yi - y[j];
                let dz = zi - z[j];
                *d = (dx * dx + dy * dy + dz * dz).sqrt() as f32;
            }
        });

        dist
    }

    /// 全部有序点对的对比度乘积 p_i·p_j，与 `calc_all_dist` 同序
    pub fn calc_all_contrasts(&self) -> Vec<f64> {
        let n = self.points.len();
        let p = &self.points.p;
        let mut contrast = vec![0.0; n * n];
        if n == 0 {
            return contrast;
        }

        contrast.par_chunks_mut(n).enumerate().for_each(|(i, row)| {
            let pi = p[i];
            for (c, &pj) in row.iter_mut().zip(p) {
                *c = pi * pj;
            }
        });

        contrast
    }

    /// 加权直方图 h(r)
    pub fn calc_hr(
        dist: &[f32],
        nbins: usize,
        contrast: &[f64],
        polydispersity: f64,
    ) -> Result<Histogram> {
        HistogramBinner::new(nbins, polydispersity)?.bin(dist, contrast)
    }

    /// 回转半径 Rg = sqrt(|Σ p(r)·r² / Σ p(r)| / 2)
    pub fn calc_rg(r: &[f64], pr: &[f64]) -> Result<f64> {
        if r.len() != pr.len() {
            return Err(SasError::shape_mismatch("p(r)", r.len(), pr.len()));
        }
        let sum_pr: f64 = pr.iter().sum();
        if sum_pr == 0.0 {
            return Err(SasError::DegenerateHistogram(
                "sum of p(r) is zero, Rg is undefined".to_string(),
            ));
        }
        let sum_pr_r2: f64 = r.iter().zip(pr).map(|(ri, pi)| pi * ri * ri).sum();
        Ok(((sum_pr_r2 / sum_pr).abs() / 2.0).sqrt())
    }

    /// 计算 p(r)，返回 bin 中心、除以 N² 的 p(r) 与峰值归一化 p(r)
    pub fn calc_pr(&self, nbins: usize, polydispersity: f64) -> Result<PairDistribution> {
        let binner = HistogramBinner::new(nbins, polydispersity)?;
        self.check_model()?;

        let mut dist = self.calc_all_dist();
        let mut contrast = self.calc_all_contrasts();
        strip_self_pairs(&mut dist, &mut contrast);
        if dist.is_empty() {
            return Err(SasError::EmptyModel(
                "model has no pairs of distinct points".to_string(),
            ));
        }

        let hist = binner.bin(&dist, &contrast)?;
        drop(dist);
        drop(contrast);

        let mut pr = hist.values;
        let pr_max = max_value(&pr).unwrap_or(0.0);
        if pr_max == 0.0 {
            return Err(SasError::DegenerateHistogram(
                "max(p(r)) is zero, cannot normalise".to_string(),
            ));
        }
        let pr_norm: Vec<f64> = pr.iter().map(|v| v / pr_max).collect();

        let n2 = (self.n_points() * self.n_points()) as f64;
        for v in pr.iter_mut() {
            *v /= n2;
        }

        Ok(PairDistribution {
            r: hist.r,
            pr,
            pr_norm,
        })
    }

    /// 包含自距离项的 h(r)，用于诊断
    pub fn calc_hr_with_self_terms(&self, nbins: usize, polydispersity: f64) -> Result<Histogram> {
        self.check_model()?;

        let dist = self.calc_all_dist();
        let contrast = self.calc_all_contrasts();
        Self::calc_hr(&dist, nbins, &contrast, polydispersity)
    }

    fn check_model(&self) -> Result<()> {
        if self.points.is_empty() {
            return Err(SasError::EmptyModel("point cloud has no points".to_string()));
        }
        if self.points.all_zero_contrast() {
            return Err(SasError::EmptyModel(
                "all points have zero contrast".to_string(),
            ));
        }
        Ok(())
    }
}

/// 原地移除距离为 0 的点对（自距离及重合点）
fn strip_self_pairs(dist: &mut Vec<f32>, contrast: &mut Vec<f64>) {
    let mut kept = 0;
    for k in 0..dist.len() {
        if dist[k] != 0.0 {
            dist[kept] = dist[k];
            contrast[kept] = contrast[k];
            kept += 1;
        }
    }
    dist.truncate(kept);
    contrast.truncate(kept);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sas::testing::uniform_sphere;

    fn two_points() -> Subunit {
        Subunit::new(
            vec![0.0, 3.0],
            vec![0.0, 4.0],
            vec![0.0, 0.0],
            vec![2.0, -1.0],
        )
        .unwrap()
    }

    #[test]
    fn test_all_dist_and_contrasts() {
        let points = two_points();
        let wpd = WeightedPairDistribution::new(&points);

        assert_eq!(wpd.calc_all_dist(), vec![0.0, 5.0, 5.0, 0.0]);
        assert_eq!(wpd.calc_all_contrasts(), vec![4.0, -2.0, -2.0, 1.0]);
    }

    #[test]
    fn test_strip_self_pairs() {
        let mut d = vec![0.0_f32, 1.0, 0.0, 2.0];
        let mut c = vec![9.0, 1.0, 9.0, 2.0];
        strip_self_pairs(&mut d, &mut c);
        assert_eq!(d, vec![1.0, 2.0]);
        assert_eq!(c, vec![1.0, 2.0]);
    }

    #[test]
    fn test_pr_normalisation() {
        let points = uniform_sphere(400, 15.0, 1.0, 7);
        let wpd = WeightedPairDistribution::new(&points);
        let pd = wpd.calc_pr(80, 0.0).unwrap();

        assert_eq!(pd.r.len(), 80);
        let max_norm = max_value(&pd.pr_norm).unwrap();
        assert_eq!(max_norm, 1.0);

        // pr 与 pr_norm 只差一个常数因子
        let pr_max = max_value(&pd.pr).unwrap();
        for (a, b) in pd.pr.iter().zip(&pd.pr_norm) {
            assert!((a / pr_max - b).abs() < 1e-12);
        }

        // 归一化前总和为 N(N-1)，除以 N² 后接近 1
        let total: f64 = pd.pr.iter().sum();
        let expected = (400.0 * 399.0) / (400.0 * 400.0);
        assert!((total - expected).abs() < 1e-9, "sum p(r) = {}", total);
    }

    #[test]
    fn test_sphere_scenario() {
        let radius = 20.0;
        let points = uniform_sphere(1000, radius, 1.0, 42);
        let wpd = WeightedPairDistribution::new(&points);
        let pd = wpd.calc_pr(200, 0.0).unwrap();

        // 单峰，峰位约在 r ≈ 1.05 R
        let peak = pd
            .pr_norm
            .iter()
            .position(|&v| v == 1.0)
            .map(|i| pd.r[i])
            .unwrap();
        assert!(peak > 17.0 && peak < 25.0, "p(r) peak at {}", peak);

        // 2R·1.05 以外为零
        for (r, v) in pd.r.iter().zip(&pd.pr_norm) {
            if *r > 2.0 * radius * 1.05 {
                assert_eq!(*v, 0.0);
            }
        }

        let rg = WeightedPairDistribution::calc_rg(&pd.r, &pd.pr).unwrap();
        let analytic = radius * (3.0_f64 / 5.0).sqrt();
        assert!(
            (rg - analytic).abs() / analytic < 0.1,
            "Rg = {}, analytic = {}",
            rg,
            analytic
        );
    }

    #[test]
    fn test_rg_converges_with_density() {
        let radius = 10.0;
        let analytic = radius * (3.0_f64 / 5.0).sqrt();
        let points = uniform_sphere(1500, radius, 1.0, 3);
        let pd = WeightedPairDistribution::new(&points)
            .calc_pr(300, 0.0)
            .unwrap();
        let rg = WeightedPairDistribution::calc_rg(&pd.r, &pd.pr).unwrap();
        assert!(
            (rg - analytic).abs() / analytic < 0.03,
            "Rg = {}, analytic = {}",
            rg,
            analytic
        );
    }

    #[test]
    fn test_polydispersity_widens_pr() {
        let points = uniform_sphere(300, 10.0, 1.0, 11);
        let wpd = WeightedPairDistribution::new(&points);
        let mono = wpd.calc_pr(100, 0.0).unwrap();
        let poly = wpd.calc_pr(100, 0.1).unwrap();

        let last = |pd: &PairDistribution| {
            pd.r.iter()
                .zip(&pd.pr)
                .filter(|(_, v)| **v > 0.0)
                .map(|(r, _)| *r)
                .fold(0.0, f64::max)
        };
        assert!(last(&poly) > last(&mono));
        assert_eq!(max_value(&poly.pr_norm).unwrap(), 1.0);
    }

    #[test]
    fn test_self_terms_in_first_bin() {
        let points = two_points();
        let wpd = WeightedPairDistribution::new(&points);
        let h = wpd.calc_hr_with_self_terms(10, 0.0).unwrap();

        // 自距离贡献 p_i² 之和
        assert_eq!(h.values[0], 5.0);
        assert_eq!(h.values[9], -4.0);
    }

    #[test]
    fn test_empty_model_errors() {
        let empty = Subunit::default();
        assert!(matches!(
            WeightedPairDistribution::new(&empty).calc_pr(10, 0.0),
            Err(SasError::EmptyModel(_))
        ));

        let zero = Subunit::new(vec![0.0, 1.0], vec![0.0; 2], vec![0.0; 2], vec![0.0; 2]).unwrap();
        assert!(matches!(
            WeightedPairDistribution::new(&zero).calc_pr(10, 0.0),
            Err(SasError::EmptyModel(_))
        ));

        let single = Subunit::new(vec![1.0], vec![1.0], vec![1.0], vec![1.0]).unwrap();
        assert!(matches!(
            WeightedPairDistribution::new(&single).calc_pr(10, 0.0),
            Err(SasError::EmptyModel(_))
        ));
    }

    #[test]
    fn test_negative_histogram_is_degenerate() {
        // 只有一对异号点：唯一非零 bin 为负
        let points = two_points();
        let err = WeightedPairDistribution::new(&points).calc_pr(10, 0.0);
        assert!(matches!(err, Err(SasError::DegenerateHistogram(_))));
    }

    #[test]
    fn test_invalid_bins() {
        let points = two_points();
        assert!(matches!(
            WeightedPairDistribution::new(&points).calc_pr(0, 0.0),
            Err(SasError::InvalidParameter { .. })
        ));
    }
}
