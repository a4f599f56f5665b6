//! # 解耦近似 (decoupling approximation)
//!
//! 计算取向平均的零阶散射振幅 A00(q)，并将理想结构因子 S(q)
//! 与形状因子 P(q) 组合为有效结构因子：
//!
//! ```text
//! A00(q)   = Σᵢ pᵢ · sinc(q · dᵢ) / A00(q₀)
//! Beta(q)  = (A00(q)² + ε) / (P(q) + ε)
//! S_eff(q) = 1 + Beta(q) · (S(q) - 1)
//! ```
//!
//! 其中 dᵢ 为各点到 |p| 加权质心的距离，ε = 1e-3。
//!
//! ## 参考
//! - Kotlarchyk & Chen, J. Chem. Phys. 79, 2461 (1983)
//!
//! ## 依赖关系
//! - 被 `sas/structure.rs` 调用
//! - 使用 `rayon` 对 q 并行求和

use crate::error::{Result, SasError};
use crate::models::Subunit;
use crate::sas::constants::DECOUPLING_EPS;
use crate::sas::math::sinc;

use rayon::prelude::*;

/// 解耦近似的公共计算上下文
pub struct StructureDecouplingApprox<'a> {
    q: &'a [f64],
    points: &'a Subunit,
}

impl<'a> StructureDecouplingApprox<'a> {
    pub fn new(q: &'a [f64], points: &'a Subunit) -> Self {
        Self { q, points }
    }

    pub fn q(&self) -> &[f64] {
        self.q
    }

    /// 以 |p| 为权重的质心
    pub fn center_of_mass(&self) -> [f64; 3] {
        let p = &self.points.p;
        let total: f64 = p.iter().map(|c| c.abs()).sum();

        // 全部对比度为零时退化为几何中心
        let (weights, total): (Vec<f64>, f64) = if total == 0.0 {
            (vec![1.0; p.len()], p.len() as f64)
        } else {
            (p.iter().map(|c| c.abs()).collect(), total)
        };
        if total == 0.0 {
            return [0.0; 3];
        }

        let weighted = |coords: &[f64]| -> f64 {
            coords.iter().zip(&weights).map(|(c, w)| c * w).sum::<f64>() / total
        };
        [
            weighted(&self.points.x),
            weighted(&self.points.y),
            weighted(&self.points.z),
        ]
    }

    /// 每个点到质心的距离
    pub fn calc_com_dist(&self) -> Vec<f64> {
        let com = self.center_of_mass();
        self.points
            .x
            .iter()
            .zip(&self.points.y)
            .zip(&self.points.z)
            .map(|((x, y), z)| {
                let dx = x - com[0];
                let dy = y - com[1];
                let dz = z - com[2];
                (dx * dx + dy * dy + dz * dz).sqrt()
            })
            .collect()
    }

    /// 归一化零阶振幅 A00(q)，A00[0] = 1
    pub fn calc_a00(&self) -> Result<Vec<f64>> {
        if self.q.is_empty() {
            return Err(SasError::invalid_parameter("q", "q grid is empty"));
        }
        if self.points.is_empty() {
            return Err(SasError::EmptyModel("point cloud has no points".to_string()));
        }

        let d = self.calc_com_dist();
        let p = &self.points.p;
        let a00: Vec<f64> = self
            .q
            .par_iter()
            .map(|&q| p.iter().zip(&d).map(|(pi, di)| pi * sinc(q * di)).sum())
            .collect();

        let a0 = a00[0];
        if a0 == 0.0 || !a0.is_finite() {
            return Err(SasError::DegenerateAmplitude(format!(
                "A00 at q = {} is {}, cannot normalise",
                self.q[0], a0
            )));
        }
        Ok(a00.into_iter().map(|a| a / a0).collect())
    }

    /// 由 P(q) 与理想 S(q) 计算有效结构因子
    pub fn decoupling_approx(&self, pq: &[f64], s: &[f64]) -> Result<Vec<f64>> {
        let nq = self.q.len();
        if pq.len() != nq {
            return Err(SasError::shape_mismatch("P(q)", nq, pq.len()));
        }
        if s.len() != nq {
            return Err(SasError::shape_mismatch("S(q)", nq, s.len()));
        }

        let a00 = self.calc_a00()?;
        Ok(a00
            .iter()
            .zip(pq)
            .zip(s)
            .map(|((a, p), s)| {
                let beta = (a * a + DECOUPLING_EPS) / (p + DECOUPLING_EPS);
                1.0 + beta * (s - 1.0)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sas::math::linspace;
    use crate::sas::testing::uniform_sphere;

    #[test]
    fn test_center_of_mass_weighted_by_abs_contrast() {
        let points = Subunit::new(
            vec![0.0, 10.0],
            vec![0.0, 0.0],
            vec![0.0, 0.0],
            vec![3.0, -1.0],
        )
        .unwrap();
        let q = [0.0];
        let approx = StructureDecouplingApprox::new(&q, &points);

        let com = approx.center_of_mass();
        assert!((com[0] - 2.5).abs() < 1e-12);
        assert_eq!(approx.calc_com_dist(), vec![2.5, 7.5]);
    }

    #[test]
    fn test_center_of_mass_zero_contrast_fallback() {
        let points = Subunit::new(
            vec![0.0, 4.0],
            vec![2.0, 2.0],
            vec![0.0, 0.0],
            vec![0.0, 0.0],
        )
        .unwrap();
        let q = [0.1];
        let approx = StructureDecouplingApprox::new(&q, &points);
        assert_eq!(approx.center_of_mass(), [2.0, 2.0, 0.0]);
    }

    #[test]
    fn test_a00_normalised_at_first_q() {
        let points = uniform_sphere(300, 20.0, 1.0, 5);
        let q = linspace(0.0, 0.5, 50);
        let approx = StructureDecouplingApprox::new(&q, &points);
        let a00 = approx.calc_a00().unwrap();

        assert_eq!(a00.len(), 50);
        assert_eq!(a00[0], 1.0);
        assert!(a00[1] < 1.0);

        let q = linspace(0.01, 0.5, 50);
        let approx = StructureDecouplingApprox::new(&q, &points);
        assert_eq!(approx.calc_a00().unwrap()[0], 1.0);
    }

    #[test]
    fn test_decoupling_identity_when_s_is_one() {
        let points = uniform_sphere(100, 10.0, 1.0, 9);
        let q = linspace(0.001, 0.5, 20);
        let approx = StructureDecouplingApprox::new(&q, &points);
        let pq: Vec<f64> = q.iter().map(|x| (-x * x * 30.0).exp()).collect();
        let s = vec![1.0; 20];

        let s_eff = approx.decoupling_approx(&pq, &s).unwrap();
        assert!(s_eff.iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_decoupling_shape_mismatch() {
        let points = uniform_sphere(10, 5.0, 1.0, 1);
        let q = linspace(0.001, 0.5, 10);
        let approx = StructureDecouplingApprox::new(&q, &points);

        let err = approx.decoupling_approx(&[1.0; 9], &[1.0; 10]);
        assert!(matches!(err, Err(SasError::ShapeMismatch { .. })));
        let err = approx.decoupling_approx(&[1.0; 10], &[1.0; 11]);
        assert!(matches!(err, Err(SasError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_a00_degenerate_for_cancelling_contrast() {
        let points = Subunit::new(
            vec![1.0, -1.0],
            vec![0.0, 0.0],
            vec![0.0, 0.0],
            vec![1.0, -1.0],
        )
        .unwrap();
        let q = [0.0, 0.1];
        let approx = StructureDecouplingApprox::new(&q, &points);
        assert!(matches!(
            approx.calc_a00(),
            Err(SasError::DegenerateAmplitude(_))
        ));
    }
}
