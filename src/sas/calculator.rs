//! # 理论散射计算流程
//!
//! 串联各计算步骤，由点云得到完整的 `TheoreticalScattering`。
//!
//! ## 算法概述
//! 1. 拼接所有子单元为一个点云
//! 2. 计算 p(r)、pr_norm 与 Rg
//! 3. Debye 变换得到 P(q) 与 I(0)
//! 4. 解耦近似得到有效结构因子 S_eff(q)
//! 5. 组合 I(q) 并施加界面粗糙度
//!
//! ## 依赖关系
//! - 被 `commands/simulate.rs` 调用
//! - 使用 `sas/pair_distribution.rs`, `sas/decoupling.rs`,
//!   `sas/structure.rs`, `sas/theoretical.rs`
//! - 使用 `models/system.rs` 的 ModelSystem, SimulationParameters

use crate::error::{Result, SasError};
use crate::models::{ModelSystem, PairDistribution, SimulationParameters, TheoreticalScattering};
use crate::sas::decoupling::StructureDecouplingApprox;
use crate::sas::pair_distribution::WeightedPairDistribution;
use crate::sas::theoretical::TheoreticalIntensity;

/// 理论散射计算器
pub struct ScatteringCalculator {
    params: SimulationParameters,
}

impl ScatteringCalculator {
    pub fn new(params: SimulationParameters) -> Self {
        Self { params }
    }

    /// 只计算 p(r)
    pub fn pair_distribution(&self, system: &ModelSystem) -> Result<PairDistribution> {
        let points = system.points.merged();
        WeightedPairDistribution::new(&points)
            .calc_pr(self.params.pr_points, system.polydispersity)
    }

    /// 计算完整的理论散射曲线
    pub fn calculate(&self, system: &ModelSystem) -> Result<TheoreticalScattering> {
        let q = &self.params.q;
        if q.is_empty() {
            return Err(SasError::invalid_parameter("q", "q grid is empty"));
        }
        let volume = system.points.volume_total;
        if !volume.is_finite() || volume < 0.0 {
            return Err(SasError::invalid_parameter(
                "volume_total",
                format!("must be a finite value >= 0, got {}", volume),
            ));
        }
        system.structure.validate()?;

        let points = system.points.merged();
        let pr = WeightedPairDistribution::new(&points)
            .calc_pr(self.params.pr_points, system.polydispersity)?;
        // Rg 只作诊断，无定义时不影响 I(q)
        let rg = WeightedPairDistribution::calc_rg(&pr.r, &pr.pr).ok();

        let theory = TheoreticalIntensity::new(q);
        let (i0, pq) = theory.calc_pq(&pr.r, &pr.pr, system.conc, volume)?;

        let approx = StructureDecouplingApprox::new(q, &points);
        let s_eff = system.structure.structure_eff(&approx, &pq)?;

        let i = theory.calc_iq(&pq, &s_eff, system.sigma_r)?;

        Ok(TheoreticalScattering {
            q: q.clone(),
            i0,
            i,
            pq,
            s_eff,
            r: pr.r,
            pr: pr.pr,
            pr_norm: pr.pr_norm,
            rg,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PointCloud, Subunit};
    use crate::sas::constants::{I0_FLOOR, I0_SCALE};
    use crate::sas::math::{linspace, max_value};
    use crate::sas::testing::uniform_sphere;
    use crate::sas::StructureFactor;

    fn sphere_system(n: usize, radius: f64) -> ModelSystem {
        let points = uniform_sphere(n, radius, 1.0, 42);
        let volume = 4.0 / 3.0 * std::f64::consts::PI * radius.powi(3);
        ModelSystem::new(PointCloud::new("sphere", vec![points], volume))
    }

    fn params(q: Vec<f64>, pr_points: usize) -> SimulationParameters {
        SimulationParameters { q, pr_points }
    }

    #[test]
    fn test_sphere_without_structure() {
        let system = sphere_system(1000, 20.0);
        let calc = ScatteringCalculator::new(params(linspace(0.0, 0.5, 100), 200));
        let result = calc.calculate(&system).unwrap();

        assert_eq!(result.q.len(), 100);
        assert_eq!(result.i.len(), 100);
        assert_eq!(result.pq[0], 1.0);
        assert!(result.s_eff.iter().all(|&s| s == 1.0));
        assert_eq!(result.i, result.pq);

        // Guinier 区单调下降
        for k in 1..10 {
            assert!(result.pq[k] < result.pq[k - 1]);
        }

        let rg_expected = 20.0 * 0.6_f64.sqrt();
        let rg = result.rg.unwrap();
        assert!((rg - rg_expected).abs() / rg_expected < 0.1, "Rg = {}", rg);
        assert!(result.i0 > 0.0);
    }

    #[test]
    fn test_sphere_on_offset_grid() {
        let system = sphere_system(1000, 20.0);
        let calc = ScatteringCalculator::new(params(linspace(0.001, 0.5, 100), 200));
        let result = calc.calculate(&system).unwrap();

        // q[0] > 0：P(q[0]) 略小于 1
        assert!(result.pq[0] < 1.0);
        assert!((result.pq[0] - 1.0).abs() < 1e-3, "P(q0) = {}", result.pq[0]);
        for k in 1..10 {
            assert!(result.pq[k] < result.pq[k - 1]);
        }

        let rg_expected = 20.0 * 0.6_f64.sqrt();
        let rg = result.rg.unwrap();
        assert!((rg - rg_expected).abs() / rg_expected < 0.1, "Rg = {}", rg);
    }

    #[test]
    fn test_zero_sum_pr_uses_i0_floor() {
        // 三个 +1 点构成单位三角形，一个 -1 点在 10 Å 外：
        // 正负点对权重之和相互抵消
        let h = 3.0_f64.sqrt() / 2.0;
        let points = Subunit::new(
            vec![0.0, 1.0, 0.5, 0.0],
            vec![0.0, 0.0, h, 0.0],
            vec![0.0, 0.0, 0.0, 10.0],
            vec![1.0, 1.0, 1.0, -1.0],
        )
        .unwrap();
        let system = ModelSystem::new(PointCloud::new("mixed", vec![points], 100.0));
        let calc = ScatteringCalculator::new(params(linspace(0.001, 0.5, 20), 50));

        let result = calc.calculate(&system).unwrap();
        assert_eq!(result.pr.iter().sum::<f64>(), 0.0);
        assert_eq!(max_value(&result.pr_norm).unwrap(), 1.0);
        assert!(result.rg.is_none());

        let expected_i0 = I0_FLOOR * system.conc * 100.0 * I0_SCALE;
        assert!((result.i0 - expected_i0).abs() <= 1e-12 * expected_i0);
        assert_eq!(result.i.len(), 20);
        assert!(result.i.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_dilute_hard_sphere_matches_no_structure() {
        let system = sphere_system(200, 15.0);
        let calc = ScatteringCalculator::new(params(linspace(0.001, 0.3, 30), 50));

        let plain = calc.calculate(&system).unwrap();
        let dilute = calc
            .calculate(&system.clone().with_structure(StructureFactor::HardSphere {
                conc: 0.0,
                r_hs: 50.0,
            }))
            .unwrap();

        for (a, b) in plain.i.iter().zip(&dilute.i) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn test_hard_sphere_suppresses_low_q() {
        let system = sphere_system(200, 15.0).with_structure(StructureFactor::HardSphere {
            conc: 0.2,
            r_hs: 15.0,
        });
        let calc = ScatteringCalculator::new(params(linspace(0.001, 0.3, 30), 50));
        let result = calc.calculate(&system).unwrap();
        assert!(result.s_eff[0] < 1.0);
    }

    #[test]
    fn test_roughness_damps_intensity() {
        let system = sphere_system(200, 15.0);
        let calc = ScatteringCalculator::new(params(linspace(0.001, 0.3, 30), 50));

        let smooth = calc.calculate(&system).unwrap();
        let rough = calc.calculate(&system.clone().with_sigma_r(5.0)).unwrap();
        assert!(rough.i[29] < smooth.i[29]);
    }

    #[test]
    fn test_subunits_are_merged() {
        let a = uniform_sphere(100, 10.0, 1.0, 1);
        let b = uniform_sphere(100, 10.0, 1.0, 2);
        let system = ModelSystem::new(PointCloud::new("two", vec![a, b], 1000.0));
        let calc = ScatteringCalculator::new(params(linspace(0.0, 0.3, 10), 40));
        let pr = calc.pair_distribution(&system).unwrap();
        assert_eq!(pr.r.len(), 40);
    }

    #[test]
    fn test_errors_propagate() {
        let calc = ScatteringCalculator::new(params(linspace(0.0, 0.3, 10), 40));

        let empty = ModelSystem::new(PointCloud::new("empty", vec![], 1.0));
        assert!(matches!(
            calc.calculate(&empty),
            Err(SasError::EmptyModel(_))
        ));

        let bad_frac = sphere_system(50, 10.0).with_structure(StructureFactor::Aggregation {
            r_eff: 10.0,
            n_aggr: 10,
            frac: 1.5,
        });
        assert!(matches!(
            calc.calculate(&bad_frac),
            Err(SasError::InvalidParameter { .. })
        ));

        let bad_pd = sphere_system(50, 10.0).with_polydispersity(-0.1);
        assert!(matches!(
            calc.calculate(&bad_pd),
            Err(SasError::InvalidParameter { .. })
        ));

        let no_q = ScatteringCalculator::new(params(vec![], 40));
        assert!(matches!(
            no_q.calculate(&sphere_system(50, 10.0)),
            Err(SasError::InvalidParameter { .. })
        ));
    }
}
