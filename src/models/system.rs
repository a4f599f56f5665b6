//! # 模拟参数与模型体系
//!
//! 描述一次理论散射计算的全部输入：q 网格、p(r) bin 数、
//! 点云、结构因子选择、多分散度、浓度与界面粗糙度。
//!
//! ## 依赖关系
//! - 被 `sas/calculator.rs` 和 `commands/` 使用
//! - 使用 `models/point_cloud.rs`, `sas/structure.rs`

use crate::models::PointCloud;
use crate::sas::constants::{DEFAULT_CONC, DEFAULT_PR_POINTS};
use crate::sas::qsampling::QSampling;
use crate::sas::StructureFactor;

/// 与体系无关的计算参数
#[derive(Debug, Clone)]
pub struct SimulationParameters {
    /// 动量传递 q（Å⁻¹）
    pub q: Vec<f64>,
    /// p(r) 直方图 bin 数
    pub pr_points: usize,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        SimulationParameters {
            q: QSampling::default().sample(),
            pr_points: DEFAULT_PR_POINTS,
        }
    }
}

/// 被模拟的样品体系
#[derive(Debug, Clone)]
pub struct ModelSystem {
    pub points: PointCloud,
    pub structure: StructureFactor,
    /// 相对多分散度（≥ 0）
    pub polydispersity: f64,
    /// 体积分数浓度
    pub conc: f64,
    /// 界面粗糙度（Å）
    pub sigma_r: f64,
}

impl ModelSystem {
    /// 以默认参数创建体系（无结构因子、单分散、无粗糙度）
    pub fn new(points: PointCloud) -> Self {
        ModelSystem {
            points,
            structure: StructureFactor::None,
            polydispersity: 0.0,
            conc: DEFAULT_CONC,
            sigma_r: 0.0,
        }
    }

    pub fn with_structure(mut self, structure: StructureFactor) -> Self {
        self.structure = structure;
        self
    }

    pub fn with_polydispersity(mut self, polydispersity: f64) -> Self {
        self.polydispersity = polydispersity;
        self
    }

    pub fn with_conc(mut self, conc: f64) -> Self {
        self.conc = conc;
        self
    }

    pub fn with_sigma_r(mut self, sigma_r: f64) -> Self {
        self.sigma_r = sigma_r;
        self
    }
}
