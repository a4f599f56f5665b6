//! # 散射计算结果模型
//!
//! ## 依赖关系
//! - 由 `sas/` 生成
//! - 被 `sas/export.rs`, `sas/plot.rs`, `commands/` 使用

use serde::Serialize;

/// 对比度加权的对距离分布
#[derive(Debug, Clone, Serialize)]
pub struct PairDistribution {
    /// bin 中心（Å）
    pub r: Vec<f64>,
    /// 除以 N² 后的 p(r)，作为 Debye 变换的输入
    pub pr: Vec<f64>,
    /// 峰值归一化为 1 的 p(r)，仅用于绘图
    pub pr_norm: Vec<f64>,
}

/// 一次理论散射计算的完整输出
#[derive(Debug, Clone, Serialize)]
pub struct TheoreticalScattering {
    pub q: Vec<f64>,
    /// 前向散射 I(0)
    pub i0: f64,
    /// 最终强度 I(q)
    pub i: Vec<f64>,
    /// 形状因子 P(q)
    pub pq: Vec<f64>,
    /// 有效结构因子
    pub s_eff: Vec<f64>,
    pub r: Vec<f64>,
    pub pr: Vec<f64>,
    pub pr_norm: Vec<f64>,
    /// 回转半径（诊断量），Σp(r) = 0 时无定义
    pub rg: Option<f64>,
}
