//! # 点云数据模型
//!
//! 由外部采样器生成的散射长度密度点云。每个子单元是四个等长数组
//! x, y, z（Å）和 p（对比度，可为负）。计算过程中只读。
//!
//! ## 依赖关系
//! - 被 `parsers/` 和 `sas/` 使用
//! - 无外部模块依赖

use crate::error::{Result, SasError};

/// 单个子单元的采样点
#[derive(Debug, Clone, Default)]
pub struct Subunit {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    /// 每个点的对比度
    pub p: Vec<f64>,
}

impl Subunit {
    /// 创建子单元，四个数组长度必须一致
    pub fn new(x: Vec<f64>, y: Vec<f64>, z: Vec<f64>, p: Vec<f64>) -> Result<Self> {
        let n = x.len();
        for (what, len) in [("subunit y", y.len()), ("subunit z", z.len()), ("subunit p", p.len())] {
            if len != n {
                return Err(SasError::shape_mismatch(what, n, len));
            }
        }
        Ok(Subunit { x, y, z, p })
    }

    /// 点数
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// 追加一个点
    pub fn push(&mut self, position: [f64; 3], contrast: f64) {
        self.x.push(position[0]);
        self.y.push(position[1]);
        self.z.push(position[2]);
        self.p.push(contrast);
    }

    /// 是否所有点对比度为零
    pub fn all_zero_contrast(&self) -> bool {
        self.p.iter().all(|&c| c == 0.0)
    }
}

/// 由多个子单元组成的模型点云
#[derive(Debug, Clone, Default)]
pub struct PointCloud {
    /// 模型名称
    pub name: String,
    /// 子单元（按顺序）
    pub subunits: Vec<Subunit>,
    /// 模型总体积（Å³），用于 I0 标度
    pub volume_total: f64,
}

impl PointCloud {
    pub fn new(name: impl Into<String>, subunits: Vec<Subunit>, volume_total: f64) -> Self {
        PointCloud {
            name: name.into(),
            subunits,
            volume_total,
        }
    }

    /// 所有子单元的总点数
    pub fn n_points(&self) -> usize {
        self.subunits.iter().map(Subunit::len).sum()
    }

    /// 按顺序拼接所有子单元
    pub fn merged(&self) -> Subunit {
        let n = self.n_points();
        let mut out = Subunit {
            x: Vec::with_capacity(n),
            y: Vec::with_capacity(n),
            z: Vec::with_capacity(n),
            p: Vec::with_capacity(n),
        };
        for s in &self.subunits {
            out.x.extend_from_slice(&s.x);
            out.y.extend_from_slice(&s.y);
            out.z.extend_from_slice(&s.z);
            out.p.extend_from_slice(&s.p);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subunit_length_check() {
        let err = Subunit::new(vec![0.0, 1.0], vec![0.0, 1.0], vec![0.0], vec![1.0, 1.0]);
        match err {
            Err(SasError::ShapeMismatch { expected, found, .. }) => {
                assert_eq!(expected, 2);
                assert_eq!(found, 1);
            }
            other => panic!("expected ShapeMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_merge_keeps_order() {
        let a = Subunit::new(vec![1.0], vec![2.0], vec![3.0], vec![1.0]).unwrap();
        let b = Subunit::new(vec![4.0, 5.0], vec![0.0, 0.0], vec![0.0, 0.0], vec![-1.0, 0.5])
            .unwrap();
        let cloud = PointCloud::new("two", vec![a, b], 10.0);

        assert_eq!(cloud.n_points(), 3);
        let merged = cloud.merged();
        assert_eq!(merged.x, vec![1.0, 4.0, 5.0]);
        assert_eq!(merged.p, vec![1.0, -1.0, 0.5]);
        assert!(!merged.all_zero_contrast());
    }
}
