//! # q 网格
//!
//! 均匀网格（含端点）或用户给定的 q 值列表。
//!
//! ## 依赖关系
//! - 被 `models/system.rs`、`commands/simulate.rs` 使用
//! - 使用 `sas/math.rs` 的 linspace

use crate::error::{Result, SasError};
use crate::sas::constants::{DEFAULT_QMAX, DEFAULT_QMIN, DEFAULT_QPOINTS};
use crate::sas::math::linspace;

/// q 采样方式
#[derive(Debug, Clone, PartialEq)]
pub enum QSampling {
    /// [qmin, qmax] 上 nq 个等距点
    Uniform { qmin: f64, qmax: f64, nq: usize },
    /// 用户给定的 q 值
    User(Vec<f64>),
}

impl Default for QSampling {
    fn default() -> Self {
        QSampling::Uniform {
            qmin: DEFAULT_QMIN,
            qmax: DEFAULT_QMAX,
            nq: DEFAULT_QPOINTS,
        }
    }
}

impl QSampling {
    /// 生成 q 值，不做校验
    pub fn sample(&self) -> Vec<f64> {
        match self {
            QSampling::Uniform { qmin, qmax, nq } => linspace(*qmin, *qmax, *nq),
            QSampling::User(q) => q.clone(),
        }
    }

    /// 校验后生成 q 值
    pub fn build(&self) -> Result<Vec<f64>> {
        self.validate()?;
        Ok(self.sample())
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            QSampling::Uniform { qmin, qmax, nq } => {
                if *nq == 0 {
                    return Err(SasError::invalid_parameter("qpoints", "must be >= 1"));
                }
                if !qmin.is_finite() || *qmin < 0.0 {
                    return Err(SasError::invalid_parameter(
                        "qmin",
                        format!("must be a finite value >= 0, got {}", qmin),
                    ));
                }
                if !qmax.is_finite() || qmax < qmin {
                    return Err(SasError::invalid_parameter(
                        "qmax",
                        format!("must be >= qmin ({}), got {}", qmin, qmax),
                    ));
                }
            }
            QSampling::User(q) => {
                if q.is_empty() {
                    return Err(SasError::invalid_parameter("q", "no q values given"));
                }
                if let Some(bad) = q.iter().find(|v| !v.is_finite() || **v < 0.0) {
                    return Err(SasError::invalid_parameter(
                        "q",
                        format!("q values must be finite and >= 0, got {}", bad),
                    ));
                }
            }
        }
        Ok(())
    }
}
