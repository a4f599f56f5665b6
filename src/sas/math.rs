//! # 数值工具函数
//!
//! sinc 与等间距采样。
//!
//! ## 依赖关系
//! - 被 `sas/` 各子模块使用
//! - 无外部依赖

/// sinc(x) = sin(x)/x，sinc(0) = 1
///
/// 注意与 numpy 的归一化 sinc (sin(πx)/(πx)) 不同。
#[inline]
pub fn sinc(x: f64) -> f64 {
    if x == 0.0 {
        1.0
    } else {
        x.sin() / x
    }
}

/// 闭区间 [start, stop] 上的 n 个等间距点（同 numpy.linspace）
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            let mut v: Vec<f64> = (0..n).map(|i| start + i as f64 * step).collect();
            // 端点精确等于 stop
            v[n - 1] = stop;
            v
        }
    }
}

/// 最大值（忽略 NaN），空切片返回 None
pub fn max_value(values: &[f64]) -> Option<f64> {
    values
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .fold(None, |acc, v| match acc {
            Some(m) if m >= v => Some(m),
            _ => Some(v),
        })
}
