//! 测试用点云生成

use crate::models::Subunit;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// 在半径 `radius` 的球内均匀采样 `n` 个点（拒绝采样），对比度恒为 `contrast`
pub fn uniform_sphere(n: usize, radius: f64, contrast: f64, seed: u64) -> Subunit {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut points = Subunit::default();
    while points.len() < n {
        let x = rng.gen_range(-radius..=radius);
        let y = rng.gen_range(-radius..=radius);
        let z = rng.gen_range(-radius..=radius);
        if x * x + y * y + z * z <= radius * radius {
            points.push([x, y, z], contrast);
        }
    }
    points
}
