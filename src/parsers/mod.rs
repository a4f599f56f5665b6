//! # 解析器模块
//!
//! 点云文件与 q 值列表的解析器。
//!
//! ## 依赖关系
//! - 被 `commands/` 模块使用
//! - 使用 `models/` 数据模型
//! - 子模块: points, qgrid

pub mod points;
pub mod qgrid;

use crate::error::{Result, SasError};
use crate::models::PointCloud;
use std::path::Path;

/// 从文件路径推断格式并解析点云
///
/// `volume_override` 优先于文件中的 `# volume:` 注释，两者都缺失时报错。
pub fn parse_point_cloud_file(path: &Path, volume_override: Option<f64>) -> Result<PointCloud> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();

    let parsed = match ext.as_str() {
        "dat" | "txt" | "xyzp" => points::parse_text_file(path)?,
        "csv" => points::parse_csv_file(path)?,
        _ => {
            return Err(SasError::UnsupportedFormat(format!(
                "Cannot determine point cloud format for: {}",
                path.display()
            )))
        }
    };

    let volume_total = volume_override.or(parsed.volume).ok_or_else(|| {
        SasError::InvalidArgument(format!(
            "No total volume for {}: add a '# volume: <V>' line or pass --volume",
            path.display()
        ))
    })?;

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("model");

    Ok(PointCloud::new(name, parsed.subunits, volume_total))
}
