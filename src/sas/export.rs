//! # 散射数据导出
//!
//! 导出 p(r)、S(q)、I(q) 与点云可视化文件。
//!
//! ## 支持格式
//! - DAT: 两列文本，`%-17.5e` 科学计数法，与既有验证脚本兼容
//!   （`pr_<name>.dat`, `Sq_<name>.dat`, `Iq_<name>.dat`）
//! - CSV: q, Pq, S_eff, I 完整曲线
//! - PDB: 每个点一个虚拟原子，仅用于可视化
//!
//! ## 依赖关系
//! - 被 `commands/simulate.rs`, `commands/pr.rs` 调用
//! - 使用 `models/` 的 PointCloud, TheoreticalScattering
//! - 使用 `csv` + `serde` 写入 CSV 文件

use crate::error::{Result, SasError};
use crate::models::{PointCloud, TheoreticalScattering};

use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// CSV 中的一行
#[derive(Debug, Serialize)]
struct CurveRow {
    q: f64,
    #[serde(rename = "Pq")]
    pq: f64,
    #[serde(rename = "S_eff")]
    s_eff: f64,
    #[serde(rename = "I")]
    i: f64,
}

/// 与 C printf `%.5e` 一致的科学计数法（指数至少两位）
pub fn format_sci(value: f64) -> String {
    if !value.is_finite() {
        return if value.is_nan() {
            "nan".to_string()
        } else if value > 0.0 {
            "inf".to_string()
        } else {
            "-inf".to_string()
        };
    }

    let s = format!("{:.5e}", value);
    match s.split_once('e') {
        Some((mantissa, exp)) => {
            let exp: i32 = exp.parse().unwrap_or(0);
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{}e{}{:02}", mantissa, sign, exp.abs())
        }
        None => s,
    }
}

/// 两列数据文件的路径：`<dir>/<prefix>_<name>.dat`
pub fn dat_path(output_dir: &Path, prefix: &str, name: &str) -> PathBuf {
    output_dir.join(format!("{}_{}.dat", prefix, name))
}

/// 写入带单行表头的两列文本
pub fn write_columns(path: &Path, header: &str, x: &[f64], y: &[f64]) -> Result<()> {
    if x.len() != y.len() {
        return Err(SasError::shape_mismatch(header, x.len(), y.len()));
    }

    let file = File::create(path).map_err(|e| write_error(path, e))?;
    let mut out = BufWriter::new(file);

    writeln!(out, "{}", header).map_err(|e| write_error(path, e))?;
    for (a, b) in x.iter().zip(y) {
        writeln!(out, "{:<17}{:<17}", format_sci(*a), format_sci(*b))
            .map_err(|e| write_error(path, e))?;
    }
    out.flush().map_err(|e| write_error(path, e))?;

    Ok(())
}

/// 导出 p(r)
pub fn save_pr(r: &[f64], pr: &[f64], output_dir: &Path, name: &str) -> Result<PathBuf> {
    let path = dat_path(output_dir, "pr", name);
    write_columns(&path, "# r   p(r)", r, pr)?;
    Ok(path)
}

/// 导出有效结构因子
pub fn save_sq(q: &[f64], s_eff: &[f64], output_dir: &Path, name: &str) -> Result<PathBuf> {
    let path = dat_path(output_dir, "Sq", name);
    write_columns(&path, "# q   S(q)", q, s_eff)?;
    Ok(path)
}

/// 导出 I(q)
pub fn save_iq(q: &[f64], i: &[f64], output_dir: &Path, name: &str) -> Result<PathBuf> {
    let path = dat_path(output_dir, "Iq", name);
    write_columns(&path, "# q   I(q)", q, i)?;
    Ok(path)
}

/// 导出完整曲线为 CSV 格式
pub fn to_csv(result: &TheoreticalScattering, output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    for (k, &q) in result.q.iter().enumerate() {
        wtr.serialize(CurveRow {
            q,
            pq: result.pq[k],
            s_eff: result.s_eff[k],
            i: result.i[k],
        })?;
    }

    wtr.flush().map_err(|e| write_error(output_path, e))?;

    Ok(())
}

/// 导出点云为 PDB 格式
///
/// 对比度符号映射为元素：正 C，零 H，负 O。不保留对比度大小。
pub fn to_pdb(cloud: &PointCloud, output_path: &Path) -> Result<()> {
    let file = File::create(output_path).map_err(|e| write_error(output_path, e))?;
    let mut out = BufWriter::new(file);

    let header = [
        format!("TITLE    POINT SCATTER : MODEL {}", cloud.name),
        "REMARK   GENERATED WITH pointsas".to_string(),
        "REMARK   EACH BEAD REPRESENTED BY DUMMY ATOM".to_string(),
        "REMARK   CARBON, C : POSITIVE EXCESS SCATTERING LENGTH".to_string(),
        "REMARK   HYDROGEN, H : ZERO EXCESS SCATTERING LENGTH".to_string(),
        "REMARK   OXYGEN, O : NEGATIVE EXCESS SCATTERING LENGTH".to_string(),
        "REMARK   ACCURATE SCATTERING LENGTH DENSITY INFORMATION NOT INCLUDED".to_string(),
        "REMARK   ONLY FOR VISUALIZATION".to_string(),
    ];
    for line in &header {
        writeln!(out, "{}", line).map_err(|e| write_error(output_path, e))?;
    }

    let points = cloud.merged();
    for i in 0..points.len() {
        let atom = pdb_element(points.p[i]);
        writeln!(
            out,
            "ATOM  {:>5} {:<4} ALA A{:>4}    {:>8.3}{:>8.3}{:>8.3}  1.00  0.00          {:>2}",
            (i + 1) % 100_000,
            atom,
            (i + 1) % 10_000,
            points.x[i],
            points.y[i],
            points.z[i],
            atom
        )
        .map_err(|e| write_error(output_path, e))?;
    }
    writeln!(out, "END").map_err(|e| write_error(output_path, e))?;
    out.flush().map_err(|e| write_error(output_path, e))?;

    Ok(())
}

fn pdb_element(contrast: f64) -> &'static str {
    if contrast > 0.0 {
        "C"
    } else if contrast == 0.0 {
        "H"
    } else {
        "O"
    }
}

fn write_error(path: &Path, source: std::io::Error) -> SasError {
    SasError::FileWriteError {
        path: path.display().to_string(),
        source,
    }
}
