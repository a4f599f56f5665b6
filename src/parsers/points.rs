//! # 点云文件解析器
//!
//! 解析外部采样器输出的点云（位置 + 对比度）。
//!
//! ## 文本格式 (.dat / .txt / .xyzp)
//! ```text
//! # volume: 33510.3
//! x1 y1 z1 p1
//! x2 y2 z2 p2
//!
//! x3 y3 z3 p3      <- 空行之后为下一个子单元
//! ```
//!
//! ## CSV 格式 (.csv)
//! ```text
//! # volume: 33510.3
//! x,y,z,p,subunit
//! 0.0,1.0,2.0,1.0,0
//! ```
//! `subunit` 列可选，按首次出现的顺序分组。
//!
//! ## 依赖关系
//! - 被 `parsers/mod.rs` 使用
//! - 使用 `models/point_cloud.rs`
//! - 使用 `csv` + `serde` 读取 CSV，`regex` 识别体积注释

use crate::error::{Result, SasError};
use crate::models::Subunit;

use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// 点云文件内容
#[derive(Debug, Clone)]
pub struct PointFile {
    pub subunits: Vec<Subunit>,
    /// `# volume:` 注释给出的总体积
    pub volume: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct PointRecord {
    x: f64,
    y: f64,
    z: f64,
    p: f64,
    #[serde(default)]
    subunit: Option<i64>,
}

/// 解析文本点云文件
pub fn parse_text_file(path: &Path) -> Result<PointFile> {
    let content = read_file(path)?;
    parse_text_content(&content, &path.display().to_string())
}

/// 解析 CSV 点云文件
pub fn parse_csv_file(path: &Path) -> Result<PointFile> {
    let content = read_file(path)?;
    parse_csv_content(&content, &path.display().to_string())
}

/// 从字符串内容解析文本点云
pub fn parse_text_content(content: &str, source: &str) -> Result<PointFile> {
    let volume_re = volume_regex()?;
    let mut subunits: Vec<Subunit> = Vec::new();
    let mut current = Subunit::default();
    let mut volume: Option<f64> = None;

    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();

        if line.is_empty() {
            if !current.is_empty() {
                subunits.push(std::mem::take(&mut current));
            }
            continue;
        }

        if line.starts_with('#') {
            if let Some(v) = parse_volume_comment(&volume_re, line, source)? {
                volume = Some(v);
            }
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 4 {
            return Err(parse_error(
                "text",
                source,
                format!(
                    "Line {}: expected 4 columns (x y z p), found {}",
                    idx + 1,
                    parts.len()
                ),
            ));
        }

        let mut values = [0.0; 4];
        for (k, part) in parts[..4].iter().enumerate() {
            values[k] = part.parse().map_err(|_| {
                parse_error(
                    "text",
                    source,
                    format!("Line {}: invalid number '{}'", idx + 1, part),
                )
            })?;
        }
        current.push([values[0], values[1], values[2]], values[3]);
    }

    if !current.is_empty() {
        subunits.push(current);
    }
    if subunits.is_empty() {
        return Err(parse_error("text", source, "No points found".to_string()));
    }

    Ok(PointFile { subunits, volume })
}

/// 从字符串内容解析 CSV 点云
pub fn parse_csv_content(content: &str, source: &str) -> Result<PointFile> {
    let volume_re = volume_regex()?;
    let mut volume: Option<f64> = None;
    for line in content.lines().map(str::trim).filter(|l| l.starts_with('#')) {
        if let Some(v) = parse_volume_comment(&volume_re, line, source)? {
            volume = Some(v);
        }
    }

    let mut rdr = csv::ReaderBuilder::new()
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut subunits: Vec<Subunit> = Vec::new();
    let mut index: HashMap<i64, usize> = HashMap::new();

    for record in rdr.deserialize() {
        let record: PointRecord = record?;
        let key = record.subunit.unwrap_or(0);
        let slot = *index.entry(key).or_insert_with(|| {
            subunits.push(Subunit::default());
            subunits.len() - 1
        });
        subunits[slot].push([record.x, record.y, record.z], record.p);
    }

    if subunits.is_empty() {
        return Err(parse_error("csv", source, "No points found".to_string()));
    }

    Ok(PointFile { subunits, volume })
}

fn volume_regex() -> Result<Regex> {
    Regex::new(r"(?i)^#\s*volume\s*[:=]\s*(\S+)").map_err(|e| SasError::Other(e.to_string()))
}

/// `# volume: V` 注释，其他注释返回 None
fn parse_volume_comment(re: &Regex, line: &str, source: &str) -> Result<Option<f64>> {
    let Some(caps) = re.captures(line) else {
        return Ok(None);
    };
    let raw = &caps[1];
    let volume: f64 = raw.parse().map_err(|_| {
        parse_error("point cloud", source, format!("Invalid volume '{}'", raw))
    })?;
    if !volume.is_finite() || volume < 0.0 {
        return Err(parse_error(
            "point cloud",
            source,
            format!("Volume must be >= 0, got {}", volume),
        ));
    }
    Ok(Some(volume))
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| SasError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })
}

fn parse_error(format: &str, source: &str, reason: String) -> SasError {
    SasError::ParseError {
        format: format.to_string(),
        path: source.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_subunits_and_volume() {
        let content = "\
# sampled sphere + shell
# volume: 1234.5
0.0 0.0 0.0 1.0
1.0 0.0 0.0 1.0

2.0 0.0 0.0 -0.5
";
        let parsed = parse_text_content(content, "test").unwrap();
        assert_eq!(parsed.volume, Some(1234.5));
        assert_eq!(parsed.subunits.len(), 2);
        assert_eq!(parsed.subunits[0].len(), 2);
        assert_eq!(parsed.subunits[1].x, vec![2.0]);
        assert_eq!(parsed.subunits[1].p, vec![-0.5]);
    }

    #[test]
    fn test_text_multiple_blank_lines_and_scientific() {
        let content = "1e1 2.5E-1 -3 1\n\n\n\n4 5 6 0.0\n\n";
        let parsed = parse_text_content(content, "test").unwrap();
        assert_eq!(parsed.volume, None);
        assert_eq!(parsed.subunits.len(), 2);
        assert_eq!(parsed.subunits[0].x, vec![10.0]);
        assert_eq!(parsed.subunits[0].y, vec![0.25]);
    }

    #[test]
    fn test_text_errors() {
        assert!(matches!(
            parse_text_content("1 2 3\n", "test"),
            Err(SasError::ParseError { .. })
        ));
        assert!(matches!(
            parse_text_content("1 2 x 4\n", "test"),
            Err(SasError::ParseError { .. })
        ));
        assert!(matches!(
            parse_text_content("# only comments\n", "test"),
            Err(SasError::ParseError { .. })
        ));
        assert!(matches!(
            parse_text_content("# volume: -3\n1 2 3 4\n", "test"),
            Err(SasError::ParseError { .. })
        ));
    }

    #[test]
    fn test_csv_grouping_first_appearance() {
        let content = "\
# Volume = 500
x,y,z,p,subunit
0,0,0,1,7
1,0,0,1,3
2,0,0,1,7
";
        let parsed = parse_csv_content(content, "test").unwrap();
        assert_eq!(parsed.volume, Some(500.0));
        assert_eq!(parsed.subunits.len(), 2);
        assert_eq!(parsed.subunits[0].x, vec![0.0, 2.0]);
        assert_eq!(parsed.subunits[1].x, vec![1.0]);
    }

    #[test]
    fn test_csv_without_subunit_column() {
        let content = "x, y, z, p\n0, 0, 0, 1\n1, 1, 1, 2\n";
        let parsed = parse_csv_content(content, "test").unwrap();
        assert_eq!(parsed.subunits.len(), 1);
        assert_eq!(parsed.subunits[0].p, vec![1.0, 2.0]);
    }

    #[test]
    fn test_csv_bad_value() {
        let content = "x,y,z,p\n0,0,zero,1\n";
        assert!(matches!(
            parse_csv_content(content, "test"),
            Err(SasError::CsvError(_))
        ));
    }

    #[test]
    fn test_text_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.xyzp");
        fs::write(&path, "# volume: 10\n0 0 0 1\n3 4 0 1\n").unwrap();

        let parsed = parse_text_file(&path).unwrap();
        assert_eq!(parsed.subunits[0].len(), 2);
        assert_eq!(parsed.volume, Some(10.0));

        assert!(matches!(
            parse_text_file(&dir.path().join("missing.dat")),
            Err(SasError::FileReadError { .. })
        ));
    }
}
