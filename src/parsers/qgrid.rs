//! # q 值列表解析
//!
//! 命令行上的自由格式数字列表（逗号、分号或空白分隔），
//! 或文本文件的第一列（`#` 注释行跳过）。
//!
//! ## 依赖关系
//! - 被 `commands/simulate.rs` 使用
//! - 使用 `regex` 切分数字列表

use crate::error::{Result, SasError};

use regex::Regex;
use std::fs;
use std::path::Path;

/// 解析 "0.01, 0.02 0.05;1e-1" 形式的列表
pub fn parse_q_list(text: &str) -> Result<Vec<f64>> {
    let sep = Regex::new(r"[\s,;]+").map_err(|e| SasError::Other(e.to_string()))?;

    let values = sep
        .split(text.trim())
        .filter(|t| !t.is_empty())
        .map(|t| {
            t.parse::<f64>()
                .map_err(|_| SasError::InvalidArgument(format!("Invalid q value: '{}'", t)))
        })
        .collect::<Result<Vec<f64>>>()?;

    if values.is_empty() {
        return Err(SasError::InvalidArgument("Empty q list".to_string()));
    }
    Ok(values)
}

/// 读取 q 文件
pub fn parse_q_file(path: &Path) -> Result<Vec<f64>> {
    let content = fs::read_to_string(path).map_err(|e| SasError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_q_content(&content, &path.display().to_string())
}

/// 取每个数据行的第一列
pub fn parse_q_content(content: &str, source: &str) -> Result<Vec<f64>> {
    let sep = Regex::new(r"[\s,;]+").map_err(|e| SasError::Other(e.to_string()))?;
    let mut q = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let first = sep.split(line).next().unwrap_or(line);
        let value: f64 = first.parse().map_err(|_| SasError::ParseError {
            format: "q".to_string(),
            path: source.to_string(),
            reason: format!("Line {}: invalid q value '{}'", idx + 1, first),
        })?;
        q.push(value);
    }

    if q.is_empty() {
        return Err(SasError::ParseError {
            format: "q".to_string(),
            path: source.to_string(),
            reason: "No q values found".to_string(),
        });
    }
    Ok(q)
}
