//! # 统一错误处理模块
//!
//! 定义 pointsas 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// pointsas 统一错误类型
#[derive(Error, Debug)]
pub enum SasError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to parse {format} file: {path}\nReason: {reason}")]
    ParseError {
        format: String,
        path: String,
        reason: String,
    },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    // ─────────────────────────────────────────────────────────────
    // 散射计算错误
    // ─────────────────────────────────────────────────────────────
    #[error("Empty model: {0}")]
    EmptyModel(String),

    #[error("Degenerate pair distance histogram: {0}")]
    DegenerateHistogram(String),

    #[error("Degenerate scattering amplitude: {0}")]
    DegenerateAmplitude(String),

    #[error("Shape mismatch in {what}: expected length {expected}, found {found}")]
    ShapeMismatch {
        what: String,
        expected: usize,
        found: usize,
    },

    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

impl SasError {
    /// 构造参数非法错误
    pub fn invalid_parameter(name: &str, reason: impl Into<String>) -> Self {
        SasError::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    /// 构造长度不匹配错误
    pub fn shape_mismatch(what: &str, expected: usize, found: usize) -> Self {
        SasError::ShapeMismatch {
            what: what.to_string(),
            expected,
            found,
        }
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, SasError>;
