//! 核心错误定义

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// 值无法转换为目标类型
    #[error("Expected {expected} for {label}. Got {found}.")]
    TypeMismatch {
        label: String,
        expected: &'static str,
        found: String,
    },

    /// 数值超出允许范围
    #[error("{label} must be {requirement}. Got {value}.")]
    OutOfRange {
        label: String,
        requirement: String,
        value: String,
    },

    /// 序列长度不符
    #[error("Length of {label} must be {expected}. Got {found}.")]
    LengthMismatch {
        label: String,
        expected: usize,
        found: usize,
    },

    #[error("Invalid UUID: {0}")]
    InvalidUuid(String),

    /// 字典无法重建为对象
    #[error("{kind} \"{identifier}\" is not valid and is not supported. {message}")]
    InvalidDict {
        kind: String,
        identifier: String,
        message: String,
    },

    #[error("Failed to find {kind} with identifier {identifier}")]
    NotFound { kind: &'static str, identifier: String },

    /// 严格模式下的几何检查失败
    #[error("{0}")]
    Validation(String),

    #[error("Geometry error: {0}")]
    Geometry(String),

    #[error("Unknown units: {0}")]
    UnknownUnits(String),

    #[error("No writer registered under the name: {0}")]
    UnknownWriter(String),

    #[error("Writer {name} failed: {message}")]
    Writer { name: String, message: String },
}

pub type CoreResult<T> = Result<T, CoreError>;
