//! 参数契约检查
//!
//! 每个构造函数在赋值之前都会经过这里的检查：
//! - 数值范围：`float_in_range` 及其开/闭区间变体、`int_in_range`
//! - 正数：`float_positive`、`int_positive`
//! - 定长序列：`tuple_with_length`、`list_with_length`
//! - 标识符：`valid_uuid`
//!
//! 输入先经过一次显式解析（数值本身，或可解析为数值的字符串），
//! 其余类型一律返回 [`CoreError::TypeMismatch`]，然后再做范围检查。

use crate::error::{CoreError, CoreResult};
use serde_json::Value;
use std::fmt::Display;
use uuid::Uuid;

/// 解析后的数值
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Float(f64),
    Int(i64),
}

/// 可以在边界处解析为数值的输入
pub trait ParseNumber {
    /// 解析为数值，不可解析时返回 `None`
    fn parse_number(&self) -> Option<Number>;

    /// 用于错误信息的描述
    fn describe(&self) -> String;
}

macro_rules! impl_parse_number_int {
    ($($t:ty),*) => {
        $(impl ParseNumber for $t {
            fn parse_number(&self) -> Option<Number> {
                i64::try_from(*self).ok().map(Number::Int)
            }

            fn describe(&self) -> String {
                self.to_string()
            }
        })*
    };
}

impl_parse_number_int!(i8, i16, i32, i64, u8, u16, u32, u64, usize);

impl ParseNumber for f64 {
    fn parse_number(&self) -> Option<Number> {
        Some(Number::Float(*self))
    }

    fn describe(&self) -> String {
        self.to_string()
    }
}

impl ParseNumber for f32 {
    fn parse_number(&self) -> Option<Number> {
        Some(Number::Float(f64::from(*self)))
    }

    fn describe(&self) -> String {
        self.to_string()
    }
}

impl ParseNumber for str {
    fn parse_number(&self) -> Option<Number> {
        let text = self.trim();
        if let Ok(i) = text.parse::<i64>() {
            return Some(Number::Int(i));
        }
        text.parse::<f64>().ok().map(Number::Float)
    }

    fn describe(&self) -> String {
        format!("\"{}\"", self)
    }
}

impl ParseNumber for String {
    fn parse_number(&self) -> Option<Number> {
        self.as_str().parse_number()
    }

    fn describe(&self) -> String {
        self.as_str().describe()
    }
}

impl ParseNumber for Value {
    fn parse_number(&self) -> Option<Number> {
        match self {
            Value::Number(n) => n
                .as_i64()
                .map(Number::Int)
                .or_else(|| n.as_f64().map(Number::Float)),
            Value::String(s) => s.parse_number(),
            _ => None,
        }
    }

    fn describe(&self) -> String {
        self.to_string()
    }
}

impl<T: ParseNumber + ?Sized> ParseNumber for &T {
    fn parse_number(&self) -> Option<Number> {
        (**self).parse_number()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// 从解析后的数值转换得到的目标类型
pub trait Coerce: Sized + Copy + PartialOrd + Display {
    /// 类型名称（用于错误信息）
    const NAME: &'static str;

    fn coerce(number: Number) -> Option<Self>;
}

impl Coerce for f64 {
    const NAME: &'static str = "float";

    fn coerce(number: Number) -> Option<Self> {
        match number {
            Number::Float(f) => Some(f),
            Number::Int(i) => Some(i as f64),
        }
    }
}

impl Coerce for i64 {
    const NAME: &'static str = "integer";

    fn coerce(number: Number) -> Option<Self> {
        match number {
            Number::Int(i) => Some(i),
            // 只接受没有小数部分的浮点数
            Number::Float(f) if f.is_finite() && f.fract() == 0.0 => Some(f as i64),
            Number::Float(_) => None,
        }
    }
}

/// 解析并转换单个值
pub fn coerce<T: Coerce, N: ParseNumber + ?Sized>(value: &N, label: &str) -> CoreResult<T> {
    value
        .parse_number()
        .and_then(T::coerce)
        .ok_or_else(|| CoreError::TypeMismatch {
            label: label.to_string(),
            expected: T::NAME,
            found: value.describe(),
        })
}

/// 区间端点策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bounds {
    Inclusive,
    Exclusive,
    InclusiveExclusive,
    ExclusiveInclusive,
}

fn in_range<T: Coerce>(value: T, low: T, high: T, bounds: Bounds, label: &str) -> CoreResult<T> {
    let (low_ok, high_ok, requirement) = match bounds {
        Bounds::Inclusive => (
            value >= low,
            value <= high,
            format!("between {} and {}", low, high),
        ),
        Bounds::Exclusive => (
            value > low,
            value < high,
            format!("greater than {} and less than {}", low, high),
        ),
        Bounds::InclusiveExclusive => (
            value >= low,
            value < high,
            format!("greater than or equal to {} and less than {}", low, high),
        ),
        Bounds::ExclusiveInclusive => (
            value > low,
            value <= high,
            format!("greater than {} and less than or equal to {}", low, high),
        ),
    };
    if low_ok && high_ok {
        Ok(value)
    } else {
        Err(CoreError::OutOfRange {
            label: label.to_string(),
            requirement,
            value: value.to_string(),
        })
    }
}

/// 闭区间 `[low, high]` 内的浮点数
pub fn float_in_range<N: ParseNumber + ?Sized>(
    value: &N,
    low: f64,
    high: f64,
    label: &str,
) -> CoreResult<f64> {
    in_range(coerce(value, label)?, low, high, Bounds::Inclusive, label)
}

/// 开区间 `(low, high)` 内的浮点数
pub fn float_in_range_excl<N: ParseNumber + ?Sized>(
    value: &N,
    low: f64,
    high: f64,
    label: &str,
) -> CoreResult<f64> {
    in_range(coerce(value, label)?, low, high, Bounds::Exclusive, label)
}

/// 左闭右开区间 `[low, high)` 内的浮点数
pub fn float_in_range_incl_excl<N: ParseNumber + ?Sized>(
    value: &N,
    low: f64,
    high: f64,
    label: &str,
) -> CoreResult<f64> {
    in_range(coerce(value, label)?, low, high, Bounds::InclusiveExclusive, label)
}

/// 左开右闭区间 `(low, high]` 内的浮点数
pub fn float_in_range_excl_incl<N: ParseNumber + ?Sized>(
    value: &N,
    low: f64,
    high: f64,
    label: &str,
) -> CoreResult<f64> {
    in_range(coerce(value, label)?, low, high, Bounds::ExclusiveInclusive, label)
}

/// 闭区间 `[low, high]` 内的整数
pub fn int_in_range<N: ParseNumber + ?Sized>(
    value: &N,
    low: i64,
    high: i64,
    label: &str,
) -> CoreResult<i64> {
    in_range(coerce(value, label)?, low, high, Bounds::Inclusive, label)
}

/// 大于零的浮点数
pub fn float_positive<N: ParseNumber + ?Sized>(value: &N, label: &str) -> CoreResult<f64> {
    in_range(
        coerce(value, label)?,
        0.0,
        f64::INFINITY,
        Bounds::ExclusiveInclusive,
        label,
    )
}

/// 大于零的整数
pub fn int_positive<N: ParseNumber + ?Sized>(value: &N, label: &str) -> CoreResult<i64> {
    in_range(coerce(value, label)?, 0, i64::MAX, Bounds::ExclusiveInclusive, label)
}

/// 检查序列长度
pub fn ensure_length(found: usize, expected: usize, label: &str) -> CoreResult<()> {
    if found == expected {
        Ok(())
    } else {
        Err(CoreError::LengthMismatch {
            label: label.to_string(),
            expected,
            found,
        })
    }
}

/// 转换为定长列表
pub fn list_with_length<T, I>(
    items: impl IntoIterator<Item = I>,
    length: usize,
    label: &str,
) -> CoreResult<Vec<T>>
where
    T: Coerce,
    I: ParseNumber,
{
    let values = items
        .into_iter()
        .map(|item| coerce::<T, I>(&item, label))
        .collect::<CoreResult<Vec<T>>>()?;
    ensure_length(values.len(), length, label)?;
    Ok(values)
}

/// 转换为定长数组
pub fn tuple_with_length<T, I, const N: usize>(
    items: impl IntoIterator<Item = I>,
    label: &str,
) -> CoreResult<[T; N]>
where
    T: Coerce,
    I: ParseNumber,
{
    let values = list_with_length::<T, I>(items, N, label)?;
    let found = values.len();
    <[T; N]>::try_from(values).map_err(|_| CoreError::LengthMismatch {
        label: label.to_string(),
        expected: N,
        found,
    })
}

/// 检查字符串是否为合法的 UUID，原样返回
pub fn valid_uuid(value: &str) -> CoreResult<&str> {
    Uuid::parse_str(value)
        .map(|_| value)
        .map_err(|e| CoreError::InvalidUuid(format!("\"{}\" ({})", value, e)))
}

/// 生成 31 个字符的短标识符
///
/// 去掉 UUID 的最后一个连字符后截断，供有标识符长度限制的下游工具使用。
pub fn short_id_from_uuid(value: &str) -> CoreResult<String> {
    let value = valid_uuid(value)?;
    let compact = match value.rfind('-') {
        Some(pos) => format!("{}{}", &value[..pos], &value[pos + 1..]),
        None => value.to_string(),
    };
    Ok(compact.chars().take(31).collect())
}

/// 生成描述无效字典的错误
///
/// 错误中带有字典的 `type` 与 `identifier`（缺失时使用占位值）。
pub fn invalid_dict_error(dict: &Value, message: impl Display) -> CoreError {
    let field = |key: &str, fallback: &str| {
        dict.get(key)
            .and_then(Value::as_str)
            .unwrap_or(fallback)
            .to_string()
    };
    CoreError::InvalidDict {
        kind: field("type", "Unknown"),
        identifier: field("identifier", "unknown"),
        message: message.to_string(),
    }
}

/// 几何检查的报告/抛出模式
///
/// 空消息表示检查通过；`raise` 为真时失败返回错误，否则返回描述文本。
pub fn report_or_raise(message: String, raise: bool) -> CoreResult<String> {
    if message.is_empty() {
        return Ok(message);
    }
    if raise {
        return Err(CoreError::Validation(message));
    }
    tracing::warn!("{}", message);
    Ok(message)
}
