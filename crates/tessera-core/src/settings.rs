//! 单位与模型默认设置

use crate::error::{CoreError, CoreResult};
use crate::validate::float_positive;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 默认容差（模型单位）
pub const DEFAULT_TOLERANCE: f64 = 0.01;

/// 将容差设为空时恢复的值
pub const RESET_TOLERANCE: f64 = 0.001;

/// 默认角度容差（度）
pub const DEFAULT_ANGLE_TOLERANCE: f64 = 1.0;

/// `Model::from_layers` 的默认层高（模型单位）
pub const DEFAULT_LAYER_HEIGHT: f64 = 200.0;

/// 长度单位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Units {
    Meters,
    #[default]
    Millimeters,
    Centimeters,
    Inches,
    Feet,
}

impl Units {
    pub const ALL: [Units; 5] = [
        Units::Meters,
        Units::Millimeters,
        Units::Centimeters,
        Units::Inches,
        Units::Feet,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Units::Meters => "Meters",
            Units::Millimeters => "Millimeters",
            Units::Centimeters => "Centimeters",
            Units::Inches => "Inches",
            Units::Feet => "Feet",
        }
    }

    /// 一个单位等于多少米
    pub fn to_meters(&self) -> f64 {
        match self {
            Units::Meters => 1.0,
            Units::Millimeters => 0.001,
            Units::Centimeters => 0.01,
            Units::Inches => 0.0254,
            Units::Feet => 0.3048,
        }
    }

    /// 从本单位换算到 `target` 的缩放系数
    pub fn conversion_factor(&self, target: Units) -> f64 {
        self.to_meters() / target.to_meters()
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Units {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Units::ALL
            .into_iter()
            .find(|units| units.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoreError::UnknownUnits(s.to_string()))
    }
}

/// 新建模型时使用的默认值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    pub units: Units,
    pub tolerance: f64,
    pub angle_tolerance: f64,
    pub layer_height: f64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            units: Units::default(),
            tolerance: DEFAULT_TOLERANCE,
            angle_tolerance: DEFAULT_ANGLE_TOLERANCE,
            layer_height: DEFAULT_LAYER_HEIGHT,
        }
    }
}

impl ModelSettings {
    /// 所有数值必须为正
    pub fn validate(&self) -> CoreResult<()> {
        float_positive(&self.tolerance, "tolerance")?;
        float_positive(&self.angle_tolerance, "angle_tolerance")?;
        float_positive(&self.layer_height, "layer_height")?;
        Ok(())
    }
}
