//! 数学基础类型
//!
//! 基于 nalgebra 的三维点、向量与轴对齐包围盒。

use serde::{Deserialize, Serialize};

pub type Point3 = nalgebra::Point3<f64>;
pub type Vector3 = nalgebra::Vector3<f64>;

/// 数值比较的默认精度
pub const EPSILON: f64 = 1e-9;

/// 轴对齐包围盒
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox3 {
    pub min: Point3,
    pub max: Point3,
}

impl BoundingBox3 {
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// 空包围盒（min 为正无穷，max 为负无穷）
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    pub fn from_points(points: impl IntoIterator<Item = Point3>) -> Self {
        let mut bbox = Self::empty();
        for p in points {
            bbox.expand_to_include(&p);
        }
        bbox
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn expand_to_include(&mut self, point: &Point3) {
        self.min = self.min.inf(point);
        self.max = self.max.sup(point);
    }

    /// 合并另一个包围盒
    pub fn union(&self, other: &BoundingBox3) -> BoundingBox3 {
        if other.is_empty() {
            return *self;
        }
        if self.is_empty() {
            return *other;
        }
        BoundingBox3::new(self.min.inf(&other.min), self.max.sup(&other.max))
    }

    pub fn center(&self) -> Point3 {
        nalgebra::center(&self.min, &self.max)
    }
}
