//! Tessera 核心几何数据模型
//!
//! 描述建筑/工程构造的平面形状、边界线以及聚合它们的模型，
//! 供下游仿真或导出工具使用。
//!
//! # 架构设计
//!
//! - `Shape`: 持有一个平面多边形
//! - `Boundary`: 持有一组线段
//! - `Model`: 拥有形状与边界，管理单位与容差
//!
//! 每种实体都带有 `Identity`（UUID 标识符、显示名称、所属模型）
//! 和可扩展的 `Properties`，并可编码为字典（`serde_json::Value`）。
//!
//! # 示例
//!
//! ```rust
//! use tessera_core::prelude::*;
//!
//! let mut model = Model::from_layers(&[15, 5, 100, 15]).unwrap();
//! model.set_display_name("Layered Construction");
//! assert_eq!(model.shapes().len(), 4);
//!
//! // 检查失败时返回描述文本而不是错误
//! assert_eq!(model.check_planar(None, false).unwrap(), "");
//!
//! let restored = Model::from_dict(&model.to_dict()).unwrap();
//! assert_eq!(restored.identifier(), model.identifier());
//! ```

pub mod boundary;
pub mod error;
pub mod geometry;
pub mod identity;
pub mod math;
pub mod model;
pub mod settings;
pub mod shape;
pub mod transform;
pub mod validate;
pub mod writer;

pub mod prelude {
    //! 常用类型的便捷导入
    pub use crate::boundary::Boundary;
    pub use crate::error::{CoreError, CoreResult};
    pub use crate::geometry::{Face3D, LineSegment3D, Plane};
    pub use crate::identity::{EntityKind, Identified, Identity, Properties};
    pub use crate::math::{BoundingBox3, Point3, Vector3};
    pub use crate::model::{EntityMut, Model, ModelBuilder, ModelObject};
    pub use crate::settings::{ModelSettings, Units};
    pub use crate::shape::Shape;
    pub use crate::transform::Transformable;
    pub use crate::validate::short_id_from_uuid;
    pub use crate::writer::{HasWriters, Writers};
}
