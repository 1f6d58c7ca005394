//! 变换操作
//!
//! Shape、Boundary 与 Model 共用的变换接口。角度参数一律为度。
//! 每个变换都由几何图元生成新值后整体替换，不修改旧图元。

use crate::error::CoreResult;
use crate::geometry::{rotation, Plane};
use crate::math::{Point3, Vector3};
use nalgebra::Rotation3;

pub trait Transformable {
    /// 平移
    fn move_by(&mut self, vector: &Vector3);

    /// 缩放，`origin` 为空时以世界原点为中心
    fn scale(&mut self, factor: f64, origin: Option<&Point3>);

    /// 按给定旋转矩阵绕 `origin` 旋转
    fn rotate_by(&mut self, rotation: &Rotation3<f64>, origin: &Point3);

    /// 关于平面镜像
    fn reflect(&mut self, plane: &Plane);

    /// 绕轴旋转，轴为零向量时返回错误且不做任何修改
    fn rotate(&mut self, axis: &Vector3, angle: f64, origin: &Point3) -> CoreResult<()> {
        let rotation = rotation(axis, angle.to_radians())?;
        self.rotate_by(&rotation, origin);
        Ok(())
    }

    /// 绕经过 `origin` 的 Z 轴旋转
    fn rotate_xy(&mut self, angle: f64, origin: &Point3) {
        let rotation = Rotation3::from_axis_angle(&Vector3::z_axis(), angle.to_radians());
        self.rotate_by(&rotation, origin);
    }
}
