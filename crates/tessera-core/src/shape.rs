//! 平面形状
//!
//! 持有一个 `Face3D` 图元，面积、周长、法向等都由图元实时计算。

use crate::error::{CoreError, CoreResult};
use crate::geometry::{Face3D, Plane};
use crate::identity::{EntityKind, Identified, Identity, IdentityMut, Properties};
use crate::math::{Point3, Vector3};
use crate::transform::Transformable;
use crate::validate::{
    float_in_range, invalid_dict_error, report_or_raise, tuple_with_length, ParseNumber,
};
use crate::writer::impl_writers;
use nalgebra::Rotation3;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// 形状
///
/// 不实现 `Clone`：副本必须通过 [`Shape::duplicate`] 获得，以清除反向引用。
#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ShapeRepr")]
pub struct Shape {
    identity: Identity,
    properties: Properties,
    geometry: Face3D,
}

#[derive(Deserialize)]
struct ShapeRepr {
    identity: Identity,
    properties: Properties,
    geometry: Face3D,
}

impl TryFrom<ShapeRepr> for Shape {
    type Error = CoreError;

    fn try_from(repr: ShapeRepr) -> CoreResult<Self> {
        if repr.properties.kind() != EntityKind::Shape {
            return Err(CoreError::Validation(format!(
                "Shape cannot carry {}.",
                repr.properties.type_name()
            )));
        }
        Ok(Self {
            identity: repr.identity,
            properties: repr.properties,
            geometry: repr.geometry,
        })
    }
}

impl_writers!(Shape);

impl Shape {
    /// 使用随机标识符创建
    pub fn new(geometry: Face3D) -> Self {
        Self {
            identity: Identity::generate(),
            properties: Properties::new(EntityKind::Shape),
            geometry,
        }
    }

    /// 使用调用方提供的标识符创建
    pub fn with_identifier(geometry: Face3D, identifier: &str) -> CoreResult<Self> {
        let identity = Identity::with_identifier(identifier)?;
        Ok(Self {
            identity,
            properties: Properties::new(EntityKind::Shape),
            geometry,
        })
    }

    /// 从顶点坐标创建，每个顶点必须恰好有三个坐标
    pub fn from_vertices<V, T>(vertices: &[V]) -> CoreResult<Self>
    where
        V: AsRef<[T]>,
        T: ParseNumber,
    {
        let boundary = vertices
            .iter()
            .map(|v| {
                let [x, y, z] = tuple_with_length::<f64, _, 3>(v.as_ref().iter(), "shape vertex")?;
                Ok(Point3::new(x, y, z))
            })
            .collect::<CoreResult<Vec<_>>>()?;
        Ok(Self::new(Face3D::new(boundary, None)?))
    }

    pub fn geometry(&self) -> &Face3D {
        &self.geometry
    }

    pub fn vertices(&self) -> &[Point3] {
        self.geometry.vertices()
    }

    pub fn normal(&self) -> &Vector3 {
        self.geometry.normal()
    }

    pub fn center(&self) -> Point3 {
        self.geometry.center()
    }

    pub fn area(&self) -> f64 {
        self.geometry.area()
    }

    pub fn perimeter(&self) -> f64 {
        self.geometry.perimeter()
    }

    pub fn altitude(&self) -> f64 {
        self.geometry.altitude()
    }

    pub fn azimuth(&self) -> f64 {
        self.geometry.azimuth()
    }

    pub fn min(&self) -> Point3 {
        self.geometry.bounding_box().min
    }

    pub fn max(&self) -> Point3 {
        self.geometry.bounding_box().max
    }

    /// 复制：保留标识符、显示名称和属性，清除反向引用
    pub fn duplicate(&self) -> Self {
        Self {
            identity: self.identity.duplicate(),
            properties: self.properties.clone(),
            geometry: self.geometry.clone(),
        }
    }

    /// 删除重复与共线顶点；失败时形状保持不变
    pub fn remove_colinear_vertices(&mut self, tolerance: f64) -> CoreResult<()> {
        let tolerance = float_in_range(&tolerance, 0.0, f64::INFINITY, "tolerance")?;
        self.geometry = self.geometry.remove_colinear_vertices(tolerance)?;
        Ok(())
    }

    /// 检查顶点是否都在平面容差内
    pub fn check_planar(&self, tolerance: f64, raise: bool) -> CoreResult<String> {
        let tolerance = float_in_range(&tolerance, 0.0, f64::INFINITY, "tolerance")?;
        report_or_raise(self.planar_issue(tolerance), raise)
    }

    /// 检查边是否自相交
    pub fn check_self_intersecting(&self, tolerance: f64, raise: bool) -> CoreResult<String> {
        let tolerance = float_in_range(&tolerance, 0.0, f64::INFINITY, "tolerance")?;
        report_or_raise(self.self_intersection_issue(tolerance), raise)
    }

    pub(crate) fn planar_issue(&self, tolerance: f64) -> String {
        let deviation = self.geometry.max_plane_deviation();
        if deviation <= tolerance {
            return String::new();
        }
        format!(
            "Shape \"{}\" is not planar: a vertex is {} off its plane, beyond the tolerance of {}.",
            self.display_name(),
            deviation,
            tolerance
        )
    }

    pub(crate) fn self_intersection_issue(&self, tolerance: f64) -> String {
        if !self.geometry.is_self_intersecting(tolerance) {
            return String::new();
        }
        format!(
            "Shape \"{}\" has self-intersecting edges at a tolerance of {}.",
            self.display_name(),
            tolerance
        )
    }

    pub fn to_dict(&self) -> Value {
        let mut dict = Map::new();
        self.identity.write_dict(EntityKind::Shape, &mut dict);
        dict.insert("geometry".to_string(), self.geometry.to_dict());
        dict.insert("properties".to_string(), self.properties.to_dict());
        Value::Object(dict)
    }

    pub fn from_dict(dict: &Value) -> CoreResult<Self> {
        let identity = Identity::read_dict(EntityKind::Shape, dict)?;
        let geometry = dict
            .get("geometry")
            .ok_or_else(|| invalid_dict_error(dict, "Missing \"geometry\"."))?;
        let geometry = Face3D::from_dict(geometry)?;
        let properties = Properties::from_dict(EntityKind::Shape, dict)?;
        Ok(Self {
            identity,
            properties,
            geometry,
        })
    }
}

impl Identified for Shape {
    fn identity(&self) -> &Identity {
        &self.identity
    }

    fn properties(&self) -> &Properties {
        &self.properties
    }

    fn properties_mut(&mut self) -> &mut Properties {
        &mut self.properties
    }

    fn set_display_name(&mut self, name: impl Into<String>) {
        self.identity.set_display_name(Some(name.into()));
    }
}

impl IdentityMut for Shape {
    fn identity_mut(&mut self) -> &mut Identity {
        &mut self.identity
    }
}

impl Transformable for Shape {
    fn move_by(&mut self, vector: &Vector3) {
        self.geometry = self.geometry.moved(vector);
    }

    fn scale(&mut self, factor: f64, origin: Option<&Point3>) {
        let origin = origin.copied().unwrap_or_else(Point3::origin);
        self.geometry = self.geometry.scaled(factor, &origin);
    }

    fn rotate_by(&mut self, rotation: &Rotation3<f64>, origin: &Point3) {
        self.geometry = self.geometry.rotated(rotation, origin);
    }

    fn reflect(&mut self, plane: &Plane) {
        self.geometry = self.geometry.reflected(plane);
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Shape: {}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::HasWriters;
    use approx::assert_relative_eq;
    use serde_json::json;
    use uuid::Uuid;

    fn pts(coords: &[[f64; 3]]) -> Vec<Point3> {
        coords.iter().map(|c| Point3::new(c[0], c[1], c[2])).collect()
    }

    fn z_plane(z: f64) -> Plane {
        Plane::new(Vector3::z(), Point3::new(0.0, 0.0, z)).unwrap()
    }

    fn unit_square_at_z2() -> Shape {
        let face = Face3D::new(
            pts(&[[1.0, 1.0, 2.0], [2.0, 1.0, 2.0], [2.0, 2.0, 2.0], [1.0, 2.0, 2.0]]),
            Some(z_plane(2.0)),
        )
        .unwrap();
        Shape::new(face)
    }

    #[test]
    fn test_renaming_keeps_identity() {
        let mut shape = unit_square_at_z2();
        let id = shape.identifier().to_string();
        shape.set_display_name("Renamed");
        shape.properties_mut().remove_extension("therm");
        assert_eq!(shape.identifier(), id);
        assert_eq!(shape.display_name(), "Renamed");
        assert!(!shape.has_parent());
    }

    #[test]
    fn test_deserialize_checks_properties_kind() {
        let shape = unit_square_at_z2();
        let mut value = serde_json::to_value(&shape).unwrap();
        assert_eq!(serde_json::from_value::<Shape>(value.clone()).unwrap(), shape);

        value["properties"]["kind"] = json!("Model");
        assert!(serde_json::from_value::<Shape>(value.clone()).is_err());
        value["properties"]["kind"] = json!("Shape");
        value["identity"]["identifier"] = json!("not-a-uuid");
        assert!(serde_json::from_value::<Shape>(value).is_err());
    }

    #[test]
    fn test_shape_init() {
        let face = Face3D::new(
            pts(&[[0.0, 0.0, 0.0], [0.0, 0.0, 3.0], [1.0, 0.0, 3.0], [1.0, 0.0, 0.0]]),
            None,
        )
        .unwrap();
        let mut shape = Shape::new(face);
        shape.set_display_name("TestShape");

        assert!(Uuid::parse_str(shape.identifier()).is_ok());
        assert_eq!(shape.display_name(), "TestShape");
        assert_eq!(shape.to_string(), "Shape: TestShape");
        assert_eq!(shape.vertices().len(), 4);
        assert_relative_eq!(*shape.normal(), Vector3::new(0.0, 1.0, 0.0), epsilon = 1e-9);
        assert_relative_eq!(shape.center(), Point3::new(0.5, 0.0, 1.5), epsilon = 1e-9);
        assert_relative_eq!(shape.area(), 3.0, epsilon = 1e-9);
        assert_relative_eq!(shape.perimeter(), 8.0, epsilon = 1e-9);
        assert_relative_eq!(shape.altitude(), 0.0, epsilon = 1e-9);
        assert_relative_eq!(shape.azimuth(), 0.0, epsilon = 1e-9);
        assert_eq!(shape.min(), Point3::new(0.0, 0.0, 0.0));
        assert_eq!(shape.max(), Point3::new(1.0, 0.0, 3.0));
        assert!(!shape.has_parent());
    }

    #[test]
    fn test_display_name_defaults_to_identifier() {
        let shape = unit_square_at_z2();
        assert_eq!(shape.display_name(), shape.identifier());
    }

    #[test]
    fn test_shape_from_vertices() {
        let shape = Shape::from_vertices(&[[0, 0, 0], [0, 0, 3], [1, 0, 3], [1, 0, 0]]).unwrap();
        assert_eq!(shape.vertices().len(), 4);
        assert_relative_eq!(shape.area(), 3.0, epsilon = 1e-9);

        let text = Shape::from_vertices(&[["0", "0", "0"], ["0", "0", "3"], ["1", "0", "3"]]);
        assert!(text.is_ok());

        let short = Shape::from_vertices(&[vec![0.0, 0.0], vec![1.0, 0.0], vec![1.0, 1.0]]);
        assert!(matches!(short, Err(crate::error::CoreError::LengthMismatch { .. })));
    }

    #[test]
    fn test_with_identifier() {
        let id = Uuid::new_v4().to_string();
        let shape = Shape::with_identifier(unit_square_at_z2().geometry().clone(), &id).unwrap();
        assert_eq!(shape.identifier(), id);
        assert!(Shape::with_identifier(shape.geometry().clone(), "not-a-uuid").is_err());
    }

    #[test]
    fn test_shape_duplicate() {
        let mut original = unit_square_at_z2();
        original.set_display_name("TestShape");
        let mut copy = original.duplicate();

        assert_eq!(copy.vertices(), original.vertices());
        assert_eq!(copy.identifier(), original.identifier());
        assert_eq!(copy.display_name(), "TestShape");

        copy.move_by(&Vector3::new(0.0, 1.0, 0.0));
        for (a, b) in original.vertices().iter().zip(copy.vertices()) {
            assert_ne!(a, b);
        }
    }

    #[test]
    fn test_move() {
        let shape = Shape::new(
            Face3D::new(
                pts(&[[0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [2.0, 2.0, 0.0], [0.0, 2.0, 0.0]]),
                Some(z_plane(0.0)),
            )
            .unwrap(),
        );
        let mut moved = shape.duplicate();
        moved.move_by(&Vector3::new(2.0, 2.0, 2.0));
        assert_eq!(
            moved.vertices(),
            pts(&[[2.0, 2.0, 2.0], [4.0, 2.0, 2.0], [4.0, 4.0, 2.0], [2.0, 4.0, 2.0]]).as_slice()
        );
        assert_eq!(moved.normal(), shape.normal());
        assert_relative_eq!(moved.area(), shape.area());
        assert_relative_eq!(moved.perimeter(), shape.perimeter());
    }

    #[test]
    fn test_scale() {
        let shape = unit_square_at_z2();
        let mut scaled = shape.duplicate();
        scaled.scale(2.0, None);
        assert_eq!(
            scaled.vertices(),
            pts(&[[2.0, 2.0, 4.0], [4.0, 2.0, 4.0], [4.0, 4.0, 4.0], [2.0, 4.0, 4.0]]).as_slice()
        );
        assert_relative_eq!(scaled.area(), shape.area() * 4.0, epsilon = 1e-9);
        assert_relative_eq!(scaled.perimeter(), shape.perimeter() * 2.0, epsilon = 1e-9);
        assert_eq!(scaled.normal(), shape.normal());
    }

    #[test]
    fn test_rotate() {
        let shape = Shape::new(
            Face3D::new(
                pts(&[[0.0, 0.0, 2.0], [2.0, 0.0, 2.0], [2.0, 2.0, 2.0], [0.0, 2.0, 2.0]]),
                Some(z_plane(2.0)),
            )
            .unwrap(),
        );
        let origin = Point3::origin();
        let axis = Vector3::x();

        let mut half = shape.duplicate();
        half.rotate(&axis, 180.0, &origin).unwrap();
        assert_relative_eq!(half.vertices()[0], Point3::new(0.0, 0.0, -2.0), epsilon = 1e-9);
        assert_relative_eq!(half.vertices()[2], Point3::new(2.0, -2.0, -2.0), epsilon = 1e-9);
        assert_relative_eq!(half.area(), shape.area(), epsilon = 1e-9);
        assert_eq!(half.vertices().len(), shape.vertices().len());

        let mut quarter = shape.duplicate();
        quarter.rotate(&axis, 90.0, &origin).unwrap();
        assert_relative_eq!(quarter.vertices()[0], Point3::new(0.0, -2.0, 0.0), epsilon = 1e-9);
        assert_relative_eq!(quarter.vertices()[2], Point3::new(2.0, -2.0, 2.0), epsilon = 1e-9);

        let mut untouched = shape.duplicate();
        assert!(untouched.rotate(&Vector3::zeros(), 90.0, &origin).is_err());
        assert_eq!(untouched.vertices(), shape.vertices());
    }

    #[test]
    fn test_rotate_xy() {
        let shape = unit_square_at_z2();
        let origin = Point3::new(1.0, 1.0, 0.0);

        let mut half = shape.duplicate();
        half.rotate_xy(180.0, &origin);
        assert_relative_eq!(half.vertices()[0], Point3::new(1.0, 1.0, 2.0), epsilon = 1e-9);
        assert_relative_eq!(half.vertices()[2], Point3::new(0.0, 0.0, 2.0), epsilon = 1e-9);

        let mut quarter = shape.duplicate();
        quarter.rotate_xy(90.0, &origin);
        assert_relative_eq!(quarter.vertices()[0], Point3::new(1.0, 1.0, 2.0), epsilon = 1e-9);
        assert_relative_eq!(quarter.vertices()[2], Point3::new(0.0, 2.0, 2.0), epsilon = 1e-9);
    }

    #[test]
    fn test_reflect() {
        let shape = unit_square_at_z2();
        let diagonal = Vector3::new(-1.0, -1.0, 0.0).normalize();
        let plane_1 = Plane::new(Vector3::x(), Point3::new(1.0, 0.0, 2.0)).unwrap();
        let plane_2 = Plane::new(diagonal, Point3::new(0.0, 0.0, 2.0)).unwrap();
        let plane_3 = Plane::new(diagonal, Point3::new(1.0, 0.0, 2.0)).unwrap();

        let mut r1 = shape.duplicate();
        r1.reflect(&plane_1);
        assert_relative_eq!(r1.vertices()[3], Point3::new(1.0, 1.0, 2.0), epsilon = 1e-9);
        assert_relative_eq!(r1.vertices()[1], Point3::new(0.0, 2.0, 2.0), epsilon = 1e-9);

        let mut r2 = shape.duplicate();
        r2.reflect(&plane_2);
        assert_relative_eq!(r2.vertices()[3], Point3::new(-1.0, -1.0, 2.0), epsilon = 1e-9);
        assert_relative_eq!(r2.vertices()[1], Point3::new(-2.0, -2.0, 2.0), epsilon = 1e-9);

        let mut r3 = shape.duplicate();
        r3.reflect(&plane_3);
        assert_relative_eq!(r3.vertices()[3], Point3::new(0.0, 0.0, 2.0), epsilon = 1e-9);
        assert_relative_eq!(r3.vertices()[1], Point3::new(-1.0, -1.0, 2.0), epsilon = 1e-9);
        assert_relative_eq!(r3.area(), shape.area(), epsilon = 1e-9);
    }

    #[test]
    fn test_transforms_keep_identity() {
        let mut shape = unit_square_at_z2();
        shape.set_display_name("Kept");
        shape
            .properties_mut()
            .set_extension("therm", json!({"type": "ShapeThermProperties"}))
            .unwrap();
        let before = (shape.identifier().to_string(), shape.properties().clone());

        shape.move_by(&Vector3::new(1.0, 0.0, 0.0));
        shape.scale(3.0, Some(&Point3::new(1.0, 1.0, 1.0)));
        shape.rotate_xy(33.0, &Point3::origin());
        shape.reflect(&Plane::world_xy());

        assert_eq!(shape.identifier(), before.0);
        assert_eq!(shape.display_name(), "Kept");
        assert_eq!(shape.properties(), &before.1);
        assert_eq!(shape.vertices().len(), 4);
    }

    #[test]
    fn test_remove_colinear_vertices() {
        let mut square = Shape::from_vertices(&[[0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [2.0, 2.0, 0.0], [0.0, 2.0, 0.0]]).unwrap();
        let mut five = Shape::from_vertices(&[
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [2.0, 0.0, 0.0],
            [2.0, 2.0, 0.0],
            [0.0, 2.0, 0.0],
        ])
        .unwrap();
        square.remove_colinear_vertices(0.0001).unwrap();
        five.remove_colinear_vertices(0.0001).unwrap();
        assert_eq!(square.vertices().len(), 4);
        assert_eq!(five.vertices().len(), 4);

        let snapshot = five.vertices().to_vec();
        five.remove_colinear_vertices(0.0001).unwrap();
        assert_eq!(five.vertices(), snapshot.as_slice());
    }

    #[test]
    fn test_check_planar() {
        let plane = z_plane(2.0);
        let flat = Shape::new(
            Face3D::new(
                pts(&[[0.0, 0.0, 2.0], [2.0, 0.0, 2.0], [2.0, 2.0, 2.0], [0.0, 2.0, 2.0]]),
                Some(plane.clone()),
            )
            .unwrap(),
        );
        let bent = Shape::new(
            Face3D::new(
                pts(&[[0.0, 0.0, 0.0], [2.0, 0.0, 2.0], [2.0, 2.0, 2.0], [0.0, 2.0, 2.0]]),
                Some(plane.clone()),
            )
            .unwrap(),
        );
        let nudged = Shape::new(
            Face3D::new(
                pts(&[[0.0, 0.0, 2.0001], [2.0, 0.0, 2.0], [2.0, 2.0, 2.0], [0.0, 2.0, 2.0]]),
                Some(plane),
            )
            .unwrap(),
        );

        assert_eq!(flat.check_planar(0.001, true).unwrap(), "");
        assert_ne!(bent.check_planar(0.001, false).unwrap(), "");
        assert!(bent.check_planar(0.0001, true).is_err());
        assert_eq!(nudged.check_planar(0.001, true).unwrap(), "");
        assert_ne!(nudged.check_planar(0.000001, false).unwrap(), "");
        assert!(nudged.check_planar(0.000001, true).is_err());
        assert!(flat.check_planar(-1.0, true).is_err());
    }

    #[test]
    fn test_check_self_intersecting() {
        let up = Plane::world_xy();
        let down = Plane::new(-Vector3::z(), Point3::origin()).unwrap();
        let square = pts(&[[0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [2.0, 2.0, 0.0], [0.0, 2.0, 0.0]]);
        let bow_tie = pts(&[[0.0, 0.0, 0.0], [0.0, 2.0, 0.0], [2.0, 0.0, 0.0], [2.0, 2.0, 0.0]]);

        for plane in [up, down] {
            let ok = Shape::new(Face3D::new(square.clone(), Some(plane.clone())).unwrap());
            let bad = Shape::new(Face3D::new(bow_tie.clone(), Some(plane)).unwrap());
            assert_eq!(ok.check_self_intersecting(0.01, false).unwrap(), "");
            assert_ne!(bad.check_self_intersecting(0.01, false).unwrap(), "");
            assert!(bad.check_self_intersecting(0.01, true).is_err());
        }
    }

    #[test]
    fn test_to_dict() {
        let mut shape = Shape::from_vertices(&[[0, 0, 0], [0, 10, 0], [0, 10, 3], [0, 0, 3]]).unwrap();
        shape.set_display_name("RectangleShape");
        let dict = shape.to_dict();

        assert_eq!(dict["type"], "Shape");
        assert!(Uuid::parse_str(dict["identifier"].as_str().unwrap()).is_ok());
        assert_eq!(dict["display_name"], "RectangleShape");
        assert_eq!(dict["geometry"]["boundary"].as_array().unwrap().len(), 4);
        assert_eq!(dict["properties"]["type"], "ShapeProperties");
    }

    #[test]
    fn test_to_from_dict() {
        let mut shape = Shape::from_vertices(&[[0, 0, 0], [0, 10, 0], [0, 10, 3], [0, 0, 3]]).unwrap();
        shape.set_display_name("RectangleShape");
        shape
            .properties_mut()
            .set_extension("energy", json!({"type": "ShapeEnergyProperties", "u": 0.3}))
            .unwrap();

        let dict = shape.to_dict();
        let restored = Shape::from_dict(&dict).unwrap();
        assert_eq!(restored.to_dict(), dict);
        assert_eq!(restored.identifier(), shape.identifier());
        assert!(!restored.has_parent());

        let mut wrong = dict.clone();
        wrong["type"] = json!("Boundary");
        assert!(Shape::from_dict(&wrong).is_err());
    }

    #[test]
    fn test_writer() {
        Shape::register_writer("vertex_count", |shape: &Shape, _args: &[Value]| {
            Ok(json!(shape.vertices().len()))
        });
        let shape = Shape::from_vertices(&[[0, 0, 0], [0, 10, 0], [0, 10, 3], [0, 0, 3]]).unwrap();
        let writers = shape.to();
        for name in writers.names() {
            assert!(writers.contains(&name));
        }
        assert_eq!(writers.call("vertex_count", &[]).unwrap(), json!(4));
    }
}
