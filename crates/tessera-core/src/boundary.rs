//! 边界线
//!
//! 持有一组有序线段（可以互不相连），长度与中心由线段实时计算。

use crate::error::{CoreError, CoreResult};
use crate::geometry::{LineSegment3D, Plane};
use crate::identity::{EntityKind, Identified, Identity, IdentityMut, Properties};
use crate::math::{BoundingBox3, Point3, Vector3, EPSILON};
use crate::transform::Transformable;
use crate::validate::{
    ensure_length, float_in_range, invalid_dict_error, report_or_raise, tuple_with_length,
    ParseNumber,
};
use crate::writer::impl_writers;
use nalgebra::Rotation3;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// 边界
#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BoundaryRepr")]
pub struct Boundary {
    identity: Identity,
    properties: Properties,
    geometry: Vec<LineSegment3D>,
}

#[derive(Deserialize)]
struct BoundaryRepr {
    identity: Identity,
    properties: Properties,
    geometry: Vec<LineSegment3D>,
}

impl TryFrom<BoundaryRepr> for Boundary {
    type Error = CoreError;

    fn try_from(repr: BoundaryRepr) -> CoreResult<Self> {
        non_empty(&repr.geometry)?;
        if repr.properties.kind() != EntityKind::Boundary {
            return Err(CoreError::Validation(format!(
                "Boundary cannot carry {}.",
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

impl_writers!(Boundary);

fn non_empty(geometry: &[LineSegment3D]) -> CoreResult<()> {
    if geometry.is_empty() {
        return Err(CoreError::Geometry(
            "Boundary requires at least one line segment".to_string(),
        ));
    }
    Ok(())
}

impl Boundary {
    pub fn new(geometry: Vec<LineSegment3D>) -> CoreResult<Self> {
        non_empty(&geometry)?;
        Ok(Self {
            identity: Identity::generate(),
            properties: Properties::new(EntityKind::Boundary),
            geometry,
        })
    }

    pub fn with_identifier(geometry: Vec<LineSegment3D>, identifier: &str) -> CoreResult<Self> {
        let identity = Identity::with_identifier(identifier)?;
        non_empty(&geometry)?;
        Ok(Self {
            identity,
            properties: Properties::new(EntityKind::Boundary),
            geometry,
        })
    }

    /// 从嵌套顶点创建：每条线段恰好两个点，每个点恰好三个坐标
    pub fn from_vertices<S, V, T>(segments: &[S]) -> CoreResult<Self>
    where
        S: AsRef<[V]>,
        V: AsRef<[T]>,
        T: ParseNumber,
    {
        let geometry = segments
            .iter()
            .map(|segment| {
                let points = segment.as_ref();
                ensure_length(points.len(), 2, "boundary segment")?;
                let point = |v: &V| -> CoreResult<Point3> {
                    let [x, y, z] =
                        tuple_with_length::<f64, _, 3>(v.as_ref().iter(), "boundary vertex")?;
                    Ok(Point3::new(x, y, z))
                };
                Ok(LineSegment3D::from_end_points(point(&points[0])?, point(&points[1])?))
            })
            .collect::<CoreResult<Vec<_>>>()?;
        Self::new(geometry)
    }

    pub fn geometry(&self) -> &[LineSegment3D] {
        &self.geometry
    }

    /// 所有线段端点依次拼接
    pub fn vertices(&self) -> Vec<Point3> {
        self.geometry.iter().flat_map(LineSegment3D::vertices).collect()
    }

    pub fn length(&self) -> f64 {
        self.geometry.iter().map(LineSegment3D::length).sum()
    }

    /// 按长度加权的线段中点平均；总长为零时退化为中点平均
    pub fn center(&self) -> Point3 {
        let total = self.length();
        let weighted = if total > EPSILON {
            self.geometry
                .iter()
                .fold(Vector3::zeros(), |acc, seg| {
                    acc + seg.midpoint().coords * seg.length()
                })
                / total
        } else {
            self.geometry
                .iter()
                .fold(Vector3::zeros(), |acc, seg| acc + seg.midpoint().coords)
                / self.geometry.len() as f64
        };
        Point3::from(weighted)
    }

    fn bounding_box(&self) -> BoundingBox3 {
        self.geometry
            .iter()
            .fold(BoundingBox3::empty(), |acc, seg| acc.union(&seg.bounding_box()))
    }

    pub fn min(&self) -> Point3 {
        self.bounding_box().min
    }

    pub fn max(&self) -> Point3 {
        self.bounding_box().max
    }

    pub fn duplicate(&self) -> Self {
        Self {
            identity: self.identity.duplicate(),
            properties: self.properties.clone(),
            geometry: self.geometry.clone(),
        }
    }

    /// 检查所有线段是否共面
    ///
    /// 全部端点共线时视为共面。
    pub fn check_planar(&self, tolerance: f64, raise: bool) -> CoreResult<String> {
        let tolerance = float_in_range(&tolerance, 0.0, f64::INFINITY, "tolerance")?;
        report_or_raise(self.planar_issue(tolerance), raise)
    }

    pub(crate) fn planar_issue(&self, tolerance: f64) -> String {
        let vertices = self.vertices();
        let deviation = Plane::best_fit(&vertices)
            .map(|plane| {
                vertices
                    .iter()
                    .map(|p| plane.distance_to_point(p))
                    .fold(0.0, f64::max)
            })
            .unwrap_or(0.0);
        if deviation <= tolerance {
            return String::new();
        }
        format!(
            "Boundary \"{}\" is not planar: a vertex is {} off the best-fit plane, beyond the tolerance of {}.",
            self.display_name(),
            deviation,
            tolerance
        )
    }

    pub fn to_dict(&self) -> Value {
        let mut dict = Map::new();
        self.identity.write_dict(EntityKind::Boundary, &mut dict);
        dict.insert(
            "geometry".to_string(),
            Value::Array(self.geometry.iter().map(LineSegment3D::to_dict).collect()),
        );
        dict.insert("properties".to_string(), self.properties.to_dict());
        Value::Object(dict)
    }

    pub fn from_dict(dict: &Value) -> CoreResult<Self> {
        let identity = Identity::read_dict(EntityKind::Boundary, dict)?;
        let geometry = dict
            .get("geometry")
            .and_then(Value::as_array)
            .ok_or_else(|| invalid_dict_error(dict, "Missing \"geometry\" segment list."))?
            .iter()
            .map(LineSegment3D::from_dict)
            .collect::<CoreResult<Vec<_>>>()?;
        non_empty(&geometry).map_err(|e| invalid_dict_error(dict, e))?;
        let properties = Properties::from_dict(EntityKind::Boundary, dict)?;
        Ok(Self {
            identity,
            properties,
            geometry,
        })
    }

    fn map_geometry(&mut self, f: impl Fn(&LineSegment3D) -> LineSegment3D) {
        self.geometry = self.geometry.iter().map(f).collect();
    }
}

impl Identified for Boundary {
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

impl IdentityMut for Boundary {
    fn identity_mut(&mut self) -> &mut Identity {
        &mut self.identity
    }
}

impl Transformable for Boundary {
    fn move_by(&mut self, vector: &Vector3) {
        self.map_geometry(|seg| seg.moved(vector));
    }

    fn scale(&mut self, factor: f64, origin: Option<&Point3>) {
        let origin = origin.copied().unwrap_or_else(Point3::origin);
        self.map_geometry(|seg| seg.scaled(factor, &origin));
    }

    fn rotate_by(&mut self, rotation: &Rotation3<f64>, origin: &Point3) {
        self.map_geometry(|seg| seg.rotated(rotation, origin));
    }

    fn reflect(&mut self, plane: &Plane) {
        self.map_geometry(|seg| seg.reflected(plane));
    }
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Boundary: {}", self.display_name())
    }
}
