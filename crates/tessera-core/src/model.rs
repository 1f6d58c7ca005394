//! 模型
//!
//! 拥有形状与边界两个有序集合，统一管理单位与容差。
//! 实体加入模型时记录模型的标识符作为反向引用，移除时清除。
//! 插入时不检查标识符重复，需显式调用检查方法。

use crate::boundary::Boundary;
use crate::error::{CoreError, CoreResult};
use crate::geometry::{Face3D, LineSegment3D, Plane};
use crate::identity::{EntityKind, Identified, Identity, IdentityMut, Properties};
use crate::math::{BoundingBox3, Point3, Vector3};
use crate::settings::{
    ModelSettings, Units, DEFAULT_ANGLE_TOLERANCE, DEFAULT_TOLERANCE, RESET_TOLERANCE,
};
use crate::shape::Shape;
use crate::transform::Transformable;
use crate::validate::{
    float_in_range, float_positive, invalid_dict_error, report_or_raise, ParseNumber,
};
use crate::writer::impl_writers;
use nalgebra::Rotation3;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Deref;
use tracing::debug;

/// 可放入模型的实体
#[derive(Debug, PartialEq)]
pub enum ModelObject {
    Shape(Shape),
    Boundary(Boundary),
}

impl ModelObject {
    /// 按 `type` 标签分派到对应实体
    pub fn from_dict(dict: &Value) -> CoreResult<Self> {
        match dict.get("type").and_then(Value::as_str) {
            Some("Shape") => Shape::from_dict(dict).map(ModelObject::Shape),
            Some("Boundary") => Boundary::from_dict(dict).map(ModelObject::Boundary),
            _ => Err(invalid_dict_error(
                dict,
                "Expected a Shape or Boundary dictionary.",
            )),
        }
    }

    pub fn to_dict(&self) -> Value {
        match self {
            ModelObject::Shape(shape) => shape.to_dict(),
            ModelObject::Boundary(boundary) => boundary.to_dict(),
        }
    }
}

impl From<Shape> for ModelObject {
    fn from(shape: Shape) -> Self {
        ModelObject::Shape(shape)
    }
}

impl From<Boundary> for ModelObject {
    fn from(boundary: Boundary) -> Self {
        ModelObject::Boundary(boundary)
    }
}

/// 模型
///
/// 反序列化经过 [`ModelRepr`] 校验容差并重建反向引用。
#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ModelRepr")]
pub struct Model {
    identity: Identity,
    properties: Properties,
    units: Units,
    tolerance: f64,
    angle_tolerance: f64,
    shapes: Vec<Shape>,
    boundaries: Vec<Boundary>,
}

impl_writers!(Model);

/// 反序列化中间表示，字段顺序与 `Model` 一致
#[derive(Deserialize)]
struct ModelRepr {
    identity: Identity,
    properties: Properties,
    units: Units,
    tolerance: f64,
    angle_tolerance: f64,
    shapes: Vec<Shape>,
    boundaries: Vec<Boundary>,
}

impl TryFrom<ModelRepr> for Model {
    type Error = CoreError;

    fn try_from(repr: ModelRepr) -> CoreResult<Self> {
        if repr.properties.kind() != EntityKind::Model {
            return Err(CoreError::Validation(format!(
                "Model cannot carry {}.",
                repr.properties.type_name()
            )));
        }
        let mut model = Model::bare(
            repr.identity,
            repr.units,
            float_positive(&repr.tolerance, "tolerance")?,
            float_positive(&repr.angle_tolerance, "angle_tolerance")?,
        );
        model.properties = repr.properties;
        repr.shapes.into_iter().for_each(|shape| model.add_shape(shape));
        repr.boundaries
            .into_iter()
            .for_each(|boundary| model.add_boundary(boundary));
        Ok(model)
    }
}

/// 模型构建器
#[derive(Debug, Default)]
pub struct ModelBuilder {
    identifier: Option<String>,
    display_name: Option<String>,
    settings: ModelSettings,
    shapes: Vec<Shape>,
    boundaries: Vec<Boundary>,
}

impl ModelBuilder {
    pub fn identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn settings(mut self, settings: ModelSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn units(mut self, units: Units) -> Self {
        self.settings.units = units;
        self
    }

    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.settings.tolerance = tolerance;
        self
    }

    pub fn angle_tolerance(mut self, angle_tolerance: f64) -> Self {
        self.settings.angle_tolerance = angle_tolerance;
        self
    }

    pub fn shapes(mut self, shapes: impl IntoIterator<Item = Shape>) -> Self {
        self.shapes.extend(shapes);
        self
    }

    pub fn boundaries(mut self, boundaries: impl IntoIterator<Item = Boundary>) -> Self {
        self.boundaries.extend(boundaries);
        self
    }

    /// 校验全部参数后再创建模型
    pub fn build(self) -> CoreResult<Model> {
        let mut identity = Identity::from_option(self.identifier.as_deref())?;
        let tolerance = float_positive(&self.settings.tolerance, "tolerance")?;
        let angle_tolerance = float_positive(&self.settings.angle_tolerance, "angle_tolerance")?;
        identity.set_display_name(self.display_name);

        let mut model = Model::bare(identity, self.settings.units, tolerance, angle_tolerance);
        self.shapes.into_iter().for_each(|shape| model.add_shape(shape));
        self.boundaries
            .into_iter()
            .for_each(|boundary| model.add_boundary(boundary));
        Ok(model)
    }
}

impl Model {
    fn bare(identity: Identity, units: Units, tolerance: f64, angle_tolerance: f64) -> Self {
        Self {
            identity,
            properties: Properties::new(EntityKind::Model),
            units,
            tolerance,
            angle_tolerance,
            shapes: Vec::new(),
            boundaries: Vec::new(),
        }
    }

    /// 使用默认单位与容差创建
    pub fn new(shapes: Vec<Shape>, boundaries: Vec<Boundary>) -> Self {
        let mut model = Self::bare(
            Identity::generate(),
            Units::default(),
            DEFAULT_TOLERANCE,
            DEFAULT_ANGLE_TOLERANCE,
        );
        shapes.into_iter().for_each(|shape| model.add_shape(shape));
        boundaries
            .into_iter()
            .for_each(|boundary| model.add_boundary(boundary));
        model
    }

    pub fn builder() -> ModelBuilder {
        ModelBuilder::default()
    }

    /// 从混合列表创建，按实体类型分组，保持各自的相对顺序
    pub fn from_objects(objects: impl IntoIterator<Item = ModelObject>) -> Self {
        let mut model = Self::new(Vec::new(), Vec::new());
        for object in objects {
            model.add_object(object);
        }
        model
    }

    /// 按层厚创建分层构造，使用默认设置
    pub fn from_layers<N: ParseNumber>(thicknesses: &[N]) -> CoreResult<Self> {
        Self::from_layers_with(thicknesses, &ModelSettings::default())
    }

    /// 按层厚创建分层构造
    ///
    /// 每层是 XY 平面内沿 +X 依次排列的矩形，宽为层厚、高为 `settings.layer_height`。
    /// 外侧边界位于 `x = 0`，内侧边界位于总厚度处。
    pub fn from_layers_with<N: ParseNumber>(
        thicknesses: &[N],
        settings: &ModelSettings,
    ) -> CoreResult<Self> {
        settings.validate()?;
        if thicknesses.is_empty() {
            return Err(CoreError::Geometry(
                "At least one layer thickness is required".to_string(),
            ));
        }
        let height = settings.layer_height;

        let mut x = 0.0;
        let mut shapes = Vec::with_capacity(thicknesses.len());
        for (i, thickness) in thicknesses.iter().enumerate() {
            let thickness = float_positive(thickness, "layer thickness")?;
            let face = Face3D::new(
                vec![
                    Point3::new(x, 0.0, 0.0),
                    Point3::new(x + thickness, 0.0, 0.0),
                    Point3::new(x + thickness, height, 0.0),
                    Point3::new(x, height, 0.0),
                ],
                Some(Plane::world_xy()),
            )?;
            let mut shape = Shape::new(face);
            shape.set_display_name(format!("Layer {}", i + 1));
            shapes.push(shape);
            x += thickness;
        }

        let edge = |x: f64, name: &str| -> CoreResult<Boundary> {
            let segment =
                LineSegment3D::from_end_points(Point3::new(x, 0.0, 0.0), Point3::new(x, height, 0.0));
            let mut boundary = Boundary::new(vec![segment])?;
            boundary.set_display_name(name);
            Ok(boundary)
        };
        let boundaries = vec![edge(0.0, "Exterior")?, edge(x, "Interior")?];

        debug!(layers = shapes.len(), total_thickness = x, "Built layered model");
        Model::builder()
            .settings(settings.clone())
            .shapes(shapes)
            .boundaries(boundaries)
            .build()
    }

    pub fn units(&self) -> Units {
        self.units
    }

    /// 只修改单位标签，不缩放几何；需要换算时使用 [`Model::convert_to_units`]
    pub fn set_units(&mut self, units: Units) {
        self.units = units;
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// 设置容差，`None` 恢复为 [`RESET_TOLERANCE`]
    pub fn set_tolerance(&mut self, tolerance: Option<f64>) -> CoreResult<()> {
        self.tolerance = match tolerance {
            Some(value) => float_positive(&value, "tolerance")?,
            None => RESET_TOLERANCE,
        };
        Ok(())
    }

    pub fn angle_tolerance(&self) -> f64 {
        self.angle_tolerance
    }

    /// 设置角度容差（度），`None` 恢复默认值
    pub fn set_angle_tolerance(&mut self, angle_tolerance: Option<f64>) -> CoreResult<()> {
        self.angle_tolerance = match angle_tolerance {
            Some(value) => float_positive(&value, "angle_tolerance")?,
            None => DEFAULT_ANGLE_TOLERANCE,
        };
        Ok(())
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    /// 逐个修改已有形状，不能增删或替换
    pub fn shapes_iter_mut(&mut self) -> impl Iterator<Item = EntityMut<'_, Shape>> {
        self.shapes.iter_mut().map(EntityMut)
    }

    /// 按标识符取第一个匹配的形状
    pub fn shape_mut(&mut self, identifier: &str) -> Option<EntityMut<'_, Shape>> {
        self.shapes
            .iter_mut()
            .find(|shape| shape.identifier() == identifier)
            .map(EntityMut)
    }

    pub fn boundaries(&self) -> &[Boundary] {
        &self.boundaries
    }

    pub fn boundaries_iter_mut(&mut self) -> impl Iterator<Item = EntityMut<'_, Boundary>> {
        self.boundaries.iter_mut().map(EntityMut)
    }

    pub fn boundary_mut(&mut self, identifier: &str) -> Option<EntityMut<'_, Boundary>> {
        self.boundaries
            .iter_mut()
            .find(|boundary| boundary.identifier() == identifier)
            .map(EntityMut)
    }

    pub fn add_shape(&mut self, mut shape: Shape) {
        shape
            .identity_mut()
            .set_parent(Some(self.identity.identifier().to_string()));
        self.shapes.push(shape);
    }

    pub fn add_boundary(&mut self, mut boundary: Boundary) {
        boundary
            .identity_mut()
            .set_parent(Some(self.identity.identifier().to_string()));
        self.boundaries.push(boundary);
    }

    pub fn add_object(&mut self, object: ModelObject) {
        match object {
            ModelObject::Shape(shape) => self.add_shape(shape),
            ModelObject::Boundary(boundary) => self.add_boundary(boundary),
        }
    }

    /// 将另一个模型的全部实体移入本模型
    ///
    /// 几何按单位换算到本模型的单位。
    pub fn add_model(&mut self, mut other: Model) {
        if other.units != self.units {
            other.convert_to_units(self.units);
        }
        for shape in other.remove_shapes(None) {
            self.add_shape(shape);
        }
        for boundary in other.remove_boundaries(None) {
            self.add_boundary(boundary);
        }
    }

    /// 移除形状并返回，`identifiers` 为空时移除全部
    pub fn remove_shapes(&mut self, identifiers: Option<&[&str]>) -> Vec<Shape> {
        take_matching(&mut self.shapes, identifiers)
    }

    /// 移除边界并返回，`identifiers` 为空时移除全部
    pub fn remove_boundaries(&mut self, identifiers: Option<&[&str]>) -> Vec<Boundary> {
        take_matching(&mut self.boundaries, identifiers)
    }

    /// 按给定顺序查找形状
    pub fn shapes_by_identifier(&self, identifiers: &[&str]) -> CoreResult<Vec<&Shape>> {
        find_by_identifier(&self.shapes, identifiers, EntityKind::Shape)
    }

    /// 按给定顺序查找边界
    pub fn boundaries_by_identifier(&self, identifiers: &[&str]) -> CoreResult<Vec<&Boundary>> {
        find_by_identifier(&self.boundaries, identifiers, EntityKind::Boundary)
    }

    pub fn check_duplicate_shape_identifiers(&self, raise: bool) -> CoreResult<String> {
        report_or_raise(duplicate_issue(&self.shapes, EntityKind::Shape), raise)
    }

    pub fn check_duplicate_boundary_identifiers(&self, raise: bool) -> CoreResult<String> {
        report_or_raise(duplicate_issue(&self.boundaries, EntityKind::Boundary), raise)
    }

    /// 检查所有形状与边界是否共面，`tolerance` 为空时使用模型容差
    pub fn check_planar(&self, tolerance: Option<f64>, raise: bool) -> CoreResult<String> {
        let tolerance = self.resolve_tolerance(tolerance)?;
        let issues = self
            .shapes
            .iter()
            .map(|shape| shape.planar_issue(tolerance))
            .chain(self.boundaries.iter().map(|b| b.planar_issue(tolerance)));
        report_or_raise(join_issues(issues), raise)
    }

    /// 检查所有形状是否自相交，`tolerance` 为空时使用模型容差
    pub fn check_self_intersecting(&self, tolerance: Option<f64>, raise: bool) -> CoreResult<String> {
        let tolerance = self.resolve_tolerance(tolerance)?;
        let issues = self
            .shapes
            .iter()
            .map(|shape| shape.self_intersection_issue(tolerance));
        report_or_raise(join_issues(issues), raise)
    }

    /// 以模型容差运行全部检查
    pub fn check_all(&self, raise: bool) -> CoreResult<String> {
        let tolerance = self.tolerance;
        let issues = [
            duplicate_issue(&self.shapes, EntityKind::Shape),
            duplicate_issue(&self.boundaries, EntityKind::Boundary),
        ]
        .into_iter()
        .chain(self.shapes.iter().map(|s| s.planar_issue(tolerance)))
        .chain(self.boundaries.iter().map(|b| b.planar_issue(tolerance)))
        .chain(self.shapes.iter().map(|s| s.self_intersection_issue(tolerance)));
        report_or_raise(join_issues(issues), raise)
    }

    /// 去除所有形状的重复与共线顶点；不足三个顶点的形状从模型中移除并返回
    ///
    /// 边界不受影响。
    pub fn remove_degenerate_geometry(&mut self, tolerance: Option<f64>) -> CoreResult<Vec<Shape>> {
        let tolerance = self.resolve_tolerance(tolerance)?;
        let mut degenerate = Vec::new();
        for mut shape in std::mem::take(&mut self.shapes) {
            if shape.remove_colinear_vertices(tolerance).is_ok() {
                self.shapes.push(shape);
            } else {
                shape.identity_mut().set_parent(None);
                degenerate.push(shape);
            }
        }
        debug!(
            removed = degenerate.len(),
            tolerance, "Removed degenerate shapes"
        );
        Ok(degenerate)
    }

    /// 将几何换算到新单位
    ///
    /// 容差保持原值不变。
    pub fn convert_to_units(&mut self, units: Units) {
        let factor = self.units.conversion_factor(units);
        if factor != 1.0 {
            self.scale(factor, None);
        }
        debug!(from = %self.units, to = %units, factor, "Converted model units");
        self.units = units;
    }

    /// 所有形状面积之和
    pub fn shape_area(&self) -> f64 {
        self.shapes.iter().map(Shape::area).sum()
    }

    /// 所有边界长度之和
    pub fn boundary_length(&self) -> f64 {
        self.boundaries.iter().map(Boundary::length).sum()
    }

    fn bounding_box(&self) -> BoundingBox3 {
        let shapes = self.shapes.iter().map(|s| s.geometry().bounding_box());
        let boundaries = self
            .boundaries
            .iter()
            .map(|b| BoundingBox3::new(b.min(), b.max()));
        shapes
            .chain(boundaries)
            .fold(BoundingBox3::empty(), |acc, bbox| acc.union(&bbox))
    }

    /// 空模型时为原点
    pub fn min(&self) -> Point3 {
        let bbox = self.bounding_box();
        if bbox.is_empty() {
            Point3::origin()
        } else {
            bbox.min
        }
    }

    /// 空模型时为原点
    pub fn max(&self) -> Point3 {
        let bbox = self.bounding_box();
        if bbox.is_empty() {
            Point3::origin()
        } else {
            bbox.max
        }
    }

    pub fn center(&self) -> Point3 {
        nalgebra::center(&self.min(), &self.max())
    }

    /// 复制模型及其全部实体；副本中的实体属于新模型
    pub fn duplicate(&self) -> Self {
        let mut model = Self::bare(
            self.identity.duplicate(),
            self.units,
            self.tolerance,
            self.angle_tolerance,
        );
        model.properties = self.properties.clone();
        self.shapes
            .iter()
            .for_each(|shape| model.add_shape(shape.duplicate()));
        self.boundaries
            .iter()
            .for_each(|boundary| model.add_boundary(boundary.duplicate()));
        model
    }

    pub fn to_dict(&self) -> Value {
        let mut dict = Map::new();
        self.identity.write_dict(EntityKind::Model, &mut dict);
        dict.insert("units".to_string(), Value::from(self.units.name()));
        dict.insert("tolerance".to_string(), Value::from(self.tolerance));
        dict.insert(
            "angle_tolerance".to_string(),
            Value::from(self.angle_tolerance),
        );
        dict.insert(
            "shapes".to_string(),
            Value::Array(self.shapes.iter().map(Shape::to_dict).collect()),
        );
        dict.insert(
            "boundaries".to_string(),
            Value::Array(self.boundaries.iter().map(Boundary::to_dict).collect()),
        );
        dict.insert("properties".to_string(), self.properties.to_dict());
        Value::Object(dict)
    }

    /// 缺失的单位与容差使用默认值，缺失的集合视为空
    pub fn from_dict(dict: &Value) -> CoreResult<Self> {
        let identity = Identity::read_dict(EntityKind::Model, dict)?;
        let units = match dict.get("units") {
            Some(Value::String(name)) => name
                .parse::<Units>()
                .map_err(|e| invalid_dict_error(dict, e))?,
            Some(other) => {
                return Err(invalid_dict_error(
                    dict,
                    format!("\"units\" must be a string. Got {}.", other),
                ))
            }
            None => Units::default(),
        };
        let number = |key: &str, default: f64| -> CoreResult<f64> {
            match dict.get(key) {
                Some(value) if !value.is_null() => {
                    float_positive(value, key).map_err(|e| invalid_dict_error(dict, e))
                }
                _ => Ok(default),
            }
        };
        let tolerance = number("tolerance", DEFAULT_TOLERANCE)?;
        let angle_tolerance = number("angle_tolerance", DEFAULT_ANGLE_TOLERANCE)?;

        let mut model = Self::bare(identity, units, tolerance, angle_tolerance);
        model.properties = Properties::from_dict(EntityKind::Model, dict)?;
        for item in entity_list(dict, "shapes")? {
            model.add_shape(Shape::from_dict(item)?);
        }
        for item in entity_list(dict, "boundaries")? {
            model.add_boundary(Boundary::from_dict(item)?);
        }
        Ok(model)
    }

    fn resolve_tolerance(&self, tolerance: Option<f64>) -> CoreResult<f64> {
        match tolerance {
            Some(value) => float_in_range(&value, 0.0, f64::INFINITY, "tolerance"),
            None => Ok(self.tolerance),
        }
    }
}

fn entity_list<'a>(dict: &'a Value, key: &str) -> CoreResult<&'a [Value]> {
    match dict.get(key) {
        Some(Value::Array(items)) => Ok(items),
        Some(Value::Null) | None => Ok(&[]),
        Some(_) => Err(invalid_dict_error(
            dict,
            format!("\"{}\" must be a list.", key),
        )),
    }
}

/// 取出匹配的实体并清除其反向引用
fn take_matching<T: Identified + IdentityMut>(items: &mut Vec<T>, identifiers: Option<&[&str]>) -> Vec<T> {
    let (removed, kept): (Vec<T>, Vec<T>) = std::mem::take(items)
        .into_iter()
        .partition(|item| identifiers.map_or(true, |ids| ids.contains(&item.identifier())));
    *items = kept;
    removed
        .into_iter()
        .map(|mut item| {
            item.identity_mut().set_parent(None);
            item
        })
        .collect()
}

fn find_by_identifier<'a, T: Identified>(
    items: &'a [T],
    identifiers: &[&str],
    kind: EntityKind,
) -> CoreResult<Vec<&'a T>> {
    identifiers
        .iter()
        .map(|id| {
            items
                .iter()
                .find(|item| item.identifier() == *id)
                .ok_or_else(|| CoreError::NotFound {
                    kind: kind.type_name(),
                    identifier: id.to_string(),
                })
        })
        .collect()
}

/// 重复标识符的描述，按首次出现的顺序列出
fn duplicate_issue<T: Identified>(items: &[T], kind: EntityKind) -> String {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for item in items {
        *counts.entry(item.identifier()).or_default() += 1;
    }
    let mut duplicates: Vec<&str> = Vec::new();
    for item in items {
        let id = item.identifier();
        if counts.get(id).copied().unwrap_or(0) > 1 && !duplicates.contains(&id) {
            duplicates.push(id);
        }
    }
    if duplicates.is_empty() {
        return String::new();
    }
    format!(
        "The following duplicated {} identifiers were found:\n  {}",
        kind,
        duplicates.join("\n  ")
    )
}

fn join_issues(issues: impl Iterator<Item = String>) -> String {
    issues
        .filter(|issue| !issue.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

impl Identified for Model {
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

/// 模型内实体的可变借用
///
/// 只开放变换、显示名称与属性修改；实体本身不能被替换或移出，
/// 因此反向引用始终与集合成员关系一致。
#[derive(Debug)]
pub struct EntityMut<'a, T>(&'a mut T);

impl<T> Deref for EntityMut<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &*self.0
    }
}

impl<T: Identified> EntityMut<'_, T> {
    pub fn set_display_name(&mut self, name: impl Into<String>) {
        self.0.set_display_name(name);
    }

    pub fn properties_mut(&mut self) -> &mut Properties {
        self.0.properties_mut()
    }
}

impl EntityMut<'_, Shape> {
    pub fn remove_colinear_vertices(&mut self, tolerance: f64) -> CoreResult<()> {
        self.0.remove_colinear_vertices(tolerance)
    }
}

impl<T: Transformable> Transformable for EntityMut<'_, T> {
    fn move_by(&mut self, vector: &Vector3) {
        self.0.move_by(vector);
    }

    fn scale(&mut self, factor: f64, origin: Option<&Point3>) {
        self.0.scale(factor, origin);
    }

    fn rotate_by(&mut self, rotation: &Rotation3<f64>, origin: &Point3) {
        self.0.rotate_by(rotation, origin);
    }

    fn reflect(&mut self, plane: &Plane) {
        self.0.reflect(plane);
    }
}

impl Transformable for Model {
    fn move_by(&mut self, vector: &Vector3) {
        self.shapes.iter_mut().for_each(|s| s.move_by(vector));
        self.boundaries.iter_mut().for_each(|b| b.move_by(vector));
    }

    fn scale(&mut self, factor: f64, origin: Option<&Point3>) {
        self.shapes.iter_mut().for_each(|s| s.scale(factor, origin));
        self.boundaries
            .iter_mut()
            .for_each(|b| b.scale(factor, origin));
    }

    fn rotate_by(&mut self, rotation: &Rotation3<f64>, origin: &Point3) {
        self.shapes
            .iter_mut()
            .for_each(|s| s.rotate_by(rotation, origin));
        self.boundaries
            .iter_mut()
            .for_each(|b| b.rotate_by(rotation, origin));
    }

    fn reflect(&mut self, plane: &Plane) {
        self.shapes.iter_mut().for_each(|s| s.reflect(plane));
        self.boundaries.iter_mut().for_each(|b| b.reflect(plane));
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Model: {}", self.display_name())
    }
}
