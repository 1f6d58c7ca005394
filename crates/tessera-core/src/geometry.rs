//! 几何图元定义
//!
//! 实体所持有的不可变几何图元：
//! - 平面 (Plane)
//! - 三维线段 (LineSegment3D)
//! - 平面多边形 (Face3D)
//!
//! 所有变换都返回新的图元，原图元保持不变。

use crate::error::{CoreError, CoreResult};
use crate::math::{BoundingBox3, Point3, Vector3, EPSILON};
use crate::validate::{invalid_dict_error, tuple_with_length};
use nalgebra::{Rotation3, Unit};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// 点的刚体/缩放变换
///
/// 图元的各个变换方法都通过它作用到每个点和方向向量上。
#[derive(Debug, Clone, Copy)]
enum PointMap<'a> {
    Move(&'a Vector3),
    Scale(f64, &'a Point3),
    Rotate(&'a Rotation3<f64>, &'a Point3),
    Reflect(&'a Vector3, &'a Point3),
}

impl PointMap<'_> {
    fn point(&self, p: &Point3) -> Point3 {
        match *self {
            PointMap::Move(v) => p + v,
            PointMap::Scale(factor, origin) => origin + (p - origin) * factor,
            PointMap::Rotate(rotation, origin) => origin + rotation * (p - origin),
            PointMap::Reflect(normal, origin) => p - normal * (2.0 * (p - origin).dot(normal)),
        }
    }

    fn vector(&self, v: &Vector3) -> Vector3 {
        match *self {
            PointMap::Move(_) => *v,
            PointMap::Scale(factor, _) => v * factor,
            PointMap::Rotate(rotation, _) => rotation * v,
            PointMap::Reflect(normal, _) => v - normal * (2.0 * v.dot(normal)),
        }
    }
}

/// 绕轴旋转（角度为弧度）
pub(crate) fn rotation(axis: &Vector3, angle: f64) -> CoreResult<Rotation3<f64>> {
    let axis = Unit::try_new(*axis, EPSILON)
        .ok_or_else(|| CoreError::Geometry("Rotation axis must not be a zero vector".to_string()))?;
    Ok(Rotation3::from_axis_angle(&axis, angle))
}

pub(crate) fn point_to_value(p: &Point3) -> Value {
    json!([p.x, p.y, p.z])
}

pub(crate) fn vector_to_value(v: &Vector3) -> Value {
    json!([v.x, v.y, v.z])
}

fn coords(dict: &Value, key: &str) -> CoreResult<[f64; 3]> {
    let items = dict
        .get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| invalid_dict_error(dict, format!("Missing coordinate array \"{}\".", key)))?;
    tuple_with_length::<f64, _, 3>(items.iter(), key).map_err(|e| invalid_dict_error(dict, e))
}

fn point_from(dict: &Value, key: &str) -> CoreResult<Point3> {
    let [x, y, z] = coords(dict, key)?;
    Ok(Point3::new(x, y, z))
}

fn vector_from(dict: &Value, key: &str) -> CoreResult<Vector3> {
    let [x, y, z] = coords(dict, key)?;
    Ok(Vector3::new(x, y, z))
}

fn expect_type(dict: &Value, expected: &str) -> CoreResult<()> {
    match dict.get("type").and_then(Value::as_str) {
        Some(t) if t == expected => Ok(()),
        _ => Err(invalid_dict_error(
            dict,
            format!("Expected {} dictionary.", expected),
        )),
    }
}

/// Newell 法向量（未归一化，模长为面积的两倍）
fn newell_normal(points: &[Point3]) -> Vector3 {
    let n = points.len();
    let mut normal = Vector3::zeros();
    for i in 0..n {
        let a = points[i].coords;
        let b = points[(i + 1) % n].coords;
        normal += a.cross(&b);
    }
    normal
}

/// 平面
///
/// 由单位法向 `n`、原点 `o` 与平面内的 X 轴 `x` 描述。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PlaneRepr")]
pub struct Plane {
    n: Vector3,
    o: Point3,
    x: Vector3,
}

#[derive(Deserialize)]
struct PlaneRepr {
    n: Vector3,
    o: Point3,
    x: Vector3,
}

impl TryFrom<PlaneRepr> for Plane {
    type Error = CoreError;

    fn try_from(repr: PlaneRepr) -> CoreResult<Self> {
        Plane::from_axes(repr.n, repr.o, repr.x)
    }
}

/// 归一化；已是单位向量时保留原值
fn unit_vector(v: Vector3, name: &str) -> CoreResult<Vector3> {
    let norm = v.norm();
    if !norm.is_finite() || norm <= EPSILON {
        return Err(CoreError::Geometry(format!(
            "Plane {} must be a finite non-zero vector",
            name
        )));
    }
    if (norm - 1.0).abs() <= EPSILON {
        Ok(v)
    } else {
        Ok(v / norm)
    }
}

impl Plane {
    pub fn new(normal: Vector3, origin: Point3) -> CoreResult<Self> {
        let n = normal
            .try_normalize(EPSILON)
            .ok_or_else(|| CoreError::Geometry("Plane normal must not be a zero vector".to_string()))?;
        let x = if n.x.abs() < EPSILON && n.y.abs() < EPSILON {
            Vector3::x()
        } else {
            Vector3::new(n.y, -n.x, 0.0).normalize()
        };
        Ok(Self { n, o: origin, x })
    }

    /// 由法向与 X 轴创建，两者不能平行
    pub fn from_axes(normal: Vector3, origin: Point3, x_axis: Vector3) -> CoreResult<Self> {
        let n = unit_vector(normal, "normal")?;
        let x = unit_vector(x_axis, "x axis")?;
        if n.cross(&x).norm() <= EPSILON {
            return Err(CoreError::Geometry(
                "Plane x axis must not be parallel to its normal".to_string(),
            ));
        }
        Ok(Self { n, o: origin, x })
    }

    /// 经过原点的 XY 平面
    pub fn world_xy() -> Self {
        Self {
            n: Vector3::z(),
            o: Point3::origin(),
            x: Vector3::x(),
        }
    }

    /// 拟合一组点的平面
    ///
    /// 优先使用 Newell 法向；点集法向抵消时退回到三个最不共线的点。
    /// 所有点共线（或少于三个点）时返回 `None`。
    pub fn best_fit(points: &[Point3]) -> Option<Plane> {
        if points.len() < 3 {
            return None;
        }
        let count = points.len() as f64;
        let centroid = Point3::from(points.iter().map(|p| p.coords).sum::<Vector3>() / count);

        let newell = newell_normal(points);
        if newell.norm() > EPSILON {
            return Plane::new(newell, centroid).ok();
        }

        let first = points[0];
        let far = points
            .iter()
            .max_by(|a, b| (*a - first).norm().total_cmp(&(*b - first).norm()))?;
        let axis = far - first;
        let normal = points
            .iter()
            .map(|p| axis.cross(&(p - first)))
            .max_by(|a, b| a.norm().total_cmp(&b.norm()))?;
        if normal.norm() <= EPSILON {
            return None;
        }
        Plane::new(normal, centroid).ok()
    }

    pub fn normal(&self) -> &Vector3 {
        &self.n
    }

    pub fn origin(&self) -> &Point3 {
        &self.o
    }

    pub fn x_axis(&self) -> &Vector3 {
        &self.x
    }

    pub fn y_axis(&self) -> Vector3 {
        self.n.cross(&self.x)
    }

    /// 点到平面的距离（非负）
    pub fn distance_to_point(&self, point: &Point3) -> f64 {
        (point - self.o).dot(&self.n).abs()
    }

    /// 点投影到平面的二维坐标
    pub fn xyz_to_xy(&self, point: &Point3) -> [f64; 2] {
        let d = point - self.o;
        [d.dot(&self.x), d.dot(&self.y_axis())]
    }

    fn mapped(&self, map: PointMap<'_>) -> Plane {
        let n = map.vector(&self.n);
        let x = map.vector(&self.x);
        Plane {
            n: n.try_normalize(EPSILON).unwrap_or(n),
            o: map.point(&self.o),
            x: x.try_normalize(EPSILON).unwrap_or(x),
        }
    }

    pub fn moved(&self, vector: &Vector3) -> Plane {
        Plane {
            o: self.o + vector,
            ..self.clone()
        }
    }

    pub fn scaled(&self, factor: f64, origin: &Point3) -> Plane {
        Plane {
            o: PointMap::Scale(factor, origin).point(&self.o),
            ..self.clone()
        }
    }

    pub fn rotated(&self, rotation: &Rotation3<f64>, origin: &Point3) -> Plane {
        self.mapped(PointMap::Rotate(rotation, origin))
    }

    pub fn reflected(&self, plane: &Plane) -> Plane {
        self.mapped(PointMap::Reflect(&plane.n, &plane.o))
    }

    pub fn to_dict(&self) -> Value {
        json!({
            "type": "Plane",
            "n": vector_to_value(&self.n),
            "o": point_to_value(&self.o),
            "x": vector_to_value(&self.x),
        })
    }

    pub fn from_dict(dict: &Value) -> CoreResult<Self> {
        expect_type(dict, "Plane")?;
        let n = vector_from(dict, "n")?;
        let o = point_from(dict, "o")?;
        let plane = match dict.get("x") {
            Some(_) => Plane::from_axes(n, o, vector_from(dict, "x")?),
            None => Plane::new(n, o),
        };
        plane.map_err(|e| invalid_dict_error(dict, e))
    }
}

/// 三维线段
///
/// 起点 `p` 加方向向量 `v`，终点为 `p + v`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSegment3D {
    p: Point3,
    v: Vector3,
}

impl LineSegment3D {
    pub fn new(p: Point3, v: Vector3) -> Self {
        Self { p, v }
    }

    pub fn from_end_points(p1: Point3, p2: Point3) -> Self {
        Self { p: p1, v: p2 - p1 }
    }

    pub fn p1(&self) -> Point3 {
        self.p
    }

    pub fn p2(&self) -> Point3 {
        self.p + self.v
    }

    pub fn direction(&self) -> &Vector3 {
        &self.v
    }

    pub fn vertices(&self) -> [Point3; 2] {
        [self.p1(), self.p2()]
    }

    pub fn length(&self) -> f64 {
        self.v.norm()
    }

    pub fn midpoint(&self) -> Point3 {
        self.p + self.v * 0.5
    }

    /// 计算点到线段的距离
    pub fn distance_to_point(&self, point: &Point3) -> f64 {
        let w = point - self.p;

        let c1 = w.dot(&self.v);
        if c1 <= 0.0 {
            return w.norm();
        }

        let c2 = self.v.dot(&self.v);
        if c2 <= c1 {
            return (point - self.p2()).norm();
        }

        let pb = self.p + self.v * (c1 / c2);
        (point - pb).norm()
    }

    pub fn bounding_box(&self) -> BoundingBox3 {
        BoundingBox3::from_points(self.vertices())
    }

    fn mapped(&self, map: PointMap<'_>) -> LineSegment3D {
        LineSegment3D {
            p: map.point(&self.p),
            v: map.vector(&self.v),
        }
    }

    pub fn moved(&self, vector: &Vector3) -> LineSegment3D {
        self.mapped(PointMap::Move(vector))
    }

    pub fn scaled(&self, factor: f64, origin: &Point3) -> LineSegment3D {
        self.mapped(PointMap::Scale(factor, origin))
    }

    pub fn rotated(&self, rotation: &Rotation3<f64>, origin: &Point3) -> LineSegment3D {
        self.mapped(PointMap::Rotate(rotation, origin))
    }

    pub fn reflected(&self, plane: &Plane) -> LineSegment3D {
        self.mapped(PointMap::Reflect(&plane.n, &plane.o))
    }

    pub fn to_dict(&self) -> Value {
        json!({
            "type": "LineSegment3D",
            "p": point_to_value(&self.p),
            "v": vector_to_value(&self.v),
        })
    }

    pub fn from_dict(dict: &Value) -> CoreResult<Self> {
        expect_type(dict, "LineSegment3D")?;
        Ok(Self {
            p: point_from(dict, "p")?,
            v: vector_from(dict, "v")?,
        })
    }
}

/// 平面多边形
///
/// 有序的顶点环加上所在平面。未给出平面时由顶点拟合。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Face3DRepr")]
pub struct Face3D {
    boundary: Vec<Point3>,
    plane: Plane,
}

#[derive(Deserialize)]
struct Face3DRepr {
    boundary: Vec<Point3>,
    plane: Plane,
}

impl TryFrom<Face3DRepr> for Face3D {
    type Error = CoreError;

    fn try_from(repr: Face3DRepr) -> CoreResult<Self> {
        Face3D::new(repr.boundary, Some(repr.plane))
    }
}

impl Face3D {
    pub fn new(boundary: Vec<Point3>, plane: Option<Plane>) -> CoreResult<Self> {
        if boundary.len() < 3 {
            return Err(CoreError::Geometry(format!(
                "Face3D requires at least 3 vertices. Got {}.",
                boundary.len()
            )));
        }
        let plane = match plane {
            Some(plane) => plane,
            None => Plane::best_fit(&boundary).ok_or_else(|| {
                CoreError::Geometry("Face3D vertices are colinear and define no plane".to_string())
            })?,
        };
        Ok(Self { boundary, plane })
    }

    pub fn vertices(&self) -> &[Point3] {
        &self.boundary
    }

    pub fn plane(&self) -> &Plane {
        &self.plane
    }

    pub fn normal(&self) -> &Vector3 {
        &self.plane.n
    }

    pub fn area(&self) -> f64 {
        newell_normal(&self.boundary).norm() / 2.0
    }

    pub fn perimeter(&self) -> f64 {
        self.edges().map(|(a, b)| (b - a).norm()).sum()
    }

    /// 面积质心
    ///
    /// 退化（面积为零）时返回顶点平均值。
    pub fn center(&self) -> Point3 {
        let origin = self.boundary[0];
        let mut weighted = Vector3::zeros();
        let mut total = 0.0;
        for pair in self.boundary[1..].windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let area = (a - origin).cross(&(b - origin)).dot(&self.plane.n) / 2.0;
            weighted += (origin.coords + a.coords + b.coords) * (area / 3.0);
            total += area;
        }
        if total.abs() > EPSILON {
            Point3::from(weighted / total)
        } else {
            let count = self.boundary.len() as f64;
            Point3::from(self.boundary.iter().map(|p| p.coords).sum::<Vector3>() / count)
        }
    }

    /// 法向与 XY 平面的夹角（度）
    pub fn altitude(&self) -> f64 {
        self.plane.n.z.clamp(-1.0, 1.0).asin().to_degrees()
    }

    /// 法向自 +Y 顺时针方向的角度（度），水平面为 0
    pub fn azimuth(&self) -> f64 {
        let n = &self.plane.n;
        if n.x.abs() < EPSILON && n.y.abs() < EPSILON {
            return 0.0;
        }
        n.x.atan2(n.y).to_degrees().rem_euclid(360.0)
    }

    pub fn bounding_box(&self) -> BoundingBox3 {
        BoundingBox3::from_points(self.boundary.iter().copied())
    }

    /// 首尾相接的边
    pub fn edges(&self) -> impl Iterator<Item = (Point3, Point3)> + '_ {
        let n = self.boundary.len();
        (0..n).map(move |i| (self.boundary[i], self.boundary[(i + 1) % n]))
    }

    /// 顶点偏离平面的最大距离
    pub fn max_plane_deviation(&self) -> f64 {
        self.boundary
            .iter()
            .map(|p| self.plane.distance_to_point(p))
            .fold(0.0, f64::max)
    }

    /// 非相邻边之间是否在容差内相交
    ///
    /// 在平面内投影后判断，与顶点环的方向无关。
    pub fn is_self_intersecting(&self, tolerance: f64) -> bool {
        let pts: Vec<[f64; 2]> = self
            .boundary
            .iter()
            .map(|p| self.plane.xyz_to_xy(p))
            .collect();
        let n = pts.len();
        for i in 0..n {
            for j in (i + 2)..n {
                if i == 0 && j == n - 1 {
                    continue; // 首尾两条边相邻
                }
                let a = (pts[i], pts[(i + 1) % n]);
                let b = (pts[j], pts[(j + 1) % n]);
                if segment_distance_2d(a, b) <= tolerance {
                    return true;
                }
            }
        }
        false
    }

    /// 去除重复与共线顶点
    ///
    /// 反复删除与前一顶点重合、或到前后顶点连线距离在容差内的顶点，
    /// 直到不再有可删除的顶点。剩余不足三个顶点时返回错误。
    pub fn remove_colinear_vertices(&self, tolerance: f64) -> CoreResult<Face3D> {
        let mut pts = self.boundary.clone();
        loop {
            let n = pts.len();
            if n < 3 {
                return Err(CoreError::Geometry(format!(
                    "Face3D has fewer than 3 non-colinear vertices at tolerance {}",
                    tolerance
                )));
            }
            let removable = (0..n).find(|&i| {
                let prev = pts[(i + n - 1) % n];
                let next = pts[(i + 1) % n];
                let current = pts[i];
                if (current - prev).norm() <= tolerance {
                    return true;
                }
                let chord = next - prev;
                let length = chord.norm();
                if length <= tolerance {
                    // 折返的尖刺
                    return true;
                }
                chord.cross(&(current - prev)).norm() / length <= tolerance
            });
            match removable {
                Some(i) => {
                    pts.remove(i);
                }
                None => break,
            }
        }
        Ok(Face3D {
            boundary: pts,
            plane: self.plane.clone(),
        })
    }

    fn mapped(&self, map: PointMap<'_>, plane: Plane) -> Face3D {
        Face3D {
            boundary: self.boundary.iter().map(|p| map.point(p)).collect(),
            plane,
        }
    }

    pub fn moved(&self, vector: &Vector3) -> Face3D {
        self.mapped(PointMap::Move(vector), self.plane.moved(vector))
    }

    pub fn scaled(&self, factor: f64, origin: &Point3) -> Face3D {
        self.mapped(
            PointMap::Scale(factor, origin),
            self.plane.scaled(factor, origin),
        )
    }

    pub fn rotated(&self, rotation: &Rotation3<f64>, origin: &Point3) -> Face3D {
        self.mapped(
            PointMap::Rotate(rotation, origin),
            self.plane.rotated(rotation, origin),
        )
    }

    /// 镜像后反转顶点顺序，使环绕方向与镜像后的平面一致
    pub fn reflected(&self, plane: &Plane) -> Face3D {
        let mut face = self.mapped(
            PointMap::Reflect(&plane.n, &plane.o),
            self.plane.reflected(plane),
        );
        face.boundary.reverse();
        face
    }

    pub fn to_dict(&self) -> Value {
        json!({
            "type": "Face3D",
            "boundary": self.boundary.iter().map(point_to_value).collect::<Vec<_>>(),
            "plane": self.plane.to_dict(),
        })
    }

    pub fn from_dict(dict: &Value) -> CoreResult<Self> {
        expect_type(dict, "Face3D")?;
        let boundary = dict
            .get("boundary")
            .and_then(Value::as_array)
            .ok_or_else(|| invalid_dict_error(dict, "Missing \"boundary\" vertex list."))?
            .iter()
            .map(|item| {
                let items = item
                    .as_array()
                    .ok_or_else(|| invalid_dict_error(dict, "Face3D vertex must be an array."))?;
                let [x, y, z] = tuple_with_length::<f64, _, 3>(items.iter(), "Face3D vertex")
                    .map_err(|e| invalid_dict_error(dict, e))?;
                Ok(Point3::new(x, y, z))
            })
            .collect::<CoreResult<Vec<_>>>()?;
        let plane = match dict.get("plane") {
            Some(plane) if !plane.is_null() => Some(Plane::from_dict(plane)?),
            _ => None,
        };
        Face3D::new(boundary, plane).map_err(|e| invalid_dict_error(dict, e))
    }
}

type Segment2 = ([f64; 2], [f64; 2]);

fn cross_2d(o: [f64; 2], a: [f64; 2], b: [f64; 2]) -> f64 {
    (a[0] - o[0]) * (b[1] - o[1]) - (a[1] - o[1]) * (b[0] - o[0])
}

/// 计算点到线段的距离（二维）
fn point_segment_distance_2d(point: [f64; 2], (start, end): Segment2) -> f64 {
    let v = [end[0] - start[0], end[1] - start[1]];
    let w = [point[0] - start[0], point[1] - start[1]];
    let dist = |a: [f64; 2], b: [f64; 2]| ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)).sqrt();

    let c1 = w[0] * v[0] + w[1] * v[1];
    if c1 <= 0.0 {
        return dist(point, start);
    }

    let c2 = v[0] * v[0] + v[1] * v[1];
    if c2 <= c1 {
        return dist(point, end);
    }

    let b = c1 / c2;
    dist(point, [start[0] + v[0] * b, start[1] + v[1] * b])
}

/// 两条线段之间的最短距离（二维），相交时为 0
fn segment_distance_2d(a: Segment2, b: Segment2) -> f64 {
    let d1 = cross_2d(a.0, a.1, b.0);
    let d2 = cross_2d(a.0, a.1, b.1);
    let d3 = cross_2d(b.0, b.1, a.0);
    let d4 = cross_2d(b.0, b.1, a.1);
    if d1 * d2 < 0.0 && d3 * d4 < 0.0 {
        return 0.0;
    }
    point_segment_distance_2d(a.0, b)
        .min(point_segment_distance_2d(a.1, b))
        .min(point_segment_distance_2d(b.0, a))
        .min(point_segment_distance_2d(b.1, a))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square(z: f64) -> Vec<Point3> {
        vec![
            Point3::new(0.0, 0.0, z),
            Point3::new(2.0, 0.0, z),
            Point3::new(2.0, 2.0, z),
            Point3::new(0.0, 2.0, z),
        ]
    }

    #[test]
    fn test_face_metrics() {
        let face = Face3D::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(0.0, 0.0, 3.0),
                Point3::new(1.0, 0.0, 3.0),
                Point3::new(1.0, 0.0, 0.0),
            ],
            None,
        )
        .unwrap();
        assert_relative_eq!(*face.normal(), Vector3::new(0.0, 1.0, 0.0), epsilon = 1e-9);
        assert_relative_eq!(face.area(), 3.0, epsilon = 1e-9);
        assert_relative_eq!(face.perimeter(), 8.0, epsilon = 1e-9);
        assert_relative_eq!(face.center(), Point3::new(0.5, 0.0, 1.5), epsilon = 1e-9);
        assert_relative_eq!(face.altitude(), 0.0, epsilon = 1e-9);
        assert_relative_eq!(face.azimuth(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_face_requires_three_vertices() {
        let result = Face3D::new(square(0.0)[..2].to_vec(), None);
        assert!(matches!(result, Err(CoreError::Geometry(_))));
    }

    #[test]
    fn test_colinear_face_has_no_plane() {
        let pts = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ];
        assert!(Face3D::new(pts, None).is_err());
    }

    #[test]
    fn test_reflect_reverses_vertices() {
        let face = Face3D::new(
            vec![
                Point3::new(1.0, 1.0, 2.0),
                Point3::new(2.0, 1.0, 2.0),
                Point3::new(2.0, 2.0, 2.0),
                Point3::new(1.0, 2.0, 2.0),
            ],
            None,
        )
        .unwrap();
        let mirror = Plane::new(Vector3::x(), Point3::new(1.0, 0.0, 2.0)).unwrap();
        let reflected = face.reflected(&mirror);
        assert_relative_eq!(reflected.vertices()[3], Point3::new(1.0, 1.0, 2.0), epsilon = 1e-9);
        assert_relative_eq!(reflected.vertices()[1], Point3::new(0.0, 2.0, 2.0), epsilon = 1e-9);
        assert_relative_eq!(reflected.area(), face.area(), epsilon = 1e-9);
    }

    #[test]
    fn test_self_intersection_ignores_winding() {
        let bow_tie = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 2.0, 0.0),
        ];
        let down = Plane::new(-Vector3::z(), Point3::origin()).unwrap();
        for plane in [Plane::world_xy(), down] {
            let ok = Face3D::new(square(0.0), Some(plane.clone())).unwrap();
            let bad = Face3D::new(bow_tie.clone(), Some(plane)).unwrap();
            assert!(!ok.is_self_intersecting(0.01));
            assert!(bad.is_self_intersecting(0.01));
        }
    }

    #[test]
    fn test_remove_colinear_vertices() {
        let mut pts = square(0.0);
        pts.insert(1, Point3::new(1.0, 0.0, 0.0));
        let face = Face3D::new(pts, None).unwrap();
        let clean = face.remove_colinear_vertices(0.0001).unwrap();
        assert_eq!(clean.vertices().len(), 4);
        let again = clean.remove_colinear_vertices(0.0001).unwrap();
        assert_eq!(again, clean);
    }

    #[test]
    fn test_degenerate_face_collapses() {
        let face = Face3D::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(0.0, 0.0, 3.0),
                Point3::new(0.0, 0.0, 3.0),
                Point3::new(0.0001, 0.0, 0.0),
            ],
            None,
        )
        .unwrap();
        assert!(face.remove_colinear_vertices(0.01).is_err());
    }

    #[test]
    fn test_best_fit_plane_of_folded_points() {
        let pts = vec![
            Point3::new(0.0, 0.0, 2.0001),
            Point3::new(2.0, 0.0, 2.0),
            Point3::new(2.0, 2.0, 2.0),
            Point3::new(0.0, 2.0, 2.0),
        ];
        let plane = Plane::best_fit(&pts).unwrap();
        let deviation = pts.iter().map(|p| plane.distance_to_point(p)).fold(0.0, f64::max);
        assert!(deviation < 0.001);
        assert!(deviation > 0.000001);
    }

    #[test]
    fn test_segment_transforms() {
        let seg = LineSegment3D::from_end_points(Point3::new(1.0, 1.0, 2.0), Point3::new(2.0, 1.0, 2.0));
        let scaled = seg.scaled(2.0, &Point3::origin());
        assert_eq!(scaled.p1(), Point3::new(2.0, 2.0, 4.0));
        assert_eq!(scaled.p2(), Point3::new(4.0, 2.0, 4.0));
        assert_relative_eq!(scaled.length(), seg.length() * 2.0);

        let rot = rotation(&Vector3::z(), std::f64::consts::PI).unwrap();
        let rotated = seg.rotated(&rot, &Point3::new(1.0, 1.0, 0.0));
        assert_relative_eq!(rotated.p2(), Point3::new(0.0, 1.0, 2.0), epsilon = 1e-9);
        assert!(rotation(&Vector3::zeros(), 1.0).is_err());
    }

    #[test]
    fn test_dict_layout() {
        let seg = LineSegment3D::from_end_points(Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 10.0, 0.0));
        let dict = seg.to_dict();
        assert_eq!(dict["type"], "LineSegment3D");
        assert_eq!(dict["p"], json!([0.0, 0.0, 0.0]));
        assert_eq!(LineSegment3D::from_dict(&dict).unwrap(), seg);

        let face = Face3D::new(square(1.0), None).unwrap();
        let dict = face.to_dict();
        assert_eq!(dict["boundary"].as_array().unwrap().len(), 4);
        assert_eq!(Face3D::from_dict(&dict).unwrap().to_dict(), dict);

        let wrong = json!({"type": "Plane", "n": [0.0, 0.0, 1.0], "o": [0.0, 0.0, 0.0]});
        assert!(matches!(
            Face3D::from_dict(&wrong),
            Err(CoreError::InvalidDict { .. })
        ));
    }

    #[test]
    fn test_plane_from_dict_normalizes_normal() {
        let dict = json!({
            "type": "Plane",
            "n": [0.0, 0.0, 2.0],
            "o": [0.0, 0.0, 0.0],
            "x": [3.0, 0.0, 0.0]
        });
        let plane = Plane::from_dict(&dict).unwrap();
        assert_eq!(plane.normal(), &Vector3::z());
        assert_eq!(plane.x_axis(), &Vector3::x());
        assert_relative_eq!(plane.distance_to_point(&Point3::new(1.0, 1.0, 3.0)), 3.0);

        let unit = Plane::world_xy().to_dict();
        assert_eq!(Plane::from_dict(&unit).unwrap().to_dict(), unit);

        for bad in [
            json!({"type": "Plane", "n": [0.0, 0.0, 0.0], "o": [0.0, 0.0, 0.0]}),
            json!({"type": "Plane", "n": [0.0, 0.0, 1.0], "o": [0.0, 0.0, 0.0], "x": [0.0, 0.0, 5.0]}),
        ] {
            assert!(matches!(
                Plane::from_dict(&bad),
                Err(CoreError::InvalidDict { .. })
            ));
        }
    }

    #[test]
    fn test_deserialize_validates_face() {
        let face = Face3D::new(square(0.0), None).unwrap();
        let mut value = serde_json::to_value(&face).unwrap();
        assert_eq!(serde_json::from_value::<Face3D>(value.clone()).unwrap(), face);

        value["boundary"] = json!([]);
        assert!(serde_json::from_value::<Face3D>(value.clone()).is_err());

        value["boundary"] = serde_json::to_value(square(0.0)).unwrap();
        value["plane"]["n"] = json!([0.0, 0.0, 0.0]);
        assert!(serde_json::from_value::<Face3D>(value).is_err());
    }
}
