//! 标识与属性
//!
//! 每种实体（Shape、Boundary、Model）都持有：
//! - `Identity`: 唯一标识符、显示名称、所属模型的反向引用
//! - `Properties`: 可扩展的属性槽，只输出自身的类型标签和扩展项

use crate::error::{CoreError, CoreResult};
use crate::validate::{invalid_dict_error, valid_uuid};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// 实体类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Shape,
    Boundary,
    Model,
}

impl EntityKind {
    /// 字典中的类型标签
    pub fn type_name(&self) -> &'static str {
        match self {
            EntityKind::Shape => "Shape",
            EntityKind::Boundary => "Boundary",
            EntityKind::Model => "Model",
        }
    }

    /// 属性字典的类型标签
    pub fn properties_type_name(&self) -> &'static str {
        match self {
            EntityKind::Shape => "ShapeProperties",
            EntityKind::Boundary => "BoundaryProperties",
            EntityKind::Model => "ModelProperties",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// 实体标识
///
/// 标识符构造后不可变；反向引用只能由 `Model` 设置和清除。
/// 反序列化时重新校验标识符。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "IdentityRepr")]
pub struct Identity {
    identifier: String,
    display_name: Option<String>,
    /// 所属模型的标识符（非拥有关系）
    #[serde(skip)]
    parent: Option<String>,
}

#[derive(Deserialize)]
struct IdentityRepr {
    identifier: String,
    display_name: Option<String>,
}

impl TryFrom<IdentityRepr> for Identity {
    type Error = CoreError;

    fn try_from(repr: IdentityRepr) -> CoreResult<Self> {
        let mut identity = Self::with_identifier(&repr.identifier)?;
        identity.display_name = repr.display_name;
        Ok(identity)
    }
}

impl Identity {
    /// 生成随机 UUID v4 标识
    pub fn generate() -> Self {
        Self {
            identifier: Uuid::new_v4().to_string(),
            display_name: None,
            parent: None,
        }
    }

    /// 使用调用方提供的标识符，必须是合法的 UUID
    pub fn with_identifier(identifier: &str) -> CoreResult<Self> {
        let identifier = valid_uuid(identifier)?;
        Ok(Self {
            identifier: identifier.to_string(),
            display_name: None,
            parent: None,
        })
    }

    /// 有标识符时校验使用，否则生成
    pub fn from_option(identifier: Option<&str>) -> CoreResult<Self> {
        match identifier {
            Some(id) => Self::with_identifier(id),
            None => Ok(Self::generate()),
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// 显示名称，未设置时为标识符
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.identifier)
    }

    pub fn explicit_display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub fn set_display_name(&mut self, name: Option<String>) {
        self.display_name = name;
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub(crate) fn set_parent(&mut self, parent: Option<String>) {
        self.parent = parent;
    }

    /// 复制标识：保留标识符和显示名称，清除反向引用
    pub fn duplicate(&self) -> Self {
        Self {
            identifier: self.identifier.clone(),
            display_name: self.display_name.clone(),
            parent: None,
        }
    }

    /// 写入字典中的标识字段
    pub(crate) fn write_dict(&self, kind: EntityKind, dict: &mut Map<String, Value>) {
        dict.insert("type".to_string(), Value::from(kind.type_name()));
        dict.insert("identifier".to_string(), Value::from(self.identifier.as_str()));
        if let Some(name) = &self.display_name {
            dict.insert("display_name".to_string(), Value::from(name.as_str()));
        }
    }

    /// 从字典恢复标识，类型标签必须匹配
    pub(crate) fn read_dict(kind: EntityKind, dict: &Value) -> CoreResult<Self> {
        match dict.get("type").and_then(Value::as_str) {
            Some(t) if t == kind.type_name() => {}
            Some(t) => {
                return Err(invalid_dict_error(
                    dict,
                    format!("Expected {} dictionary. Got {}.", kind, t),
                ))
            }
            None => {
                return Err(invalid_dict_error(
                    dict,
                    format!("Expected {} dictionary without a type tag.", kind),
                ))
            }
        }
        let identifier = dict
            .get("identifier")
            .and_then(Value::as_str)
            .ok_or_else(|| invalid_dict_error(dict, "Missing \"identifier\"."))?;
        let mut identity =
            Self::with_identifier(identifier).map_err(|e| invalid_dict_error(dict, e))?;
        identity.display_name = dict
            .get("display_name")
            .and_then(Value::as_str)
            .map(str::to_string);
        Ok(identity)
    }
}

/// 可扩展属性
///
/// 基础类型只有类型标签；外部协作方以自己的键名挂载扩展项，
/// 本库不解释扩展内容，但保证往返时原样保留。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PropertiesRepr")]
pub struct Properties {
    kind: EntityKind,
    extensions: BTreeMap<String, Value>,
}

#[derive(Deserialize)]
struct PropertiesRepr {
    kind: EntityKind,
    extensions: BTreeMap<String, Value>,
}

impl TryFrom<PropertiesRepr> for Properties {
    type Error = CoreError;

    fn try_from(repr: PropertiesRepr) -> CoreResult<Self> {
        for (name, value) in &repr.extensions {
            Self::check_extension(name, value).map_err(CoreError::Validation)?;
        }
        Ok(Self {
            kind: repr.kind,
            extensions: repr.extensions,
        })
    }
}

impl Properties {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            extensions: BTreeMap::new(),
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn type_name(&self) -> &'static str {
        self.kind.properties_type_name()
    }

    pub fn extension(&self, name: &str) -> Option<&Value> {
        self.extensions.get(name)
    }

    pub fn extension_names(&self) -> impl Iterator<Item = &str> {
        self.extensions.keys().map(String::as_str)
    }

    /// 挂载扩展项，扩展内容必须是映射，键名不能是 `type`
    pub fn set_extension(&mut self, name: impl Into<String>, value: Value) -> CoreResult<()> {
        let name = name.into();
        Self::check_extension(&name, &value).map_err(CoreError::Validation)?;
        self.extensions.insert(name, value);
        Ok(())
    }

    pub fn remove_extension(&mut self, name: &str) -> Option<Value> {
        self.extensions.remove(name)
    }

    fn check_extension(name: &str, value: &Value) -> Result<(), String> {
        if name == "type" {
            return Err("\"type\" is reserved and cannot name a properties extension.".to_string());
        }
        if !value.is_object() {
            return Err(format!(
                "Properties extension \"{}\" must be a mapping. Got {}.",
                name, value
            ));
        }
        Ok(())
    }

    pub fn to_dict(&self) -> Value {
        let mut dict = Map::new();
        dict.insert("type".to_string(), Value::from(self.type_name()));
        for (name, value) in &self.extensions {
            dict.insert(name.clone(), value.clone());
        }
        Value::Object(dict)
    }

    /// 从实体字典的 `properties` 字段恢复
    ///
    /// `entity_dict` 用于在扩展项无效时报告所属实体。
    pub fn from_dict(kind: EntityKind, entity_dict: &Value) -> CoreResult<Self> {
        let mut properties = Self::new(kind);
        let Some(dict) = entity_dict.get("properties") else {
            return Ok(properties);
        };
        let map = dict
            .as_object()
            .ok_or_else(|| invalid_dict_error(entity_dict, "\"properties\" must be a mapping."))?;
        match map.get("type").and_then(Value::as_str) {
            Some(t) if t == kind.properties_type_name() => {}
            _ => {
                return Err(invalid_dict_error(
                    entity_dict,
                    format!("Expected {} in \"properties\".", kind.properties_type_name()),
                ))
            }
        }
        for (name, value) in map.iter().filter(|(name, _)| name.as_str() != "type") {
            Self::check_extension(name, value)
                .map_err(|message| invalid_dict_error(entity_dict, message))?;
            properties.extensions.insert(name.clone(), value.clone());
        }
        Ok(properties)
    }
}

/// 标识能力
///
/// 为所有实体提供统一的标识、显示名称与反向引用访问。
/// 标识本身只读：标识符不可替换，反向引用只由 `Model` 维护。
///
/// ```compile_fail
/// use tessera_core::prelude::*;
///
/// let mut shape = Shape::from_vertices(&[[0, 0, 0], [1, 0, 0], [1, 1, 0]]).unwrap();
/// *shape.identity_mut() = Identity::generate();
/// ```
pub trait Identified {
    fn identity(&self) -> &Identity;

    fn properties(&self) -> &Properties;

    fn properties_mut(&mut self) -> &mut Properties;

    fn set_display_name(&mut self, name: impl Into<String>)
    where
        Self: Sized;

    fn identifier(&self) -> &str {
        self.identity().identifier()
    }

    fn display_name(&self) -> &str {
        self.identity().display_name()
    }

    /// 当前是否属于某个模型
    fn has_parent(&self) -> bool {
        self.identity().parent().is_some()
    }

    /// 所属模型的标识符
    fn parent_identifier(&self) -> Option<&str> {
        self.identity().parent()
    }
}

/// 供 `Model` 维护反向引用
pub(crate) trait IdentityMut {
    fn identity_mut(&mut self) -> &mut Identity;
}
