//! 导出器注册表
//!
//! 每种实体有一个进程级注册表，外部协作方在加载时按名称注册导出函数；
//! 通过 `entity.to()` 取得与具体实体绑定的命名空间后按名称调用。
//! 本库不依赖任何具体导出格式。

use crate::error::{CoreError, CoreResult};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

/// 导出函数：以实体为上下文，接受任意个参数
pub type WriterFn<T> = Arc<dyn Fn(&T, &[Value]) -> CoreResult<Value> + Send + Sync>;

/// 名称 -> 导出函数
pub struct WriterRegistry<T> {
    writers: BTreeMap<String, WriterFn<T>>,
}

impl<T> WriterRegistry<T> {
    pub fn new() -> Self {
        Self {
            writers: BTreeMap::new(),
        }
    }

    /// 注册导出函数，同名时替换
    pub fn register<F>(&mut self, name: impl Into<String>, writer: F)
    where
        F: Fn(&T, &[Value]) -> CoreResult<Value> + Send + Sync + 'static,
    {
        self.writers.insert(name.into(), Arc::new(writer));
    }

    pub fn unregister(&mut self, name: &str) -> bool {
        self.writers.remove(name).is_some()
    }

    pub fn names(&self) -> Vec<String> {
        self.writers.keys().cloned().collect()
    }

    pub fn get(&self, name: &str) -> Option<WriterFn<T>> {
        self.writers.get(name).cloned()
    }
}

impl<T> Default for WriterRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// 拥有导出器命名空间的实体
pub trait HasWriters: Sized + 'static {
    fn writer_registry() -> &'static RwLock<WriterRegistry<Self>>;

    /// 注册一个导出函数
    fn register_writer<F>(name: impl Into<String>, writer: F)
    where
        F: Fn(&Self, &[Value]) -> CoreResult<Value> + Send + Sync + 'static,
    {
        Self::writer_registry()
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .register(name, writer);
    }

    fn unregister_writer(name: &str) -> bool {
        Self::writer_registry()
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .unregister(name)
    }

    /// 与当前实体绑定的导出器命名空间
    fn to(&self) -> Writers<'_, Self> {
        Writers { entity: self }
    }
}

/// 绑定到具体实体的导出器命名空间
pub struct Writers<'a, T> {
    entity: &'a T,
}

impl<T: HasWriters> Writers<'_, T> {
    pub fn names(&self) -> Vec<String> {
        T::writer_registry()
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .names()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    fn lookup(&self, name: &str) -> Option<WriterFn<T>> {
        T::writer_registry()
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
    }

    /// 调用时才解析名称；调用期间不持有注册表锁
    pub fn call(&self, name: &str, args: &[Value]) -> CoreResult<Value> {
        let writer = self
            .lookup(name)
            .ok_or_else(|| CoreError::UnknownWriter(name.to_string()))?;
        writer(self.entity, args)
    }
}

/// 为实体类型实现进程级注册表
macro_rules! impl_writers {
    ($t:ty) => {
        impl $crate::writer::HasWriters for $t {
            fn writer_registry(
            ) -> &'static ::std::sync::RwLock<$crate::writer::WriterRegistry<Self>> {
                static REGISTRY: ::std::sync::OnceLock<
                    ::std::sync::RwLock<$crate::writer::WriterRegistry<$t>>,
                > = ::std::sync::OnceLock::new();
                REGISTRY.get_or_init(|| {
                    ::std::sync::RwLock::new($crate::writer::WriterRegistry::new())
                })
            }
        }
    };
}

pub(crate) use impl_writers;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Sample(&'static str);

    impl_writers!(Sample);

    #[test]
    fn test_registry_roundtrip() {
        let mut registry: WriterRegistry<Sample> = WriterRegistry::new();
        registry.register("name", |p: &Sample, _args: &[Value]| Ok(json!(p.0)));
        assert_eq!(registry.names(), vec!["name".to_string()]);
        assert!(registry.unregister("name"));
        assert!(registry.get("name").is_none());
    }

    #[test]
    fn test_bound_namespace() {
        Sample::register_writer("echo", |p: &Sample, args: &[Value]| {
            Ok(json!({"sample": p.0, "args": args.len()}))
        });
        let sample = Sample("a");
        let writers = sample.to();
        assert!(writers.names().contains(&"echo".to_string()));
        let out = writers.call("echo", &[json!(1), json!(2)]).unwrap();
        assert_eq!(out, json!({"sample": "a", "args": 2}));
        assert!(matches!(
            writers.call("missing", &[]),
            Err(CoreError::UnknownWriter(_))
        ));
        assert!(Sample::unregister_writer("echo"));
        assert!(!sample.to().contains("echo"));
    }
}
