//! 模型默认设置的 TOML 加载
//!
//! ```toml
//! units = "Meters"
//! tolerance = 0.001
//! angle_tolerance = 1.0
//! layer_height = 0.2
//! ```
//!
//! 缺失的字段使用默认值。

use crate::error::{FileError, FileResult};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tessera_core::settings::ModelSettings;

/// 指定设置文件路径的环境变量
pub const SETTINGS_ENV: &str = "TESSERA_SETTINGS";

/// 从显式路径加载设置并校验
pub fn from_file(path: impl AsRef<Path>) -> FileResult<ModelSettings> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| FileError::SettingsIo {
        path: path.to_path_buf(),
        source,
    })?;
    let settings: ModelSettings =
        toml::from_str(&content).map_err(|source| FileError::SettingsParse {
            path: path.to_path_buf(),
            source,
        })?;
    settings.validate()?;
    Ok(settings)
}

/// 优先读取 `TESSERA_SETTINGS` 指向的文件，否则寻找 `./tessera.toml`；
/// 都不存在时返回默认设置。
pub fn discover() -> FileResult<ModelSettings> {
    if let Some(path) = env::var_os(SETTINGS_ENV) {
        return from_file(PathBuf::from(path));
    }
    let default_path = env::current_dir()?.join("tessera.toml");
    if default_path.exists() {
        from_file(default_path)
    } else {
        Ok(ModelSettings::default())
    }
}
