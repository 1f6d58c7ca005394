//! Tessera 文件格式处理
//!
//! 支持：
//! - `.json` 文本格式（模型的字典编码）
//! - `.tsnap` 二进制快照（MessagePack + Zstd）
//! - `tessera.toml` 模型默认设置

pub mod error;
pub mod settings;
pub mod snapshot;
pub mod text;

pub use error::{FileError, FileResult};

use std::path::{Path, PathBuf};
use tessera_core::model::Model;

/// 模型的文件读写
///
/// ```no_run
/// use std::path::Path;
/// use tessera_core::model::Model;
/// use tessera_file::ModelFiles;
///
/// let model = Model::from_layers(&[15, 5, 100, 15]).unwrap();
/// let path = model.to_json_file("wall", Path::new("out")).unwrap();
/// let again = Model::from_json_file(&path).unwrap();
/// assert_eq!(again.to_dict(), model.to_dict());
/// ```
pub trait ModelFiles: Sized {
    /// 写出 `<directory>/<name>.json`，返回文件路径
    fn to_json_file(&self, name: &str, directory: &Path) -> FileResult<PathBuf>;

    fn from_json_file(path: &Path) -> FileResult<Self>;

    /// 写出 `<directory>/<name>.tsnap`，返回文件路径
    fn to_snapshot_file(&self, name: &str, directory: &Path) -> FileResult<PathBuf>;

    fn from_snapshot_file(path: &Path) -> FileResult<Self>;
}

impl ModelFiles for Model {
    fn to_json_file(&self, name: &str, directory: &Path) -> FileResult<PathBuf> {
        text::save(self, name, directory)
    }

    fn from_json_file(path: &Path) -> FileResult<Self> {
        text::load(path)
    }

    fn to_snapshot_file(&self, name: &str, directory: &Path) -> FileResult<PathBuf> {
        snapshot::save(self, name, directory)
    }

    fn from_snapshot_file(path: &Path) -> FileResult<Self> {
        snapshot::load(path)
    }
}
