//! JSON 文本格式（.json）
//!
//! 文件内容就是模型的字典编码。字典的键按字母顺序排列，
//! 语义相同的模型写出的文件逐字节一致。

use crate::error::FileResult;
use serde_json::Value;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tessera_core::identity::Identified;
use tessera_core::model::Model;

/// 文本格式扩展名
pub const EXTENSION: &str = "json";

/// 由基础名称和目录得到文件路径
pub fn file_path(name: &str, directory: &Path) -> PathBuf {
    directory.join(format!("{}.{}", name, EXTENSION))
}

/// 写出模型，目录不存在时创建
pub fn save(model: &Model, name: &str, directory: &Path) -> FileResult<PathBuf> {
    fs::create_dir_all(directory)?;
    let path = file_path(name, directory);

    let file = File::create(&path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &model.to_dict())?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    tracing::info!(
        "Saved model {} ({} shapes, {} boundaries) to {}",
        model.identifier(),
        model.shapes().len(),
        model.boundaries().len(),
        path.display()
    );

    Ok(path)
}

/// 读取模型
pub fn load(path: &Path) -> FileResult<Model> {
    let file = File::open(path)?;
    let dict: Value = serde_json::from_reader(BufReader::new(file))?;
    let model = Model::from_dict(&dict)?;

    tracing::info!(
        "Loaded model {} ({} shapes, {} boundaries) from {}",
        model.identifier(),
        model.shapes().len(),
        model.boundaries().len(),
        path.display()
    );

    Ok(model)
}
