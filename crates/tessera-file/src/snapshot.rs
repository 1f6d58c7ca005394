//! 二进制快照格式（.tsnap）
//!
//! MessagePack + Zstd，带固定长度的文件头。
//! 只保证同一格式版本内可读，不作为长期交换格式。

use crate::error::{FileError, FileResult};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tessera_core::identity::Identified;
use tessera_core::model::Model;

/// 快照扩展名
pub const EXTENSION: &str = "tsnap";

/// 文件魔数 "TSNP"
const MAGIC: &[u8; 4] = b"TSNP";

/// 当前快照格式版本
const FORMAT_VERSION: u32 = 1;

/// Zstd 压缩级别
const COMPRESSION_LEVEL: i32 = 3;

/// 文件头长度：魔数、版本、预留标志位、压缩数据长度，各 4 字节
const HEADER_LEN: usize = 16;

fn encode_header(compressed_size: u32) -> [u8; HEADER_LEN] {
    let mut header = [0u8; HEADER_LEN];
    header[..4].copy_from_slice(MAGIC);
    header[4..8].copy_from_slice(&FORMAT_VERSION.to_le_bytes());
    header[12..].copy_from_slice(&compressed_size.to_le_bytes());
    header
}

/// 校验文件头，返回压缩数据长度
fn decode_header(header: &[u8; HEADER_LEN]) -> FileResult<usize> {
    if &header[..4] != MAGIC {
        return Err(FileError::InvalidFormat(
            "Invalid magic number, not a Tessera snapshot".to_string(),
        ));
    }
    let word = |at: usize| {
        u32::from_le_bytes([header[at], header[at + 1], header[at + 2], header[at + 3]])
    };
    let version = word(4);
    if version > FORMAT_VERSION {
        return Err(FileError::UnsupportedVersion(format!(
            "Snapshot version {} is newer than supported version {}",
            version, FORMAT_VERSION
        )));
    }
    Ok(word(12) as usize)
}

pub fn file_path(name: &str, directory: &Path) -> PathBuf {
    directory.join(format!("{}.{}", name, EXTENSION))
}

/// 写出快照，目录不存在时创建
pub fn save(model: &Model, name: &str, directory: &Path) -> FileResult<PathBuf> {
    let msgpack_data = rmp_serde::to_vec(model)?;
    let compressed_data = zstd::encode_all(msgpack_data.as_slice(), COMPRESSION_LEVEL)?;
    let compressed_size = u32::try_from(compressed_data.len()).map_err(|_| {
        FileError::InvalidFormat(format!(
            "Snapshot of {} bytes exceeds the format limit",
            compressed_data.len()
        ))
    })?;

    fs::create_dir_all(directory)?;
    let path = file_path(name, directory);
    let mut writer = BufWriter::new(File::create(&path)?);
    writer.write_all(&encode_header(compressed_size))?;
    writer.write_all(&compressed_data)?;
    writer.flush()?;

    tracing::info!(
        "Saved snapshot of model {} to {} ({} bytes compressed)",
        model.identifier(),
        path.display(),
        compressed_size
    );

    Ok(path)
}

/// 读取快照
///
/// 反序列化时重新校验容差并重建实体的反向引用。
pub fn load(path: &Path) -> FileResult<Model> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut header = [0u8; HEADER_LEN];
    reader.read_exact(&mut header)?;
    let compressed_size = decode_header(&header)?;

    let mut compressed_data = vec![0u8; compressed_size];
    reader.read_exact(&mut compressed_data)?;
    let msgpack_data = zstd::decode_all(compressed_data.as_slice())?;
    let model: Model = rmp_serde::from_slice(&msgpack_data)?;

    tracing::info!(
        "Loaded snapshot of model {} ({} shapes, {} boundaries) from {}",
        model.identifier(),
        model.shapes().len(),
        model.boundaries().len(),
        path.display()
    );

    Ok(model)
}
