//! # ICO 打包与写出模块
//!
//! ## 设计思路
//!
//! ICO 容器编码完全委托给 `image::codecs::ico`，本模块只负责：
//! - 把每个 `S×S` RGBA 帧压成 PNG 条目
//! - 先在内存中完成整个容器编码，再原子地落盘
//!
//! 单尺寸与多尺寸走同一个 `encode_images` 调用，单元素列表即单帧 ICO。
//!
//! ## 实现思路
//!
//! 写出时先写同目录临时文件，再提交到目标路径，失败时清理临时文件，
//! 保证目标路径要么是完整的新文件，要么保持原样。
//! - 允许覆盖：`rename` 替换目标
//! - 不允许覆盖：`hard_link` 提交，目标已存在时由文件系统拒绝，避免检查与写入之间被抢先创建

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use image::codecs::ico::{IcoEncoder, IcoFrame};
use image::{ExtendedColorType, RgbaImage};

use super::ConvertError;

/// 将若干方形 RGBA 帧编码为 ICO 容器字节。
pub(crate) fn encode_ico(frames: &[RgbaImage]) -> Result<Vec<u8>, ConvertError> {
    if frames.is_empty() {
        return Err(ConvertError::Validation("没有可写入的图标帧".to_string()));
    }

    let mut entries = Vec::with_capacity(frames.len());
    for frame in frames {
        let (width, height) = frame.dimensions();
        let entry = IcoFrame::as_png(frame.as_raw(), width, height, ExtendedColorType::Rgba8)
            .map_err(|e| ConvertError::Encode(format!("{}x{} 帧编码失败：{}", width, height, e)))?;
        entries.push(entry);
    }

    let mut buffer = Vec::new();
    IcoEncoder::new(&mut buffer)
        .encode_images(&entries)
        .map_err(|e| ConvertError::Encode(format!("ICO 容器编码失败：{}", e)))?;

    Ok(buffer)
}

/// 原子写出：临时文件 + rename（覆盖）或 hard_link（不覆盖）。
pub(crate) fn write_atomically(
    path: &Path,
    bytes: &[u8],
    overwrite: bool,
) -> Result<(), ConvertError> {
    let temp_path = temp_sibling(path);

    fs::write(&temp_path, bytes).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        ConvertError::Io(format!("写入临时文件失败 {}：{}", temp_path.display(), e))
    })?;

    if overwrite {
        return fs::rename(&temp_path, path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            ConvertError::Io(format!("写入输出文件失败 {}：{}", path.display(), e))
        });
    }

    let committed = fs::hard_link(&temp_path, path);
    let _ = fs::remove_file(&temp_path);
    committed.map_err(|e| match e.kind() {
        ErrorKind::AlreadyExists => ConvertError::AlreadyExists(path.to_path_buf()),
        _ => ConvertError::Io(format!("写入输出文件失败 {}：{}", path.display(), e)),
    })
}

fn temp_sibling(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "icon.ico".to_string());
    path.with_file_name(format!(".{}.{}.tmp", file_name, std::process::id()))
}
