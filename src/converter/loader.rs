//! # 加载与校验模块
//!
//! ## 设计思路
//!
//! 在“尽可能早”的阶段执行输入校验，尽快失败，减少不必要的内存与 CPU 消耗。
//! 格式判断依据文件签名（magic bytes），与扩展名无关。
//!
//! ## 实现思路
//!
//! 1. 存在性 + metadata 体积限制
//! 2. 读取字节并用 `infer` 校验签名必须为 `image/png`
//! 3. 只解析 PNG 头获取宽高，按像素上限快速拒绝
//! 4. 完整解码并统一转换为 RGBA8

use std::io::Cursor;
use std::path::Path;

use image::codecs::png::PngDecoder;
use image::{ImageDecoder, ImageFormat};

use super::source::{ImageInfo, RawImageData, SourceImage};
use super::{ConvertConfig, ConvertError, IconConverter};

const PNG_MIME: &str = "image/png";

impl IconConverter {
    /// 读取输入文件并完成签名、头部与像素上限校验（不做完整解码）。
    pub(super) fn load_raw(
        &self,
        path: &Path,
        config: &ConvertConfig,
    ) -> Result<RawImageData, ConvertError> {
        let bytes = Self::read_png_bytes(path, config)?;

        let (width, height, _) = Self::inspect_png_header(&bytes)?;
        Self::validate_dimensions(config, width, height)?;

        Ok(RawImageData {
            path: path.to_path_buf(),
            bytes,
            width,
            height,
        })
    }

    /// 存在性、体积上限与 PNG 签名校验，返回原始字节。
    fn read_png_bytes(path: &Path, config: &ConvertConfig) -> Result<Vec<u8>, ConvertError> {
        if !path.exists() {
            return Err(ConvertError::NotFound(path.to_path_buf()));
        }

        let metadata = std::fs::metadata(path)
            .map_err(|e| ConvertError::Io(format!("无法读取文件信息 {}：{}", path.display(), e)))?;

        if !metadata.is_file() {
            return Err(ConvertError::UnsupportedFormat(format!(
                "输入不是普通文件：{}",
                path.display()
            )));
        }

        if metadata.len() > config.max_file_size {
            return Err(ConvertError::ResourceLimit(format!(
                "文件过大：{:.2} MB（限制：{:.2} MB）",
                metadata.len() as f64 / 1024.0 / 1024.0,
                config.max_file_size as f64 / 1024.0 / 1024.0
            )));
        }

        let bytes = std::fs::read(path)
            .map_err(|e| ConvertError::Io(format!("无法读取图片文件 {}：{}", path.display(), e)))?;
        Self::validate_png_signature(path, &bytes)?;

        Ok(bytes)
    }

    /// 完整解码为 RGBA8。
    pub(super) fn decode_source(&self, raw: RawImageData) -> Result<SourceImage, ConvertError> {
        let decoded = image::load_from_memory_with_format(&raw.bytes, ImageFormat::Png).map_err(
            |e| ConvertError::Decode(format!("PNG 解码失败 {}：{}", raw.path.display(), e)),
        )?;

        let rgba = decoded.into_rgba8();
        if rgba.dimensions() != (raw.width, raw.height) {
            return Err(ConvertError::Decode("解码后尺寸与文件头不一致".to_string()));
        }

        log::debug!(
            "🖼️ 源图解码完成 - {} {}x{}",
            raw.path.display(),
            raw.width,
            raw.height
        );

        Ok(SourceImage {
            path: raw.path,
            rgba,
        })
    }

    /// 读取图片头信息（格式、尺寸、颜色模式），不做完整解码。
    ///
    /// 只看文件头，因此不受像素上限约束。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use png2ico::converter::{ConvertConfig, IconConverter};
    ///
    /// let converter = IconConverter::new(ConvertConfig::default());
    /// let info = converter.inspect_image("logo.png")?;
    /// println!("{} {}x{} {}", info.format, info.width, info.height, info.color);
    /// # Ok::<(), png2ico::converter::ConvertError>(())
    /// ```
    pub fn inspect_image(&self, path: impl AsRef<Path>) -> Result<ImageInfo, ConvertError> {
        let path = path.as_ref();
        let bytes = Self::read_png_bytes(path, &self.config)?;
        let (width, height, color) = Self::inspect_png_header(&bytes)?;

        Ok(ImageInfo {
            path: path.to_path_buf(),
            format: "PNG",
            width,
            height,
            color,
            file_size: bytes.len() as u64,
        })
    }

    fn validate_png_signature(path: &Path, bytes: &[u8]) -> Result<(), ConvertError> {
        if bytes.is_empty() {
            return Err(ConvertError::UnsupportedFormat(format!(
                "文件内容为空：{}",
                path.display()
            )));
        }

        match infer::get(bytes) {
            Some(kind) if kind.mime_type() == PNG_MIME => Ok(()),
            Some(kind) => Err(ConvertError::UnsupportedFormat(format!(
                "{} 不是 PNG（识别为 {}）",
                path.display(),
                kind.mime_type()
            ))),
            None => Err(ConvertError::UnsupportedFormat(format!(
                "{} 不是 PNG（无法识别文件类型）",
                path.display()
            ))),
        }
    }

    /// 仅通过 PNG 头读取宽高与颜色模式。
    fn inspect_png_header(bytes: &[u8]) -> Result<(u32, u32, String), ConvertError> {
        let decoder = PngDecoder::new(Cursor::new(bytes))
            .map_err(|e| ConvertError::Decode(format!("无法读取 PNG 头：{}", e)))?;
        let (width, height) = decoder.dimensions();
        Ok((width, height, format!("{:?}", decoder.color_type())))
    }

    fn validate_dimensions(
        config: &ConvertConfig,
        width: u32,
        height: u32,
    ) -> Result<(), ConvertError> {
        if width == 0 || height == 0 {
            return Err(ConvertError::Validation(format!(
                "图片尺寸无效：{}x{}",
                width, height
            )));
        }

        let pixels = (width as u64)
            .checked_mul(height as u64)
            .ok_or_else(|| ConvertError::ResourceLimit("图片像素数溢出".to_string()))?;

        if pixels > config.max_decoded_pixels {
            return Err(ConvertError::ResourceLimit(format!(
                "图片像素过大：{} 像素（限制：{} 像素）",
                pixels, config.max_decoded_pixels
            )));
        }

        Ok(())
    }
}
