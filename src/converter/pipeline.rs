//! # 缩放与居中流水线模块
//!
//! ## 设计思路
//!
//! 把“等比缩放 → 透明方形画布 → 居中合成”集中在一处，保证每一帧都是
//! 精确的 `S×S` RGBA 图像，且源图内容完整可见、不被裁剪。
//!
//! ## 实现思路
//!
//! 1. 按宽高比计算落入 `S×S` 的目标尺寸（四舍五入，至少 1 像素）
//! 2. 优先使用 `fast_image_resize` 卷积缩放，失败时回退 `image::resize_exact`
//! 3. 创建全透明画布，按向下取整的偏移量居中
//! 4. 使用 `overlay` 以源图自身 alpha 混合到画布上

use fast_image_resize as fr;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageBuffer, Rgba, RgbaImage};

use super::ConvertError;

/// 等比缩放后落入方形画布的位置与尺寸。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitLayout {
    pub width: u32,
    pub height: u32,
    pub x_offset: u32,
    pub y_offset: u32,
}

/// 计算 `source_width × source_height` 等比缩放进 `size × size` 画布后的布局。
///
/// 宽图以宽度贴边，其余（含正方形）以高度贴边。
pub fn fit_into_square(source_width: u32, source_height: u32, size: u32) -> FitLayout {
    let aspect_ratio = source_width as f64 / source_height as f64;

    let (width, height) = if aspect_ratio > 1.0 {
        let height = (size as f64 / aspect_ratio).round() as u32;
        (size, height.clamp(1, size))
    } else {
        let width = (size as f64 * aspect_ratio).round() as u32;
        (width.clamp(1, size), size)
    };

    FitLayout {
        width,
        height,
        x_offset: (size - width) / 2,
        y_offset: (size - height) / 2,
    }
}

/// 生成单个 `size × size` 的透明底 RGBA 帧。
///
/// 调用方保证 `size > 0` 且源图宽高非零。
pub fn resize_to_square(
    source: &RgbaImage,
    size: u32,
    filter: FilterType,
) -> Result<RgbaImage, ConvertError> {
    let (source_width, source_height) = source.dimensions();
    if size == 0 || source_width == 0 || source_height == 0 {
        return Err(ConvertError::Validation(format!(
            "无法缩放：源图 {}x{}，目标 {}",
            source_width, source_height, size
        )));
    }

    let layout = fit_into_square(source_width, source_height, size);

    let resized = if (layout.width, layout.height) == (source_width, source_height) {
        source.clone()
    } else {
        match resize_with_fast_image_resize(source, layout.width, layout.height, filter) {
            Ok(resized) => resized,
            Err(err) => {
                log::warn!(
                    "⚠️ fast_image_resize 缩放失败，回退 image::resize_exact：{}",
                    err
                );
                DynamicImage::ImageRgba8(source.clone())
                    .resize_exact(layout.width, layout.height, filter)
                    .into_rgba8()
            }
        }
    };

    let mut canvas: RgbaImage = ImageBuffer::from_pixel(size, size, Rgba([0, 0, 0, 0]));
    imageops::overlay(
        &mut canvas,
        &resized,
        i64::from(layout.x_offset),
        i64::from(layout.y_offset),
    );

    Ok(canvas)
}

fn resize_with_fast_image_resize(
    source: &RgbaImage,
    target_width: u32,
    target_height: u32,
    filter: FilterType,
) -> Result<RgbaImage, ConvertError> {
    let (src_width, src_height) = source.dimensions();

    let src_image = fr::images::Image::from_vec_u8(
        src_width,
        src_height,
        source.as_raw().clone(),
        fr::PixelType::U8x4,
    )
    .map_err(|e| ConvertError::Unexpected(format!("构建源图像缓冲失败：{}", e)))?;

    let mut dst_image = fr::images::Image::new(target_width, target_height, fr::PixelType::U8x4);

    let mut resizer = fr::Resizer::new();
    let options = fr::ResizeOptions::new()
        .resize_alg(fr::ResizeAlg::Convolution(to_fast_filter(filter)));

    resizer
        .resize(&src_image, &mut dst_image, Some(&options))
        .map_err(|e| ConvertError::Unexpected(format!("fast_image_resize 执行失败：{}", e)))?;

    ImageBuffer::<Rgba<u8>, Vec<u8>>::from_raw(target_width, target_height, dst_image.into_vec())
        .ok_or_else(|| ConvertError::Unexpected("fast_image_resize 输出缓冲长度异常".to_string()))
}

fn to_fast_filter(filter: FilterType) -> fr::FilterType {
    match filter {
        FilterType::Nearest => fr::FilterType::Box,
        FilterType::Triangle => fr::FilterType::Bilinear,
        FilterType::CatmullRom => fr::FilterType::CatmullRom,
        FilterType::Gaussian => fr::FilterType::Mitchell,
        FilterType::Lanczos3 => fr::FilterType::Lanczos3,
    }
}
