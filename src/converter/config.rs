//! # 配置模块
//!
//! ## 设计思路
//!
//! 将所有“可调策略”集中到 `ConvertConfig`，在构造 `IconConverter` 时显式传入，
//! 不依赖任何进程级全局状态。
//!
//! ## 实现思路
//!
//! - `IconSizes` 是经过校验的新类型：非空、每项位于 `1..=256`（ICO 单帧上限）。
//! - `Default` 提供与设置文件一致的回退默认值。
//! - 缩放滤镜通过稳定字符串解析与反向输出，便于持久化。

use std::path::PathBuf;

use image::imageops::FilterType;

use super::ConvertError;

/// ICO 单帧允许的最大边长（像素）。
pub const MAX_ICON_EDGE: u32 = 256;

/// 默认图标尺寸列表。
pub const DEFAULT_ICON_SIZES: [u32; 7] = [16, 24, 32, 48, 64, 128, 256];

/// 默认输出目录。
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// 有序的目标边长列表。
///
/// 构造时完成校验，之后的转换链路可以直接信任其内容。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconSizes(Vec<u32>);

impl IconSizes {
    /// 从整数列表构建，重复项按首次出现保留。
    ///
    /// # 示例
    /// ```rust
    /// use png2ico::converter::IconSizes;
    ///
    /// let sizes = IconSizes::new(vec![32, 16, 32])?;
    /// assert_eq!(sizes.as_slice(), &[32, 16]);
    /// # Ok::<(), png2ico::converter::ConvertError>(())
    /// ```
    pub fn new(sizes: Vec<u32>) -> Result<Self, ConvertError> {
        if sizes.is_empty() {
            return Err(ConvertError::Validation("图标尺寸列表不能为空".to_string()));
        }

        let mut unique = Vec::with_capacity(sizes.len());
        for size in sizes {
            if size == 0 || size > MAX_ICON_EDGE {
                return Err(ConvertError::Validation(format!(
                    "图标尺寸无效：{}（允许范围：1~{}）",
                    size, MAX_ICON_EDGE
                )));
            }
            if !unique.contains(&size) {
                unique.push(size);
            }
        }

        Ok(Self(unique))
    }

    /// 解析逗号分隔的尺寸字符串，例如 `"16, 32,48"`。
    ///
    /// 空白片段会被忽略；非整数与非正数均视为校验错误。
    pub fn parse(input: &str) -> Result<Self, ConvertError> {
        let mut sizes = Vec::new();
        for part in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let value: i64 = part.parse().map_err(|_| {
                ConvertError::Validation(format!("图标尺寸不是整数：{}", part))
            })?;
            let value = u32::try_from(value).map_err(|_| {
                ConvertError::Validation(format!("图标尺寸必须为正整数：{}", part))
            })?;
            sizes.push(value);
        }
        Self::new(sizes)
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for IconSizes {
    fn default() -> Self {
        Self(DEFAULT_ICON_SIZES.to_vec())
    }
}

impl std::fmt::Display for IconSizes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let joined: Vec<String> = self.0.iter().map(u32::to_string).collect();
        f.write_str(&joined.join(","))
    }
}

/// 图标转换配置。
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    /// 未显式指定时使用的尺寸列表。
    pub icon_sizes: IconSizes,
    /// 默认输出目录（批量模式未指定目录时由调用方使用）。
    pub output_dir: PathBuf,
    /// 默认是否覆盖已存在的输出文件。
    pub overwrite: bool,
    /// 缩放滤镜。
    pub resize_filter: FilterType,
    /// 读取输入文件时允许的最大体积（字节）。
    pub max_file_size: u64,
    /// 解码后的像素上限（`width * height`）。
    pub max_decoded_pixels: u64,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            icon_sizes: IconSizes::default(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            overwrite: false,
            resize_filter: FilterType::Lanczos3,
            max_file_size: 50 * 1024 * 1024,
            max_decoded_pixels: 40_000_000,
        }
    }
}

/// 从外部字符串解析缩放滤镜。
pub fn parse_filter(name: &str) -> Result<FilterType, ConvertError> {
    match name.trim().to_lowercase().as_str() {
        "nearest" => Ok(FilterType::Nearest),
        "triangle" => Ok(FilterType::Triangle),
        "catmullrom" => Ok(FilterType::CatmullRom),
        "gaussian" => Ok(FilterType::Gaussian),
        "lanczos3" => Ok(FilterType::Lanczos3),
        other => Err(ConvertError::Validation(format!(
            "未知缩放滤镜：{}（可选：nearest / triangle / catmullrom / gaussian / lanczos3）",
            other
        ))),
    }
}

/// 将滤镜输出为稳定字符串，供设置文件持久化。
pub fn filter_name(filter: FilterType) -> &'static str {
    match filter {
        FilterType::Nearest => "nearest",
        FilterType::Triangle => "triangle",
        FilterType::CatmullRom => "catmullrom",
        FilterType::Gaussian => "gaussian",
        FilterType::Lanczos3 => "lanczos3",
    }
}
