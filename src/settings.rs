//! 设置文件模块
//!
//! # 设计思路
//!
//! 以 JSON 文件持久化默认尺寸、输出目录等偏好，启动时加载后转换为
//! 显式的 `ConvertConfig` 注入转换器，不保留任何全局可变状态。
//!
//! # 实现思路
//!
//! - 文件缺失或内容损坏时回退默认值，不阻断启动。
//! - 缺失字段由 `#[serde(default)]` 补齐，兼容旧版本设置文件。
//! - 首次使用时写出默认设置文件，便于用户手动编辑。

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::converter::{
    ConvertConfig, DEFAULT_ICON_SIZES, DEFAULT_OUTPUT_DIR, IconSizes, filter_name, parse_filter,
};
use crate::error::AppError;

/// 默认设置文件名（相对当前目录）。
pub const DEFAULT_SETTINGS_FILE: &str = "config.json";

/// 持久化设置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub icon_sizes: Vec<u32>,
    pub default_output_dir: String,
    pub batch_mode: bool,
    pub overwrite_existing: bool,
    pub resize_filter: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            icon_sizes: DEFAULT_ICON_SIZES.to_vec(),
            default_output_dir: DEFAULT_OUTPUT_DIR.to_string(),
            batch_mode: false,
            overwrite_existing: false,
            resize_filter: filter_name(ConvertConfig::default().resize_filter).to_string(),
        }
    }
}

impl AppSettings {
    /// 校验并转换为转换器配置。
    pub fn to_convert_config(&self) -> Result<ConvertConfig, AppError> {
        let icon_sizes = IconSizes::new(self.icon_sizes.clone())
            .map_err(|e| AppError::Settings(format!("icon_sizes 无效: {}", e)))?;
        let resize_filter = parse_filter(&self.resize_filter)
            .map_err(|e| AppError::Settings(format!("resize_filter 无效: {}", e)))?;

        let output_dir = if self.default_output_dir.trim().is_empty() {
            PathBuf::from(DEFAULT_OUTPUT_DIR)
        } else {
            PathBuf::from(&self.default_output_dir)
        };

        Ok(ConvertConfig {
            icon_sizes,
            output_dir,
            overwrite: self.overwrite_existing,
            resize_filter,
            ..ConvertConfig::default()
        })
    }
}

/// 读取设置文件，缺失或无法解析时回退默认值。
pub fn load_settings_from_path(path: &Path) -> AppSettings {
    if path.exists() {
        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(settings) => return settings,
                Err(err) => log::warn!("⚠️ 设置文件解析失败，使用默认值: {err}"),
            },
            Err(err) => log::warn!("⚠️ 设置文件读取失败，使用默认值: {err}"),
        }
    }
    AppSettings::default()
}

/// 读取设置文件；文件不存在时写出一份默认设置。
pub fn load_or_create_settings(path: &Path) -> Result<AppSettings, AppError> {
    if !path.exists() {
        let settings = AppSettings::default();
        save_settings_to_path(path, &settings)?;
        log::info!("📝 已创建默认设置文件: {}", path.display());
        return Ok(settings);
    }
    Ok(load_settings_from_path(path))
}

/// 以格式化 JSON 写出设置文件，必要时创建父目录。
pub fn save_settings_to_path(path: &Path, settings: &AppSettings) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| AppError::Settings(format!("创建设置目录失败: {}", e)))?;
        }
    }

    let content = serde_json::to_string_pretty(settings)
        .map_err(|e| AppError::Settings(format!("序列化设置失败: {}", e)))?;

    fs::write(path, content)?;
    Ok(())
}
