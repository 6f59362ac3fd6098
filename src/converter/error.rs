//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 使用单一错误枚举承载转换链路中的所有错误来源，避免字符串拼接式错误处理。
//! 通过 `thiserror` 保持人类可读错误，同时让调用侧可按分支匹配。

use std::path::PathBuf;

/// 图标转换统一错误类型。
///
/// `convert_one` 会吸收全部错误并只返回布尔值；批量模式把错误文本写入明细。
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("输入文件不存在：{}", .0.display())]
    NotFound(PathBuf),

    #[error("不支持的输入格式：{0}")]
    UnsupportedFormat(String),

    #[error("输出文件已存在：{}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("参数校验失败：{0}")]
    Validation(String),

    #[error("文件错误：{0}")]
    Io(String),

    #[error("解码错误：{0}")]
    Decode(String),

    #[error("资源限制：{0}")]
    ResourceLimit(String),

    #[error("编码错误：{0}")]
    Encode(String),

    #[error("未知错误：{0}")]
    Unexpected(String),
}

impl ConvertError {
    /// 稳定错误码，供报告与日志检索使用。
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_NOT_FOUND",
            Self::UnsupportedFormat(_) => "E_UNSUPPORTED_FORMAT",
            Self::AlreadyExists(_) => "E_ALREADY_EXISTS",
            Self::Validation(_) => "E_VALIDATION",
            Self::Io(_) => "E_IO",
            Self::Decode(_) => "E_DECODE",
            Self::ResourceLimit(_) => "E_RESOURCE_LIMIT",
            Self::Encode(_) => "E_ENCODE",
            Self::Unexpected(_) => "E_UNEXPECTED",
        }
    }
}

impl From<std::io::Error> for ConvertError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}
