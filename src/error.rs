//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义应用级 `AppError` 枚举，供 CLI 与设置层统一返回，
//! 替代分散的 `.map_err(|e| e.to_string())`、`expect()` 等不一致模式。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为 `ConvertError` 与 `std::io::Error` 提供 `From` 转换，无需手动 map。

use crate::converter::ConvertError;

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 转换链路错误（加载 / 缩放 / 编码 / 写出）
    #[error("{0}")]
    Convert(#[from] ConvertError),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),

    /// 设置文件读写或校验失败
    #[error("设置错误: {0}")]
    Settings(String),

    /// 后台转换线程异常
    #[error("转换线程错误: {0}")]
    Worker(String),
}
