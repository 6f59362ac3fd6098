//! # 数据模型
//!
//! ## 设计思路
//!
//! 将“外部请求”和“流水线中间结果”解耦：
//! - `RawImageData` 表示已读取、已通过签名与头部校验但未解码的字节
//! - `SourceImage` 表示已解码、已转 RGBA 的源图
//! - `ImageInfo` 表示仅做头部探测的图片信息（替代原预览面板）
//! - `BatchResult` / `BatchEntry` 表示批量转换的聚合结果

use std::path::PathBuf;

use image::RgbaImage;
use serde::Serialize;

/// 探测阶段输出：原始 PNG 字节与头部尺寸。
pub(crate) struct RawImageData {
    pub(crate) path: PathBuf,
    pub(crate) bytes: Vec<u8>,
    pub(crate) width: u32,
    pub(crate) height: u32,
}

/// 解码阶段输出：RGBA 源图与来源路径。
///
/// 生命周期仅限单次转换调用，缩放后即丢弃。
pub(crate) struct SourceImage {
    pub(crate) path: PathBuf,
    pub(crate) rgba: RgbaImage,
}

/// 图片头信息。
#[derive(Debug, Clone, Serialize)]
pub struct ImageInfo {
    pub path: PathBuf,
    pub format: &'static str,
    pub width: u32,
    pub height: u32,
    /// 颜色模式，例如 `Rgba8`、`Rgb8`、`La8`。
    pub color: String,
    pub file_size: u64,
}

/// 单个文件的转换结果状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    Success,
    Failed,
}

/// 批量转换明细项。
#[derive(Debug, Clone, Serialize)]
pub struct BatchEntry {
    pub source: PathBuf,
    pub status: BatchStatus,
    /// 成功时为实际写出的路径。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    /// 失败时为可读错误描述。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// 批量转换汇总。
///
/// 不变量：`total == successful + failed == details.len()`。
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchResult {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub details: Vec<BatchEntry>,
}

impl BatchResult {
    pub(crate) fn record_success(&mut self, source: PathBuf, output: PathBuf) {
        self.total += 1;
        self.successful += 1;
        self.details.push(BatchEntry {
            source,
            status: BatchStatus::Success,
            output: Some(output),
            error: None,
        });
    }

    pub(crate) fn record_failure(&mut self, source: PathBuf, error: String) {
        self.total += 1;
        self.failed += 1;
        self.details.push(BatchEntry {
            source,
            status: BatchStatus::Failed,
            output: None,
            error: Some(error),
        });
    }

    /// 汇总文本，例如 `3 成功, 1 失败`。
    pub fn summary(&self) -> String {
        format!("{} 成功, {} 失败", self.successful, self.failed)
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_stay_consistent_with_details() {
        let mut result = BatchResult::default();
        result.record_success("a.png".into(), "out/a.ico".into());
        result.record_failure("b.png".into(), "转换失败".into());
        result.record_failure("c.txt".into(), "不支持的输入格式".into());

        assert_eq!(result.total, 3);
        assert_eq!(result.successful + result.failed, result.total);
        assert_eq!(result.details.len(), result.total);
        assert_eq!(result.details[0].status, BatchStatus::Success);
        assert_eq!(result.summary(), "1 成功, 2 失败");
        assert!(!result.all_succeeded());
    }

    #[test]
    fn report_serializes_status_in_lowercase() {
        let mut result = BatchResult::default();
        result.record_failure("b.png".into(), "转换失败".into());

        let json = serde_json::to_value(&result).expect("serialize report");
        assert_eq!(json["details"][0]["status"], "failed");
        assert!(json["details"][0].get("output").is_none());
    }
}
