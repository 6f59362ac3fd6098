//! # 批量转换模块
//!
//! ## 设计思路
//!
//! 批量模式按输入顺序逐个调用单文件转换，单个文件失败不会中断整批。
//! 结果按输入顺序写入 `BatchResult`，进度回调在每个文件处理后同步触发。
//!
//! ## 实现思路
//!
//! - 输出目录只在开始前创建一次（含缺失的父目录），创建失败是整批失败。
//! - 单文件错误（含 panic）被捕获为明细中的失败项。
//! - 百分比 = 已处理数 / 总数 × 100，最后一个文件恰好为 100。

use std::fs;
use std::path::{Path, PathBuf};

use super::handler::guard_panics;
use super::source::BatchResult;
use super::{ConvertError, IconConverter, IconSizes};

impl IconConverter {
    /// 批量转换。
    ///
    /// 只有输出目录创建失败会让整个操作返回 `Err`，其余错误都记录在明细中。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use std::path::PathBuf;
    /// use png2ico::converter::{ConvertConfig, IconConverter};
    ///
    /// let converter = IconConverter::new(ConvertConfig::default());
    /// let inputs = vec![PathBuf::from("a.png"), PathBuf::from("b.png")];
    /// let result = converter.convert_batch(&inputs, Some("out".as_ref()), None, false, |percent, status| {
    ///     println!("{percent:.0}% {status}");
    /// })?;
    /// println!("{}", result.summary());
    /// # Ok::<(), png2ico::converter::ConvertError>(())
    /// ```
    pub fn convert_batch<P>(
        &self,
        inputs: &[PathBuf],
        output_dir: Option<&Path>,
        sizes: Option<&IconSizes>,
        overwrite: bool,
        mut on_progress: P,
    ) -> Result<BatchResult, ConvertError>
    where
        P: FnMut(f64, &str),
    {
        if let Some(dir) = output_dir {
            if !dir.exists() {
                fs::create_dir_all(dir).map_err(|e| {
                    ConvertError::Io(format!("创建输出目录 '{}' 失败：{}", dir.display(), e))
                })?;
            }
        }

        let total = inputs.len();
        let mut result = BatchResult::default();

        log::info!("📦 开始批量转换：共 {} 个文件", total);

        for (index, input) in inputs.iter().enumerate() {
            let output = Self::batch_output_path(input, output_dir);

            let outcome =
                guard_panics(|| self.try_convert_one(input, Some(&output), sizes, overwrite));

            match outcome {
                Ok(written) => result.record_success(input.clone(), written),
                Err(err @ ConvertError::Unexpected(_)) => {
                    log::error!("❌ 批量项异常 {}：{}", input.display(), err);
                    result.record_failure(input.clone(), err.to_string());
                }
                Err(err) => {
                    log::warn!("⚠️ 批量项失败 {} [{}]：{}", input.display(), err.code(), err);
                    result.record_failure(input.clone(), err.to_string());
                }
            }

            let percent = (index + 1) as f64 / total as f64 * 100.0;
            let file_name = input
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_else(|| input.display().to_string());
            on_progress(percent, &format!("正在处理：{}", file_name));
        }

        log::info!("📦 批量转换完成：{}", result.summary());
        Ok(result)
    }

    /// 扫描目录并批量转换其中所有 PNG。
    pub fn convert_directory<P>(
        &self,
        input_dir: &Path,
        output_dir: Option<&Path>,
        sizes: Option<&IconSizes>,
        overwrite: bool,
        on_progress: P,
    ) -> Result<BatchResult, ConvertError>
    where
        P: FnMut(f64, &str),
    {
        let inputs = scan_png_files(input_dir)?;
        if inputs.is_empty() {
            return Err(ConvertError::Validation(format!(
                "目录中没有 PNG 文件：{}",
                input_dir.display()
            )));
        }
        self.convert_batch(&inputs, output_dir, sizes, overwrite, on_progress)
    }

    fn batch_output_path(input: &Path, output_dir: Option<&Path>) -> PathBuf {
        let file_name = Self::default_output_path(input);
        match output_dir {
            Some(dir) => dir.join(file_name),
            None => file_name,
        }
    }
}

/// 列出目录下所有 `.png`（不区分大小写）普通文件，按文件名字典序排序。
pub fn scan_png_files(dir: &Path) -> Result<Vec<PathBuf>, ConvertError> {
    if !dir.is_dir() {
        return Err(ConvertError::Validation(format!(
            "批量模式需要目录作为输入：{}",
            dir.display()
        )));
    }

    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter(|entry| {
            entry
                .file_name()
                .to_string_lossy()
                .to_lowercase()
                .ends_with(".png")
        })
        .map(|entry| entry.path())
        .collect();

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}
