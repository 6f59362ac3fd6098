//! # 核心编排模块
//!
//! ## 设计思路
//!
//! `IconConverter` 只负责流程编排，不持有任何可变共享状态，配置在构造时注入后只读。
//! 单文件处理链路固定为：
//! 1. 加载并校验输入（存在性、PNG 签名、头部尺寸）
//! 2. 解析输出路径，必要时拒绝覆盖
//! 3. 解析尺寸列表
//! 4. 完整解码 → 逐尺寸缩放居中 → 打包 ICO → 原子写出
//!
//! ## 实现思路
//!
//! - 所有前置条件都在写盘之前检查，任何一步失败都不会产生输出文件。
//! - `try_convert_one` 返回带分类的错误；`convert_one` 吸收错误并记录日志，只返回布尔值。
//! - 单文件处理中的 panic 由 `guard_panics` 转为 `Unexpected`，不会越过调用方。
//! - 记录 `load/resize/encode/total` 阶段耗时，便于性能诊断。

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::time::Instant;

use super::encoder::{encode_ico, write_atomically};
use super::pipeline::resize_to_square;
use super::{ConvertConfig, ConvertError, IconSizes};

/// PNG → ICO 转换器。
#[derive(Debug, Clone)]
pub struct IconConverter {
    pub(super) config: ConvertConfig,
}

impl IconConverter {
    /// 根据配置创建转换器。
    ///
    /// # 示例
    /// ```rust
    /// use png2ico::converter::{ConvertConfig, IconConverter};
    ///
    /// let converter = IconConverter::new(ConvertConfig::default());
    /// assert_eq!(converter.config().icon_sizes.len(), 7);
    /// ```
    pub fn new(config: ConvertConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConvertConfig {
        &self.config
    }

    /// 未指定输出路径时的默认值：当前目录下的 `<文件名主干>.ico`。
    pub fn default_output_path(input: &Path) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|stem| stem.to_os_string())
            .unwrap_or_else(|| "icon".into());
        PathBuf::from(stem).with_extension("ico")
    }

    /// 单文件转换，吸收所有错误，只返回是否成功。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use png2ico::converter::{ConvertConfig, IconConverter};
    ///
    /// let converter = IconConverter::new(ConvertConfig::default());
    /// let ok = converter.convert_one("logo.png", Some("logo.ico".as_ref()), None, false);
    /// assert!(ok);
    /// ```
    pub fn convert_one(
        &self,
        input: impl AsRef<Path>,
        output: Option<&Path>,
        sizes: Option<&IconSizes>,
        overwrite: bool,
    ) -> bool {
        let input = input.as_ref();
        match guard_panics(|| self.try_convert_one(input, output, sizes, overwrite)) {
            Ok(_) => true,
            Err(ConvertError::AlreadyExists(path)) => {
                log::warn!("⚠️ 输出文件已存在，跳过：{}", path.display());
                false
            }
            Err(err) => {
                log::error!("❌ 转换失败 {} [{}]：{}", input.display(), err.code(), err);
                false
            }
        }
    }

    /// 单文件转换，返回实际写出的路径或分类错误。
    pub fn try_convert_one(
        &self,
        input: impl AsRef<Path>,
        output: Option<&Path>,
        sizes: Option<&IconSizes>,
        overwrite: bool,
    ) -> Result<PathBuf, ConvertError> {
        let input = input.as_ref();
        let total_start = Instant::now();

        let load_start = Instant::now();
        let raw = self.load_raw(input, &self.config)?;

        let output = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| Self::default_output_path(input));

        if output.exists() && !overwrite {
            return Err(ConvertError::AlreadyExists(output));
        }

        let sizes = sizes.unwrap_or(&self.config.icon_sizes);
        if sizes.is_empty() {
            return Err(ConvertError::Validation("图标尺寸列表不能为空".to_string()));
        }

        let source = self.decode_source(raw)?;
        let load_elapsed = load_start.elapsed();

        let resize_start = Instant::now();
        let frames = sizes
            .as_slice()
            .iter()
            .map(|&size| resize_to_square(&source.rgba, size, self.config.resize_filter))
            .collect::<Result<Vec<_>, _>>()?;
        let resize_elapsed = resize_start.elapsed();

        let encode_start = Instant::now();
        let bytes = encode_ico(&frames)?;
        write_atomically(&output, &bytes, overwrite)?;
        let encode_elapsed = encode_start.elapsed();

        log::info!(
            "✅ 已转换 {} -> {}（尺寸 {}）load={}ms resize={}ms encode={}ms total={}ms",
            source.path.display(),
            output.display(),
            sizes,
            load_elapsed.as_millis(),
            resize_elapsed.as_millis(),
            encode_elapsed.as_millis(),
            total_start.elapsed().as_millis()
        );

        Ok(output)
    }
}

/// 执行单文件处理，把其中的 panic 转成 `ConvertError::Unexpected`。
pub(super) fn guard_panics<T, F>(task: F) -> Result<T, ConvertError>
where
    F: FnOnce() -> Result<T, ConvertError>,
{
    panic::catch_unwind(AssertUnwindSafe(task)).unwrap_or_else(|payload| {
        Err(ConvertError::Unexpected(panic_message(payload.as_ref())))
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "转换过程中发生未知异常".to_string()
    }
}
