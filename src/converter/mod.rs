//! # PNG → ICO 转换模块（converter）
//!
//! ## 设计思路
//!
//! 该模块将“输入加载校验 → 等比缩放居中 → ICO 打包写出 → 批量编排 → 后台执行”
//! 按职责拆分为多个子模块，避免单文件膨胀与耦合。
//!
//! - `config`：尺寸列表与转换策略（显式注入，无全局状态）
//! - `handler`：单文件转换编排
//! - `batch`：批量转换、目录扫描与进度回调
//! - `loader`：文件读取、PNG 签名与头部校验、解码
//! - `pipeline`：等比缩放进透明方形画布
//! - `encoder`：ICO 容器编码与原子写出
//! - `service`：后台工作线程与事件通道
//! - `error/source`：错误与数据模型
//!
//! ## 新同事快速上手
//!
//! 可以按下面顺序理解调用链：
//!
//! ```text
//! CLI / 调用方
//!    ↓
//! service.rs（后台线程 + 事件通道，可选）
//!    ↓
//! batch.rs（逐文件调度 + 明细汇总 + 进度）
//!    ↓
//! handler.rs（单文件编排 + 阶段耗时日志）
//!    ├─ loader.rs（存在性 / 签名 / 像素上限 / 解码）
//!    ├─ pipeline.rs（等比缩放 + 透明画布居中）
//!    └─ encoder.rs（ICO 打包 + 原子写出）
//! ```

mod batch;
mod config;
mod encoder;
mod error;
mod handler;
mod loader;
mod pipeline;
mod service;
mod source;

pub use batch::scan_png_files;
pub use config::{
    ConvertConfig, DEFAULT_ICON_SIZES, DEFAULT_OUTPUT_DIR, IconSizes, MAX_ICON_EDGE, filter_name,
    parse_filter,
};
pub use error::ConvertError;
pub use handler::IconConverter;
pub use pipeline::{FitLayout, fit_into_square, resize_to_square};
pub use service::{ConversionRequest, ConversionWorker, WorkerEvent};
pub use source::{BatchEntry, BatchResult, BatchStatus, ImageInfo};

#[cfg(test)]
pub(crate) mod test_support {
    use std::io::Cursor;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    use image::{DynamicImage, ImageBuffer, ImageFormat, Rgba};

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    pub(crate) fn unique_temp_dir(tag: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock error")
            .as_nanos();
        let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
        let dir = std::env::temp_dir().join(format!(
            "png2ico-{tag}-{}-{nanos}-{seq}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    pub(crate) fn create_png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            let r = (x % 255) as u8;
            let g = (y % 255) as u8;
            let b = ((x + y) % 255) as u8;
            Rgba([r, g, b, 255])
        });

        let mut cursor = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut cursor, ImageFormat::Png)
            .expect("failed to encode test image");
        cursor.into_inner()
    }

    pub(crate) fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, create_png_bytes(width, height)).expect("write test png");
        path
    }

    /// 读取 ICO 目录项中的宽高（0 表示 256）。
    pub(crate) fn read_ico_directory(bytes: &[u8]) -> Vec<(u32, u32)> {
        assert!(bytes.len() >= 6, "ico header too short");
        assert_eq!(&bytes[0..4], &[0, 0, 1, 0], "not an icon container");
        let count = u16::from_le_bytes([bytes[4], bytes[5]]) as usize;

        (0..count)
            .map(|i| {
                let entry = &bytes[6 + i * 16..6 + (i + 1) * 16];
                let edge = |b: u8| if b == 0 { 256 } else { b as u32 };
                (edge(entry[0]), edge(entry[1]))
            })
            .collect()
    }
}
