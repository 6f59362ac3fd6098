//! # PNG 转 ICO 工具 — 命令行入口
//!
//! 本文件只负责参数解析、设置加载与后台任务的事件轮询。
//! 转换逻辑详见 `lib.rs` 架构文档。

use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::{Parser, Subcommand};
use png2ico::converter::{
    BatchResult, BatchStatus, ConversionRequest, ConversionWorker, IconConverter, IconSizes,
    WorkerEvent, parse_filter,
};
use png2ico::error::AppError;
use png2ico::settings::{self, AppSettings, DEFAULT_SETTINGS_FILE};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Parser)]
#[command(name = "png2ico")]
#[command(version, about = "将 PNG 转换为多尺寸 ICO 图标（支持批量）")]
struct Cli {
    /// 设置文件路径
    #[arg(long, global = true, default_value = DEFAULT_SETTINGS_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 转换单个 PNG，或以批量模式转换目录下所有 PNG
    Convert {
        /// 输入 PNG 文件（批量模式下为目录）
        input: PathBuf,
        /// 输出 ICO 文件（批量模式下为输出目录）
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// 逗号分隔的图标尺寸，例如 16,32,48
        #[arg(short, long)]
        sizes: Option<String>,
        /// 覆盖已存在的输出文件
        #[arg(long)]
        overwrite: bool,
        /// 批量模式
        #[arg(short, long)]
        batch: bool,
        /// 批量结果 JSON 报告路径
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// 查看 PNG 的格式、尺寸与颜色模式
    Info {
        input: PathBuf,
    },
    /// 查看或修改默认设置
    Settings {
        /// 默认图标尺寸，逗号分隔
        #[arg(long)]
        sizes: Option<String>,
        /// 默认输出目录
        #[arg(long)]
        output_dir: Option<String>,
        /// 默认是否覆盖
        #[arg(long)]
        overwrite: Option<bool>,
        /// 缩放滤镜：nearest / triangle / catmullrom / gaussian / lanczos3
        #[arg(long)]
        filter: Option<String>,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(err) => {
            log::error!("❌ {err}");
            eprintln!("错误: {err}");
            process::exit(1);
        }
    }
}

/// 返回值表示是否全部成功。
fn run(cli: Cli) -> Result<bool, AppError> {
    let app_settings = settings::load_or_create_settings(&cli.config)?;

    match cli.command {
        Commands::Convert {
            input,
            output,
            sizes,
            overwrite,
            batch,
            report,
        } => {
            let config = app_settings.to_convert_config()?;
            let sizes = sizes.as_deref().map(IconSizes::parse).transpose()?;
            let overwrite = overwrite || config.overwrite;

            let request = if batch || app_settings.batch_mode {
                ConversionRequest::Batch {
                    input_dir: input,
                    output_dir: Some(output.unwrap_or_else(|| config.output_dir.clone())),
                    sizes,
                    overwrite,
                }
            } else {
                ConversionRequest::Single {
                    input,
                    output,
                    sizes,
                    overwrite,
                }
            };

            let converter = Arc::new(IconConverter::new(config));
            run_worker(converter, request, report.as_deref())
        }
        Commands::Info { input } => {
            let config = app_settings.to_convert_config()?;
            let info = IconConverter::new(config).inspect_image(&input)?;
            println!(
                "{}\n{} • {}×{} • {} • {} 字节",
                info.path.display(),
                info.format,
                info.width,
                info.height,
                info.color,
                info.file_size
            );
            Ok(true)
        }
        Commands::Settings {
            sizes,
            output_dir,
            overwrite,
            filter,
        } => {
            let changed = sizes.is_some()
                || output_dir.is_some()
                || overwrite.is_some()
                || filter.is_some();
            let updated =
                apply_settings_changes(app_settings, sizes, output_dir, overwrite, filter)?;
            if changed {
                settings::save_settings_to_path(&cli.config, &updated)?;
                log::info!("💾 设置已保存: {}", cli.config.display());
            }
            print_settings(&updated);
            Ok(true)
        }
    }
}

fn apply_settings_changes(
    mut current: AppSettings,
    sizes: Option<String>,
    output_dir: Option<String>,
    overwrite: Option<bool>,
    filter: Option<String>,
) -> Result<AppSettings, AppError> {
    if let Some(sizes) = sizes {
        current.icon_sizes = IconSizes::parse(&sizes)?.as_slice().to_vec();
    }
    if let Some(dir) = output_dir {
        current.default_output_dir = dir;
    }
    if let Some(overwrite) = overwrite {
        current.overwrite_existing = overwrite;
    }
    if let Some(filter) = filter {
        parse_filter(&filter)?;
        current.resize_filter = filter.trim().to_lowercase();
    }
    Ok(current)
}

fn print_settings(settings: &AppSettings) {
    let sizes: Vec<String> = settings.icon_sizes.iter().map(u32::to_string).collect();
    println!("icon_sizes         = {}", sizes.join(","));
    println!("default_output_dir = {}", settings.default_output_dir);
    println!("batch_mode         = {}", settings.batch_mode);
    println!("overwrite_existing = {}", settings.overwrite_existing);
    println!("resize_filter      = {}", settings.resize_filter);
}

/// 启动后台转换并按固定节拍处理事件。
fn run_worker(
    converter: Arc<IconConverter>,
    request: ConversionRequest,
    report: Option<&Path>,
) -> Result<bool, AppError> {
    let mut worker = ConversionWorker::spawn(converter, request)?;
    let mut succeeded = false;

    println!("开始转换...");
    while !worker.is_finished() {
        thread::sleep(POLL_INTERVAL);

        for event in worker.drain() {
            match event {
                WorkerEvent::Progress { percent, message } => {
                    println!("[{:>5.1}%] {}", percent, message);
                }
                WorkerEvent::Completed { message } => {
                    println!("[100.0%] {}", message);
                    succeeded = true;
                }
                WorkerEvent::BatchCompleted(result) => {
                    print_batch_result(&result);
                    if let Some(path) = report {
                        write_report(path, &result)?;
                    }
                    succeeded = result.all_succeeded();
                }
                WorkerEvent::Failed { message } => {
                    eprintln!("转换失败: {}", message);
                }
            }
        }
    }

    worker.join()?;
    Ok(succeeded)
}

fn print_batch_result(result: &BatchResult) {
    println!("批量转换完成: {}", result.summary());
    println!("明细:");
    for entry in &result.details {
        match entry.status {
            BatchStatus::Success => println!(
                "  {}: success -> {}",
                entry.source.display(),
                entry
                    .output
                    .as_deref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default()
            ),
            BatchStatus::Failed => println!(
                "  {}: failed ({})",
                entry.source.display(),
                entry.error.as_deref().unwrap_or("转换失败")
            ),
        }
    }
}

fn write_report(path: &Path, result: &BatchResult) -> Result<(), AppError> {
    let content = serde_json::to_string_pretty(result).map_err(std::io::Error::from)?;
    std::fs::write(path, content)?;
    log::info!("📄 报告已写出: {}", path.display());
    Ok(())
}
