//! # 后台转换服务
//!
//! ## 设计思路
//!
//! 交互线程不直接接触文件系统与解码器：所有转换（单文件或批量）都在一个
//! 独立的后台线程中执行，通过单生产者/单消费者通道回传事件。
//! 交互侧按固定节拍调用 `drain` 取走全部待处理事件。
//!
//! ## 实现思路
//!
//! - `ConversionWorker::spawn` 启动具名线程，线程持有 `Arc<IconConverter>`。
//! - 进度回调在工作线程上同步执行，直接把事件写入通道。
//! - 每次运行恰好发送一个终止事件（`Completed` / `BatchCompleted` / `Failed`）。
//! - 没有中途取消机制，唯一的停止点是批量中的文件之间（由调用方决定不再发起）。

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use super::source::BatchResult;
use super::{IconConverter, IconSizes};
use crate::error::AppError;

/// 一次转换请求。
#[derive(Debug, Clone)]
pub enum ConversionRequest {
    /// 单文件：`output` 缺省时为当前目录下的 `<主干>.ico`。
    Single {
        input: PathBuf,
        output: Option<PathBuf>,
        sizes: Option<IconSizes>,
        overwrite: bool,
    },
    /// 批量：`input_dir` 必须是目录。
    Batch {
        input_dir: PathBuf,
        output_dir: Option<PathBuf>,
        sizes: Option<IconSizes>,
        overwrite: bool,
    },
}

/// 工作线程回传的事件。
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    Progress { percent: f64, message: String },
    Completed { message: String },
    BatchCompleted(BatchResult),
    Failed { message: String },
}

impl WorkerEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Progress { .. })
    }
}

/// 后台转换任务句柄。
pub struct ConversionWorker {
    receiver: Receiver<WorkerEvent>,
    handle: Option<JoinHandle<()>>,
    finished: bool,
}

impl ConversionWorker {
    /// 启动后台线程执行一次转换。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use std::sync::Arc;
    /// use png2ico::converter::{ConversionRequest, ConversionWorker, ConvertConfig, IconConverter};
    ///
    /// let converter = Arc::new(IconConverter::new(ConvertConfig::default()));
    /// let mut worker = ConversionWorker::spawn(converter, ConversionRequest::Single {
    ///     input: "logo.png".into(),
    ///     output: None,
    ///     sizes: None,
    ///     overwrite: false,
    /// })?;
    /// while !worker.is_finished() {
    ///     for event in worker.drain() {
    ///         println!("{event:?}");
    ///     }
    ///     std::thread::sleep(std::time::Duration::from_millis(100));
    /// }
    /// # Ok::<(), png2ico::error::AppError>(())
    /// ```
    pub fn spawn(
        converter: Arc<IconConverter>,
        request: ConversionRequest,
    ) -> Result<Self, AppError> {
        let (sender, receiver) = mpsc::channel();

        let handle = thread::Builder::new()
            .name("png2ico-worker".to_string())
            .spawn(move || run_request(&converter, request, &sender))
            .map_err(|e| AppError::Worker(format!("启动转换线程失败: {}", e)))?;

        Ok(Self {
            receiver,
            handle: Some(handle),
            finished: false,
        })
    }

    /// 非阻塞地取走当前所有待处理事件。
    ///
    /// 工作线程异常退出（未发送终止事件即断开）时补发一个 `Failed`。
    pub fn drain(&mut self) -> Vec<WorkerEvent> {
        let mut events = Vec::new();
        if self.finished {
            return events;
        }

        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    let terminal = event.is_terminal();
                    events.push(event);
                    if terminal {
                        self.finished = true;
                        break;
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.finished = true;
                    events.push(WorkerEvent::Failed {
                        message: "转换线程意外退出".to_string(),
                    });
                    break;
                }
            }
        }

        events
    }

    /// 是否已收到终止事件。
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// 等待工作线程结束。
    pub fn join(mut self) -> Result<(), AppError> {
        match self.handle.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| AppError::Worker("转换线程发生 panic".to_string())),
            None => Ok(()),
        }
    }
}

fn run_request(
    converter: &IconConverter,
    request: ConversionRequest,
    sender: &Sender<WorkerEvent>,
) {
    // 接收端已丢弃时发送失败无需处理
    let send = |event: WorkerEvent| {
        let _ = sender.send(event);
    };

    match request {
        ConversionRequest::Single {
            input,
            output,
            sizes,
            overwrite,
        } => {
            let name = display_name(&input);
            let ok = converter.convert_one(&input, output.as_deref(), sizes.as_ref(), overwrite);
            if ok {
                send(WorkerEvent::Completed {
                    message: format!("已成功将 {} 转换为 ICO", name),
                });
            } else {
                send(WorkerEvent::Failed {
                    message: format!("转换 {} 失败", name),
                });
            }
        }
        ConversionRequest::Batch {
            input_dir,
            output_dir,
            sizes,
            overwrite,
        } => {
            let result = converter.convert_directory(
                &input_dir,
                output_dir.as_deref(),
                sizes.as_ref(),
                overwrite,
                |percent, status| {
                    send(WorkerEvent::Progress {
                        percent,
                        message: status.to_string(),
                    })
                },
            );
            match result {
                Ok(result) => send(WorkerEvent::BatchCompleted(result)),
                Err(err) => send(WorkerEvent::Failed {
                    message: err.to_string(),
                }),
            }
        }
    }
}

fn display_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::test_support::{unique_temp_dir, write_png};
    use crate::converter::ConvertConfig;
    use std::time::{Duration, Instant};

    fn collect_until_finished(worker: &mut ConversionWorker) -> Vec<WorkerEvent> {
        let deadline = Instant::now() + Duration::from_secs(60);
        let mut events = Vec::new();
        while !worker.is_finished() {
            assert!(Instant::now() < deadline, "worker did not finish in time");
            events.extend(worker.drain());
            thread::sleep(Duration::from_millis(10));
        }
        events
    }

    #[test]
    fn single_request_completes() {
        let dir = unique_temp_dir("service-single");
        let input = write_png(&dir, "logo.png", 32, 32);
        let converter = Arc::new(IconConverter::new(ConvertConfig::default()));

        let mut worker = ConversionWorker::spawn(
            converter,
            ConversionRequest::Single {
                input,
                output: Some(dir.join("logo.ico")),
                sizes: Some(IconSizes::new(vec![16, 32]).expect("valid sizes")),
                overwrite: false,
            },
        )
        .expect("spawn worker");

        let events = collect_until_finished(&mut worker);
        worker.join().expect("join worker");

        assert!(matches!(events.last(), Some(WorkerEvent::Completed { .. })));
        assert!(dir.join("logo.ico").exists());

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn batch_request_streams_progress_then_result() {
        let dir = unique_temp_dir("service-batch");
        let input_dir = dir.join("in");
        std::fs::create_dir_all(&input_dir).expect("create input dir");
        write_png(&input_dir, "a.png", 16, 16);
        write_png(&input_dir, "b.png", 24, 12);
        let converter = Arc::new(IconConverter::new(ConvertConfig::default()));

        let mut worker = ConversionWorker::spawn(
            converter,
            ConversionRequest::Batch {
                input_dir,
                output_dir: Some(dir.join("out")),
                sizes: None,
                overwrite: false,
            },
        )
        .expect("spawn worker");

        let events = collect_until_finished(&mut worker);
        worker.join().expect("join worker");

        let progress: Vec<f64> = events
            .iter()
            .filter_map(|event| match event {
                WorkerEvent::Progress { percent, .. } => Some(*percent),
                _ => None,
            })
            .collect();
        assert_eq!(progress, vec![50.0, 100.0]);

        match events.last() {
            Some(WorkerEvent::BatchCompleted(result)) => {
                assert_eq!((result.total, result.successful, result.failed), (2, 2, 0));
            }
            other => panic!("unexpected terminal event: {other:?}"),
        }

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn batch_request_on_file_fails_without_panicking() {
        let dir = unique_temp_dir("service-batch-file");
        let file = write_png(&dir, "single.png", 16, 16);
        let converter = Arc::new(IconConverter::new(ConvertConfig::default()));

        let mut worker = ConversionWorker::spawn(
            converter,
            ConversionRequest::Batch {
                input_dir: file,
                output_dir: None,
                sizes: None,
                overwrite: false,
            },
        )
        .expect("spawn worker");

        let events = collect_until_finished(&mut worker);
        worker.join().expect("join worker");

        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], WorkerEvent::Failed { .. }));

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn single_request_on_missing_input_fails_once() {
        let dir = unique_temp_dir("service-single-missing");
        let converter = Arc::new(IconConverter::new(ConvertConfig::default()));

        let mut worker = ConversionWorker::spawn(
            converter,
            ConversionRequest::Single {
                input: dir.join("nonexistent.png"),
                output: Some(dir.join("nonexistent.ico")),
                sizes: None,
                overwrite: false,
            },
        )
        .expect("spawn worker");

        let events = collect_until_finished(&mut worker);
        worker.join().expect("join worker");

        assert_eq!(events.len(), 1);
        match &events[0] {
            WorkerEvent::Failed { message } => assert!(message.contains("nonexistent.png")),
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(!dir.join("nonexistent.ico").exists());

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn disconnected_channel_reports_single_failure() {
        let (sender, receiver) = mpsc::channel::<WorkerEvent>();
        sender
            .send(WorkerEvent::Progress {
                percent: 50.0,
                message: "正在处理：a.png".to_string(),
            })
            .expect("send progress");
        drop(sender);

        let mut worker = ConversionWorker {
            receiver,
            handle: None,
            finished: false,
        };

        let events = worker.drain();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], WorkerEvent::Progress { .. }));
        assert!(matches!(events[1], WorkerEvent::Failed { .. }));
        assert!(worker.is_finished());

        assert!(worker.drain().is_empty());
        worker.join().expect("join without thread");
    }
}
