//! # PNG 转 ICO 工具 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 CLI (clap)  —  main.rs                   │
//! │   convert / info / settings 子命令                       │
//! │        │  100ms 节拍 drain 事件                          │
//! └────────┼─────────────────────────────────────────────────┘
//!          ↕ mpsc 通道 (WorkerEvent)
//! ┌────────┼─────────────────────────────────────────────────┐
//! │        ↕            核心库 (Rust)                        │
//! │                                                          │
//! │  ┌─ error ────── AppError (统一错误类型)                 │
//! │  │                                                       │
//! │  ├─ settings ─── config.json 读写 → ConvertConfig        │
//! │  │                                                       │
//! │  └─ converter ── 单文件 / 批量 / 后台线程                │
//! │      ├─ loader    PNG 签名·头部·解码                     │
//! │      ├─ pipeline  等比缩放 + 透明方形画布                │
//! │      └─ encoder   ICO 打包 + 原子写出                    │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError` |
//! | [`settings`] | 设置文件加载、回退默认值、保存 |
//! | [`converter`] | PNG → 多尺寸 ICO 转换、批量汇总、后台执行 |

pub mod converter;
pub mod error;
pub mod settings;
