//! NeuroPulse 浏览器端 WASM 封装
//!
//! 将 `neuropulse` 核心分析编译为 WebAssembly，供页面直接调用：
//!
//! ## 模块
//! - `movement`: 两帧 RGBA canvas 缓冲之间的运动指数
//! - `session`: 单项测试录制会话与三项筛查会话
//! - `scoring`: 反应时统计与各项评分函数

pub mod movement;
pub mod scoring;
pub mod session;

// 重新导出核心类型，方便外部使用
pub use movement::compute_movement;
pub use session::{RecordingSession, Screening};
