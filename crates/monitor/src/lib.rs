//! # `stockwatch-monitor` - 指数波动监控状态机
//!
//! 负责轮询节奏、快照比较、显著波动判定、告警时间窗与去重策略。
//! 数据源与通知渠道均通过 `stockwatch-core` 中的端口注入。

pub mod alert;
pub mod monitor;
pub mod policy;
pub mod state;
pub mod window;
