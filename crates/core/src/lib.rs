//! # `stockwatch-core` - 领域契约层
//!
//! 定义指数监控系统各组件之间共享的实体、端口 (Port) 与错误类型。
//! 本 crate 不包含任何网络或 IO 实现，具体适配器位于 `stockwatch-feed`
//! 与 `stockwatch-notify` 中，由 `stockwatch-app` 装配。

pub mod common;
pub mod config;

pub mod market {
    pub mod entity;
    pub mod error;
    pub mod port;
}

pub mod notify {
    pub mod error;
    pub mod port;
}
