//! # `stockwatch-notify` - 通知推送适配层
//!
//! 实现 `stockwatch_core::notify::port::Notifier`，目前支持企业微信群机器人 webhook。

pub mod wechat;
