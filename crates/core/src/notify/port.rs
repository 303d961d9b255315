use crate::notify::error::NotifyError;
use async_trait::async_trait;

/// # Summary
/// 发送文本通知到外部系统的接口定义。
///
/// # Invariants
/// - 实现必须是 `Send` 和 `Sync` 以支持跨任务调用。
/// - 每次调用至多发起一次外部请求，不做重试。
#[async_trait]
pub trait Notifier: Send + Sync {
    /// # Summary
    /// 发送一条纯文本消息。
    ///
    /// # Logic
    /// 1. 按目标平台要求封装消息。
    /// 2. 通过底层传输协议发送消息。
    /// 3. 同时校验传输层与应用层的返回状态。
    ///
    /// # Arguments
    /// * `message` - 消息正文。
    ///
    /// # Returns
    /// * 成功返回 `Ok(())`。
    /// * 失败返回 `Err(NotifyError)`。
    async fn send(&self, message: &str) -> Result<(), NotifyError>;
}
