use crate::market::entity::Snapshot;
use crate::market::error::MarketError;
use async_trait::async_trait;

/// # Summary
/// 指数行情快照提供者接口。
///
/// # Invariants
/// - 每次调用产生一份全新的快照。
/// - 实现必须为请求设置有限超时，不得无限阻塞轮询节奏。
#[async_trait]
pub trait SnapshotProvider: Send + Sync {
    /// # Summary
    /// 获取指定代码的最新行情快照。
    ///
    /// # Arguments
    /// * `code`: 指数代码，如 `sh000001`。
    ///
    /// # Returns
    /// 成功返回 `Snapshot`，失败返回 `MarketError`。
    async fn fetch(&self, code: &str) -> Result<Snapshot, MarketError>;
}
