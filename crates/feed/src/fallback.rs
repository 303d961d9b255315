use crate::synthetic::SyntheticProvider;
use async_trait::async_trait;
use std::sync::Arc;
use stockwatch_core::market::entity::Snapshot;
use stockwatch_core::market::error::MarketError;
use stockwatch_core::market::port::SnapshotProvider;
use tracing::warn;

/// # Summary
/// 带降级能力的行情提供者。
///
/// # Invariants
/// - 主数据源的任何失败 (网络、状态码、解析) 都被吞掉并改用模拟数据。
/// - `fetch` 永远返回 `Ok`。
pub struct FallbackProvider {
    primary: Arc<dyn SnapshotProvider>,
    fallback: SyntheticProvider,
}

impl FallbackProvider {
    pub fn new(primary: Arc<dyn SnapshotProvider>, fallback: SyntheticProvider) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl SnapshotProvider for FallbackProvider {
    async fn fetch(&self, code: &str) -> Result<Snapshot, MarketError> {
        match self.primary.fetch(code).await {
            Ok(snapshot) => Ok(snapshot),
            Err(e) => {
                warn!("Primary quote source failed for {}, using synthetic data: {}", code, e);
                Ok(self.fallback.generate(code))
            }
        }
    }
}
