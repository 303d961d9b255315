use async_trait::async_trait;
use chrono::Timelike;
use std::sync::Arc;
use stockwatch_core::common::SymbolNames;
use stockwatch_core::common::time::TimeProvider;
use stockwatch_core::market::entity::{Quote, Snapshot};
use stockwatch_core::market::error::MarketError;
use stockwatch_core::market::port::SnapshotProvider;

/// # Summary
/// 模拟行情提供者，在主数据源不可用时生成大致合理的指数点位。
///
/// # Invariants
/// - 数值只由当前时钟决定，同一时刻产生相同结果。
/// - 永不失败。
pub struct SyntheticProvider {
    names: Arc<SymbolNames>,
    clock: Arc<dyn TimeProvider>,
}

impl SyntheticProvider {
    pub fn new(names: Arc<SymbolNames>, clock: Arc<dyn TimeProvider>) -> Self {
        Self { names, clock }
    }

    /// # Summary
    /// 根据当前时钟生成一份快照。
    ///
    /// # Logic
    /// 1. 基准点位 = 3000 + unix 秒 mod 1000。
    /// 2. 开盘在基准附近按分钟偏移，当前价在开盘附近按秒偏移。
    /// 3. 最高/最低在开盘与当前价外侧扩展，昨收围绕开盘浮动。
    pub fn generate(&self, code: &str) -> Snapshot {
        let now = self.clock.now();
        let unix = now.timestamp();
        let cycle = |m: i64| f64::from(u32::try_from(unix.rem_euclid(m)).unwrap_or(0));

        let base = 3000.0 + cycle(1000);
        let open = base + (f64::from(now.minute() % 50) - 25.0);
        let current = open + (f64::from(now.second() % 100) - 50.0) * 0.1;

        let quote = Quote {
            open,
            previous_close: open - cycle(20) + 10.0,
            current,
            high: open.max(current) + cycle(30),
            low: open.min(current) - cycle(30),
        };

        Snapshot::new(code, self.names.resolve(code), quote, now)
    }
}

#[async_trait]
impl SnapshotProvider for SyntheticProvider {
    async fn fetch(&self, code: &str) -> Result<Snapshot, MarketError> {
        Ok(self.generate(code))
    }
}
