use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// # Summary
/// 数据源返回的原始价位字段。
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Quote {
    // 今日开盘点位
    pub open: f64,
    // 昨日收盘点位
    pub previous_close: f64,
    // 当前点位
    pub current: f64,
    // 今日最高点位
    pub high: f64,
    // 今日最低点位
    pub low: f64,
}

/// # Summary
/// 单次轮询得到的指数行情快照。
///
/// # Invariants
/// - 产生后不可修改，新的轮询总是产生新的快照。
/// - `change_percent` 与 `change_amount` 始终相对于 `previous_close` 计算。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    // 指数代码
    pub code: String,
    // 展示名称
    pub name: String,
    // 当前点位
    pub current: f64,
    // 开盘点位
    pub open: f64,
    // 最高点位
    pub high: f64,
    // 最低点位
    pub low: f64,
    // 昨收点位
    pub previous_close: f64,
    // 相对昨收的涨跌幅 (百分比)
    pub change_percent: f64,
    // 相对昨收的涨跌点数
    pub change_amount: f64,
    // 采集时间
    pub captured_at: DateTime<Utc>,
}

impl Snapshot {
    /// # Summary
    /// 由原始价位构造快照，并计算相对昨收的涨跌。
    ///
    /// # Arguments
    /// * `code`: 指数代码。
    /// * `name`: 展示名称。
    /// * `quote`: 原始价位。
    /// * `captured_at`: 采集时间。
    ///
    /// # Returns
    /// 新的快照实例。
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        quote: Quote,
        captured_at: DateTime<Utc>,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            current: quote.current,
            open: quote.open,
            high: quote.high,
            low: quote.low,
            previous_close: quote.previous_close,
            change_percent: change_percent(quote.previous_close, quote.current),
            change_amount: quote.current - quote.previous_close,
            captured_at,
        }
    }
}

/// # Summary
/// 计算 `current` 相对 `base` 的百分比变化。
///
/// # Invariants
/// - `base` 为 0 时结果恒为 0，不会产生除零。
pub fn change_percent(base: f64, current: f64) -> f64 {
    if base == 0.0 {
        return 0.0;
    }
    (current - base) / base * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(previous_close: f64, current: f64) -> Quote {
        Quote {
            open: previous_close,
            previous_close,
            current,
            high: current.max(previous_close),
            low: current.min(previous_close),
        }
    }

    #[test]
    fn test_change_percent_zero_base() {
        assert_eq!(change_percent(0.0, 3000.0), 0.0);
        assert_eq!(change_percent(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_snapshot_derives_change_fields() {
        let snapshot = Snapshot::new("sh000001", "上证指数", quote(3000.0, 3030.0), Utc::now());
        assert!((snapshot.change_percent - 1.0).abs() < 1e-9);
        assert!((snapshot.change_amount - 30.0).abs() < 1e-9);

        let falling = Snapshot::new("sh000001", "上证指数", quote(3000.0, 2970.0), Utc::now());
        assert!((falling.change_percent + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_snapshot_with_zero_previous_close() {
        let snapshot = Snapshot::new("sh000001", "上证指数", quote(0.0, 3030.0), Utc::now());
        assert_eq!(snapshot.change_percent, 0.0);
        assert_eq!(snapshot.change_amount, 3030.0);
    }
}
