use crate::policy::AlertRecord;
use chrono::{DateTime, Utc};
use stockwatch_core::market::entity::{Snapshot, change_percent};

/// # Summary
/// 一次快照比较的结果。
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Observation {
    /// 首个快照，仅建立基准，不做比较
    Baseline,
    /// 与已有基准比较得到的两个涨跌幅
    Compared {
        change_vs_prev_close: f64,
        change_vs_open: f64,
    },
}

/// # Summary
/// 监控器的可变状态，只由轮询任务读写。
///
/// # Invariants
/// - 同一时刻只有一个"当前"快照 (`last_snapshot`)。
/// - `day_open` 在首个快照时确定，此后直到进程重启都不再修正。
/// - `max_change` / `min_change` 统计的是相对开盘的涨跌幅绝对值，均以 0 起步。
#[derive(Debug, Default)]
pub struct MonitorState {
    last_snapshot: Option<Snapshot>,
    day_open: f64,
    max_change: f64,
    min_change: f64,
    last_alert: Option<AlertRecord>,
}

impl MonitorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Summary
    /// 用新快照与当前状态比较。
    ///
    /// # Logic
    /// 1. 尚无快照时，以其开盘价作为日内基准，保存快照并清零统计，返回 `Baseline`。
    /// 2. 否则计算相对昨收与相对日内基准的涨跌幅，并更新绝对值的最大/最小统计。
    ///
    /// 非首个快照不会在此替换 `last_snapshot`，调用方需在本轮处理结束后调用 `advance`。
    pub fn observe(&mut self, snapshot: &Snapshot) -> Observation {
        if self.last_snapshot.is_none() {
            self.day_open = snapshot.open;
            self.last_snapshot = Some(snapshot.clone());
            self.max_change = 0.0;
            self.min_change = 0.0;
            return Observation::Baseline;
        }

        let change_vs_open = change_percent(self.day_open, snapshot.current);
        self.max_change = self.max_change.max(change_vs_open.abs());
        self.min_change = self.min_change.min(change_vs_open.abs());

        Observation::Compared {
            change_vs_prev_close: snapshot.change_percent,
            change_vs_open,
        }
    }

    /// 以新快照替换当前快照
    pub fn advance(&mut self, snapshot: Snapshot) {
        self.last_snapshot = Some(snapshot);
    }

    /// 记录一次成功送达的告警，作为新的去重基准
    pub fn record_alert(&mut self, sent_at: DateTime<Utc>, magnitude: f64) {
        self.last_alert = Some(AlertRecord { sent_at, magnitude });
    }

    pub fn last_alert(&self) -> Option<&AlertRecord> {
        self.last_alert.as_ref()
    }

    pub fn max_change(&self) -> f64 {
        self.max_change
    }

    /// 拷贝一份只读统计视图
    pub fn stats(&self) -> MonitorStats {
        MonitorStats {
            last_snapshot: self.last_snapshot.clone(),
            day_open: self.day_open,
            max_change_vs_open: self.max_change,
            min_change_vs_open: self.min_change,
            last_alert_at: self.last_alert.map(|a| a.sent_at),
            last_alert_magnitude: self.last_alert.map(|a| a.magnitude),
        }
    }
}

/// # Summary
/// 对外暴露的状态副本，修改它不会影响监控器。
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorStats {
    pub last_snapshot: Option<Snapshot>,
    pub day_open: f64,
    pub max_change_vs_open: f64,
    pub min_change_vs_open: f64,
    pub last_alert_at: Option<DateTime<Utc>>,
    pub last_alert_magnitude: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockwatch_core::market::entity::Quote;

    fn snapshot(open: f64, previous_close: f64, current: f64) -> Snapshot {
        Snapshot::new(
            "sh000001",
            "上证指数",
            Quote {
                open,
                previous_close,
                current,
                high: current.max(open),
                low: current.min(open),
            },
            Utc::now(),
        )
    }

    #[test]
    fn test_first_snapshot_is_baseline() {
        let mut state = MonitorState::new();
        let first = snapshot(3000.0, 2990.0, 3005.0);
        assert_eq!(state.observe(&first), Observation::Baseline);

        let stats = state.stats();
        assert_eq!(stats.day_open, 3000.0);
        assert_eq!(stats.last_snapshot, Some(first));
        assert_eq!(stats.max_change_vs_open, 0.0);
        assert_eq!(stats.min_change_vs_open, 0.0);
        assert!(stats.last_alert_at.is_none());
    }

    #[test]
    fn test_compare_uses_both_baselines() {
        let mut state = MonitorState::new();
        state.observe(&snapshot(3000.0, 2990.0, 3005.0));

        let second = snapshot(3010.0, 3000.0, 3030.0);
        match state.observe(&second) {
            Observation::Compared {
                change_vs_prev_close,
                change_vs_open,
            } => {
                assert!((change_vs_prev_close - 1.0).abs() < 1e-9);
                // 日内基准仍为首个快照的开盘价 3000
                assert!((change_vs_open - 1.0).abs() < 1e-9);
            }
            other => panic!("unexpected observation: {:?}", other),
        }
        assert_eq!(state.stats().day_open, 3000.0);
    }

    #[test]
    fn test_running_extremes() {
        let mut state = MonitorState::new();
        state.observe(&snapshot(3000.0, 3000.0, 3000.0));
        state.observe(&snapshot(3000.0, 3000.0, 3060.0));
        state.observe(&snapshot(3000.0, 3000.0, 2985.0));

        let stats = state.stats();
        assert!((stats.max_change_vs_open - 2.0).abs() < 1e-9);
        assert_eq!(stats.min_change_vs_open, 0.0);
    }

    #[test]
    fn test_zero_open_baseline_is_guarded() {
        let mut state = MonitorState::new();
        state.observe(&snapshot(0.0, 3000.0, 3000.0));
        match state.observe(&snapshot(0.0, 3000.0, 3030.0)) {
            Observation::Compared { change_vs_open, .. } => assert_eq!(change_vs_open, 0.0),
            other => panic!("unexpected observation: {:?}", other),
        }
    }

    #[test]
    fn test_advance_and_record_alert() {
        let mut state = MonitorState::new();
        let first = snapshot(3000.0, 3000.0, 3000.0);
        state.observe(&first);
        let second = snapshot(3000.0, 3000.0, 3030.0);
        state.observe(&second);
        assert_eq!(state.stats().last_snapshot, Some(first));

        state.advance(second.clone());
        assert_eq!(state.stats().last_snapshot, Some(second.clone()));

        state.record_alert(second.captured_at, 1.0);
        let record = state.last_alert().copied().unwrap();
        assert_eq!(record.sent_at, second.captured_at);
        assert_eq!(record.magnitude, 1.0);
    }
}
