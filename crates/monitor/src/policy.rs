use chrono::{DateTime, Duration, Utc};

/// 浮点比较容差，吸收百分比计算中的舍入误差
pub const EPSILON: f64 = 1e-9;

/// # Summary
/// 显著波动判定：涨跌幅绝对值达到阈值即为候选告警。
///
/// # Invariants
/// - 正负方向对称，使用 `>=` 比较。
pub fn is_significant(change_percent: f64, threshold: f64) -> bool {
    change_percent.abs() + EPSILON >= threshold
}

/// # Summary
/// 最近一次成功送达的告警记录，即去重基准。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertRecord {
    // 告警对应快照的采集时间
    pub sent_at: DateTime<Utc>,
    // 告警时相对昨收的涨跌幅绝对值
    pub magnitude: f64,
}

/// # Summary
/// 告警去重策略。
///
/// # Invariants
/// - 冷却期内只有幅度继续扩大至少 `escalation_step` 个百分点才会再次告警。
/// - 冷却期外总是放行。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DedupPolicy {
    pub cooldown: Duration,
    pub escalation_step: f64,
}

impl Default for DedupPolicy {
    fn default() -> Self {
        Self {
            cooldown: Duration::minutes(5),
            escalation_step: 0.2,
        }
    }
}

impl DedupPolicy {
    /// # Summary
    /// 判断候选告警是否应当发送。
    ///
    /// # Arguments
    /// * `last`: 上一次成功送达的告警，从未送达过为 `None`。
    /// * `at`: 当前快照的采集时间。
    /// * `magnitude`: 当前涨跌幅绝对值。
    ///
    /// # Returns
    /// 应当发送返回 `true`。
    pub fn should_send(&self, last: Option<&AlertRecord>, at: DateTime<Utc>, magnitude: f64) -> bool {
        let Some(last) = last else {
            return true;
        };
        if at - last.sent_at >= self.cooldown {
            return true;
        }
        magnitude - last.magnitude + EPSILON >= self.escalation_step
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 8, 6, 40, 0).unwrap()
    }

    #[test]
    fn test_is_significant() {
        assert!(is_significant(1.0, 0.8));
        assert!(is_significant(-1.0, 0.8));
        assert!(is_significant(0.8, 0.8));
        assert!(is_significant(-0.8, 0.8));
        assert!(!is_significant(0.79, 0.8));
        assert!(!is_significant(-0.79, 0.8));
        assert!(!is_significant(0.0, 0.8));
        // 24 / 3000 * 100 在浮点下略偏离 0.8
        assert!(is_significant((3024.0 - 3000.0) / 3000.0 * 100.0, 0.8));
    }

    #[test]
    fn test_first_alert_always_allowed() {
        let policy = DedupPolicy::default();
        assert!(policy.should_send(None, t0(), 0.9));
    }

    #[test]
    fn test_within_cooldown_requires_escalation() {
        let policy = DedupPolicy::default();
        let last = AlertRecord {
            sent_at: t0(),
            magnitude: 1.0,
        };
        assert!(!policy.should_send(Some(&last), t0() + Duration::minutes(2), 1.05));
        assert!(!policy.should_send(Some(&last), t0() + Duration::minutes(2), 0.9));
        assert!(policy.should_send(Some(&last), t0() + Duration::minutes(3), 1.3));
        assert!(policy.should_send(Some(&last), t0() + Duration::minutes(3), 1.2));
    }

    #[test]
    fn test_after_cooldown_always_allowed() {
        let policy = DedupPolicy::default();
        let last = AlertRecord {
            sent_at: t0(),
            magnitude: 1.0,
        };
        assert!(policy.should_send(Some(&last), t0() + Duration::minutes(5), 1.0));
        assert!(policy.should_send(Some(&last), t0() + Duration::minutes(6), 0.85));
        assert!(!policy.should_send(
            Some(&last),
            t0() + Duration::minutes(5) - Duration::seconds(1),
            1.0
        ));
    }
}
