use chrono::FixedOffset;
use stockwatch_core::market::entity::Snapshot;

/// 波动方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn of(change_percent: f64) -> Self {
        if change_percent > 0.0 {
            Direction::Up
        } else {
            Direction::Down
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Direction::Up => "上涨",
            Direction::Down => "下跌",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Direction::Up => "📈",
            Direction::Down => "📉",
        }
    }
}

/// # Summary
/// 组装告警消息所需的全部数据。
pub struct AlertContext<'a> {
    pub snapshot: &'a Snapshot,
    pub change_vs_prev_close: f64,
    pub change_vs_open: f64,
    pub max_change_vs_open: f64,
    pub threshold: f64,
    /// 展示采集时间所用的时区
    pub offset: FixedOffset,
}

/// # Summary
/// 生成推送到群聊的纯文本告警。
///
/// # Logic
/// 1. 根据涨跌方向选择文案与图标。
/// 2. 列出点位信息、采集时间与阈值。
/// 3. 附上相对开盘的日内统计。
pub fn format_alert_message(ctx: &AlertContext<'_>) -> String {
    let snapshot = ctx.snapshot;
    let direction = Direction::of(ctx.change_vs_prev_close);
    let captured = snapshot
        .captured_at
        .with_timezone(&ctx.offset)
        .format("%H:%M:%S");

    format!(
        "{emoji} 指数波动警报 {emoji}\n\
         \n\
         指数: {name} ({code})\n\
         当前点位: {current:.2}\n\
         涨跌: {label} {change:.2}% ({amount:+.2} 点)\n\
         开盘: {open:.2}\n\
         最高: {high:.2}\n\
         最低: {low:.2}\n\
         时间: {captured}\n\
         阈值: {threshold:.2}%\n\
         \n\
         日内统计 (相对开盘):\n\
         - 当前波动: {vs_open:.2}%\n\
         - 最大波动: {max_vs_open:.2}%\n\
         \n\
         请注意风险！",
        emoji = direction.emoji(),
        name = snapshot.name,
        code = snapshot.code,
        current = snapshot.current,
        label = direction.label(),
        change = ctx.change_vs_prev_close.abs(),
        amount = snapshot.change_amount,
        open = snapshot.open,
        high = snapshot.high,
        low = snapshot.low,
        captured = captured,
        threshold = ctx.threshold,
        vs_open = ctx.change_vs_open.abs(),
        max_vs_open = ctx.max_change_vs_open,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use stockwatch_core::market::entity::Quote;

    fn snapshot(current: f64) -> Snapshot {
        Snapshot::new(
            "sh000001",
            "上证指数",
            Quote {
                open: 3010.0,
                previous_close: 3000.0,
                current,
                high: 3040.0,
                low: 2950.0,
            },
            Utc.with_ymd_and_hms(2024, 5, 8, 6, 40, 3).unwrap(),
        )
    }

    #[test]
    fn test_direction() {
        assert_eq!(Direction::of(1.0), Direction::Up);
        assert_eq!(Direction::of(-1.0), Direction::Down);
        assert_eq!(Direction::Up.label(), "上涨");
        assert_eq!(Direction::Down.emoji(), "📉");
    }

    #[test]
    fn test_rising_message() {
        let snap = snapshot(3030.0);
        let message = format_alert_message(&AlertContext {
            snapshot: &snap,
            change_vs_prev_close: snap.change_percent,
            change_vs_open: 0.6644,
            max_change_vs_open: 0.9,
            threshold: 0.8,
            offset: FixedOffset::east_opt(8 * 3600).unwrap(),
        });

        assert!(message.starts_with("📈 指数波动警报 📈"));
        assert!(message.contains("指数: 上证指数 (sh000001)"));
        assert!(message.contains("当前点位: 3030.00"));
        assert!(message.contains("涨跌: 上涨 1.00% (+30.00 点)"));
        assert!(message.contains("时间: 14:40:03"));
        assert!(message.contains("阈值: 0.80%"));
        assert!(message.contains("- 当前波动: 0.66%"));
        assert!(message.contains("- 最大波动: 0.90%"));
        assert!(message.ends_with("请注意风险！"));
    }

    #[test]
    fn test_falling_message() {
        let snap = snapshot(2970.0);
        let message = format_alert_message(&AlertContext {
            snapshot: &snap,
            change_vs_prev_close: snap.change_percent,
            change_vs_open: -1.33,
            max_change_vs_open: 1.33,
            threshold: 0.8,
            offset: FixedOffset::east_opt(0).unwrap(),
        });

        assert!(message.starts_with("📉"));
        assert!(message.contains("涨跌: 下跌 1.00% (-30.00 点)"));
        assert!(message.contains("时间: 06:40:03"));
        assert!(message.contains("- 当前波动: 1.33%"));
    }
}
