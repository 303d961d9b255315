use chrono::{DateTime, Datelike, FixedOffset, NaiveTime, Offset, TimeZone, Timelike, Utc, Weekday};
use stockwatch_core::config::AlertWindowConfig;
use thiserror::Error;

/// # Summary
/// 告警时间窗配置错误。
#[derive(Error, Debug, PartialEq, Eq)]
pub enum WindowError {
    #[error("invalid time '{0}', expected HH:MM")]
    InvalidTime(String),
    #[error("window start {start} is after end {end}")]
    Inverted { start: String, end: String },
    #[error("invalid UTC offset: {0} hours")]
    InvalidOffset(i32),
}

/// # Summary
/// 每周重复的告警推送时间窗，默认周一至周五 14:30-15:00 (UTC+8)。
///
/// # Invariants
/// - 比较精度为分钟，起止两端均包含，15:00:59 仍在窗口内。
/// - `start_minute <= end_minute`，不支持跨午夜窗口。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertWindow {
    weekdays_only: bool,
    // 起始时刻，按一天中的分钟数表示
    start_minute: u32,
    // 结束时刻，按一天中的分钟数表示
    end_minute: u32,
    offset: FixedOffset,
}

impl AlertWindow {
    /// # Summary
    /// 由起止时刻构造时间窗。
    ///
    /// # Returns
    /// 起点晚于终点时返回 `WindowError::Inverted`。
    pub fn new(
        start: NaiveTime,
        end: NaiveTime,
        offset: FixedOffset,
        weekdays_only: bool,
    ) -> Result<Self, WindowError> {
        if start > end {
            return Err(WindowError::Inverted {
                start: start.format("%H:%M").to_string(),
                end: end.format("%H:%M").to_string(),
            });
        }
        Ok(Self {
            weekdays_only,
            start_minute: minute_of_day(start),
            end_minute: minute_of_day(end),
            offset,
        })
    }

    /// # Summary
    /// 由配置段构造时间窗。
    ///
    /// # Logic
    /// 1. 以 `%H:%M` 解析起止时刻。
    /// 2. 将小时偏移转换为固定时区。
    /// 3. 校验起止顺序。
    pub fn from_config(config: &AlertWindowConfig) -> Result<Self, WindowError> {
        let start = parse_time(&config.start)?;
        let end = parse_time(&config.end)?;
        let offset = config
            .utc_offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or(WindowError::InvalidOffset(config.utc_offset_hours))?;
        Self::new(start, end, offset, config.weekdays_only)
    }

    /// 判断给定时刻是否落在时间窗内
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        let local = at.with_timezone(&self.offset);
        if self.weekdays_only && matches!(local.weekday(), Weekday::Sat | Weekday::Sun) {
            return false;
        }
        let minute = local.hour() * 60 + local.minute();
        minute >= self.start_minute && minute <= self.end_minute
    }

    /// 时间窗所在时区，告警消息中的时间按此时区展示
    pub fn offset(&self) -> FixedOffset {
        self.offset
    }
}

impl Default for AlertWindow {
    fn default() -> Self {
        Self {
            weekdays_only: true,
            start_minute: 14 * 60 + 30,
            end_minute: 15 * 60,
            offset: FixedOffset::east_opt(8 * 3600).unwrap_or_else(|| Utc.fix()),
        }
    }
}

fn parse_time(text: &str) -> Result<NaiveTime, WindowError> {
    NaiveTime::parse_from_str(text.trim(), "%H:%M")
        .map_err(|_| WindowError::InvalidTime(text.to_string()))
}

fn minute_of_day(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}
