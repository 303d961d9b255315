use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// 默认波动阈值 (百分比)
pub const DEFAULT_THRESHOLD: f64 = 0.8;
/// 默认轮询间隔
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);
/// 默认告警冷却时间
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(5 * 60);
/// 冷却期内再次告警所需的最小幅度增量 (百分点)
pub const DEFAULT_ESCALATION_STEP: f64 = 0.2;

/// 全局应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub stock: StockConfig,
    #[serde(default)]
    pub wechat: WeChatConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
    /// 额外的代码与名称映射，覆盖内置对照表
    #[serde(default)]
    pub names: HashMap<String, String>,
    #[serde(default)]
    pub log: LogConfig,
}

/// 被监控指数的配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockConfig {
    // 指数代码，例如 sh000001
    #[serde(default)]
    pub code: String,
    // 展示名称，缺省时按代码查表
    #[serde(default)]
    pub name: Option<String>,
    // 波动阈值 (百分比)，0.8 表示 0.8%
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

/// 企业微信机器人配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeChatConfig {
    #[serde(default)]
    pub webhook_url: String,
    /// 启动时是否发送一条连通性测试消息
    #[serde(default)]
    pub startup_ping: bool,
}

/// 监控循环配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    #[serde(default = "default_interval", with = "duration_str")]
    pub interval: Duration,
    #[serde(default = "default_cooldown", with = "duration_str")]
    pub cooldown: Duration,
    #[serde(default = "default_escalation_step")]
    pub escalation_step: f64,
    #[serde(default)]
    pub alert_window: AlertWindowConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            cooldown: DEFAULT_COOLDOWN,
            escalation_step: DEFAULT_ESCALATION_STEP,
            alert_window: AlertWindowConfig::default(),
        }
    }
}

/// # Summary
/// 告警推送时间窗配置。
///
/// # Invariants
/// - `start` 与 `end` 使用 `HH:MM` 格式，区间两端均包含。
/// - 时间按 `utc_offset_hours` 指定的固定时区解释。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertWindowConfig {
    #[serde(default = "default_true")]
    pub weekdays_only: bool,
    #[serde(default = "default_window_start")]
    pub start: String,
    #[serde(default = "default_window_end")]
    pub end: String,
    #[serde(default = "default_utc_offset")]
    pub utc_offset_hours: i32,
}

impl Default for AlertWindowConfig {
    fn default() -> Self {
        Self {
            weekdays_only: true,
            start: default_window_start(),
            end: default_window_end(),
            utc_offset_hours: default_utc_offset(),
        }
    }
}

/// 日志输出配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// 设置后按天滚动写入该目录，否则输出到标准输出
    #[serde(default)]
    pub dir: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: None,
        }
    }
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

fn default_interval() -> Duration {
    DEFAULT_INTERVAL
}

fn default_cooldown() -> Duration {
    DEFAULT_COOLDOWN
}

fn default_escalation_step() -> f64 {
    DEFAULT_ESCALATION_STEP
}

fn default_true() -> bool {
    true
}

fn default_window_start() -> String {
    "14:30".to_string()
}

fn default_window_end() -> String {
    "15:00".to_string()
}

fn default_utc_offset() -> i32 {
    8
}

fn default_log_level() -> String {
    "info".to_string()
}

/// # Summary
/// 人类可读时长的 serde 适配，文本交给 `humantime` 解析 (`500ms`、`30s`、`1h 30m` 等)，
/// 纯整数表示秒数。
pub mod duration_str {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawDuration {
        Seconds(u64),
        Text(String),
    }

    /// 解析时长文本，纯数字按秒处理 (环境变量覆盖时数值以文本形式到达)
    pub fn parse(input: &str) -> Result<Duration, humantime::DurationError> {
        let text = input.trim();
        match text.parse::<u64>() {
            Ok(secs) => Ok(Duration::from_secs(secs)),
            Err(_) => humantime::parse_duration(text),
        }
    }

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        match RawDuration::deserialize(deserializer)? {
            RawDuration::Seconds(secs) => Ok(Duration::from_secs(secs)),
            RawDuration::Text(text) => parse(&text).map_err(serde::de::Error::custom),
        }
    }
}
