use crate::alert::{AlertContext, format_alert_message};
use crate::policy::{DedupPolicy, is_significant};
use crate::state::{MonitorState, MonitorStats, Observation};
use crate::window::AlertWindow;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;
use stockwatch_core::common::time::TimeProvider;
use stockwatch_core::config::AppConfig;
use stockwatch_core::market::entity::Snapshot;
use stockwatch_core::market::port::SnapshotProvider;
use stockwatch_core::notify::port::Notifier;
use thiserror::Error;
use tokio::sync::{Mutex, Notify};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// # Summary
/// 监控器层的统一错误类型。
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Monitor is already running")]
    AlreadyRunning,
    #[error("Monitor has been stopped")]
    Stopped,
    #[error("Invalid monitor settings: {0}")]
    InvalidSettings(String),
}

/// # Summary
/// 监控器生命周期：`Idle -> Running -> Stopped`，`Stopped` 为终态。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Idle,
    Running,
    Stopped,
}

const IDLE: u8 = 0;
const RUNNING: u8 = 1;
const STOPPED: u8 = 2;

impl Lifecycle {
    fn from_raw(raw: u8) -> Self {
        match raw {
            IDLE => Lifecycle::Idle,
            RUNNING => Lifecycle::Running,
            _ => Lifecycle::Stopped,
        }
    }
}

/// # Summary
/// 单次轮询的处理结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// 行情获取失败，本轮跳过且状态不变
    FetchFailed,
    /// 首个快照，仅建立基准
    Baseline,
    /// 涨跌幅未达阈值
    Quiet,
    /// 达到阈值但被拦截
    Suppressed(SuppressReason),
    /// 告警已送达
    Delivered,
    /// 告警发送失败，去重基准不前移
    SendFailed,
}

/// 候选告警被拦截的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppressReason {
    OutsideWindow,
    Duplicate,
}

/// # Summary
/// 监控器运行参数。
///
/// # Invariants
/// - `threshold > 0`。
/// - `interval` 非零。
#[derive(Debug, Clone)]
pub struct MonitorSettings {
    pub code: String,
    pub threshold: f64,
    pub interval: Duration,
    pub window: AlertWindow,
    pub dedup: DedupPolicy,
}

impl MonitorSettings {
    /// # Summary
    /// 从应用配置中提取并校验监控参数。
    ///
    /// # Logic
    /// 1. 校验代码非空、阈值为正、间隔非零、步长非负。
    /// 2. 解析告警时间窗。
    /// 3. 转换冷却时长。
    ///
    /// # Returns
    /// 任一校验失败返回 `MonitorError::InvalidSettings`。
    pub fn from_config(config: &AppConfig) -> Result<Self, MonitorError> {
        let code = config.stock.code.trim();
        if code.is_empty() {
            return Err(MonitorError::InvalidSettings(
                "stock code must not be empty".to_string(),
            ));
        }

        let threshold = config.stock.threshold;
        if threshold.is_nan() || threshold <= 0.0 {
            return Err(MonitorError::InvalidSettings(format!(
                "threshold must be greater than 0, got {}",
                threshold
            )));
        }

        if config.monitor.interval.is_zero() {
            return Err(MonitorError::InvalidSettings(
                "interval must be greater than 0".to_string(),
            ));
        }

        let step = config.monitor.escalation_step;
        if step.is_nan() || step < 0.0 {
            return Err(MonitorError::InvalidSettings(format!(
                "escalation_step must not be negative, got {}",
                step
            )));
        }

        let window = AlertWindow::from_config(&config.monitor.alert_window)
            .map_err(|e| MonitorError::InvalidSettings(e.to_string()))?;
        let cooldown = chrono::Duration::from_std(config.monitor.cooldown)
            .map_err(|e| MonitorError::InvalidSettings(format!("cooldown: {}", e)))?;

        Ok(Self {
            code: code.to_string(),
            threshold,
            interval: config.monitor.interval,
            window,
            dedup: DedupPolicy {
                cooldown,
                escalation_step: step,
            },
        })
    }
}

/// # Summary
/// 单指数波动监控器。
///
/// # Invariants
/// - 所有状态读写都在持有 `state` 锁时进行，一轮处理期间锁不释放。
/// - 轮询在单个后台任务中串行执行，相邻两轮不会重叠。
/// - `stop` 可以重复调用，只有第一次生效。
pub struct StockMonitor {
    settings: MonitorSettings,
    // 行情数据源
    provider: Arc<dyn SnapshotProvider>,
    // 告警推送渠道
    notifier: Arc<dyn Notifier>,
    // 告警时间窗使用的墙上时钟
    clock: Arc<dyn TimeProvider>,
    state: Mutex<MonitorState>,
    lifecycle: AtomicU8,
    // 停止信号，`notify_one` 会在无人等待时保留许可
    shutdown: Notify,
}

impl StockMonitor {
    /// # Summary
    /// 创建处于 `Idle` 状态的监控器。
    ///
    /// # Arguments
    /// * `settings`: 已校验的运行参数。
    /// * `provider`: 行情数据源。
    /// * `notifier`: 告警推送渠道。
    /// * `clock`: 时间供给器。
    ///
    /// # Returns
    /// 可共享的监控器实例。
    pub fn new(
        settings: MonitorSettings,
        provider: Arc<dyn SnapshotProvider>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn TimeProvider>,
    ) -> Arc<Self> {
        Arc::new(Self {
            settings,
            provider,
            notifier,
            clock,
            state: Mutex::new(MonitorState::new()),
            lifecycle: AtomicU8::new(IDLE),
            shutdown: Notify::new(),
        })
    }

    pub fn lifecycle(&self) -> Lifecycle {
        Lifecycle::from_raw(self.lifecycle.load(Ordering::SeqCst))
    }

    /// # Summary
    /// 启动后台轮询任务。
    ///
    /// # Logic
    /// 1. 以 CAS 将状态从 `Idle` 切换为 `Running`。
    /// 2. spawn 轮询循环：立即执行一次，之后按固定间隔执行。
    ///
    /// # Returns
    /// 成功返回后台任务句柄；已在运行返回 `AlreadyRunning`，已停止返回 `Stopped`。
    pub fn start(self: &Arc<Self>) -> Result<JoinHandle<()>, MonitorError> {
        self.lifecycle
            .compare_exchange(IDLE, RUNNING, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|current| match Lifecycle::from_raw(current) {
                Lifecycle::Running => MonitorError::AlreadyRunning,
                _ => MonitorError::Stopped,
            })?;

        let monitor = Arc::clone(self);
        Ok(tokio::spawn(async move { monitor.run().await }))
    }

    /// # Summary
    /// 请求停止监控。
    ///
    /// # Logic
    /// 1. 原子地将状态置为 `Stopped`。
    /// 2. 仅当本次调用完成了状态切换时才发出停止信号。
    ///
    /// # Returns
    /// 本次调用是否生效；重复调用返回 `false` 且没有任何副作用。
    pub fn stop(&self) -> bool {
        let previous = self.lifecycle.swap(STOPPED, Ordering::SeqCst);
        if previous == STOPPED {
            return false;
        }
        self.shutdown.notify_one();
        info!("Stop requested for {}", self.settings.code);
        true
    }

    fn is_stopped(&self) -> bool {
        self.lifecycle.load(Ordering::SeqCst) == STOPPED
    }

    /// 轮询主循环，每个周期边界检查一次停止信号
    async fn run(&self) {
        info!(
            "Monitor for {} started (threshold {:.2}%, interval {:?})",
            self.settings.code, self.settings.threshold, self.settings.interval
        );

        let mut ticker = tokio::time::interval(self.settings.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.notified() => break,
                _ = ticker.tick() => {}
            }
            if self.is_stopped() {
                break;
            }
            self.tick().await;
        }

        info!("Monitor for {} stopped", self.settings.code);
    }

    /// # Summary
    /// 执行一轮完整的 获取 -> 比较 -> 告警 流程。
    ///
    /// # Logic
    /// 1. 获取快照，失败则记录日志并跳过，不改变任何状态。
    /// 2. 首个快照只建立基准。
    /// 3. 计算相对昨收与相对开盘的涨跌幅并更新统计。
    /// 4. 相对昨收涨跌幅达到阈值时进入告警闸门。
    /// 5. 无论是否告警，都以新快照替换当前快照。
    ///
    /// # Returns
    /// 本轮处理结果。
    pub async fn tick(&self) -> TickOutcome {
        let snapshot = match self.provider.fetch(&self.settings.code).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Failed to fetch snapshot for {}: {}", self.settings.code, e);
                return TickOutcome::FetchFailed;
            }
        };

        let mut state = self.state.lock().await;

        let (change_vs_prev_close, change_vs_open) = match state.observe(&snapshot) {
            Observation::Baseline => {
                info!(
                    "Initial snapshot: {} current {:.2} open {:.2}",
                    snapshot.name, snapshot.current, snapshot.open
                );
                return TickOutcome::Baseline;
            }
            Observation::Compared {
                change_vs_prev_close,
                change_vs_open,
            } => (change_vs_prev_close, change_vs_open),
        };

        info!(
            "{}: current {:.2} prev close {:.2} open {:.2} change {:.2}% (vs prev close) {:.2}% (vs open)",
            snapshot.name,
            snapshot.current,
            snapshot.previous_close,
            snapshot.open,
            change_vs_prev_close,
            change_vs_open
        );

        let outcome = if is_significant(change_vs_prev_close, self.settings.threshold) {
            self.dispatch_alert(&mut state, &snapshot, change_vs_prev_close, change_vs_open)
                .await
        } else {
            TickOutcome::Quiet
        };

        state.advance(snapshot);
        outcome
    }

    /// # Summary
    /// 对候选告警依次应用时间窗与去重闸门，通过后发送。
    ///
    /// # Logic
    /// 1. 当前墙上时间不在时间窗内则静默丢弃。
    /// 2. 冷却期内幅度增量不足则丢弃。
    /// 3. 发送成功后更新去重基准，失败则保持原基准以便下一轮重试。
    async fn dispatch_alert(
        &self,
        state: &mut MonitorState,
        snapshot: &Snapshot,
        change_vs_prev_close: f64,
        change_vs_open: f64,
    ) -> TickOutcome {
        if !self.settings.window.contains(self.clock.now()) {
            debug!("Alert for {} suppressed: outside alert window", snapshot.code);
            return TickOutcome::Suppressed(SuppressReason::OutsideWindow);
        }

        let magnitude = change_vs_prev_close.abs();
        if !self
            .settings
            .dedup
            .should_send(state.last_alert(), snapshot.captured_at, magnitude)
        {
            debug!(
                "Alert for {} suppressed: {:.2}% is not a significant escalation",
                snapshot.code, magnitude
            );
            return TickOutcome::Suppressed(SuppressReason::Duplicate);
        }

        let message = format_alert_message(&AlertContext {
            snapshot,
            change_vs_prev_close,
            change_vs_open,
            max_change_vs_open: state.max_change(),
            threshold: self.settings.threshold,
            offset: self.settings.window.offset(),
        });

        match self.notifier.send(&message).await {
            Ok(()) => {
                state.record_alert(snapshot.captured_at, magnitude);
                info!(
                    code = %snapshot.code,
                    magnitude = magnitude,
                    "Alert sent"
                );
                TickOutcome::Delivered
            }
            Err(e) => {
                error!(code = %snapshot.code, error = %e, "Failed to send alert");
                TickOutcome::SendFailed
            }
        }
    }

    /// 获取当前状态的只读副本
    pub async fn stats(&self) -> MonitorStats {
        self.state.lock().await.stats()
    }
}
