mod logging;
mod settings;

use std::sync::Arc;

use stockwatch_core::common::SymbolNames;
use stockwatch_core::common::time::{RealTimeProvider, TimeProvider};
use stockwatch_core::config::{AppConfig, LogConfig};
use stockwatch_core::market::port::SnapshotProvider;
use stockwatch_feed::fallback::FallbackProvider;
use stockwatch_feed::sina::SinaProvider;
use stockwatch_feed::synthetic::SyntheticProvider;
use stockwatch_monitor::monitor::{MonitorSettings, StockMonitor};
use stockwatch_notify::wechat::WeChatNotifier;
use tracing::{error, info, warn};

/// # Summary
/// 应用启动入口，纯粹的装配层。
/// 负责实例化数据源、通知器与监控器，并把它们通过 Arc<dyn Trait> 注入 StockMonitor。
///
/// # Logic
/// 1. 安装 TLS 加密后端。
/// 2. 加载配置并初始化日志。
/// 3. 实例化数据源 (Sina 优先，失败时回退到合成行情) 与企业微信通知器。
/// 4. 启动监控器后台任务。
/// 5. 挂起等待退出信号，停止监控器并等待当前轮次结束。
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. reqwest 未启用默认加密后端，需显式安装
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        return Err("failed to install rustls crypto provider".into());
    }

    // 2. 加载配置
    let path = settings::config_path();
    let config = match settings::load(&path) {
        Ok(config) => config,
        Err(e) => {
            let _guard = logging::init(&LogConfig::default())?;
            error!("Failed to load configuration from {}: {}", path.display(), e);
            return Err(e.into());
        }
    };
    let _guard = logging::init(&config.log)?;

    // 3. 实例化基础设施层
    let clock: Arc<dyn TimeProvider> = Arc::new(RealTimeProvider);
    let names = Arc::new(symbol_names(&config));
    let sina = Arc::new(SinaProvider::new(names.clone(), clock.clone())?);
    let provider: Arc<dyn SnapshotProvider> = Arc::new(FallbackProvider::new(
        sina,
        SyntheticProvider::new(names.clone(), clock.clone()),
    ));
    let notifier = Arc::new(WeChatNotifier::new(config.wechat.webhook_url.clone())?);

    if config.wechat.startup_ping {
        match notifier.test_connection().await {
            Ok(()) => info!("WeCom webhook connectivity check passed"),
            Err(e) => warn!("WeCom webhook connectivity check failed: {}", e),
        }
    }

    // 4. 构造并启动监控器
    let monitor_settings = MonitorSettings::from_config(&config)?;
    info!(
        "Stock watcher starting: {} ({}), threshold {:.2}%, interval {:?}",
        names.resolve(&monitor_settings.code),
        monitor_settings.code,
        monitor_settings.threshold,
        monitor_settings.interval
    );
    let monitor = StockMonitor::new(monitor_settings, provider, notifier, clock);
    let handle = monitor.start()?;

    // 5. 等待退出信号
    shutdown_signal().await?;
    info!("Shutdown signal received, stopping monitor...");
    monitor.stop();
    if let Err(e) = handle.await {
        error!("Monitor task ended abnormally: {}", e);
    }
    info!("Stock watcher exited");

    Ok(())
}

/// 内置名称表叠加配置中的 `names`，`stock.name` 优先级最高
fn symbol_names(config: &AppConfig) -> SymbolNames {
    let mut overrides = config.names.clone();
    if let Some(name) = config.stock.name.as_ref().filter(|n| !n.trim().is_empty()) {
        overrides.insert(config.stock.code.trim().to_string(), name.clone());
    }
    SymbolNames::with_overrides(&overrides)
}

/// 等待 Ctrl-C 或 SIGTERM
async fn shutdown_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    let terminate = async {
        let mut signal =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
        signal.recv().await;
        Ok::<(), std::io::Error>(())
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<std::io::Result<()>>();

    tokio::select! {
        result = tokio::signal::ctrl_c() => result,
        result = terminate => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockwatch_core::config::{MonitorConfig, StockConfig, WeChatConfig};

    fn config(name: Option<&str>) -> AppConfig {
        AppConfig {
            stock: StockConfig {
                code: "sz399006".to_string(),
                name: name.map(str::to_string),
                threshold: 0.8,
            },
            wechat: WeChatConfig::default(),
            monitor: MonitorConfig::default(),
            names: [("sh000002".to_string(), "A股指数".to_string())].into(),
            log: LogConfig::default(),
        }
    }

    #[test]
    fn test_symbol_names_layers() {
        let names = symbol_names(&config(None));
        assert_eq!(names.resolve("sz399006"), "创业板指");
        assert_eq!(names.resolve("sh000002"), "A股指数");
        assert_eq!(names.resolve("sh000300"), "sh000300");

        let names = symbol_names(&config(Some("创业板")));
        assert_eq!(names.resolve("sz399006"), "创业板");

        let names = symbol_names(&config(Some("  ")));
        assert_eq!(names.resolve("sz399006"), "创业板指");
    }
}
