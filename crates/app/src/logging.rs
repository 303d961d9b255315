use stockwatch_core::config::LogConfig;
use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const LOG_FILE_PREFIX: &str = "stockwatch.log";

#[derive(Error, Debug)]
pub enum LogError {
    #[error("Invalid log filter '{0}'")]
    Filter(String),
    #[error("Failed to install subscriber: {0}")]
    Init(String),
}

/// # Summary
/// 初始化全局日志订阅器。
///
/// # Logic
/// 1. `RUST_LOG` 存在时优先使用，否则采用配置中的级别。
/// 2. 配置了 `dir` 时写入按天滚动的日志文件，否则输出到标准输出。
///
/// # Returns
/// 文件输出时返回后台写线程的 guard，调用方需持有到进程退出。
pub fn init(config: &LogConfig) -> Result<Option<WorkerGuard>, LogError> {
    let filter = build_filter(&config.level)?;

    match &config.dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .try_init()
                .map_err(|e| LogError::Init(e.to_string()))?;
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .try_init()
                .map_err(|e| LogError::Init(e.to_string()))?;
            Ok(None)
        }
    }
}

fn build_filter(level: &str) -> Result<EnvFilter, LogError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(level).map_err(|_| LogError::Filter(level.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter_accepts_levels_and_directives() {
        assert!(EnvFilter::try_new("info").is_ok());
        assert!(build_filter("debug").is_ok());
        assert!(build_filter("stockwatch_monitor=debug,warn").is_ok());
    }
}
