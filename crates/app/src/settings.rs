use std::collections::HashMap;
use std::path::{Path, PathBuf};
use stockwatch_core::config::AppConfig;
use stockwatch_monitor::monitor::MonitorSettings;
use thiserror::Error;

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";
/// 指定配置文件路径的环境变量
pub const CONFIG_PATH_ENV: &str = "STOCKWATCH_CONFIG";
/// 环境变量覆盖项的前缀，例如 `STOCKWATCH__STOCK__THRESHOLD=1.2`
const ENV_PREFIX: &str = "STOCKWATCH";
const ENV_SEPARATOR: &str = "__";

/// 首次运行时写出的配置模板
pub const TEMPLATE: &str = r#"# 股票指数监视器配置文件

# 指数配置
stock:
  code: "sh000001"        # 指数代码
  name: "上证指数"        # 展示名称，留空时按代码查表
  threshold: 0.8          # 波动阈值 (百分比)，0.8 表示 0.8%

# 企业微信机器人配置
wechat:
  webhook_url: ""         # 请填写企业微信机器人的 webhook URL
  startup_ping: false     # 启动时发送一条连通性测试消息

# 监视器配置
monitor:
  interval: 30s           # 检查间隔，例如 500ms、30s、5m、1h 30m
  cooldown: 5m            # 告警冷却时间
  escalation_step: 0.2    # 冷却期内再次告警所需的幅度增量 (百分点)
  alert_window:
    weekdays_only: true
    start: "14:30"
    end: "15:00"
    utc_offset_hours: 8

# 额外的代码与名称对照
names: {}

# 日志配置
log:
  level: info
  # dir: logs             # 设置后按天滚动写入该目录
"#;

/// # Summary
/// 配置加载错误。
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
    #[error(
        "Configuration file not found, a template was written to {0}; fill in wechat.webhook_url and restart"
    )]
    TemplateCreated(PathBuf),
}

/// 解析配置文件路径：环境变量优先，否则使用默认路径
pub fn config_path() -> PathBuf {
    std::env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// # Summary
/// 加载并校验应用配置，进程环境变量参与覆盖。
pub fn load(path: &Path) -> Result<AppConfig, ConfigError> {
    load_with_env(path, None)
}

/// # Summary
/// 加载并校验应用配置。
///
/// # Logic
/// 1. 文件不存在时写出模板并返回 `TemplateCreated`。
/// 2. 以 YAML 文件为底，叠加 `STOCKWATCH__` 前缀的环境变量。
/// 3. 反序列化为 `AppConfig` 并校验。
///
/// # Arguments
/// * `path`: 配置文件路径。
/// * `env`: 替代进程环境变量的键值表，`None` 时读取真实环境。
///
/// # Returns
/// 校验通过的配置。
pub fn load_with_env(
    path: &Path,
    env: Option<HashMap<String, String>>,
) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        write_template(path)?;
        return Err(ConfigError::TemplateCreated(path.to_path_buf()));
    }

    let settings = config::Config::builder()
        .add_source(config::File::from(path).format(config::FileFormat::Yaml))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator(ENV_SEPARATOR)
                .separator(ENV_SEPARATOR)
                .try_parsing(true)
                .source(env),
        )
        .build()?;

    let app_config: AppConfig = settings.try_deserialize()?;
    validate(&app_config)?;
    Ok(app_config)
}

/// # Summary
/// 校验配置的业务约束。
///
/// # Logic
/// 1. webhook 地址不能为空。
/// 2. 监控参数 (代码、阈值、间隔、时间窗、步长) 交由 `MonitorSettings` 校验。
pub fn validate(config: &AppConfig) -> Result<(), ConfigError> {
    if config.wechat.webhook_url.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "wechat.webhook_url must not be empty, configure the WeCom robot first".to_string(),
        ));
    }
    MonitorSettings::from_config(config).map_err(|e| ConfigError::Invalid(e.to_string()))?;
    Ok(())
}

fn write_template(path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(path, TEMPLATE)?;
    Ok(())
}
