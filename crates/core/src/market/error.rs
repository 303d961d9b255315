use thiserror::Error;

/// # Summary
/// 行情获取错误枚举，覆盖网络与解析两类失败。
///
/// # Invariants
/// - 必须通过 `thiserror` 派生 `Error` trait。
/// - 属于可恢复错误，不会越过数据源适配层导致轮询中断。
#[derive(Error, Debug)]
pub enum MarketError {
    // 网络层错误，包含超时、连接失败与非成功状态码
    #[error("Network error: {0}")]
    Network(String),
    // 响应格式错误，如缺少 '=' 分隔符或字段不足
    #[error("Parse error: {0}")]
    Parse(String),
    // 数据源没有返回该代码的行情
    #[error("Data not found: {0}")]
    NotFound(String),
}
