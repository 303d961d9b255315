use thiserror::Error;

/// # Summary
/// 通知服务错误枚举。
///
/// # Invariants
/// - 必须通过 `thiserror` 派生 `Error` trait。
#[derive(Error, Debug)]
pub enum NotifyError {
    /// 网络连接或传输错误
    #[error("Network error: {0}")]
    Network(String),

    /// 推送平台返回非 2xx 状态码
    #[error("HTTP status {status}: {body}")]
    Http { status: u16, body: String },

    /// 传输成功但平台返回非零错误码
    #[error("Platform error {code}: {message}")]
    Platform { code: i64, message: String },

    /// 配置错误 (如缺少 webhook 地址) 或响应无法解析
    #[error("Configuration error: {0}")]
    Config(String),
}
