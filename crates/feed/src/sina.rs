use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use stockwatch_core::common::SymbolNames;
use stockwatch_core::common::time::TimeProvider;
use stockwatch_core::market::entity::{Quote, Snapshot};
use stockwatch_core::market::error::MarketError;
use stockwatch_core::market::port::SnapshotProvider;
use tracing::debug;

/// 新浪实时行情接口前缀，后接指数代码
pub const SINA_QUOTE_URL: &str = "https://hq.sinajs.cn/list=";

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const SINA_REFERER: &str = "https://finance.sina.com.cn/";

/// 最少需要的字段数: 名称, 开盘, 昨收, 当前, 最高, 最低
const MIN_FIELDS: usize = 6;

/// # Summary
/// 新浪财经行情提供者实现。
///
/// # Invariants
/// - 每个请求都携带浏览器 User-Agent 与 Referer，否则上游会拒绝访问。
/// - 请求超时固定为 10 秒。
#[derive(Clone)]
pub struct SinaProvider {
    /// 内部使用的 HTTP 客户端
    client: Client,
    /// 接口前缀，测试时可替换为本地地址
    base_url: String,
    /// 代码与名称对照簿
    names: Arc<SymbolNames>,
    /// 采集时间来源
    clock: Arc<dyn TimeProvider>,
}

impl SinaProvider {
    /// # Summary
    /// 创建一个新的 SinaProvider 实例。
    ///
    /// # Logic
    /// 1. 配置 10 秒超时。
    /// 2. 设置伪装浏览器 Header (User-Agent, Referer)。
    /// 3. 初始化 reqwest 客户端。
    ///
    /// # Arguments
    /// * `names`: 代码与名称对照簿。
    /// * `clock`: 时间供给器，用于标记采集时间。
    ///
    /// # Returns
    /// 成功返回 SinaProvider，客户端构建失败返回 `MarketError::Network`。
    pub fn new(names: Arc<SymbolNames>, clock: Arc<dyn TimeProvider>) -> Result<Self, MarketError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static(BROWSER_USER_AGENT),
        );
        headers.insert(
            reqwest::header::REFERER,
            reqwest::header::HeaderValue::from_static(SINA_REFERER),
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .default_headers(headers)
            .build()
            .map_err(|e| MarketError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: SINA_QUOTE_URL.to_string(),
            names,
            clock,
        })
    }

    /// 替换接口前缀
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl SnapshotProvider for SinaProvider {
    /// # Summary
    /// 从新浪接口抓取实时行情。
    ///
    /// # Logic
    /// 1. 拼接 `list=<code>` 请求地址并发起 GET。
    /// 2. 非成功状态码视为网络错误。
    /// 3. 解析伪 JS 赋值语句中的价位字段。
    /// 4. 组装快照，名称取自对照簿。
    async fn fetch(&self, code: &str) -> Result<Snapshot, MarketError> {
        let url = format!("{}{}", self.base_url, code);

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| MarketError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(MarketError::Network(format!("HTTP {}", resp.status())));
        }

        // 上游为 GBK 编码，只需要其中的数字字段，按有损 UTF-8 处理即可
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| MarketError::Network(e.to_string()))?;
        let body = String::from_utf8_lossy(&bytes);
        debug!("Sina response for {}: {}", code, body.trim());

        let quote = parse_quote(&body)?;
        Ok(Snapshot::new(
            code,
            self.names.resolve(code),
            quote,
            self.clock.now(),
        ))
    }
}

/// # Summary
/// 解析新浪返回的 `var hq_str_xxx="v1,v2,...";` 格式。
///
/// # Logic
/// 1. 取第一个 `=` 之后的部分并去掉引号、分号与空白。
/// 2. 内容为空说明上游没有该代码的行情。
/// 3. 以逗号分割字段，不足 6 个视为解析失败。
/// 4. 位置 1..=5 依次为开盘、昨收、当前、最高、最低。
///
/// # Returns
/// 成功返回 `Quote`；未知代码返回 `MarketError::NotFound`，格式异常返回 `MarketError::Parse`。
pub fn parse_quote(body: &str) -> Result<Quote, MarketError> {
    let (_, payload) = body
        .split_once('=')
        .ok_or_else(|| MarketError::Parse(format!("missing '=' in response: {}", body.trim())))?;

    let payload = payload.trim_matches(|c: char| c == '"' || c == ';' || c.is_whitespace());
    if payload.is_empty() {
        return Err(MarketError::NotFound(body.trim().to_string()));
    }
    let fields: Vec<&str> = payload.split(',').collect();
    if fields.len() < MIN_FIELDS {
        return Err(MarketError::Parse(format!(
            "expected at least {} fields, got {}: {}",
            MIN_FIELDS,
            fields.len(),
            payload
        )));
    }

    Ok(Quote {
        open: parse_number(fields[1]),
        previous_close: parse_number(fields[2]),
        current: parse_number(fields[3]),
        high: parse_number(fields[4]),
        low: parse_number(fields[5]),
    })
}

/// 数值字段容错解析，空串、`-` 或非法数字均记为 0
fn parse_number(token: &str) -> f64 {
    let token = token.trim();
    if token.is_empty() || token == "-" {
        return 0.0;
    }
    token.parse().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "var hq_str_sh000001=\"上证指数,3001.25,2998.10,3030.50,3035.00,2995.75,0,0,324567890,412345678901,2024-05-08,14:40:03,00\";\n";

    #[test]
    fn test_parse_quote_positions() {
        let quote = parse_quote(SAMPLE).unwrap();
        assert_eq!(quote.open, 3001.25);
        assert_eq!(quote.previous_close, 2998.10);
        assert_eq!(quote.current, 3030.50);
        assert_eq!(quote.high, 3035.00);
        assert_eq!(quote.low, 2995.75);
    }

    #[test]
    fn test_parse_quote_missing_separator() {
        let err = parse_quote("Forbidden").unwrap_err();
        assert!(matches!(err, MarketError::Parse(_)));
    }

    #[test]
    fn test_parse_quote_unknown_code() {
        let err = parse_quote("var hq_str_sh999999=\"\";\n").unwrap_err();
        assert!(matches!(err, MarketError::NotFound(_)));
    }

    #[test]
    fn test_parse_quote_too_few_fields() {
        let err = parse_quote("var hq_str_sh000001=\"上证指数,1,2,3,4\";").unwrap_err();
        assert!(matches!(err, MarketError::Parse(_)));
    }

    #[test]
    fn test_parse_quote_tolerates_bad_tokens() {
        let quote = parse_quote("var hq_str_sh000001=\"名称,,-,abc,3035.00,2995.75\";").unwrap();
        assert_eq!(quote.open, 0.0);
        assert_eq!(quote.previous_close, 0.0);
        assert_eq!(quote.current, 0.0);
        assert_eq!(quote.high, 3035.00);
        assert_eq!(quote.low, 2995.75);
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(""), 0.0);
        assert_eq!(parse_number("-"), 0.0);
        assert_eq!(parse_number("n/a"), 0.0);
        assert_eq!(parse_number(" 12.5 "), 12.5);
        assert_eq!(parse_number("-3.2"), -3.2);
    }
}
