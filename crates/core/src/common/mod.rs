use std::collections::HashMap;

pub mod time;

/// 内置的常见指数代码与中文名称对照
const BUILTIN_NAMES: [(&str, &str); 3] = [
    ("sh000001", "上证指数"),
    ("sz399001", "深证成指"),
    ("sz399006", "创业板指"),
];

/// # Summary
/// 证券代码到展示名称的对照簿。
///
/// # Invariants
/// - 默认包含沪深三大指数的名称。
/// - 配置注入的条目优先于内置条目。
/// - 未登记的代码解析为代码本身。
#[derive(Debug, Clone)]
pub struct SymbolNames {
    names: HashMap<String, String>,
}

impl SymbolNames {
    /// # Summary
    /// 在内置对照表之上叠加外部提供的映射。
    ///
    /// # Arguments
    /// * `overrides`: 来自配置文件的代码与名称映射。
    ///
    /// # Returns
    /// 合并后的对照簿。
    pub fn with_overrides(overrides: &HashMap<String, String>) -> Self {
        let mut book = Self::default();
        for (code, name) in overrides {
            book.names.insert(code.clone(), name.clone());
        }
        book
    }

    /// 查找已登记的名称
    pub fn get(&self, code: &str) -> Option<&str> {
        self.names.get(code).map(String::as_str)
    }

    /// 解析展示名称，未登记时回退为代码本身
    pub fn resolve(&self, code: &str) -> String {
        self.get(code).unwrap_or(code).to_string()
    }
}

impl Default for SymbolNames {
    fn default() -> Self {
        Self {
            names: BUILTIN_NAMES
                .iter()
                .map(|(code, name)| ((*code).to_string(), (*name).to_string()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_names() {
        let book = SymbolNames::default();
        assert_eq!(book.resolve("sh000001"), "上证指数");
        assert_eq!(book.resolve("sz399006"), "创业板指");
        assert_eq!(book.resolve("sh000300"), "sh000300");
    }

    #[test]
    fn test_overrides_take_precedence() {
        let mut overrides = HashMap::new();
        overrides.insert("sh000001".to_string(), "SSE Composite".to_string());
        overrides.insert("sh000300".to_string(), "沪深300".to_string());

        let book = SymbolNames::with_overrides(&overrides);
        assert_eq!(book.resolve("sh000001"), "SSE Composite");
        assert_eq!(book.resolve("sh000300"), "沪深300");
        assert_eq!(book.resolve("sz399001"), "深证成指");
    }
}
