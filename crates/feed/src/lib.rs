//! # `stockwatch-feed` - 行情数据源适配层
//!
//! - [`sina::SinaProvider`]: 新浪财经实时行情接口 (主数据源)
//! - [`synthetic::SyntheticProvider`]: 基于时钟生成的模拟行情 (备用数据源)
//! - [`fallback::FallbackProvider`]: 主数据源失败时自动降级，永不失败

pub mod fallback;
pub mod sina;
pub mod synthetic;
