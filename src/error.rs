//! src/error.rs
//!
//! 全局错误类型定义。解析/评分/优化本身不会失败，错误只来自状态操作与配置加载。

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SentinelError {
    #[error("找不到物品：{0}")]
    ItemNotFound(String),
    #[error("物品 {id} 不能作为{role}使用")]
    WrongItemRole { id: String, role: &'static str },
    #[error("内置方案不可修改：{0}")]
    BuiltinStrategy(String),
    #[error("找不到自定义方案：{0}")]
    StrategyNotFound(String),
    #[error("方案导入失败：{0}")]
    StrategyImport(String),

    #[error("JSON解析失败：{0}")]
    Json(#[from] serde_json::Error),
    #[error("IO操作失败：{0}")]
    Io(#[from] std::io::Error),
}

pub type SentinelResult<T> = Result<T, SentinelError>;
