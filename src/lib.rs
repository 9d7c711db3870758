//! atlas_sentinel - 物品文本解析、方案评分与 "1 + 3" 组合优化

pub use self::calculator::{score_item, score_set};
pub use self::catalog::{StrategyCatalog, mod_catalog, DEFAULT_STRATEGY_ID};
pub use self::error::{SentinelError, SentinelResult};
pub use self::inventory::Inventory;
pub use self::models::{ItemStats, ItemType, OptimizedSet, ParsedItem, Rarity, Strategy};
pub use self::optimizer::find_best_sets;
pub use self::parser::parse_item;

pub mod calculator;
pub mod catalog;
pub mod config;
pub mod error;
pub mod inventory;
pub mod models;
pub mod optimizer;
pub mod parser;
pub mod utils;
