//! src/models.rs
//!
//! 定义了程序中所有核心的数据结构。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// 物品类别。Unknown 在进入评分/优化之前就会被解析器拒绝。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemType {
    Waystone,
    Tablet,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Rarity {
    #[default]
    Normal,
    Magic,
    Rare,
    Unique,
}

impl Rarity {
    pub const ALL: [Rarity; 4] = [Rarity::Normal, Rarity::Magic, Rarity::Rare, Rarity::Unique];

    pub fn label(&self) -> &'static str {
        match self {
            Rarity::Normal => "Normal",
            Rarity::Magic => "Magic",
            Rarity::Rare => "Rare",
            Rarity::Unique => "Unique",
        }
    }
}

/// 物品上可解析的 8 种数值属性。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatKind {
    ItemQuantity,
    ItemRarity,
    PackSize,
    Gold,
    Delirium,
    MagicMonsters,
    RareMonsters,
    ExpGain,
}

impl StatKind {
    pub const ALL: [StatKind; 8] = [
        StatKind::ItemQuantity,
        StatKind::ItemRarity,
        StatKind::PackSize,
        StatKind::Gold,
        StatKind::Delirium,
        StatKind::MagicMonsters,
        StatKind::RareMonsters,
        StatKind::ExpGain,
    ];
}

/// 固定的数值属性记录，缺失的属性一律为 0。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemStats {
    pub item_quantity: u32,
    pub item_rarity: u32,
    pub pack_size: u32,
    pub gold: u32,
    pub delirium: u32,
    pub magic_monsters: u32,
    pub rare_monsters: u32,
    pub exp_gain: u32,
}

impl ItemStats {
    pub fn get(&self, kind: StatKind) -> u32 {
        match kind {
            StatKind::ItemQuantity => self.item_quantity,
            StatKind::ItemRarity => self.item_rarity,
            StatKind::PackSize => self.pack_size,
            StatKind::Gold => self.gold,
            StatKind::Delirium => self.delirium,
            StatKind::MagicMonsters => self.magic_monsters,
            StatKind::RareMonsters => self.rare_monsters,
            StatKind::ExpGain => self.exp_gain,
        }
    }

    pub fn set(&mut self, kind: StatKind, value: u32) {
        let slot = match kind {
            StatKind::ItemQuantity => &mut self.item_quantity,
            StatKind::ItemRarity => &mut self.item_rarity,
            StatKind::PackSize => &mut self.pack_size,
            StatKind::Gold => &mut self.gold,
            StatKind::Delirium => &mut self.delirium,
            StatKind::MagicMonsters => &mut self.magic_monsters,
            StatKind::RareMonsters => &mut self.rare_monsters,
            StatKind::ExpGain => &mut self.exp_gain,
        };
        *slot = value;
    }
}

/// 从一次剪贴板快照中解析出的真实物品。
///
/// `tier` 只对 Waystone 有意义（0 = 未设置）；`uses` 与 `sub_type` 只对 Tablet 有意义。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedItem {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub sub_type: Option<String>,
    pub tier: u32,
    pub uses: u32,
    pub rarity: Rarity,
    pub corrupted: bool,
    pub stats: ItemStats,
    pub original_text: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModCategory {
    Prefix,
    Suffix,
    League,
    Special,
}

/// 词缀适用的物品类别。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ModTarget {
    Waystone,
    Tablet,
    Both,
}

/// 词缀目录中的一条静态记录。`text` 以不区分大小写的子串方式匹配原始文本。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModDefinition {
    pub id: &'static str,
    pub text: &'static str,
    pub category: ModCategory,
    #[serde(rename = "type")]
    pub applies_to: ModTarget,
    pub tags: &'static [&'static str],
    pub base_value: f64,
}

fn default_synergy_multiplier() -> f64 { 1.2 }
fn default_league_loyalty() -> f64 { 1.5 }
fn default_mix_mastery() -> f64 { 1.5 }

/// 一个命名的评分方案：标签权重 + 三个乘数。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Strategy {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub color: String,
    pub tag_weights: BTreeMap<String, f64>,
    #[serde(default = "default_synergy_multiplier")]
    pub synergy_multiplier: f64,
    #[serde(default = "default_league_loyalty")]
    pub league_loyalty: f64,
    #[serde(default = "default_mix_mastery")]
    pub mix_mastery: f64,
    #[serde(default)]
    pub target_mod_ids: Vec<String>,
    /// 旧版权重模型使用的关键词缀，只保留用于展示。
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub crucial_mods: Vec<String>,
}

impl Strategy {
    /// 未列出的标签权重为 1.0。
    pub fn tag_weight(&self, tag: &str) -> f64 {
        self.tag_weights.get(tag).copied().unwrap_or(1.0)
    }

    /// 显式列出的权重；未列出时为 0，用于判断"高优先级"。
    pub fn listed_weight(&self, tag: &str) -> f64 {
        self.tag_weights.get(tag).copied().unwrap_or(0.0)
    }
}

/// 对自定义方案的部分更新，`None` 字段保持原值。
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StrategyPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub tag_weights: Option<BTreeMap<String, f64>>,
    pub synergy_multiplier: Option<f64>,
    pub league_loyalty: Option<f64>,
    pub mix_mastery: Option<f64>,
    pub target_mod_ids: Option<Vec<String>>,
}

/// 一个候选组合：1 个主物品 + 恰好 3 个伴随物品。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizedSet<'a> {
    pub primary: &'a ParsedItem,
    pub companions: [&'a ParsedItem; 3],
    pub total_score: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsedItemRef {
    pub id: String,
    pub name: String,
}

/// 一次组合执行的历史记录。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageEntry {
    pub id: String,
    pub primary_name: String,
    pub companions: Vec<UsedItemRef>,
    pub timestamp: DateTime<Utc>,
    pub score: i64,
    pub strategy: String,
}

fn default_snapshot_dir() -> String { "snapshots".to_string() }
fn default_custom_strategies_path() -> String { "data/CustomStrategies.json".to_string() }
fn default_top_items() -> usize { 10 }

/// 代表从 config.json 加载的原始用户输入。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UserConfigRaw {
    #[serde(default)]
    pub active_strategy: Option<String>,
    #[serde(default = "default_snapshot_dir")]
    pub snapshot_dir: String,
    #[serde(default = "default_custom_strategies_path")]
    pub custom_strategies_path: String,
    #[serde(default = "default_top_items")]
    pub top_items: usize,
}

/// 解析后，供程序内部使用的最终配置。
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub active_strategy: String,
    pub snapshot_dir: PathBuf,
    pub top_items: usize,
}
