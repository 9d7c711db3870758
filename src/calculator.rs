//! src/calculator.rs
//!
//! 包含程序最核心的评分逻辑。
//! 单件评分 = 阶级加成 + 标签加权的数值属性 + 词缀命中 + 腐化加成；
//! 组合评分在单件评分之和上叠加三个相互独立的乘数（协同、忠诚、混搭）。

use crate::catalog::{self, StrategyCatalog};
use crate::models::{ItemType, ModDefinition, ParsedItem, StatKind, Strategy};
use crate::utils;
use std::collections::BTreeSet;

const HIGH_TIER: u32 = 15;
const HIGH_TIER_BONUS: f64 = 100.0;
const MID_TIER: u32 = 10;
const MID_TIER_BONUS: f64 = 50.0;
const CORRUPTION_BONUS: f64 = 20.0;

/// 标签权重超过此值即视为"高优先级"。
const HIGH_PRIORITY_WEIGHT: f64 = 1.5;

/// 每种数值属性的 (所属标签, 基础系数)。
fn stat_coefficient(kind: StatKind) -> (&'static str, f64) {
    match kind {
        StatKind::ItemQuantity => ("efficiency", 5.0),
        StatKind::PackSize => ("efficiency", 8.0),
        StatKind::ItemRarity => ("rarity", 5.0),
        StatKind::Gold => ("gold", 3.0),
        StatKind::Delirium => ("delirium", 6.0),
        StatKind::ExpGain => ("xp", 10.0),
        StatKind::MagicMonsters => ("xp", 5.0),
        StatKind::RareMonsters => ("xp", 8.0),
    }
}

/// 顶层函数：按方案 id 计算单件物品分数。
pub fn score_item(item: &ParsedItem, strategy_id: &str, strategies: &StrategyCatalog) -> i64 {
    score_item_with(item, strategies.resolve_strategy(strategy_id))
}

/// 按方案 id 计算组合分数（1 主物品 + 3 伴随物品）。
pub fn score_set(
    primary: &ParsedItem,
    companions: &[&ParsedItem; 3],
    strategy_id: &str,
    strategies: &StrategyCatalog,
) -> i64 {
    score_set_with(primary, companions, strategies.resolve_strategy(strategy_id))
}

pub fn score_item_with(item: &ParsedItem, strategy: &Strategy) -> i64 {
    if item.item_type == ItemType::Unknown {
        return 0;
    }

    let mut score = 0.0;

    if item.item_type == ItemType::Waystone {
        if item.tier >= HIGH_TIER {
            score += HIGH_TIER_BONUS;
        } else if item.tier >= MID_TIER {
            score += MID_TIER_BONUS;
        }
    }

    for kind in StatKind::ALL {
        let (tag, coefficient) = stat_coefficient(kind);
        score += item.stats.get(kind) as f64 * coefficient * strategy.tag_weight(tag);
    }

    for m in detect_mods(&item.original_text) {
        score += m.base_value * m.tags.iter().map(|t| strategy.tag_weight(t)).product::<f64>();
    }

    if item.corrupted {
        score += CORRUPTION_BONUS;
    }

    score.floor() as i64
}

pub fn score_set_with(primary: &ParsedItem, companions: &[&ParsedItem; 3], strategy: &Strategy) -> i64 {
    let base: i64 = score_item_with(primary, strategy)
        + companions.iter().map(|c| score_item_with(c, strategy)).sum::<i64>();

    let mut multiplier = 1.0;

    // --- 1. 标签协同：主物品的每个标签若也出现在伴随物品上，乘一次 ---
    let primary_tags = item_tags(primary);
    let companion_tags: BTreeSet<&str> = companions.iter().flat_map(|c| item_tags(c)).collect();
    for tag in &primary_tags {
        if companion_tags.contains(tag) {
            multiplier *= strategy.synergy_multiplier;
        }
    }

    // --- 2. 家族忠诚：伴随物品只属于一个家族，且该家族是高优先级 ---
    let families: BTreeSet<&str> = companions
        .iter()
        .map(|c| league_family(c))
        .filter(|f| *f != catalog::OTHER_FAMILY)
        .collect();

    if families.len() == 1 {
        if let Some(family) = families.iter().next() {
            if strategy.listed_weight(family) > HIGH_PRIORITY_WEIGHT {
                multiplier *= strategy.league_loyalty;
            }
        }
    }

    // --- 3. 混搭精通：伴随物品覆盖至少两个高优先级家族 ---
    let high_priority: Vec<&str> = high_priority_families(strategy);
    if high_priority.len() >= 2 {
        let present = high_priority.iter().filter(|f| families.contains(**f)).count();
        if present >= 2 && families.len() >= 2 {
            multiplier *= strategy.mix_mastery;
        }
    }

    (base as f64 * multiplier).floor() as i64
}

/// 方案中权重 > 1.5 的标签，排除两个通用标签。
pub fn high_priority_families(strategy: &Strategy) -> Vec<&str> {
    strategy
        .tag_weights
        .iter()
        .filter(|(tag, weight)| **weight > HIGH_PRIORITY_WEIGHT && !catalog::GENERIC_TAGS.contains(&tag.as_str()))
        .map(|(tag, _)| tag.as_str())
        .collect()
}

/// 原始文本中出现的所有目录词缀（不区分大小写的子串匹配）。
pub fn detect_mods(text: &str) -> Vec<&'static ModDefinition> {
    let lower = text.to_lowercase();
    catalog::mod_catalog()
        .iter()
        .filter(|m| utils::contains_ignore_case(&lower, m.text))
        .collect()
}

/// 物品命中词缀的标签并集。
pub fn item_tags(item: &ParsedItem) -> BTreeSet<&'static str> {
    detect_mods(&item.original_text)
        .into_iter()
        .flat_map(|m| m.tags.iter().copied())
        .collect()
}

/// 从名称推断主题家族；无法识别时为 "Other"。
pub fn league_family(item: &ParsedItem) -> &'static str {
    let lower = item.name.to_lowercase();
    let (keyword, family) = catalog::EFFICIENCY_KEYWORD;
    if lower.contains(keyword) {
        return family;
    }
    catalog::FAMILY_KEYWORDS
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, family)| *family)
        .unwrap_or(catalog::OTHER_FAMILY)
}

/// 物品上命中、且被方案列为目标的词缀，仅用于高亮，不参与评分。
pub fn target_mod_hits(item: &ParsedItem, strategy: &Strategy) -> Vec<&'static ModDefinition> {
    detect_mods(&item.original_text)
        .into_iter()
        .filter(|m| strategy.target_mod_ids.iter().any(|id| id == m.id))
        .collect()
}
