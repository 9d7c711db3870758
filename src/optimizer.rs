//! src/optimizer.rs
//!
//! 在库存中寻找最佳的 "1 主物品 + 3 伴随物品" 组合。
//! 只在单件分数最高的 10 个伴随物品里穷举 C(10,3)=120 种三元组，这是有意的近似。

use crate::calculator;
use crate::catalog::StrategyCatalog;
use crate::models::{ItemType, OptimizedSet, ParsedItem, Strategy};
use itertools::Itertools;
use std::cmp::Ordering;
use tracing::debug;

/// 参与穷举的伴随物品上限。
pub const COMPANION_POOL_SIZE: usize = 10;

/// 每组固定的伴随物品数量。
pub const COMPANIONS_PER_SET: usize = 3;

/// 最多返回的组合数。
pub const MAX_RESULTS: usize = 5;

/// 顶层函数：返回至多 5 个按总分降序排列的组合。库存不足时返回空列表。
pub fn find_best_sets<'a>(
    items: &'a [ParsedItem],
    strategy_id: &str,
    strategies: &StrategyCatalog,
) -> Vec<OptimizedSet<'a>> {
    let strategy = strategies.resolve_strategy(strategy_id);

    let primaries: Vec<&'a ParsedItem> = items.iter().filter(|i| i.item_type == ItemType::Waystone).collect();
    let companions: Vec<&'a ParsedItem> = items.iter().filter(|i| i.item_type == ItemType::Tablet).collect();

    if primaries.is_empty() || companions.len() < COMPANIONS_PER_SET {
        debug!("库存不足：{} 个主物品，{} 个伴随物品", primaries.len(), companions.len());
        return vec![];
    }

    // --- 1. 单件评分并截取候选池，同分按 id 升序 ---
    let mut scored: Vec<(&'a ParsedItem, i64)> = companions
        .into_iter()
        .map(|c| (c, calculator::score_item_with(c, strategy)))
        .collect();
    scored.sort_by(|(a, sa), (b, sb)| sb.cmp(sa).then_with(|| a.id.cmp(&b.id)));

    let pool: Vec<&'a ParsedItem> = scored
        .into_iter()
        .take(COMPANION_POOL_SIZE)
        .map(|(c, _)| c)
        .collect();
    debug!("候选池：{} 个伴随物品，{} 个主物品", pool.len(), primaries.len());

    // --- 2. 每个主物品穷举所有三元组，保留第一个出现的最高分 ---
    let mut sets: Vec<OptimizedSet<'a>> = primaries
        .iter()
        .filter_map(|&primary| best_set_for(primary, &pool, strategy))
        .collect();

    // --- 3. 全局排序，同分按主物品 id 升序 ---
    sets.sort_by(|a, b| compare_sets(a, b));
    sets.truncate(MAX_RESULTS);
    sets
}

fn best_set_for<'a>(
    primary: &'a ParsedItem,
    pool: &[&'a ParsedItem],
    strategy: &Strategy,
) -> Option<OptimizedSet<'a>> {
    if pool.len() < COMPANIONS_PER_SET {
        return None;
    }

    let mut best: Option<OptimizedSet<'a>> = None;
    for combo in pool.iter().copied().combinations(COMPANIONS_PER_SET) {
        let companions = [combo[0], combo[1], combo[2]];
        let total_score = calculator::score_set_with(primary, &companions, strategy);
        if best.as_ref().is_none_or(|b| total_score > b.total_score) {
            best = Some(OptimizedSet { primary, companions, total_score });
        }
    }
    best
}

fn compare_sets(a: &OptimizedSet, b: &OptimizedSet) -> Ordering {
    b.total_score
        .cmp(&a.total_score)
        .then_with(|| a.primary.id.cmp(&b.primary.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ItemStats, Rarity};
    use chrono::{TimeZone, Utc};

    fn item(id: &str, item_type: ItemType, quantity: u32) -> ParsedItem {
        ParsedItem {
            id: id.to_string(),
            name: format!("Item {id}"),
            item_type,
            sub_type: None,
            tier: 0,
            uses: 1,
            rarity: Rarity::Normal,
            corrupted: false,
            stats: ItemStats { item_quantity: quantity, ..ItemStats::default() },
            original_text: String::new(),
            timestamp: Utc.timestamp_opt(0, 0).single().unwrap_or_default(),
            score: None,
        }
    }

    #[test]
    fn insufficient_inventory_yields_nothing() {
        let catalog = StrategyCatalog::new();
        assert!(find_best_sets(&[], "Generic", &catalog).is_empty());

        let items = vec![
            item("w", ItemType::Waystone, 1),
            item("t1", ItemType::Tablet, 1),
            item("t2", ItemType::Tablet, 1),
        ];
        assert!(find_best_sets(&items, "Generic", &catalog).is_empty());

        let only_tablets: Vec<_> = (0..5).map(|i| item(&format!("t{i}"), ItemType::Tablet, i)).collect();
        assert!(find_best_sets(&only_tablets, "Generic", &catalog).is_empty());
    }

    #[test]
    fn picks_top_three_companions() {
        let catalog = StrategyCatalog::new();
        let mut items = vec![item("w", ItemType::Waystone, 0)];
        items.extend((1..=6).map(|i| item(&format!("t{i}"), ItemType::Tablet, i)));

        let sets = find_best_sets(&items, "Generic", &catalog);
        assert_eq!(sets.len(), 1);
        let ids: Vec<&str> = sets[0].companions.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["t6", "t5", "t4"]);
        assert_eq!(sets[0].total_score, (6 + 5 + 4) * 5);
    }

    #[test]
    fn pool_is_limited_to_ten_companions() {
        let catalog = StrategyCatalog::new();
        let mut items = vec![item("w", ItemType::Waystone, 0)];
        items.extend((0..15).map(|i| item(&format!("t{i:02}"), ItemType::Tablet, 1)));
        let sets = find_best_sets(&items, "Generic", &catalog);
        // 同分时按 id 升序入池，第一个三元组胜出
        let ids: Vec<&str> = sets[0].companions.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["t00", "t01", "t02"]);
    }

    #[test]
    fn results_are_capped_and_ordered() {
        let catalog = StrategyCatalog::new();
        let mut items: Vec<ParsedItem> = (0..8).map(|i| item(&format!("w{i}"), ItemType::Waystone, i % 3)).collect();
        items.extend((0..4).map(|i| item(&format!("t{i}"), ItemType::Tablet, 2)));

        let sets = find_best_sets(&items, "Generic", &catalog);
        assert_eq!(sets.len(), MAX_RESULTS);
        for pair in sets.windows(2) {
            assert_ne!(compare_sets(&pair[0], &pair[1]), Ordering::Greater);
        }
        let primaries: Vec<&str> = sets.iter().map(|s| s.primary.id.as_str()).collect();
        assert_eq!(primaries, vec!["w2", "w5", "w1", "w4", "w7"]);
    }

    #[test]
    fn unknown_items_are_ignored() {
        let catalog = StrategyCatalog::new();
        let items = vec![
            item("w", ItemType::Waystone, 1),
            item("t1", ItemType::Tablet, 1),
            item("t2", ItemType::Tablet, 1),
            item("u", ItemType::Unknown, 99),
        ];
        assert!(find_best_sets(&items, "Generic", &catalog).is_empty());
    }
}
