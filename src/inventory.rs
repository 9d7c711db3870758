//! src/inventory.rs
//!
//! 应用状态对象：库存物品、当前方案、自定义方案与使用历史。
//! 解析、评分与优化都以参数形式接收这里的数据，自身不持有任何全局状态。

use crate::calculator;
use crate::catalog::{DEFAULT_STRATEGY_ID, StrategyCatalog};
use crate::error::{SentinelError, SentinelResult};
use crate::models::{ItemType, OptimizedSet, ParsedItem, Strategy, StrategyPatch, UsageEntry, UsedItemRef};
use crate::optimizer;
use crate::parser;
use chrono::Utc;
use rayon::prelude::*;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// 库存最多保留的物品数（最新的在前）。
pub const MAX_ITEMS: usize = 100;

/// 使用历史最多保留的条目数。
pub const MAX_HISTORY: usize = 100;

#[derive(Debug, Clone)]
pub struct Inventory {
    items: Vec<ParsedItem>,
    active_strategy: String,
    strategies: StrategyCatalog,
    usage_history: Vec<UsageEntry>,
}

impl Default for Inventory {
    fn default() -> Self {
        Self::new(StrategyCatalog::new(), DEFAULT_STRATEGY_ID)
    }
}

impl Inventory {
    pub fn new(strategies: StrategyCatalog, active_strategy: &str) -> Self {
        let mut inventory = Self {
            items: Vec::new(),
            active_strategy: active_strategy.to_string(),
            strategies,
            usage_history: Vec::new(),
        };
        inventory.validate_state();
        inventory
    }

    pub fn items(&self) -> &[ParsedItem] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&ParsedItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn active_strategy(&self) -> &str {
        &self.active_strategy
    }

    pub fn strategies(&self) -> &StrategyCatalog {
        &self.strategies
    }

    pub fn usage_history(&self) -> &[UsageEntry] {
        &self.usage_history
    }

    /// 按当前方案计算分数后放到库存最前面。Unknown 物品被拒绝。
    pub fn add_item(&mut self, mut item: ParsedItem) -> Option<&ParsedItem> {
        if item.item_type == ItemType::Unknown {
            warn!("拒绝未知类型物品：{}", item.name);
            return None;
        }
        item.score = Some(calculator::score_item(&item, &self.active_strategy, &self.strategies));
        info!("新物品：{} (分数 {})", item.name, item.score.unwrap_or_default());
        self.items.insert(0, item);
        self.items.truncate(MAX_ITEMS);
        self.items.first()
    }

    /// 解析一次剪贴板快照并加入库存；无关文本不产生任何变化。
    pub fn ingest_text(&mut self, text: &str) -> Option<&ParsedItem> {
        let item = parser::parse_item(text)?;
        self.add_item(item)
    }

    /// 并行解析多份快照，再按输入顺序依次加入。返回加入的物品数。
    pub fn ingest_texts<S: AsRef<str> + Sync>(&mut self, texts: &[S]) -> usize {
        let parsed: Vec<Option<ParsedItem>> = texts
            .par_iter()
            .map(|text| parser::parse_item(text.as_ref()))
            .collect();

        let mut added = 0;
        for item in parsed.into_iter().flatten() {
            if self.add_item(item).is_some() {
                added += 1;
            }
        }
        debug!("批量解析：{} 份文本，加入 {} 个物品", texts.len(), added);
        added
    }

    pub fn remove_item(&mut self, id: &str) -> SentinelResult<ParsedItem> {
        let index = self
            .items
            .iter()
            .position(|i| i.id == id)
            .ok_or_else(|| SentinelError::ItemNotFound(id.to_string()))?;
        Ok(self.items.remove(index))
    }

    pub fn clear_items(&mut self) {
        self.items.clear();
    }

    /// 切换方案并重新计算所有物品的缓存分数。未知 id 回退到默认方案。
    pub fn set_strategy(&mut self, id: &str) {
        self.active_strategy = id.to_string();
        self.validate_state();
        self.rescore();
        info!("当前方案：{}", self.active_strategy);
    }

    /// 当前方案无法解析时回退到默认方案。
    pub fn validate_state(&mut self) {
        if !self.strategies.contains(&self.active_strategy) {
            warn!("方案 {} 不存在，回退到 {}", self.active_strategy, DEFAULT_STRATEGY_ID);
            self.active_strategy = DEFAULT_STRATEGY_ID.to_string();
            self.rescore();
        }
    }

    fn rescore(&mut self) {
        for item in &mut self.items {
            item.score = Some(calculator::score_item(item, &self.active_strategy, &self.strategies));
        }
    }

    /// 当前库存与方案下的最佳组合。
    pub fn best_sets(&self) -> Vec<OptimizedSet<'_>> {
        optimizer::find_best_sets(&self.items, &self.active_strategy, &self.strategies)
    }

    /// 新增自定义方案，返回形如 `custom-<毫秒>` 的 id。
    pub fn add_custom_strategy(&mut self, strategy: Strategy) -> String {
        let base = format!("custom-{}", Utc::now().timestamp_millis());
        let mut id = base.clone();
        let mut suffix = 1;
        while self.strategies.contains(&id) {
            id = format!("{base}-{suffix}");
            suffix += 1;
        }
        info!("新增自定义方案：{} ({})", strategy.name, id);
        self.strategies.custom_mut().insert(id.clone(), strategy);
        id
    }

    pub fn update_custom_strategy(&mut self, id: &str, patch: StrategyPatch) -> SentinelResult<()> {
        if self.strategies.is_builtin(id) {
            return Err(SentinelError::BuiltinStrategy(id.to_string()));
        }
        let strategy = self
            .strategies
            .custom_mut()
            .get_mut(id)
            .ok_or_else(|| SentinelError::StrategyNotFound(id.to_string()))?;

        if let Some(v) = patch.name { strategy.name = v; }
        if let Some(v) = patch.description { strategy.description = v; }
        if let Some(v) = patch.color { strategy.color = v; }
        if let Some(v) = patch.tag_weights { strategy.tag_weights = v; }
        if let Some(v) = patch.synergy_multiplier { strategy.synergy_multiplier = v; }
        if let Some(v) = patch.league_loyalty { strategy.league_loyalty = v; }
        if let Some(v) = patch.mix_mastery { strategy.mix_mastery = v; }
        if let Some(v) = patch.target_mod_ids { strategy.target_mod_ids = v; }

        if self.active_strategy == id {
            self.rescore();
        }
        Ok(())
    }

    /// 删除自定义方案；若删除的是当前方案则回退到默认方案。
    pub fn remove_custom_strategy(&mut self, id: &str) -> SentinelResult<Strategy> {
        if self.strategies.is_builtin(id) {
            return Err(SentinelError::BuiltinStrategy(id.to_string()));
        }
        let removed = self
            .strategies
            .custom_mut()
            .remove(id)
            .ok_or_else(|| SentinelError::StrategyNotFound(id.to_string()))?;
        self.validate_state();
        Ok(removed)
    }

    pub fn export_strategy(&self, id: &str) -> SentinelResult<String> {
        let strategy = self
            .strategies
            .get(id)
            .ok_or_else(|| SentinelError::StrategyNotFound(id.to_string()))?;
        Ok(serde_json::to_string_pretty(strategy)?)
    }

    /// 从 JSON 导入方案。必须包含 name 与 tagWeights，缺省的乘数使用默认值。
    pub fn import_strategy(&mut self, json: &str) -> SentinelResult<String> {
        let strategy: Strategy =
            serde_json::from_str(json).map_err(|e| SentinelError::StrategyImport(e.to_string()))?;
        if strategy.name.trim().is_empty() {
            return Err(SentinelError::StrategyImport("name 不能为空".to_string()));
        }
        Ok(self.add_custom_strategy(strategy))
    }

    /// 执行一个组合：移除主物品，伴随物品次数减一，次数归零的伴随物品被移除。
    pub fn mark_as_used(&mut self, primary_id: &str, companion_ids: &[&str], score: i64) -> SentinelResult<UsageEntry> {
        let primary = self
            .get(primary_id)
            .ok_or_else(|| SentinelError::ItemNotFound(primary_id.to_string()))?;
        if primary.item_type != ItemType::Waystone {
            return Err(SentinelError::WrongItemRole { id: primary_id.to_string(), role: "主物品" });
        }
        let primary_name = primary.name.clone();

        let mut companions = Vec::with_capacity(companion_ids.len());
        for &id in companion_ids {
            let item = self.get(id).ok_or_else(|| SentinelError::ItemNotFound(id.to_string()))?;
            if item.item_type != ItemType::Tablet {
                return Err(SentinelError::WrongItemRole { id: id.to_string(), role: "伴随物品" });
            }
            companions.push(UsedItemRef { id: item.id.clone(), name: item.name.clone() });
        }

        self.items.retain(|i| i.id != primary_id);
        for item in &mut self.items {
            if companion_ids.contains(&item.id.as_str()) {
                item.uses = item.uses.saturating_sub(1);
            }
        }
        self.items.retain(|i| !(i.item_type == ItemType::Tablet && i.uses == 0));

        let entry = UsageEntry {
            id: format!("usage-{}", Uuid::now_v7()),
            primary_name,
            companions,
            timestamp: Utc::now(),
            score,
            strategy: self.active_strategy.clone(),
        };
        info!("执行组合：{} + {} 个伴随物品", entry.primary_name, entry.companions.len());
        self.usage_history.insert(0, entry.clone());
        self.usage_history.truncate(MAX_HISTORY);
        Ok(entry)
    }

    pub fn clear_history(&mut self) {
        self.usage_history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::builtin_strategies;

    const WAYSTONE: &str = "Item Class: Waystones\nRarity: Rare\nGlacial Waystone\nWaystone Tier: 16\n20% increased Item Quantity";

    fn tablet(name: &str, uses: u32, body: &str) -> String {
        format!("Item Class: Tablet\nRarity: Magic\n{name}\n{uses} uses remaining\n{body}")
    }

    fn stocked() -> Inventory {
        let mut inv = Inventory::default();
        inv.ingest_text(WAYSTONE).expect("waystone");
        inv.ingest_text(&tablet("Ritual Precursor Tablet", 1, "Abysses have additional pits")).expect("t1");
        inv.ingest_text(&tablet("Delirium Precursor Tablet", 2, "")).expect("t2");
        inv.ingest_text(&tablet("Breach Precursor Tablet", 3, "")).expect("t3");
        inv
    }

    #[test]
    fn items_are_scored_on_insert_and_rescored_on_strategy_change() {
        let mut inv = stocked();
        assert_eq!(inv.items().len(), 4);
        assert_eq!(inv.items()[0].name, "Breach Precursor Tablet");
        let pits_generic = inv.items().iter().find(|i| i.name.starts_with("Ritual")).and_then(|i| i.score);
        assert_eq!(pits_generic, Some(100));

        inv.set_strategy("Infinite Abyss");
        let pits_abyss = inv.items().iter().find(|i| i.name.starts_with("Ritual")).and_then(|i| i.score);
        assert_eq!(pits_abyss, Some(200));
    }

    #[test]
    fn irrelevant_text_is_a_no_op() {
        let mut inv = Inventory::default();
        assert!(inv.ingest_text("Item Class: Rings\nRarity: Rare\nDoom Loop").is_none());
        assert!(inv.items().is_empty());
    }

    #[test]
    fn bulk_ingest_keeps_input_order() {
        let mut inv = Inventory::default();
        let texts = vec![WAYSTONE.to_string(), "garbage".to_string(), tablet("Ritual Tablet", 1, "")];
        assert_eq!(inv.ingest_texts(&texts), 2);
        assert_eq!(inv.items()[0].name, "Ritual Tablet");
        assert_eq!(inv.items()[1].name, "Glacial Waystone");
    }

    #[test]
    fn inventory_is_capped() {
        let mut inv = Inventory::default();
        let texts: Vec<String> = (0..MAX_ITEMS + 5).map(|i| tablet(&format!("Tablet {i}"), 1, "")).collect();
        inv.ingest_texts(&texts);
        assert_eq!(inv.items().len(), MAX_ITEMS);
        assert_eq!(inv.items()[0].name, format!("Tablet {}", MAX_ITEMS + 4));
    }

    #[test]
    fn unknown_strategy_falls_back() {
        let mut inv = Inventory::new(StrategyCatalog::new(), "Gone");
        assert_eq!(inv.active_strategy(), DEFAULT_STRATEGY_ID);
        inv.set_strategy("Also Gone");
        assert_eq!(inv.active_strategy(), DEFAULT_STRATEGY_ID);
    }

    #[test]
    fn mark_as_used_consumes_charges() {
        let mut inv = stocked();
        let primary = inv.items().iter().find(|i| i.item_type == ItemType::Waystone).map(|i| i.id.clone()).expect("primary");
        let tablets: Vec<String> = inv.items().iter().filter(|i| i.item_type == ItemType::Tablet).map(|i| i.id.clone()).collect();
        let ids: Vec<&str> = tablets.iter().map(String::as_str).collect();

        let entry = inv.mark_as_used(&primary, &ids, 1234).expect("execute");
        assert_eq!(entry.primary_name, "Glacial Waystone");
        assert_eq!(entry.companions.len(), 3);
        assert_eq!(entry.strategy, DEFAULT_STRATEGY_ID);

        // 主物品被移除，1 次的石板被用完
        let remaining: Vec<(&str, u32)> = inv.items().iter().map(|i| (i.name.as_str(), i.uses)).collect();
        assert_eq!(remaining, vec![("Breach Precursor Tablet", 2), ("Delirium Precursor Tablet", 1)]);
        assert_eq!(inv.usage_history().len(), 1);
    }

    #[test]
    fn mark_as_used_validates_roles() {
        let mut inv = stocked();
        let tablet_id = inv.items()[0].id.clone();
        let err = inv.mark_as_used(&tablet_id, &[], 0).unwrap_err();
        assert!(matches!(err, SentinelError::WrongItemRole { .. }));
        let err = inv.mark_as_used("missing", &[], 0).unwrap_err();
        assert!(matches!(err, SentinelError::ItemNotFound(_)));
        assert_eq!(inv.items().len(), 4);
    }

    #[test]
    fn custom_strategy_lifecycle() {
        let mut inv = stocked();
        let id = inv
            .import_strategy(r#"{"name":"Pit Digger","tagWeights":{"abyss":3.0}}"#)
            .expect("import");
        let imported = inv.strategies().get(&id).expect("stored");
        assert_eq!(imported.league_loyalty, 1.5);
        assert_eq!(imported.mix_mastery, 1.5);
        assert_eq!(imported.synergy_multiplier, 1.2);

        inv.set_strategy(&id);
        assert_eq!(inv.active_strategy(), id);

        let patch = StrategyPatch { tag_weights: Some([("abyss".to_string(), 4.0)].into()), ..Default::default() };
        inv.update_custom_strategy(&id, patch).expect("update");
        let pits = inv.items().iter().find(|i| i.name.starts_with("Ritual")).and_then(|i| i.score);
        assert_eq!(pits, Some(400));

        let exported = inv.export_strategy(&id).expect("export");
        assert!(exported.contains("Pit Digger"));

        inv.remove_custom_strategy(&id).expect("remove");
        assert_eq!(inv.active_strategy(), DEFAULT_STRATEGY_ID);
    }

    #[test]
    fn builtins_are_read_only_and_imports_validated() {
        let mut inv = Inventory::default();
        assert!(matches!(
            inv.update_custom_strategy("Generic", StrategyPatch::default()),
            Err(SentinelError::BuiltinStrategy(_))
        ));
        assert!(matches!(inv.remove_custom_strategy("Generic"), Err(SentinelError::BuiltinStrategy(_))));
        assert!(matches!(inv.import_strategy(r#"{"name":"x"}"#), Err(SentinelError::StrategyImport(_))));
        assert!(matches!(inv.import_strategy("not json"), Err(SentinelError::StrategyImport(_))));
        assert!(builtin_strategies().contains_key("Generic"));
    }

    #[test]
    fn custom_ids_do_not_collide() {
        let mut inv = Inventory::default();
        let s = builtin_strategies()["Generic"].clone();
        let a = inv.add_custom_strategy(s.clone());
        let b = inv.add_custom_strategy(s);
        assert_ne!(a, b);
        assert!(a.starts_with("custom-"));
    }
}
