//! src/catalog.rs
//!
//! 静态参考数据：词缀目录、内置方案目录，以及主题家族表。
//! 目录在进程内只构建一次，之后只读。

use crate::models::{ModCategory, ModDefinition, ModTarget, Strategy};
use once_cell::sync::Lazy;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// 解析不到方案 id 时使用的默认方案。
pub const DEFAULT_STRATEGY_ID: &str = "Generic";

/// 不属于任何主题家族的物品。
pub const OTHER_FAMILY: &str = "Other";

/// 两个通用标签，不参与"高优先级家族"的统计。
pub const GENERIC_TAGS: [&str; 2] = ["efficiency", "rarity"];

/// 特殊关键字：Irradiated 石板归入通用的 efficiency 家族。
pub const EFFICIENCY_KEYWORD: (&str, &str) = ("irradiated", "efficiency");

/// (名称中的小写关键字, 家族标签)，按顺序取第一个命中的。
pub const FAMILY_KEYWORDS: [(&str, &str); 6] = [
    ("breach", "breach"),
    ("expedition", "expedition"),
    ("delirium", "delirium"),
    ("ritual", "ritual"),
    ("abyss", "abyss"),
    ("overseer", "boss"),
];

/// 以 id 为键的不可变词缀表。检测时需要遍历全部条目。
pub struct ModCatalog {
    entries: Vec<ModDefinition>,
    index: HashMap<&'static str, usize>,
}

impl ModCatalog {
    fn new(entries: Vec<ModDefinition>) -> Self {
        let index = entries.iter().enumerate().map(|(i, m)| (m.id, i)).collect();
        Self { entries, index }
    }

    pub fn get(&self, id: &str) -> Option<&ModDefinition> {
        self.index.get(id).map(|&i| &self.entries[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModDefinition> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

const fn waystone_mod(
    id: &'static str,
    text: &'static str,
    category: ModCategory,
    tags: &'static [&'static str],
    base_value: f64,
) -> ModDefinition {
    ModDefinition { id, text, category, applies_to: ModTarget::Waystone, tags, base_value }
}

const fn tablet_mod(
    id: &'static str,
    text: &'static str,
    tags: &'static [&'static str],
    base_value: f64,
) -> ModDefinition {
    ModDefinition { id, text, category: ModCategory::League, applies_to: ModTarget::Tablet, tags, base_value }
}

static MOD_CATALOG: Lazy<ModCatalog> = Lazy::new(|| {
    use ModCategory::{Prefix, Suffix};
    ModCatalog::new(vec![
        // 地图石前缀（奖励）
        waystone_mod("w_quant", "Increased Quantity of Items found in the Area", Prefix, &["efficiency", "drops"], 50.0),
        waystone_mod("w_rarity", "Increased Rarity of Items found in the Area", Prefix, &["rarity", "drops"], 50.0),
        waystone_mod("w_gold", "Increased Gold found in the Area", Prefix, &["gold"], 40.0),
        waystone_mod("w_packsize", "Increased Pack size", Prefix, &["efficiency", "monsters"], 60.0),
        waystone_mod("w_rare_monsters", "Increased Rare Monsters", Prefix, &["monsters", "xp"], 70.0),
        waystone_mod("w_magic_monsters", "Increased Magic Monsters", Prefix, &["monsters", "xp"], 40.0),
        waystone_mod("w_exp", "Increased Experience gain", Prefix, &["xp"], 50.0),
        // 地图石后缀
        waystone_mod("w_drop_chance", "Increased Waystones found in Area", Suffix, &["waystones"], 30.0),
        // Breach
        tablet_mod("t_breach_quant", "increased Quantity of Items found in your Maps", &["breach", "efficiency"], 80.0),
        tablet_mod("t_breach_monsters", "Breaches remain open while there are alive Breach Monsters", &["breach", "monsters"], 100.0),
        // Expedition
        tablet_mod("t_exp_logbooks", "Increased Quantity of Expedition Logbooks dropped by Runic Monsters in your Maps", &["expedition", "drops"], 150.0),
        tablet_mod("t_exp_markers", "Your Maps contain increased number of Runic Monster Markers", &["expedition"], 100.0),
        tablet_mod("t_exp_duplicate", "Runic Monsters in your Maps are Duplicated", &["expedition", "monsters"], 120.0),
        // Delirium
        tablet_mod("t_deli_splinters", "increased stack size of Simulacrum Splinters", &["delirium", "drops"], 120.0),
        tablet_mod("t_deli_progress", "increased reward progress from Delirious Monsters", &["delirium"], 130.0),
        tablet_mod("t_deli_never_dissipates", "Delirium Fog in your Maps never dissipates", &["delirium"], 150.0),
        // Ritual
        tablet_mod("t_rit_tribute", "Monsters Sacrificed at Ritual Altars in your Maps grant increased Tribute", &["ritual"], 100.0),
        tablet_mod("t_rit_reroll_cost", "Rerolling/Deferring Favours at Ritual Altars in your Maps costs reduced Tribute", &["ritual"], 120.0),
        tablet_mod("t_rit_reroll_free", "Favours Rerolled at Ritual Altars in your Maps have a chance to cost no Tribute", &["ritual"], 110.0),
        // Abyss
        tablet_mod("t_abyss_pits", "Abysses have additional pits", &["abyss"], 100.0),
        tablet_mod("t_abyss_overrun", "Overrun by Abyssals", &["abyss", "monsters"], 150.0),
        // Overseer
        tablet_mod("t_boss_mod", "Map Bosses have 1 additional Modifier", &["boss"], 120.0),
        tablet_mod("t_boss_hunted", "Map Bosses are Hunted by Azmeri Spirits", &["boss"], 140.0),
    ])
});

/// 全局词缀目录。
pub fn mod_catalog() -> &'static ModCatalog {
    &MOD_CATALOG
}

fn builtin(
    name: &str,
    description: &str,
    color: &str,
    weights: &[(&str, f64)],
    multipliers: (f64, f64, f64),
    targets: &[&str],
    crucial: &[&str],
) -> Strategy {
    let (synergy_multiplier, league_loyalty, mix_mastery) = multipliers;
    Strategy {
        name: name.to_string(),
        description: description.to_string(),
        color: color.to_string(),
        tag_weights: weights.iter().map(|(t, w)| (t.to_string(), *w)).collect(),
        synergy_multiplier,
        league_loyalty,
        mix_mastery,
        target_mod_ids: targets.iter().map(|s| s.to_string()).collect(),
        crucial_mods: crucial.iter().map(|s| s.to_string()).collect(),
    }
}

static BUILTIN_STRATEGIES: Lazy<BTreeMap<String, Strategy>> = Lazy::new(|| {
    let list = [
        ("Generic", builtin(
            "Generic Farming", "Balanced weights for general loot and performance.", "#64748b",
            &[("efficiency", 1.0)], (1.2, 1.5, 1.4),
            &["w_quant", "w_rarity", "w_packsize"], &[],
        )),
        ("Infinite Abyss", builtin(
            "Infinite Abyss", "Experience (XP), ilvl 84+ bases and Abyssal Jewels.", "#a855f7",
            &[("abyss", 2.0), ("xp", 1.8), ("monsters", 1.5), ("efficiency", 1.2)], (1.25, 1.6, 1.4),
            &["t_abyss_pits", "t_abyss_overrun", "w_rare_monsters", "w_exp"],
            &["Overrun by Abyssals", "Experience Gain"],
        )),
        ("Currency Rain", builtin(
            "Currency Rain", "Divines and Raw Currency.", "#22c55e",
            &[("gold", 2.0), ("drops", 1.8), ("breach", 1.6), ("efficiency", 1.5)], (1.2, 1.5, 1.4),
            &["w_quant", "w_gold", "t_breach_quant"],
            &["Monster Effectiveness", "Local Knowledge"],
        )),
        ("Blood Gambler", builtin(
            "Blood Gambler", "High-value Ritual Omens and T0 Uniques.", "#ef4444",
            &[("ritual", 2.2), ("rarity", 2.0), ("boss", 1.3)], (1.3, 1.7, 1.3),
            &["t_rit_tribute", "t_rit_reroll_cost", "t_rit_reroll_free", "w_rarity"],
            &["Reduced Reroll Cost", "Tribute from Sacrificed Monsters"],
        )),
        ("Mist Engine", builtin(
            "Mist Engine", "Simulacrum Splinters and Cluster Jewels (Delirium Hybrid).", "#6366f1",
            &[("delirium", 2.2), ("breach", 1.6), ("monsters", 1.4), ("efficiency", 1.3)], (1.2, 1.5, 1.5),
            &["t_deli_splinters", "t_deli_progress", "t_deli_never_dissipates", "w_packsize"],
            &["increases faster with distance", "Slaying Rare Monsters pauses"],
        )),
        ("Logistic Excavation", builtin(
            "Logistic Excavation", "Expedition Logbooks and Trog Artifacts.", "#eab308",
            &[("expedition", 2.2), ("drops", 1.5), ("monsters", 1.3), ("efficiency", 1.2)], (1.2, 1.6, 1.3),
            &["t_exp_logbooks", "t_exp_markers", "t_exp_duplicate"],
            &["Quantity of Logbooks", "Runic Monster Markers"],
        )),
        ("Boss Hunter", builtin(
            "Boss Hunter", "Boss Uniques, T16 Maps and Fragments.", "#f97316",
            &[("boss", 2.2), ("rarity", 1.8), ("waystones", 1.5)], (1.3, 1.6, 1.3),
            &["t_boss_mod", "t_boss_hunted", "w_drop_chance"],
            &["Map Drop Chance", "Twin Bosses", "additional Unique Item"],
        )),
    ];
    list.into_iter().map(|(id, s)| (id.to_string(), s)).collect()
});

/// 内置方案表。
pub fn builtin_strategies() -> &'static BTreeMap<String, Strategy> {
    &BUILTIN_STRATEGIES
}

/// 内置方案 + 用户自定义方案。自定义方案由外部状态持有，这里按 id 查找。
#[derive(Debug, Clone, Default)]
pub struct StrategyCatalog {
    custom: BTreeMap<String, Strategy>,
}

impl StrategyCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_custom(custom: BTreeMap<String, Strategy>) -> Self {
        Self { custom }
    }

    pub fn get(&self, id: &str) -> Option<&Strategy> {
        BUILTIN_STRATEGIES.get(id).or_else(|| self.custom.get(id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn is_builtin(&self, id: &str) -> bool {
        BUILTIN_STRATEGIES.contains_key(id)
    }

    /// 按 id 解析方案；找不到时静默回退到默认方案。
    pub fn resolve_strategy(&self, id: &str) -> &Strategy {
        match self.get(id) {
            Some(strategy) => strategy,
            None => {
                debug!("方案 {} 不存在，回退到 {}", id, DEFAULT_STRATEGY_ID);
                &BUILTIN_STRATEGIES[DEFAULT_STRATEGY_ID]
            }
        }
    }

    pub fn custom(&self) -> &BTreeMap<String, Strategy> {
        &self.custom
    }

    pub(crate) fn custom_mut(&mut self) -> &mut BTreeMap<String, Strategy> {
        &mut self.custom
    }

    /// 所有可用方案 id：内置在前，自定义在后。
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        BUILTIN_STRATEGIES.keys().chain(self.custom.keys()).map(String::as_str)
    }
}
