//! src/parser.rs
//!
//! 把游戏导出的剪贴板文本解析为结构化的物品。
//! 解析是纯函数：同样的文本总是得到同样的派生字段，只有 id 与时间戳不同。

use crate::models::{ItemStats, ItemType, ParsedItem, Rarity, StatKind};
use crate::utils;
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};
use uuid::Uuid;

/// 名称提取时最多扫描的行数。
const NAME_SCAN_LINES: usize = 5;

/// 元数据行标记（各语言）。
const METADATA_MARKERS: [&str; 4] = ["Item Class:", "Rarity:", "Classe do Item:", "Raridade:"];

const WAYSTONE_MARKERS: [&str; 4] = ["Waystones", "Waystone", "Pedra de Caminho", "Pedras de Caminho"];

const TABLET_MARKERS: [&str; 4] = ["Tablet", "Precursor", "Tábua", "Precursora"];

/// 石板子类型关键字，在名称中按顺序查找。
const SUB_TYPES: [&str; 6] = ["Ritual", "Delirium", "Irradiated", "Breach", "Expedition", "Precursor"];

const DEFAULT_SUB_TYPE: &str = "Other";

static TIER_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile_all(&[r"Tier: (\d+)", r"Tier (\d+)", r"Nível: (\d+)", r"Level: (\d+)", r"Level (\d+)"])
});

static USES_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile_all(&[r"(\d+) uses remaining", r"(\d+) usos restantes", r"Cargas: (\d+)", r"Charges: (\d+)"])
});

fn compile_all(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("内置正则模式必须合法"))
        .collect()
}

/// 按顺序尝试每个模式，返回第一个命中的第一个捕获组。
fn first_capture(patterns: &[Regex], text: &str) -> Option<u32> {
    patterns
        .iter()
        .find_map(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// 单个数值属性的提取器。新的语言或措辞只需增加新的实现或短语。
pub trait StatExtractor: Send + Sync {
    fn kind(&self) -> StatKind;
    fn extract(&self, text: &str) -> Option<u32>;
}

/// 双向匹配："数字% ... 短语" 或 "短语 ... 数字%"，同一行内。
///
/// 故意宽松：同一行里与短语无关的数字也可能被命中。
pub struct BidirectionalPattern {
    kind: StatKind,
    patterns: Vec<Regex>,
}

impl BidirectionalPattern {
    pub fn new(kind: StatKind, phrases: &[&str]) -> Self {
        let patterns = phrases
            .iter()
            .map(|phrase| {
                let escaped = regex::escape(phrase);
                Regex::new(&format!(r"(\d+)%?.*{escaped}|{escaped}.*?(\d+)%"))
                    .expect("短语已转义，正则必须合法")
            })
            .collect();
        Self { kind, patterns }
    }
}

impl StatExtractor for BidirectionalPattern {
    fn kind(&self) -> StatKind {
        self.kind
    }

    fn extract(&self, text: &str) -> Option<u32> {
        self.patterns.iter().find_map(|re| {
            let caps = re.captures(text)?;
            caps.get(1).or_else(|| caps.get(2))?.as_str().parse().ok()
        })
    }
}

static STAT_EXTRACTORS: Lazy<Vec<Box<dyn StatExtractor>>> = Lazy::new(|| {
    let table: [(StatKind, &[&str]); 8] = [
        (StatKind::ItemQuantity, &["Item Quantity", "Quantidade de Itens"]),
        (StatKind::ItemRarity, &["Item Rarity", "Raridade de Itens"]),
        (StatKind::PackSize, &["Monster Pack Size", "Tamanho dos Grupos de Monstros"]),
        (StatKind::Gold, &["increased Gold found", "de Ouro encontrado"]),
        (StatKind::Delirium, &["Layers to be Delirious"]),
        (StatKind::MagicMonsters, &["Magic Monsters", "Monstros Mágicos"]),
        (StatKind::RareMonsters, &["Rare Monsters", "Monstros Raros"]),
        (StatKind::ExpGain, &["Experience Gain", "Experiência Obtida"]),
    ];
    table
        .into_iter()
        .map(|(kind, phrases)| Box::new(BidirectionalPattern::new(kind, phrases)) as Box<dyn StatExtractor>)
        .collect()
});

/// 顶层函数：解析一段剪贴板文本。无关或无法解析的文本返回 None。
pub fn parse_item(text: &str) -> Option<ParsedItem> {
    let lines = utils::non_empty_lines(text);
    let first = *lines.first()?;

    let name = lines
        .iter()
        .take(NAME_SCAN_LINES)
        .find(|line| !utils::contains_any(line, &METADATA_MARKERS) && line.chars().count() > 2)
        .copied()
        .unwrap_or(first)
        .to_string();

    let item_type = classify(text);
    if item_type == ItemType::Unknown {
        warn!("非相关物品文本，已忽略");
        return None;
    }

    let is_waystone = item_type == ItemType::Waystone;
    let item = ParsedItem {
        id: generate_id(),
        tier: if is_waystone { extract_tier(text) } else { 0 },
        sub_type: (!is_waystone).then(|| extract_sub_type(&name).to_string()),
        uses: if is_waystone { 1 } else { extract_uses(text) },
        rarity: extract_rarity(text),
        corrupted: text.contains("Corrupted"),
        stats: extract_stats(text),
        original_text: text.to_string(),
        timestamp: Utc::now(),
        score: None,
        name,
        item_type,
    };
    debug!("解析物品：{} ({:?})", item.name, item.item_type);
    Some(item)
}

/// 地图石标记优先于石板标记。
pub fn classify(text: &str) -> ItemType {
    if utils::contains_any(text, &WAYSTONE_MARKERS) {
        ItemType::Waystone
    } else if utils::contains_any(text, &TABLET_MARKERS) {
        ItemType::Tablet
    } else {
        ItemType::Unknown
    }
}

pub fn extract_tier(text: &str) -> u32 {
    first_capture(&TIER_PATTERNS, text).unwrap_or(0)
}

pub fn extract_uses(text: &str) -> u32 {
    first_capture(&USES_PATTERNS, text).unwrap_or(1)
}

pub fn extract_sub_type(name: &str) -> &'static str {
    SUB_TYPES
        .iter()
        .find(|t| name.contains(*t))
        .copied()
        .unwrap_or(DEFAULT_SUB_TYPE)
}

/// 只识别英文的 "Rarity: X"，其余情况一律视为 Normal。
pub fn extract_rarity(text: &str) -> Rarity {
    Rarity::ALL
        .into_iter()
        .find(|r| text.contains(&format!("Rarity: {}", r.label())))
        .unwrap_or_default()
}

pub fn extract_stats(text: &str) -> ItemStats {
    let mut stats = ItemStats::default();
    for extractor in STAT_EXTRACTORS.iter() {
        stats.set(extractor.kind(), extractor.extract(text).unwrap_or(0));
    }
    stats
}

/// 时间有序前缀 + 随机后缀。
fn generate_id() -> String {
    Uuid::now_v7().to_string()
}
