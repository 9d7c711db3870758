//! src/config.rs
//!
//! 负责加载和解析所有配置文件。
//! 它的主要职责是将用户提供的、人类可读的配置 (UserConfigRaw)，
//! 结合自定义方案 (StrategyCatalog)，转换为程序内部使用的配置 (AppConfig)。

use crate::catalog::{DEFAULT_STRATEGY_ID, StrategyCatalog};
use crate::error::SentinelResult;
use crate::models::{AppConfig, Strategy, UserConfigRaw};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub fn load_and_build_config() -> SentinelResult<(AppConfig, StrategyCatalog)> {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    load_from_dir(&manifest_dir)
}

/// 以 `root` 为根目录读取 config.json 与自定义方案文件。
pub fn load_from_dir(root: &Path) -> SentinelResult<(AppConfig, StrategyCatalog)> {
    let raw_config: UserConfigRaw = serde_json::from_str(&fs::read_to_string(root.join("config.json"))?)?;

    let custom = load_custom_strategies(&root.join(&raw_config.custom_strategies_path))?;
    let strategies = StrategyCatalog::with_custom(custom);

    let app_config = build_app_config(&raw_config, root, &strategies);
    Ok((app_config, strategies))
}

/// 自定义方案文件不存在时视为没有自定义方案。
fn load_custom_strategies(path: &Path) -> SentinelResult<BTreeMap<String, Strategy>> {
    if !path.exists() {
        debug!("自定义方案文件不存在：{}", path.display());
        return Ok(BTreeMap::new());
    }
    let custom: BTreeMap<String, Strategy> = serde_json::from_str(&fs::read_to_string(path)?)?;
    debug!("加载 {} 个自定义方案", custom.len());
    Ok(custom)
}

fn build_app_config(raw_config: &UserConfigRaw, root: &Path, strategies: &StrategyCatalog) -> AppConfig {
    let active_strategy = match raw_config.active_strategy.as_deref() {
        Some(id) if strategies.contains(id) => id.to_string(),
        Some(id) => {
            warn!("配置中的方案 {} 不存在，使用 {}", id, DEFAULT_STRATEGY_ID);
            DEFAULT_STRATEGY_ID.to_string()
        }
        None => DEFAULT_STRATEGY_ID.to_string(),
    };

    AppConfig {
        active_strategy,
        snapshot_dir: root.join(&raw_config.snapshot_dir),
        top_items: raw_config.top_items,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SentinelError;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("atlas_sentinel_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).expect("create scratch dir");
        dir
    }

    #[test]
    fn defaults_apply_to_minimal_config() {
        let dir = scratch_dir("minimal");
        fs::write(dir.join("config.json"), "{}").expect("write config");

        let (config, strategies) = load_from_dir(&dir).expect("load");
        assert_eq!(config.active_strategy, DEFAULT_STRATEGY_ID);
        assert_eq!(config.snapshot_dir, dir.join("snapshots"));
        assert_eq!(config.top_items, 10);
        assert!(strategies.custom().is_empty());
    }

    #[test]
    fn custom_strategy_can_be_active() {
        let dir = scratch_dir("custom");
        fs::create_dir_all(dir.join("data")).expect("data dir");
        fs::write(dir.join("config.json"), r#"{"active_strategy":"custom-1","top_items":3}"#).expect("write config");
        fs::write(
            dir.join("data/CustomStrategies.json"),
            r#"{"custom-1":{"name":"Ritual Only","tagWeights":{"ritual":2.5}}}"#,
        )
        .expect("write strategies");

        let (config, strategies) = load_from_dir(&dir).expect("load");
        assert_eq!(config.active_strategy, "custom-1");
        assert_eq!(config.top_items, 3);
        assert_eq!(strategies.resolve_strategy("custom-1").name, "Ritual Only");
    }

    #[test]
    fn unknown_active_strategy_falls_back() {
        let dir = scratch_dir("fallback");
        fs::write(dir.join("config.json"), r#"{"active_strategy":"Nope"}"#).expect("write config");
        let (config, _) = load_from_dir(&dir).expect("load");
        assert_eq!(config.active_strategy, DEFAULT_STRATEGY_ID);
    }

    #[test]
    fn missing_or_broken_config_is_an_error() {
        let dir = scratch_dir("broken");
        assert!(matches!(load_from_dir(&dir), Err(SentinelError::Io(_))));
        fs::write(dir.join("config.json"), "{ not json").expect("write config");
        assert!(matches!(load_from_dir(&dir), Err(SentinelError::Json(_))));
    }
}
