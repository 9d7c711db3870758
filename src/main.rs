//! src/main.rs
//!
//! 程序的主入口。
//! 读取剪贴板快照目录，解析并评分所有物品，打印库存排行与最佳 "1 + 3" 组合。

use atlas_sentinel::{calculator, config, utils, Inventory, SentinelResult};
use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // 1. 启动计时器
    let start_time = Instant::now();

    // 2. 加载配置与自定义方案
    let (app_config, strategies) = match config::load_and_build_config() {
        Ok((config, strategies)) => (config, strategies),
        Err(e) => {
            eprintln!("\n错误：加载配置失败。\n原因: {}", e);
            return;
        }
    };

    // 3. 读取所有快照并并行解析
    let snapshots = match read_snapshots(&app_config.snapshot_dir) {
        Ok(texts) => texts,
        Err(e) => {
            eprintln!("\n错误：读取快照目录 {} 失败。\n原因: {}", app_config.snapshot_dir.display(), e);
            return;
        }
    };

    let mut inventory = Inventory::new(strategies, &app_config.active_strategy);
    let added = inventory.ingest_texts(&snapshots);
    println!("\n方案：{}  快照：{}  有效物品：{}", inventory.active_strategy(), snapshots.len(), added);

    // 4. 库存排行
    let strategy = inventory.strategies().resolve_strategy(inventory.active_strategy());
    let mut ranked: Vec<_> = inventory.items().iter().collect();
    ranked.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.id.cmp(&b.id)));

    println!("\n{:<30} | {:<8} | {:<5} | {:<5} | {:>6} | 目标词缀", "名称", "类型", "阶级", "次数", "分数");
    println!("{:-<30}-+-{:-<10}-+-{:-<6}-+-{:-<6}-+-{:-<8}-+-{:-<12}", "", "", "", "", "", "");
    for item in ranked.iter().take(app_config.top_items) {
        let targets: Vec<&str> = calculator::target_mod_hits(item, strategy).iter().map(|m| m.id).collect();
        println!(
            "{:<30} | {:<8} | {:<5} | {:<5} | {:>6} | {}",
            utils::truncate_string(&item.name, 28),
            format!("{:?}", item.item_type),
            item.tier,
            item.uses,
            item.score.unwrap_or_default(),
            targets.join(", ")
        );
    }

    // 5. 最佳组合
    let sets = inventory.best_sets();
    if sets.is_empty() {
        println!("\n至少需要 1 个地图石和 3 个石板才能计算组合。");
    }
    for (rank, set) in sets.iter().enumerate() {
        println!("\n#{} 总分 {}", rank + 1, set.total_score);
        println!("  主物品：{}", utils::truncate_string(&set.primary.name, 40));
        for companion in &set.companions {
            println!("  石板  ：{}", utils::truncate_string(&companion.name, 40));
        }
    }

    // 6. 停止计时器并打印性能报告
    let duration = start_time.elapsed();
    println!("\n总计算耗时: {:.2?}", duration);
}

/// 按文件名顺序读取目录下所有 .txt 快照。
fn read_snapshots(dir: &Path) -> SentinelResult<Vec<String>> {
    let mut paths: Vec<_> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "txt"))
        .collect();
    paths.sort();

    let mut texts = Vec::with_capacity(paths.len());
    for path in paths {
        texts.push(fs::read_to_string(path)?);
    }
    Ok(texts)
}
