//! One-shot CLI commands

use anyhow::{Context, Result};
use colored::Colorize;

use crate::config::StaticConfig;
use crate::storage::StorageFactory;
use crate::views::ViewManager;

/// 立即清理一次过期的浏览记录
pub async fn run_cleanup() -> Result<()> {
    let storage = StorageFactory::create()
        .await
        .context("Failed to create storage backend")?;

    let deleted = ViewManager::cleanup_expired(storage.as_ref()).await?;
    println!(
        "{} {} expired view record(s) deleted",
        "✓".green().bold(),
        deleted.to_string().cyan()
    );
    Ok(())
}

/// 输出示例配置；指定路径时写入文件
pub fn run_config_gen(output: Option<&str>) -> Result<()> {
    match output {
        Some(path) => {
            StaticConfig::default().save_to_file(path)?;
            println!("{} Sample config written to {}", "✓".green().bold(), path);
        }
        None => {
            print!("{}", StaticConfig::generate_sample_config()?);
        }
    }
    Ok(())
}
