use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::api::ApiSettings;
use crate::storage::{SeaOrmStorage, StorageFactory};
use crate::views::ViewStore;

pub struct StartupContext {
    pub storage: Arc<SeaOrmStorage>,
    /// 同一个 storage，以 ViewStore trait object 形式交给路由
    pub view_store: Arc<dyn ViewStore>,
    pub settings: ApiSettings,
}

/// 准备服务器启动的上下文：存储、迁移、路由设置
pub async fn prepare_server_startup() -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    let storage = StorageFactory::create()
        .await
        .context("Failed to create storage backend")?;
    info!(
        "Using storage backend: {} (transactional views: {})",
        storage.backend_name(),
        storage.is_transactional()
    );

    let settings = ApiSettings::from_config();
    if settings.session.is_none() {
        info!("auth.jwt_secret not set, all views are attributed by client IP");
    }
    if settings.cron_secret.is_empty() {
        tracing::warn!("auth.cron_secret not set, cleanup endpoint is unauthenticated");
    }

    let view_store: Arc<dyn ViewStore> = storage.clone();

    debug!(
        "Pre-startup processing completed in {} ms",
        start_time.elapsed().as_millis()
    );

    Ok(StartupContext {
        storage,
        view_store,
        settings,
    })
}
