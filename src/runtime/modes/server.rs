//! Server mode
//!
//! Starts the HTTP server with the view, cron and health routes.

use std::sync::Arc;

use actix_web::{
    App, HttpServer,
    middleware::{Compress, DefaultHeaders},
    web,
};
use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::api::services::{AppStartTime, cron_routes, health_routes, view_routes};
use crate::runtime::lifetime;
use crate::system::shutdown_signal;
use crate::views::ViewCleanupTask;

/// Run the HTTP server
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server() -> Result<()> {
    let app_start_time = AppStartTime {
        start_datetime: chrono::Utc::now(),
    };

    let startup = lifetime::prepare_server_startup().await.map_err(|e| {
        tracing::error!("Server startup failed: {}", e);
        e
    })?;

    let config = crate::config::get_config();
    let cpu_count = config.server.cpu_count.clamp(1, 32);
    warn!("Using {} CPU cores for the server", cpu_count);

    // 进程内定期清理（可选，默认交给外部 cron）
    let cleanup_handle = if config.views.cleanup_interval_hours > 0 {
        let task = Arc::new(ViewCleanupTask::new(
            startup.view_store.clone(),
            config.views.cleanup_interval_hours,
        ));
        Some(task.spawn_background_task())
    } else {
        info!("In-process view cleanup disabled, relying on the cron endpoint");
        None
    };

    let storage = startup.storage.clone();
    let view_store = startup.view_store.clone();
    let settings = startup.settings.clone();

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Compress::default())
            .wrap(DefaultHeaders::new().add(("Cache-Control", "no-cache, no-store, must-revalidate")))
            .app_data(web::Data::new(storage.clone()))
            .app_data(web::Data::new(view_store.clone()))
            .app_data(web::Data::new(settings.clone()))
            .app_data(web::Data::new(app_start_time.clone()))
            .service(health_routes())
            .service(web::scope("/api").service(view_routes()).service(cron_routes()))
    })
    .keep_alive(std::time::Duration::from_secs(30))
    .client_request_timeout(std::time::Duration::from_millis(5000))
    .workers(cpu_count)
    .disable_signals();

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    warn!("Starting server at http://{}", bind_address);
    let server = server
        .bind(&bind_address)
        .with_context(|| format!("Failed to bind {}", bind_address))?
        .run();

    let handle = server.handle();
    tokio::spawn(async move {
        shutdown_signal().await;
        handle.stop(true).await;
    });

    server.await?;

    if let Some(handle) = cleanup_handle {
        handle.abort();
    }
    if let Err(e) = startup.storage.get_db().clone().close().await {
        warn!("Failed to close database connection: {}", e);
    }
    warn!("Graceful shutdown complete");

    Ok(())
}
