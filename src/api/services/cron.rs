use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::api::ApiSettings;
use crate::views::{ViewManager, ViewStore};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CleanupResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CleanupResponse {
    fn failed(message: &str) -> Self {
        Self {
            success: false,
            deleted: None,
            error: Some(message.to_string()),
        }
    }
}

pub struct CronService;

impl CronService {
    /// 定时任务入口：删除所有过期的浏览去重记录
    pub async fn cleanup_views(
        req: HttpRequest,
        store: web::Data<Arc<dyn ViewStore>>,
        settings: web::Data<ApiSettings>,
    ) -> impl Responder {
        if !settings.cron_authorized(req.headers()) {
            warn!("Rejected unauthorized cron request");
            return HttpResponse::Unauthorized().json(CleanupResponse::failed("Unauthorized"));
        }

        match ViewManager::cleanup_expired(store.get_ref().as_ref()).await {
            Ok(deleted) => {
                info!("Cron cleanup finished, {} view records deleted", deleted);
                HttpResponse::Ok().json(CleanupResponse {
                    success: true,
                    deleted: Some(deleted),
                    error: None,
                })
            }
            Err(e) => {
                error!("Cron cleanup failed: {}", e);
                HttpResponse::InternalServerError()
                    .json(CleanupResponse::failed("Failed to clean up expired views"))
            }
        }
    }
}

pub fn cron_routes() -> actix_web::Scope {
    web::scope("/cron")
        .route("/cleanup-views", web::get().to(CronService::cleanup_views))
        .route("/cleanup-views", web::post().to(CronService::cleanup_views))
}
