use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use tracing::{error, trace};

use crate::api::ApiSettings;
use crate::views::{RecordOutcome, RecordRejection, ViewManager, ViewManagerOptions, ViewStore};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordViewRequest {
    /// "{type}:{id}"
    pub entity: String,
}

pub struct ViewService;

impl ViewService {
    /// 记录一次浏览
    ///
    /// 身份：有效会话令牌的用户 id，否则为代理头解析出的客户端 IP。
    /// 400 表示输入被拒绝，500 表示存储失败。
    pub async fn record_view(
        req: HttpRequest,
        body: web::Json<RecordViewRequest>,
        store: web::Data<Arc<dyn ViewStore>>,
        settings: web::Data<ApiSettings>,
    ) -> impl Responder {
        let user_id = settings.user_id(req.headers());
        let user_ip = if user_id.is_none() {
            ViewManager::extract_client_ip(req.headers())
        } else {
            None
        };
        trace!(
            "Record view request: entity={}, authenticated={}",
            body.entity,
            user_id.is_some()
        );

        let manager = ViewManager::new(
            store.get_ref().clone(),
            ViewManagerOptions {
                exp: Some(settings.expire_hours),
                user_id,
                user_ip,
            },
        );

        match manager.record_view_for_entity(&body.entity).await {
            Ok(outcome) if outcome.is_rejected() => HttpResponse::BadRequest().json(outcome),
            Ok(outcome) => HttpResponse::Ok().json(outcome),
            Err(e) => {
                error!("Failed to record view for {}: {}", body.entity, e);
                HttpResponse::InternalServerError()
                    .json(RecordOutcome::failed("Internal server error"))
            }
        }
    }
}

/// 请求体缺失或无法解析时，按实体格式错误返回 `RecordOutcome` JSON
pub fn record_view_json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(4096)
        .error_handler(|err, _req| {
            trace!("Rejected record view body: {}", err);
            let response = HttpResponse::BadRequest()
                .json(RecordOutcome::rejected(RecordRejection::InvalidEntityFormat));
            actix_web::error::InternalError::from_response(err, response).into()
        })
}

pub fn view_routes() -> actix_web::Scope {
    web::scope("/views")
        .app_data(record_view_json_config())
        .route("", web::post().to(ViewService::record_view))
}
