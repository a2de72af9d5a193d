//! HTTP API 集成测试
//!
//! 覆盖 /api/views、/api/cron/cleanup-views 与 /health，存储使用临时 SQLite。

use std::sync::{Arc, Once};

use actix_web::http::StatusCode;
use actix_web::http::header::AUTHORIZATION;
use actix_web::test::{self, TestRequest};
use actix_web::{App, web};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use sea_orm::{ActiveModelTrait, ActiveValue::Set, EntityTrait};
use serde_json::{Value, json};
use tempfile::TempDir;

use migration::entities::{grant, rfp, view};
use opentribe::api::ApiSettings;
use opentribe::api::services::{AppStartTime, cron_routes, health_routes, view_routes};
use opentribe::api::session::{SessionClaims, SessionVerifier};
use opentribe::config::init_config;
use opentribe::errors::{OpentribeError, Result};
use opentribe::storage::SeaOrmStorage;
use opentribe::views::{CounterRef, ViewRecord, ViewStore, ViewTarget, Viewer};

static INIT: Once = Once::new();

fn init_static_config() {
    INIT.call_once(|| {
        init_config();
    });
}

const JWT_SECRET: &str = "test-session-secret";
const CRON_SECRET: &str = "test-cron-secret";

fn settings() -> ApiSettings {
    ApiSettings {
        expire_hours: 24,
        session: Some(Arc::new(SessionVerifier::new(JWT_SECRET))),
        cron_secret: CRON_SECRET.to_string(),
    }
}

fn session_token(sub: &str) -> String {
    let now = Utc::now();
    let claims = SessionClaims {
        sub: sub.to_string(),
        exp: (now + Duration::hours(1)).timestamp(),
        iat: Some(now.timestamp()),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("签发测试令牌失败")
}

/// 所有操作都失败的存储
struct FailingStore;

#[async_trait]
impl ViewStore for FailingStore {
    async fn find_active_view(
        &self,
        _entity: &str,
        _viewer: &Viewer,
        _now: DateTime<Utc>,
    ) -> Result<Option<ViewRecord>> {
        Err(OpentribeError::database_operation("connection refused"))
    }

    async fn insert_view(&self, _view: &ViewRecord) -> Result<()> {
        Err(OpentribeError::database_operation("connection refused"))
    }

    async fn increment_view_count(&self, _counter: CounterRef<'_>) -> Result<u64> {
        Err(OpentribeError::database_operation("connection refused"))
    }

    async fn delete_expired_views(&self, _now: DateTime<Utc>) -> Result<u64> {
        Err(OpentribeError::database_operation("connection refused"))
    }
}

macro_rules! api_app {
    ($store:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($store))
                .app_data(web::Data::new(settings()))
                .service(web::scope("/api").service(view_routes()).service(cron_routes())),
        )
        .await
    };
}

async fn create_storage() -> (TempDir, Arc<SeaOrmStorage>) {
    init_static_config();
    let temp_dir = TempDir::new().expect("创建临时目录失败");
    let db_path = temp_dir.path().join("api_test.db");
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let storage = SeaOrmStorage::new(&db_url, "sqlite")
        .await
        .expect("创建 SQLite 存储失败");
    (temp_dir, Arc::new(storage))
}

fn as_view_store(storage: &Arc<SeaOrmStorage>) -> Arc<dyn ViewStore> {
    storage.clone()
}

async fn seed_grant(storage: &SeaOrmStorage, id: &str) {
    grant::ActiveModel {
        id: Set(id.to_string()),
        view_count: Set(0),
        created_at: Set(Utc::now()),
    }
    .insert(storage.get_db())
    .await
    .expect("插入 grant 失败");
}

async fn seed_rfp(storage: &SeaOrmStorage, id: &str) {
    rfp::ActiveModel {
        id: Set(id.to_string()),
        view_count: Set(0),
        created_at: Set(Utc::now()),
    }
    .insert(storage.get_db())
    .await
    .expect("插入 rfp 失败");
}

async fn view_rows(storage: &SeaOrmStorage) -> Vec<view::Model> {
    view::Entity::find()
        .all(storage.get_db())
        .await
        .expect("查询 views 失败")
}

// =============================================================================
// POST /api/views
// =============================================================================

#[actix_rt::test]
async fn test_record_view_by_forwarded_ip() {
    let (_dir, storage) = create_storage().await;
    seed_grant(&storage, "g1").await;
    let app = api_app!(as_view_store(&storage));

    let req = TestRequest::post()
        .uri("/api/views")
        .insert_header(("X-Forwarded-For", "203.0.113.5, 10.0.0.1"))
        .set_json(json!({"entity": "grant:g1"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"created": true}));

    let views = view_rows(&storage).await;
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].user_ip.as_deref(), Some("203.0.113.5"));
    assert_eq!(
        storage.view_count(ViewTarget::Grant, "g1").await.unwrap(),
        Some(1)
    );

    // 同一 IP 再次浏览
    let req = TestRequest::post()
        .uri("/api/views")
        .insert_header(("X-Forwarded-For", "203.0.113.5"))
        .set_json(json!({"entity": "grant:g1"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"created": false}));
    assert_eq!(
        storage.view_count(ViewTarget::Grant, "g1").await.unwrap(),
        Some(1)
    );
}

#[actix_rt::test]
async fn test_record_view_by_session_user() {
    let (_dir, storage) = create_storage().await;
    seed_rfp(&storage, "r1").await;
    let app = api_app!(as_view_store(&storage));

    let req = TestRequest::post()
        .uri("/api/views")
        .insert_header((AUTHORIZATION, format!("Bearer {}", session_token("user-42"))))
        .insert_header(("X-Real-IP", "198.51.100.1"))
        .set_json(json!({"entity": "rfp:r1"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let views = view_rows(&storage).await;
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].user_id.as_deref(), Some("user-42"));
    assert!(views[0].user_ip.is_none());
    assert_eq!(
        storage.view_count(ViewTarget::Rfp, "r1").await.unwrap(),
        Some(1)
    );
}

#[actix_rt::test]
async fn test_invalid_session_falls_back_to_ip() {
    let (_dir, storage) = create_storage().await;
    let app = api_app!(as_view_store(&storage));

    let req = TestRequest::post()
        .uri("/api/views")
        .insert_header((AUTHORIZATION, "Bearer not-a-jwt"))
        .insert_header(("CF-Connecting-IP", "192.0.2.8"))
        .set_json(json!({"entity": "submission:s1"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let views = view_rows(&storage).await;
    assert_eq!(views.len(), 1);
    assert!(views[0].user_id.is_none());
    assert_eq!(views[0].user_ip.as_deref(), Some("192.0.2.8"));
}

#[actix_rt::test]
async fn test_empty_forwarded_for_falls_back_to_real_ip() {
    let (_dir, storage) = create_storage().await;
    let app = api_app!(as_view_store(&storage));

    let req = TestRequest::post()
        .uri("/api/views")
        .insert_header(("X-Forwarded-For", ""))
        .insert_header(("X-Real-IP", "198.51.100.7"))
        .set_json(json!({"entity": "grant:g1"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let views = view_rows(&storage).await;
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].user_ip.as_deref(), Some("198.51.100.7"));
}

#[actix_rt::test]
async fn test_record_view_without_identity_is_bad_request() {
    let (_dir, storage) = create_storage().await;
    let app = api_app!(as_view_store(&storage));

    let req = TestRequest::post()
        .uri("/api/views")
        .set_json(json!({"entity": "grant:g1"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body,
        json!({"created": false, "error": "No user ID or IP provided"})
    );
    assert!(view_rows(&storage).await.is_empty());
}

#[actix_rt::test]
async fn test_record_view_malformed_entity_is_bad_request() {
    let (_dir, storage) = create_storage().await;
    let app = api_app!(as_view_store(&storage));

    let req = TestRequest::post()
        .uri("/api/views")
        .insert_header(("X-Forwarded-For", "203.0.113.5"))
        .set_json(json!({"entity": "grant:"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["created"], json!(false));
    assert_eq!(
        body["error"],
        json!("Invalid entity format. Expected 'type:id'")
    );
    assert!(view_rows(&storage).await.is_empty());
}

#[actix_rt::test]
async fn test_record_view_unparsable_body_is_json_bad_request() {
    let (_dir, storage) = create_storage().await;
    let app = api_app!(as_view_store(&storage));

    for body in ["", "not json", r#"{"other": 1}"#] {
        let req = TestRequest::post()
            .uri("/api/views")
            .insert_header(("Content-Type", "application/json"))
            .insert_header(("X-Forwarded-For", "203.0.113.5"))
            .set_payload(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(
            body,
            json!({"created": false, "error": "Invalid entity format. Expected 'type:id'"})
        );
    }
    assert!(view_rows(&storage).await.is_empty());
}

#[actix_rt::test]
async fn test_record_view_storage_failure_is_server_error() {
    init_static_config();
    let store: Arc<dyn ViewStore> = Arc::new(FailingStore);
    let app = api_app!(store);

    let req = TestRequest::post()
        .uri("/api/views")
        .insert_header(("X-Forwarded-For", "203.0.113.5"))
        .set_json(json!({"entity": "grant:g1"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["created"], json!(false));
    assert!(body["error"].is_string());
}

// =============================================================================
// /api/cron/cleanup-views
// =============================================================================

async fn seed_views(store: &SeaOrmStorage, expired: usize, active: usize) {
    let now = Utc::now();
    let viewer = Viewer::Ip("203.0.113.5".to_string());
    for i in 0..expired {
        let record = ViewRecord::new(&format!("grant:old{}", i), &viewer, now - Duration::hours(1));
        store.insert_view(&record).await.unwrap();
    }
    for i in 0..active {
        let record = ViewRecord::new(&format!("grant:new{}", i), &viewer, now + Duration::hours(1));
        store.insert_view(&record).await.unwrap();
    }
}

#[actix_rt::test]
async fn test_cron_cleanup_requires_secret() {
    let (_dir, storage) = create_storage().await;
    seed_views(&storage, 2, 0).await;
    let app = api_app!(as_view_store(&storage));

    let req = TestRequest::get().uri("/api/cron/cleanup-views").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = TestRequest::get()
        .uri("/api/cron/cleanup-views")
        .insert_header((AUTHORIZATION, "Bearer wrong-secret"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    assert_eq!(view_rows(&storage).await.len(), 2);
}

#[actix_rt::test]
async fn test_cron_cleanup_deletes_expired() {
    let (_dir, storage) = create_storage().await;
    seed_views(&storage, 3, 2).await;
    let app = api_app!(as_view_store(&storage));

    let req = TestRequest::post()
        .uri("/api/cron/cleanup-views")
        .insert_header((AUTHORIZATION, format!("Bearer {}", CRON_SECRET)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"success": true, "deleted": 3}));
    assert_eq!(view_rows(&storage).await.len(), 2);

    let req = TestRequest::get()
        .uri("/api/cron/cleanup-views")
        .insert_header((AUTHORIZATION, format!("Bearer {}", CRON_SECRET)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["deleted"], json!(0));
}

#[actix_rt::test]
async fn test_cron_cleanup_storage_failure() {
    init_static_config();
    let store: Arc<dyn ViewStore> = Arc::new(FailingStore);
    let app = api_app!(store);

    let req = TestRequest::post()
        .uri("/api/cron/cleanup-views")
        .insert_header((AUTHORIZATION, format!("Bearer {}", CRON_SECRET)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], json!(false));
}

// =============================================================================
// /health
// =============================================================================

#[actix_rt::test]
async fn test_health_check_with_sqlite() {
    let (_dir, storage) = create_storage().await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(storage))
            .app_data(web::Data::new(AppStartTime {
                start_datetime: Utc::now(),
            }))
            .service(health_routes()),
    )
    .await;

    let req = TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], json!("healthy"));
    assert_eq!(body["database"]["backend"], json!("sqlite"));
}
