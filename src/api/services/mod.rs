pub mod cron;
pub mod health;
pub mod views;

pub use cron::{CleanupResponse, CronService, cron_routes};
pub use health::{AppStartTime, HealthService, health_routes};
pub use views::{RecordViewRequest, ViewService, record_view_json_config, view_routes};
