pub mod config;
pub mod database;
pub mod entities;
pub mod error;
pub mod external;
pub mod handlers;
pub mod middlewares;
pub mod models;
pub mod services;
pub mod swagger;
pub mod tasks;
pub mod utils;

pub use config::Config;
pub use error::{AppError, AppResult};

use actix_web::web;
use sea_orm::DatabaseConnection;

use services::*;
use utils::{JwtService, StockUnderflowPolicy};

/// Every request-scoped service, built once at startup and shared by all workers.
#[derive(Clone)]
pub struct AppServices {
    pub auth: AuthService,
    pub user: UserService,
    pub item: ItemService,
    pub transaction: TransactionService,
    pub cash_session: CashSessionService,
    pub dashboard: DashboardService,
    pub attendance: AttendanceService,
}

impl AppServices {
    pub fn new(
        pool: DatabaseConnection,
        jwt_service: JwtService,
        notifier: NotificationService,
        stock_policy: StockUnderflowPolicy,
    ) -> Self {
        let user = UserService::new(pool.clone());
        Self {
            auth: AuthService::new(user.clone(), jwt_service),
            user,
            item: ItemService::new(pool.clone()),
            transaction: TransactionService::new(pool.clone(), notifier, stock_policy),
            cash_session: CashSessionService::new(pool.clone()),
            dashboard: DashboardService::new(pool.clone()),
            attendance: AttendanceService::new(pool),
        }
    }

    /// Registers services and extractor configs as app data.
    pub fn register(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.auth.clone()))
            .app_data(web::Data::new(self.user.clone()))
            .app_data(web::Data::new(self.item.clone()))
            .app_data(web::Data::new(self.transaction.clone()))
            .app_data(web::Data::new(self.cash_session.clone()))
            .app_data(web::Data::new(self.dashboard.clone()))
            .app_data(web::Data::new(self.attendance.clone()))
            // 请求体与查询参数解析失败统一返回 400 信封
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                AppError::ValidationError(err.to_string()).into()
            }))
            .app_data(web::QueryConfig::default().error_handler(|err, _req| {
                AppError::ValidationError(err.to_string()).into()
            }))
            .app_data(web::PathConfig::default().error_handler(|err, _req| {
                AppError::ValidationError(err.to_string()).into()
            }));
    }
}
