pub mod attendance;
pub mod auth;
pub mod cash_session;
pub mod dashboard;
pub mod item;
pub mod transaction;
pub mod user;

pub use attendance::attendance_config;
pub use auth::auth_config;
pub use cash_session::cash_session_config;
pub use dashboard::dashboard_config;
pub use item::item_config;
pub use transaction::transaction_config;
pub use user::user_config;

use actix_web::{HttpRequest, web};
use crate::middlewares::AuthUser;
use crate::services::AuditContext;

/// 审计信息：操作者与来源 IP
pub(crate) fn audit_context(req: &HttpRequest, user: &AuthUser) -> AuditContext {
    let ip = req
        .connection_info()
        .realip_remote_addr()
        .map(str::to_string);
    AuditContext::new(Some(user.id), ip)
}

/// 注册 `/api/v1` 下的全部路由
pub fn api_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(auth_config)
            .configure(item_config)
            .configure(transaction_config)
            .configure(cash_session_config)
            .configure(dashboard_config)
            .configure(attendance_config)
            .configure(user_config),
    );
}
