use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::models::*;
use crate::services::DashboardService;

#[utoipa::path(
    get,
    path = "/dashboard",
    tag = "dashboard",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "仪表盘汇总", body = DashboardResponse),
        (status = 401, description = "未授权")
    )
)]
pub async fn get_dashboard(dashboard_service: web::Data<DashboardService>) -> Result<HttpResponse> {
    match dashboard_service.summary().await {
        Ok(summary) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": summary
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn dashboard_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/dashboard", web::get().to(get_dashboard));
}
