use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::middlewares::RequireRole;
use crate::models::*;
use crate::services::UserService;

#[utoipa::path(
    get,
    path = "/users",
    tag = "user",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取用户列表成功", body = [UserResponse]),
        (status = 401, description = "未授权"),
        (status = 403, description = "仅管理员可访问")
    )
)]
pub async fn list_users(user_service: web::Data<UserService>) -> Result<HttpResponse> {
    match user_service.list_users().await {
        Ok(users) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": users
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn user_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .wrap(RequireRole::admin())
            .route("", web::get().to(list_users)),
    );
}
