use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::middlewares::AuthUser;
use crate::models::*;
use crate::services::CashSessionService;

#[utoipa::path(
    post,
    path = "/cash-sessions",
    tag = "cash_session",
    request_body = OpenCashSessionRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "开班成功", body = CashSessionResponse),
        (status = 400, description = "已有未结束的班次"),
        (status = 401, description = "未授权")
    )
)]
pub async fn open_session(
    cash_session_service: web::Data<CashSessionService>,
    user: AuthUser,
    request: web::Json<OpenCashSessionRequest>,
) -> Result<HttpResponse> {
    match cash_session_service
        .open_session(user.id, request.into_inner())
        .await
    {
        Ok(session) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": session
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/cash-sessions/current",
    tag = "cash_session",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "当前班次", body = CashSessionResponse),
        (status = 404, description = "没有未结束的班次")
    )
)]
pub async fn current_session(
    cash_session_service: web::Data<CashSessionService>,
    user: AuthUser,
) -> Result<HttpResponse> {
    match cash_session_service.current_session(user.id).await {
        Ok(session) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": session
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/cash-sessions/close",
    tag = "cash_session",
    request_body = CloseCashSessionRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "结班对账成功", body = CashSessionResponse),
        (status = 400, description = "没有未结束的班次")
    )
)]
pub async fn close_session(
    cash_session_service: web::Data<CashSessionService>,
    user: AuthUser,
    request: web::Json<CloseCashSessionRequest>,
) -> Result<HttpResponse> {
    match cash_session_service
        .close_session(user.id, request.into_inner())
        .await
    {
        Ok(session) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": session
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/cash-sessions/history",
    tag = "cash_session",
    params(CashSessionQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "班次历史"),
        (status = 400, description = "日期格式错误")
    )
)]
pub async fn session_history(
    cash_session_service: web::Data<CashSessionService>,
    user: AuthUser,
    query: web::Query<CashSessionQuery>,
) -> Result<HttpResponse> {
    match cash_session_service.history(user.id, &query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": page
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn cash_session_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/cash-sessions")
            .route("", web::post().to(open_session))
            .route("/current", web::get().to(current_session))
            .route("/close", web::post().to(close_session))
            .route("/history", web::get().to(session_history)),
    );
}
