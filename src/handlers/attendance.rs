use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::middlewares::RequireRole;
use crate::models::*;
use crate::services::AttendanceService;

#[utoipa::path(
    post,
    path = "/attendance",
    tag = "attendance",
    request_body = CreateAttendanceRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "记录考勤成功", body = AttendanceResponse),
        (status = 400, description = "该用户今日已记录"),
        (status = 403, description = "仅管理员可访问"),
        (status = 404, description = "用户不存在")
    )
)]
pub async fn create_attendance(
    attendance_service: web::Data<AttendanceService>,
    request: web::Json<CreateAttendanceRequest>,
) -> Result<HttpResponse> {
    match attendance_service
        .create_attendance(request.into_inner())
        .await
    {
        Ok(record) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": record
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/attendance",
    tag = "attendance",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "全部考勤记录", body = [AttendanceResponse]),
        (status = 403, description = "仅管理员可访问")
    )
)]
pub async fn list_attendance(
    attendance_service: web::Data<AttendanceService>,
) -> Result<HttpResponse> {
    match attendance_service.list_all().await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": list
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/attendance/today",
    tag = "attendance",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "今日考勤", body = [AttendanceResponse]),
        (status = 403, description = "仅管理员可访问")
    )
)]
pub async fn today_attendance(
    attendance_service: web::Data<AttendanceService>,
) -> Result<HttpResponse> {
    match attendance_service.today().await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": list
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/attendance/history",
    tag = "attendance",
    params(AttendanceQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "考勤历史（分页）"),
        (status = 403, description = "仅管理员可访问")
    )
)]
pub async fn attendance_history(
    attendance_service: web::Data<AttendanceService>,
    query: web::Query<AttendanceQuery>,
) -> Result<HttpResponse> {
    match attendance_service.history(&query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": page
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn attendance_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/attendance")
            .wrap(RequireRole::admin())
            .route("", web::post().to(create_attendance))
            .route("", web::get().to(list_attendance))
            .route("/today", web::get().to(today_attendance))
            .route("/history", web::get().to(attendance_history)),
    );
}
