use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::handlers::audit_context;
use crate::middlewares::AuthUser;
use crate::models::*;
use crate::services::ItemService;

#[utoipa::path(
    get,
    path = "/items",
    tag = "item",
    params(ItemQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取商品列表成功，管理员可见进价"),
        (status = 401, description = "未授权")
    )
)]
pub async fn list_items(
    item_service: web::Data<ItemService>,
    user: AuthUser,
    query: web::Query<ItemQuery>,
) -> Result<HttpResponse> {
    let access = FieldAccess::from(user.role);
    match item_service.list_items(&query, access).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": page
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/items/{id}",
    tag = "item",
    params(
        ("id" = i64, Path, description = "商品ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取商品成功"),
        (status = 401, description = "未授权"),
        (status = 404, description = "商品不存在")
    )
)]
pub async fn get_item(
    item_service: web::Data<ItemService>,
    user: AuthUser,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match item_service.get_item(path.into_inner()).await {
        Ok(item) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": ItemView::project(item, user.role.into())
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/public/items",
    tag = "public",
    params(ItemQuery),
    responses(
        (status = 200, description = "公开商品列表（不含进价）")
    )
)]
pub async fn list_public_items(
    item_service: web::Data<ItemService>,
    query: web::Query<ItemQuery>,
) -> Result<HttpResponse> {
    match item_service
        .list_items(&query, FieldAccess::for_caller(None))
        .await
    {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": page
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/public/items/{id}",
    tag = "public",
    params(
        ("id" = i64, Path, description = "商品ID")
    ),
    responses(
        (status = 200, description = "公开商品详情（不含进价）", body = CashierItemResponse),
        (status = 404, description = "商品不存在")
    )
)]
pub async fn get_public_item(
    item_service: web::Data<ItemService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match item_service.get_item(path.into_inner()).await {
        Ok(item) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": ItemView::project(item, FieldAccess::for_caller(None))
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/items",
    tag = "item",
    request_body = ItemRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "创建商品成功"),
        (status = 400, description = "参数错误或名称重复"),
        (status = 401, description = "未授权")
    )
)]
pub async fn create_item(
    item_service: web::Data<ItemService>,
    req: HttpRequest,
    user: AuthUser,
    request: web::Json<ItemRequest>,
) -> Result<HttpResponse> {
    let ctx = audit_context(&req, &user);
    match item_service.create_item(&ctx, request.into_inner()).await {
        Ok(item) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": ItemView::project(item, user.role.into())
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/items/bulk",
    tag = "item",
    request_body = Vec<ItemRequest>,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "批量创建成功"),
        (status = 400, description = "任一商品无效时整体失败"),
        (status = 401, description = "未授权")
    )
)]
pub async fn bulk_create_items(
    item_service: web::Data<ItemService>,
    req: HttpRequest,
    user: AuthUser,
    request: web::Json<Vec<ItemRequest>>,
) -> Result<HttpResponse> {
    let ctx = audit_context(&req, &user);
    let access = FieldAccess::from(user.role);
    match item_service.bulk_create_items(&ctx, request.into_inner()).await {
        Ok(items) => {
            let count = items.len();
            let data: Vec<ItemView> = items
                .into_iter()
                .map(|m| ItemView::project(m, access))
                .collect();
            Ok(HttpResponse::Created().json(json!({
                "success": true,
                "data": data,
                "message": format!("{count} items created")
            })))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/items/{id}",
    tag = "item",
    params(
        ("id" = i64, Path, description = "商品ID")
    ),
    request_body = ItemRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "更新商品成功"),
        (status = 400, description = "参数错误或名称重复"),
        (status = 404, description = "商品不存在")
    )
)]
pub async fn update_item(
    item_service: web::Data<ItemService>,
    req: HttpRequest,
    user: AuthUser,
    path: web::Path<i64>,
    request: web::Json<ItemRequest>,
) -> Result<HttpResponse> {
    let ctx = audit_context(&req, &user);
    match item_service
        .update_item(&ctx, path.into_inner(), request.into_inner())
        .await
    {
        Ok(item) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": ItemView::project(item, user.role.into())
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/items/{id}",
    tag = "item",
    params(
        ("id" = i64, Path, description = "商品ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "删除商品成功"),
        (status = 404, description = "商品不存在")
    )
)]
pub async fn delete_item(
    item_service: web::Data<ItemService>,
    req: HttpRequest,
    user: AuthUser,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let ctx = audit_context(&req, &user);
    match item_service.delete_item(&ctx, path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::message("Item deleted"))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/items/export",
    tag = "item",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "导出 CSV", content_type = "text/csv"),
        (status = 401, description = "未授权")
    )
)]
pub async fn export_items(
    item_service: web::Data<ItemService>,
    user: AuthUser,
) -> Result<HttpResponse> {
    match item_service.export_csv(user.role.into()).await {
        Ok(csv) => Ok(HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header(("Content-Disposition", "attachment; filename=\"items.csv\""))
            .body(csv)),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn item_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/items")
            .route("", web::get().to(list_items))
            .route("", web::post().to(create_item))
            .route("/bulk", web::post().to(bulk_create_items))
            .route("/export", web::get().to(export_items))
            .route("/{id}", web::get().to(get_item))
            .route("/{id}", web::put().to(update_item))
            .route("/{id}", web::delete().to(delete_item)),
    )
    .service(
        web::scope("/public/items")
            .route("", web::get().to(list_public_items))
            .route("/{id}", web::get().to(get_public_item)),
    );
}
