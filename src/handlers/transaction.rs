use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::handlers::audit_context;
use crate::middlewares::AuthUser;
use crate::models::*;
use crate::services::TransactionService;

#[utoipa::path(
    post,
    path = "/transactions",
    tag = "transaction",
    request_body = CreateTransactionRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "创建交易成功，库存不足时附带 warnings", body = TransactionOutcome),
        (status = 400, description = "参数错误、付款不足或库存不足"),
        (status = 401, description = "未授权")
    )
)]
pub async fn create_transaction(
    transaction_service: web::Data<TransactionService>,
    req: HttpRequest,
    user: AuthUser,
    request: web::Json<CreateTransactionRequest>,
) -> Result<HttpResponse> {
    let ctx = audit_context(&req, &user);
    match transaction_service
        .create_transaction(&ctx, request.into_inner())
        .await
    {
        Ok(outcome) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": outcome
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/transactions",
    tag = "transaction",
    params(TransactionQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取交易列表成功"),
        (status = 400, description = "日期格式错误"),
        (status = 401, description = "未授权")
    )
)]
pub async fn list_transactions(
    transaction_service: web::Data<TransactionService>,
    query: web::Query<TransactionQuery>,
) -> Result<HttpResponse> {
    match transaction_service.list_transactions(&query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": page
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/transactions/history",
    tag = "transaction",
    params(TransactionQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取已完成与已退款交易成功"),
        (status = 401, description = "未授权")
    )
)]
pub async fn transaction_history(
    transaction_service: web::Data<TransactionService>,
    query: web::Query<TransactionQuery>,
) -> Result<HttpResponse> {
    match transaction_service.history(&query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": page
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/transactions/drafts",
    tag = "transaction",
    params(DraftQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "按状态获取交易（默认草稿）", body = [TransactionResponse]),
        (status = 401, description = "未授权")
    )
)]
pub async fn list_drafts(
    transaction_service: web::Data<TransactionService>,
    query: web::Query<DraftQuery>,
) -> Result<HttpResponse> {
    match transaction_service.drafts(&query).await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": list
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/transactions/{id}",
    tag = "transaction",
    params(
        ("id" = i64, Path, description = "交易ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取交易成功", body = TransactionResponse),
        (status = 404, description = "交易不存在")
    )
)]
pub async fn get_transaction(
    transaction_service: web::Data<TransactionService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match transaction_service.get_transaction(path.into_inner()).await {
        Ok(t) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": t
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/transactions/{id}",
    tag = "transaction",
    params(
        ("id" = i64, Path, description = "交易ID")
    ),
    request_body = UpdateTransactionRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "更新草稿成功", body = TransactionResponse),
        (status = 400, description = "仅草稿可修改"),
        (status = 404, description = "交易不存在")
    )
)]
pub async fn update_transaction(
    transaction_service: web::Data<TransactionService>,
    req: HttpRequest,
    user: AuthUser,
    path: web::Path<i64>,
    request: web::Json<UpdateTransactionRequest>,
) -> Result<HttpResponse> {
    let ctx = audit_context(&req, &user);
    match transaction_service
        .update_transaction(&ctx, path.into_inner(), request.into_inner())
        .await
    {
        Ok(t) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": t
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/transactions/{id}",
    tag = "transaction",
    params(
        ("id" = i64, Path, description = "交易ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "删除草稿成功"),
        (status = 400, description = "仅草稿可删除"),
        (status = 404, description = "交易不存在")
    )
)]
pub async fn delete_transaction(
    transaction_service: web::Data<TransactionService>,
    req: HttpRequest,
    user: AuthUser,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let ctx = audit_context(&req, &user);
    match transaction_service
        .delete_transaction(&ctx, path.into_inner())
        .await
    {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::message("Transaction deleted"))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/transactions/{id}/checkout",
    tag = "transaction",
    params(
        ("id" = i64, Path, description = "交易ID")
    ),
    request_body = CheckoutRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "结账成功", body = TransactionOutcome),
        (status = 400, description = "非草稿、付款不足或库存不足"),
        (status = 404, description = "交易不存在")
    )
)]
pub async fn checkout_transaction(
    transaction_service: web::Data<TransactionService>,
    req: HttpRequest,
    user: AuthUser,
    path: web::Path<i64>,
    request: web::Json<CheckoutRequest>,
) -> Result<HttpResponse> {
    let ctx = audit_context(&req, &user);
    match transaction_service
        .checkout(&ctx, path.into_inner(), request.into_inner())
        .await
    {
        Ok(outcome) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": outcome
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/transactions/{id}/refund",
    tag = "transaction",
    params(
        ("id" = i64, Path, description = "交易ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "退款成功，库存已恢复", body = TransactionResponse),
        (status = 400, description = "仅已完成交易可退款"),
        (status = 404, description = "交易不存在")
    )
)]
pub async fn refund_transaction(
    transaction_service: web::Data<TransactionService>,
    req: HttpRequest,
    user: AuthUser,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let ctx = audit_context(&req, &user);
    match transaction_service.refund(&ctx, path.into_inner()).await {
        Ok(t) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": t
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn transaction_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/transactions")
            .route("", web::post().to(create_transaction))
            .route("", web::get().to(list_transactions))
            .route("/history", web::get().to(transaction_history))
            .route("/drafts", web::get().to(list_drafts))
            .route("/{id}", web::get().to(get_transaction))
            .route("/{id}", web::patch().to(update_transaction))
            .route("/{id}", web::delete().to(delete_transaction))
            .route("/{id}/checkout", web::post().to(checkout_transaction))
            .route("/{id}/refund", web::post().to(refund_transaction)),
    );
}
