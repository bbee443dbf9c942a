use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{AttendanceStatus, CashSessionStatus, PaymentType, Role, TransactionStatus};
use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::login,
        handlers::user::list_users,
        handlers::item::list_items,
        handlers::item::get_item,
        handlers::item::list_public_items,
        handlers::item::get_public_item,
        handlers::item::create_item,
        handlers::item::bulk_create_items,
        handlers::item::update_item,
        handlers::item::delete_item,
        handlers::item::export_items,
        handlers::transaction::create_transaction,
        handlers::transaction::list_transactions,
        handlers::transaction::transaction_history,
        handlers::transaction::list_drafts,
        handlers::transaction::get_transaction,
        handlers::transaction::update_transaction,
        handlers::transaction::delete_transaction,
        handlers::transaction::checkout_transaction,
        handlers::transaction::refund_transaction,
        handlers::cash_session::open_session,
        handlers::cash_session::current_session,
        handlers::cash_session::close_session,
        handlers::cash_session::session_history,
        handlers::dashboard::get_dashboard,
        handlers::attendance::create_attendance,
        handlers::attendance::list_attendance,
        handlers::attendance::today_attendance,
        handlers::attendance::attendance_history,
    ),
    components(
        schemas(
            Role,
            TransactionStatus,
            PaymentType,
            CashSessionStatus,
            AttendanceStatus,
            LoginRequest,
            LoginResponse,
            UserResponse,
            ItemRequest,
            ItemResponse,
            CashierItemResponse,
            CreateTransactionRequest,
            TransactionLineRequest,
            UpdateTransactionRequest,
            CheckoutRequest,
            TransactionResponse,
            TransactionLineResponse,
            TransactionOutcome,
            OpenCashSessionRequest,
            CloseCashSessionRequest,
            CashSessionResponse,
            CreateAttendanceRequest,
            AttendanceResponse,
            DashboardResponse,
            TopItem,
            ApiError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Authentication API"),
        (name = "user", description = "User management API"),
        (name = "item", description = "Item catalog API"),
        (name = "public", description = "Public read-only catalog API"),
        (name = "transaction", description = "Transaction and checkout API"),
        (name = "cash_session", description = "Cash drawer session API"),
        (name = "dashboard", description = "Dashboard summary API"),
        (name = "attendance", description = "Attendance API"),
    ),
    info(
        title = "POS Backend API",
        version = "1.0.0",
        description = "Point-of-sale backend REST API documentation"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
