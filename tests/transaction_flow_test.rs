mod common;

use common::*;
use pos_backend::AppError;
use pos_backend::entities::{
    AuditAction, PaymentType, Role, TransactionStatus, item_entity as item,
    transaction_item_entity as trx_item,
};
use pos_backend::models::*;
use pos_backend::services::{AuditService, ItemService};
use pos_backend::utils::StockUnderflowPolicy;
use sea_orm::{EntityTrait, PaginatorTrait};

fn line(item_id: i64, quantity: i32, custom_price: Option<i64>) -> TransactionLineRequest {
    TransactionLineRequest {
        item_id,
        quantity,
        custom_price,
    }
}

fn completed(lines: Vec<TransactionLineRequest>, payment: i64) -> CreateTransactionRequest {
    CreateTransactionRequest {
        status: TransactionStatus::Completed,
        items: lines,
        discount: None,
        payment_amount: Some(payment),
        payment_type: None,
        note: None,
        transaction_type: None,
    }
}

fn draft(lines: Vec<TransactionLineRequest>) -> CreateTransactionRequest {
    CreateTransactionRequest {
        status: TransactionStatus::Draft,
        items: lines,
        discount: None,
        payment_amount: None,
        payment_type: None,
        note: None,
        transaction_type: None,
    }
}

async fn stock_of(db: &sea_orm::DatabaseConnection, id: i64) -> i32 {
    item::Entity::find_by_id(id).one(db).await.unwrap().unwrap().stock
}

#[tokio::test]
async fn test_completed_sale_prices_lines_and_decrements_stock() {
    let db = setup_db().await;
    let cashier = seed_user(&db, "kasir", "kasir123", Role::Cashier).await;
    let mie = seed_item(&db, "Indomie", 10, 2500, 5000).await;
    let teh = seed_item(&db, "Teh Botol", 3, 1500, 2000).await;
    let (svc, mut rx) = transaction_service(&db, StockUnderflowPolicy::Clamp);

    let mut req = completed(vec![line(mie.id, 2, None), line(teh.id, 1, Some(1500))], 20_000);
    req.discount = Some(500);
    let outcome = svc.create_transaction(&ctx(cashier.id), req).await.unwrap();
    let t = outcome.transaction;

    assert!(outcome.warnings.is_empty());
    assert_eq!(t.status, TransactionStatus::Completed);
    assert_eq!(t.total, 10_000 + 1_500 - 500);
    assert_eq!(t.discount, 500);
    assert_eq!(t.payment, Some(20_000));
    assert_eq!(t.change, Some(9_000));
    assert_eq!(t.payment_type, Some(PaymentType::Cash));
    assert_eq!(t.transaction_type, "onsite");
    assert_eq!(t.user_id, Some(cashier.id));
    assert!(t.completed_at.is_some());
    assert_eq!(t.items.len(), 2);
    assert_eq!(t.items[1].item_name, "Teh Botol");
    assert_eq!(t.items[1].price, 1_500);

    assert_eq!(stock_of(&db, mie.id).await, 8);
    assert_eq!(stock_of(&db, teh.id).await, 2);

    let notice = rx.try_recv().expect("notice queued");
    assert_eq!(notice.transaction_id, t.id);
    assert_eq!(notice.lines.len(), 2);

    let audit = AuditService::new(db.clone())
        .entries_for("transaction", t.id)
        .await
        .unwrap();
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].action, AuditAction::Create);
    assert_eq!(audit[0].user_id, Some(cashier.id));
}

#[tokio::test]
async fn test_insufficient_payment_is_rejected_without_side_effects() {
    let db = setup_db().await;
    let cashier = seed_user(&db, "kasir", "kasir123", Role::Cashier).await;
    let mie = seed_item(&db, "Indomie", 10, 2500, 5000).await;
    let (svc, mut rx) = transaction_service(&db, StockUnderflowPolicy::Clamp);

    let err = svc
        .create_transaction(&ctx(cashier.id), completed(vec![line(mie.id, 3, None)], 14_999))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(ref m) if m == "Payment not enough"));

    let mut missing = completed(vec![line(mie.id, 1, None)], 0);
    missing.payment_amount = None;
    assert!(svc.create_transaction(&ctx(cashier.id), missing).await.is_err());

    assert_eq!(stock_of(&db, mie.id).await, 10);
    assert_eq!(
        pos_backend::entities::transaction_entity::Entity::find()
            .count(&db)
            .await
            .unwrap(),
        0
    );
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_exact_payment_gives_zero_change_and_big_discount_floors_at_zero() {
    let db = setup_db().await;
    let cashier = seed_user(&db, "kasir", "kasir123", Role::Cashier).await;
    let kopi = seed_item(&db, "Kopi", 10, 2000, 4000).await;
    let (svc, _rx) = transaction_service(&db, StockUnderflowPolicy::Clamp);

    let t = svc
        .create_transaction(&ctx(cashier.id), completed(vec![line(kopi.id, 2, None)], 8_000))
        .await
        .unwrap()
        .transaction;
    assert_eq!(t.change, Some(0));

    let mut req = completed(vec![line(kopi.id, 1, None)], 0);
    req.discount = Some(10_000);
    let t = svc.create_transaction(&ctx(cashier.id), req).await.unwrap().transaction;
    assert_eq!(t.total, 0);
    assert_eq!(t.change, Some(0));
}

#[tokio::test]
async fn test_invalid_create_requests() {
    let db = setup_db().await;
    let cashier = seed_user(&db, "kasir", "kasir123", Role::Cashier).await;
    let kopi = seed_item(&db, "Kopi", 10, 2000, 4000).await;
    let (svc, _rx) = transaction_service(&db, StockUnderflowPolicy::Clamp);
    let c = ctx(cashier.id);

    let err = svc.create_transaction(&c, draft(vec![])).await.unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));

    let err = svc
        .create_transaction(&c, draft(vec![line(9999, 1, None)]))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(ref m) if m.contains("9999")));

    let err = svc
        .create_transaction(&c, draft(vec![line(kopi.id, 0, None)]))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));

    let mut refunded = draft(vec![line(kopi.id, 1, None)]);
    refunded.status = TransactionStatus::Refunded;
    assert!(svc.create_transaction(&c, refunded).await.is_err());
}

#[tokio::test]
async fn test_overflowing_total_is_rejected() {
    let db = setup_db().await;
    let cashier = seed_user(&db, "kasir", "kasir123", Role::Cashier).await;
    let kopi = seed_item(&db, "Kopi", 10, 2000, 4000).await;
    let (svc, _rx) = transaction_service(&db, StockUnderflowPolicy::Clamp);

    let half = i64::MAX / 2 + 1;
    let err = svc
        .create_transaction(
            &ctx(cashier.id),
            completed(
                vec![line(kopi.id, 1, Some(half)), line(kopi.id, 1, Some(half))],
                i64::MAX,
            ),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));

    assert_eq!(stock_of(&db, kopi.id).await, 10);
    assert_eq!(trx_item::Entity::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_draft_update_checkout_refund_lifecycle() {
    let db = setup_db().await;
    let cashier = seed_user(&db, "kasir", "kasir123", Role::Cashier).await;
    let roti = seed_item(&db, "Roti", 5, 3000, 6000).await;
    let (svc, mut rx) = transaction_service(&db, StockUnderflowPolicy::Clamp);
    let c = ctx(cashier.id);

    let d = svc
        .create_transaction(&c, draft(vec![line(roti.id, 2, None)]))
        .await
        .unwrap()
        .transaction;
    assert_eq!(d.status, TransactionStatus::Draft);
    assert_eq!(d.total, 12_000);
    assert_eq!(d.payment, None);
    assert_eq!(stock_of(&db, roti.id).await, 5);
    assert!(rx.try_recv().is_err());

    let patched = svc
        .update_transaction(
            &c,
            d.id,
            UpdateTransactionRequest {
                status: None,
                note: Some("meja 4".into()),
                transaction_type: Some("takeaway".into()),
                discount: Some(2_000),
            },
        )
        .await
        .unwrap();
    assert_eq!(patched.total, 10_000);
    assert_eq!(patched.note.as_deref(), Some("meja 4"));
    assert_eq!(patched.transaction_type, "takeaway");

    // 折扣为负视为 0
    let patched = svc
        .update_transaction(
            &c,
            d.id,
            UpdateTransactionRequest {
                discount: Some(-50),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(patched.discount, 0);
    assert_eq!(patched.total, 12_000);

    let err = svc
        .checkout(
            &c,
            d.id,
            CheckoutRequest {
                payment_amount: 5_000,
                payment_type: None,
                discount: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));

    let done = svc
        .checkout(
            &c,
            d.id,
            CheckoutRequest {
                payment_amount: 20_000,
                payment_type: Some(PaymentType::Qris),
                discount: Some(1_000),
            },
        )
        .await
        .unwrap();
    let t = done.transaction;
    assert_eq!(t.status, TransactionStatus::Completed);
    assert_eq!(t.total, 11_000);
    assert_eq!(t.change, Some(9_000));
    assert_eq!(t.payment_type, Some(PaymentType::Qris));
    assert!(t.completed_at.is_some());
    assert_eq!(stock_of(&db, roti.id).await, 3);
    assert_eq!(rx.try_recv().map(|n| n.transaction_id).ok(), Some(d.id));

    // 已完成的交易不可再修改或结账
    assert!(svc
        .update_transaction(&c, d.id, UpdateTransactionRequest::default())
        .await
        .is_err());
    assert!(svc
        .checkout(
            &c,
            d.id,
            CheckoutRequest {
                payment_amount: 20_000,
                payment_type: None,
                discount: None
            }
        )
        .await
        .is_err());

    let refunded = svc.refund(&c, d.id).await.unwrap();
    assert_eq!(refunded.status, TransactionStatus::Refunded);
    assert_eq!(refunded.payment, None);
    assert_eq!(refunded.change, None);
    assert_eq!(stock_of(&db, roti.id).await, 5);

    let err = svc.refund(&c, d.id).await.unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));

    let actions: Vec<AuditAction> = AuditService::new(db.clone())
        .entries_for("transaction", d.id)
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.action)
        .collect();
    assert_eq!(
        actions,
        vec![
            AuditAction::Create,
            AuditAction::Update,
            AuditAction::Update,
            AuditAction::Checkout,
            AuditAction::Refund
        ]
    );
}

#[tokio::test]
async fn test_patch_cannot_complete_a_draft() {
    let db = setup_db().await;
    let cashier = seed_user(&db, "kasir", "kasir123", Role::Cashier).await;
    let roti = seed_item(&db, "Roti", 5, 3000, 6000).await;
    let (svc, _rx) = transaction_service(&db, StockUnderflowPolicy::Clamp);
    let c = ctx(cashier.id);

    let d = svc
        .create_transaction(&c, draft(vec![line(roti.id, 1, None)]))
        .await
        .unwrap()
        .transaction;
    let err = svc
        .update_transaction(
            &c,
            d.id,
            UpdateTransactionRequest {
                status: Some(TransactionStatus::Completed),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
    assert_eq!(
        svc.get_transaction(d.id).await.unwrap().status,
        TransactionStatus::Draft
    );
}

#[tokio::test]
async fn test_refund_requires_completed_status() {
    let db = setup_db().await;
    let cashier = seed_user(&db, "kasir", "kasir123", Role::Cashier).await;
    let roti = seed_item(&db, "Roti", 5, 3000, 6000).await;
    let (svc, _rx) = transaction_service(&db, StockUnderflowPolicy::Clamp);
    let c = ctx(cashier.id);

    let d = svc
        .create_transaction(&c, draft(vec![line(roti.id, 1, None)]))
        .await
        .unwrap()
        .transaction;
    let err = svc.refund(&c, d.id).await.unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));

    let err = svc.refund(&c, 424242).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_refund_skips_items_deleted_since_sale() {
    let db = setup_db().await;
    let admin = seed_user(&db, "admin", "admin123", Role::Admin).await;
    let roti = seed_item(&db, "Roti", 5, 3000, 6000).await;
    let susu = seed_item(&db, "Susu", 5, 4000, 7000).await;
    let (svc, _rx) = transaction_service(&db, StockUnderflowPolicy::Clamp);
    let c = ctx(admin.id);

    let t = svc
        .create_transaction(
            &c,
            completed(vec![line(roti.id, 1, None), line(susu.id, 2, None)], 50_000),
        )
        .await
        .unwrap()
        .transaction;
    ItemService::new(db.clone()).delete_item(&c, roti.id).await.unwrap();

    let refunded = svc.refund(&c, t.id).await.unwrap();
    assert_eq!(refunded.status, TransactionStatus::Refunded);
    assert_eq!(refunded.items.len(), 2);
    assert_eq!(stock_of(&db, susu.id).await, 5);
}

#[tokio::test]
async fn test_only_drafts_can_be_deleted() {
    let db = setup_db().await;
    let cashier = seed_user(&db, "kasir", "kasir123", Role::Cashier).await;
    let roti = seed_item(&db, "Roti", 5, 3000, 6000).await;
    let (svc, _rx) = transaction_service(&db, StockUnderflowPolicy::Clamp);
    let c = ctx(cashier.id);

    let sold = svc
        .create_transaction(&c, completed(vec![line(roti.id, 1, None)], 6_000))
        .await
        .unwrap()
        .transaction;
    let err = svc.delete_transaction(&c, sold.id).await.unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));

    let d = svc
        .create_transaction(&c, draft(vec![line(roti.id, 2, None)]))
        .await
        .unwrap()
        .transaction;
    svc.delete_transaction(&c, d.id).await.unwrap();

    assert!(matches!(
        svc.get_transaction(d.id).await.unwrap_err(),
        AppError::NotFound(_)
    ));
    assert_eq!(trx_item::Entity::find().count(&db).await.unwrap(), 1);
    assert!(matches!(
        svc.delete_transaction(&c, d.id).await.unwrap_err(),
        AppError::NotFound(_)
    ));
}

#[tokio::test]
async fn test_block_policy_rejects_oversell_and_keeps_stock() {
    let db = setup_db().await;
    let cashier = seed_user(&db, "kasir", "kasir123", Role::Cashier).await;
    let roti = seed_item(&db, "Roti", 2, 3000, 6000).await;
    let (svc, _rx) = transaction_service(&db, StockUnderflowPolicy::Block);

    let err = svc
        .create_transaction(&ctx(cashier.id), completed(vec![line(roti.id, 3, None)], 100_000))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(ref m) if m.contains("Roti")));
    assert_eq!(stock_of(&db, roti.id).await, 2);
    assert_eq!(
        pos_backend::entities::transaction_entity::Entity::find()
            .count(&db)
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn test_clamp_policy_zeroes_stock_with_warning() {
    let db = setup_db().await;
    let cashier = seed_user(&db, "kasir", "kasir123", Role::Cashier).await;
    let roti = seed_item(&db, "Roti", 2, 3000, 6000).await;
    let (svc, _rx) = transaction_service(&db, StockUnderflowPolicy::Clamp);

    let outcome = svc
        .create_transaction(&ctx(cashier.id), completed(vec![line(roti.id, 3, None)], 100_000))
        .await
        .unwrap();
    assert_eq!(outcome.warnings.len(), 1);
    assert!(outcome.warnings[0].contains("Roti"));
    assert_eq!(stock_of(&db, roti.id).await, 0);
}

#[tokio::test]
async fn test_allow_negative_policy_goes_below_zero_on_checkout() {
    let db = setup_db().await;
    let cashier = seed_user(&db, "kasir", "kasir123", Role::Cashier).await;
    let roti = seed_item(&db, "Roti", 2, 3000, 6000).await;
    let (svc, _rx) = transaction_service(&db, StockUnderflowPolicy::AllowNegative);
    let c = ctx(cashier.id);

    let d = svc
        .create_transaction(&c, draft(vec![line(roti.id, 4, None)]))
        .await
        .unwrap()
        .transaction;
    let outcome = svc
        .checkout(
            &c,
            d.id,
            CheckoutRequest {
                payment_amount: 24_000,
                payment_type: Some(PaymentType::Cash),
                discount: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(outcome.warnings.len(), 1);
    assert_eq!(stock_of(&db, roti.id).await, -2);
}

#[tokio::test]
async fn test_listing_history_and_drafts() {
    let db = setup_db().await;
    let cashier = seed_user(&db, "kasir", "kasir123", Role::Cashier).await;
    let roti = seed_item(&db, "Roti", 50, 3000, 6000).await;
    let (svc, _rx) = transaction_service(&db, StockUnderflowPolicy::Clamp);
    let c = ctx(cashier.id);

    let d1 = svc
        .create_transaction(&c, draft(vec![line(roti.id, 1, None)]))
        .await
        .unwrap()
        .transaction;
    let sold = svc
        .create_transaction(&c, completed(vec![line(roti.id, 1, None)], 6_000))
        .await
        .unwrap()
        .transaction;
    let refunded = svc
        .create_transaction(&c, completed(vec![line(roti.id, 1, None)], 6_000))
        .await
        .unwrap()
        .transaction;
    svc.refund(&c, refunded.id).await.unwrap();

    let all = svc
        .list_transactions(&TransactionQuery::default())
        .await
        .unwrap();
    assert_eq!(all.total, 3);
    assert_eq!(all.data[0].id, refunded.id);
    assert_eq!(all.data[2].id, d1.id);
    assert!(all.data.iter().all(|t| t.items.len() == 1));

    let today = chrono::Utc::now().date_naive().format("%Y-%m-%d").to_string();
    let filtered = svc
        .list_transactions(&TransactionQuery {
            date: Some(today),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(filtered.total, 3);
    let empty = svc
        .list_transactions(&TransactionQuery {
            date: Some("2001-01-01".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(empty.total, 0);
    assert!(svc
        .list_transactions(&TransactionQuery {
            date: Some("yesterday".into()),
            ..Default::default()
        })
        .await
        .is_err());

    let page = svc
        .list_transactions(&TransactionQuery {
            page: Some(2),
            page_size: Some(2),
            date: None,
        })
        .await
        .unwrap();
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.total_pages, 2);

    let history = svc.history(&TransactionQuery::default()).await.unwrap();
    let ids: Vec<i64> = history.data.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![refunded.id, sold.id]);

    let drafts = svc.drafts(&DraftQuery::default()).await.unwrap();
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].id, d1.id);
    let completed_only = svc
        .drafts(&DraftQuery {
            status: Some(TransactionStatus::Completed),
        })
        .await
        .unwrap();
    assert_eq!(completed_only.len(), 1);
    assert_eq!(completed_only[0].id, sold.id);
}
