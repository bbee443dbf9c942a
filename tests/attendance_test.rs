mod common;

use common::*;
use pos_backend::AppError;
use pos_backend::entities::{AttendanceStatus, Role};
use pos_backend::models::*;
use pos_backend::services::AttendanceService;

fn mark(user_id: i64, status: AttendanceStatus) -> CreateAttendanceRequest {
    CreateAttendanceRequest {
        user_id,
        status,
        note: None,
    }
}

#[tokio::test]
async fn test_record_once_per_day() {
    let db = setup_db().await;
    let cashier = seed_user(&db, "kasir", "kasir123", Role::Cashier).await;
    let svc = AttendanceService::new(db.clone());

    let created = svc
        .create_attendance(CreateAttendanceRequest {
            note: Some("shift pagi".into()),
            ..mark(cashier.id, AttendanceStatus::Present)
        })
        .await
        .unwrap();
    assert_eq!(created.username.as_deref(), Some("kasir"));
    assert_eq!(created.date, chrono::Utc::now().date_naive());
    assert_eq!(created.note.as_deref(), Some("shift pagi"));

    let err = svc
        .create_attendance(mark(cashier.id, AttendanceStatus::Absent))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));

    let err = svc
        .create_attendance(mark(9999, AttendanceStatus::Present))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_listing_today_and_history() {
    let db = setup_db().await;
    let a = seed_user(&db, "andi", "pw123456", Role::Cashier).await;
    let b = seed_user(&db, "budi", "pw123456", Role::Cashier).await;
    let svc = AttendanceService::new(db.clone());

    svc.create_attendance(mark(a.id, AttendanceStatus::Present))
        .await
        .unwrap();
    svc.create_attendance(CreateAttendanceRequest {
        note: Some("   ".into()),
        ..mark(b.id, AttendanceStatus::Off)
    })
    .await
    .unwrap();

    let today = svc.today().await.unwrap();
    let names: Vec<_> = today.iter().map(|r| r.username.clone().unwrap()).collect();
    assert_eq!(names, vec!["andi", "budi"]);
    assert_eq!(today[1].note, None);

    assert_eq!(svc.list_all().await.unwrap().len(), 2);

    let only_b = svc
        .history(&AttendanceQuery {
            user_id: Some(b.id),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(only_b.total, 1);
    assert_eq!(only_b.data[0].status, AttendanceStatus::Off);

    let paged = svc
        .history(&AttendanceQuery {
            page: Some(2),
            page_size: Some(1),
            user_id: None,
        })
        .await
        .unwrap();
    assert_eq!(paged.total, 2);
    assert_eq!(paged.total_pages, 2);
    assert_eq!(paged.data.len(), 1);
    assert_eq!(paged.data[0].user_id, a.id);
}
