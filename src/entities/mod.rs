pub mod attendances;
pub mod audit_logs;
pub mod cash_sessions;
pub mod items;
pub mod transaction_items;
pub mod transactions;
pub mod users;

pub use attendances::AttendanceStatus;
pub use audit_logs::AuditAction;
pub use cash_sessions::CashSessionStatus;
pub use transactions::{PaymentType, TransactionStatus};
pub use users::Role;

pub use attendances as attendance_entity;
pub use audit_logs as audit_log_entity;
pub use cash_sessions as cash_session_entity;
pub use items as item_entity;
pub use transaction_items as transaction_item_entity;
pub use transactions as transaction_entity;
pub use users as user_entity;
