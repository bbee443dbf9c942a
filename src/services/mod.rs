pub mod attendance_service;
pub mod audit_service;
pub mod auth_service;
pub mod cash_session_service;
pub mod dashboard_service;
pub mod item_service;
pub mod notification_service;
pub mod transaction_service;
pub mod user_service;

pub use attendance_service::*;
pub use audit_service::*;
pub use auth_service::*;
pub use cash_session_service::*;
pub use dashboard_service::*;
pub use item_service::*;
pub use notification_service::*;
pub use transaction_service::*;
pub use user_service::*;
