pub mod attendance;
pub mod cash_session;
pub mod common;
pub mod dashboard;
pub mod item;
pub mod notification;
pub mod pagination;
pub mod transaction;
pub mod user;

pub use attendance::*;
pub use cash_session::*;
pub use common::*;
pub use dashboard::*;
pub use item::*;
pub use notification::*;
pub use pagination::*;
pub use transaction::*;
pub use user::*;
