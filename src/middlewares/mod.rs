pub mod auth;
pub mod cors;
pub mod role;

pub use auth::*;
pub use cors::*;
pub use role::*;
