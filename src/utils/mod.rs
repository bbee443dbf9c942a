pub mod csv;
pub mod dates;
pub mod diff;
pub mod jwt;
pub mod password;
pub mod pricing;
pub mod reconcile;
pub mod stock;

pub use csv::*;
pub use dates::*;
pub use diff::*;
pub use jwt::*;
pub use password::*;
pub use pricing::*;
pub use reconcile::*;
pub use stock::*;
