pub use sea_orm_migration::prelude::*;

mod m20250301_000001_initial;
mod m20250301_000002_add_transactions;
mod m20250305_000001_add_cash_sessions;
mod m20250310_000001_add_attendances;
mod m20250312_000001_add_audit_logs;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_initial::Migration),
            Box::new(m20250301_000002_add_transactions::Migration),
            Box::new(m20250305_000001_add_cash_sessions::Migration),
            Box::new(m20250310_000001_add_attendances::Migration),
            Box::new(m20250312_000001_add_audit_logs::Migration),
        ]
    }
}
