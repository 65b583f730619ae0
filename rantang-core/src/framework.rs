use sqlx::PgPool;

/// Postgres-backed processor. Query objects in [`crate::entities`]
/// implement `kanau::processor::Processor` for it.
#[derive(Debug, Clone)]
pub struct DatabaseProcessor {
    pub pool: PgPool,
}
