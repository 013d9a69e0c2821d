use sqlx::SqlitePool;

/// Catalog entry. Seeded by the migration, read-only to clients.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MenuItem {
    pub id: i64,
    pub name: String,
    pub price_cents: i64,
}

pub async fn list(pool: &SqlitePool) -> Result<Vec<MenuItem>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM menu_items ORDER BY id")
        .fetch_all(pool)
        .await
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<MenuItem>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM menu_items WHERE id = ?1")
        .bind(id)
        .fetch_optional(pool)
        .await
}
