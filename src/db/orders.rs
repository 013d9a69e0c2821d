//! Order aggregate queries
//!
//! An order and its line items form one consistency unit: the stored total is
//! always `Σ(price_cents × quantity)` over the items, and every mutation of
//! the item set happens inside a single transaction. All lookups are scoped
//! by `user_id`; a row owned by someone else is indistinguishable from an
//! absent one.

use sqlx::SqlitePool;

#[derive(Debug, sqlx::FromRow)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub total_cents: i64,
    pub created_at: i64,
}

#[derive(Debug, sqlx::FromRow)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub menu_item_id: i64,
    pub item_name: String,
    pub price_cents: i64,
    pub quantity: i64,
}

/// A line item ready to be persisted: menu lookup done, price snapshotted.
#[derive(Debug, Clone)]
pub struct NewItem {
    pub menu_item_id: i64,
    pub item_name: String,
    pub price_cents: i64,
    pub quantity: i64,
}

fn total_of(items: &[NewItem]) -> i64 {
    items.iter().map(|i| i.price_cents * i.quantity).sum()
}

/// Most-recent-first list of a user's orders.
pub async fn list_for_user(pool: &SqlitePool, user_id: i64) -> Result<Vec<Order>, sqlx::Error> {
    sqlx::query_as(
        "SELECT * FROM orders WHERE user_id = ?1 ORDER BY created_at DESC, id DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Ownership-scoped lookup: `None` covers both "no such order" and "owned by
/// another user".
pub async fn find_for_user(
    pool: &SqlitePool,
    order_id: i64,
    user_id: i64,
) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM orders WHERE id = ?1 AND user_id = ?2")
        .bind(order_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn items_for_order(
    pool: &SqlitePool,
    order_id: i64,
) -> Result<Vec<OrderItem>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM order_items WHERE order_id = ?1 ORDER BY id")
        .bind(order_id)
        .fetch_all(pool)
        .await
}

/// Insert an order and its items atomically; returns the new order id.
pub async fn create(
    pool: &SqlitePool,
    user_id: i64,
    items: &[NewItem],
    now: i64,
) -> Result<i64, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let order_id: i64 = sqlx::query_scalar(
        "INSERT INTO orders (user_id, total_cents, created_at)
         VALUES (?1, ?2, ?3)
         RETURNING id",
    )
    .bind(user_id)
    .bind(total_of(items))
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    insert_items(&mut tx, order_id, items).await?;

    tx.commit().await?;
    Ok(order_id)
}

/// Replace the whole item set of an order: delete the old items, insert the
/// new ones, recompute the total and refresh the timestamp — one transaction,
/// so a failure leaves the previous state intact. The caller has already
/// verified ownership.
pub async fn replace_items(
    pool: &SqlitePool,
    order_id: i64,
    items: &[NewItem],
    now: i64,
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM order_items WHERE order_id = ?1")
        .bind(order_id)
        .execute(&mut *tx)
        .await?;

    insert_items(&mut tx, order_id, items).await?;

    sqlx::query("UPDATE orders SET total_cents = ?1, created_at = ?2 WHERE id = ?3")
        .bind(total_of(items))
        .bind(now)
        .bind(order_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

/// Delete an order together with its items. The caller has already verified
/// ownership.
pub async fn delete(pool: &SqlitePool, order_id: i64) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM order_items WHERE order_id = ?1")
        .bind(order_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM orders WHERE id = ?1")
        .bind(order_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

async fn insert_items(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    order_id: i64,
    items: &[NewItem],
) -> Result<(), sqlx::Error> {
    for item in items {
        sqlx::query(
            "INSERT INTO order_items (order_id, menu_item_id, item_name, price_cents, quantity)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(order_id)
        .bind(item.menu_item_id)
        .bind(&item.item_name)
        .bind(item.price_cents)
        .bind(item.quantity)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}
