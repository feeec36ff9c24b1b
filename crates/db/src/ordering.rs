//! Per-row primitives over a table's `order_number` column.
//!
//! Every ordered table is expected to keep `order_number` dense (an unbroken
//! 0..N-1 sequence) at rest. The protocol that maintains that invariant lives
//! in the `services` crate; this module only exposes the single-row reads and
//! writes it is built on. No multi-row statement is offered through this seam.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use thiserror::Error;
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Ordering-relevant slice of one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow, Serialize, Deserialize, TS)]
pub struct OrderEntry {
    pub id: Uuid,
    pub order_number: i64,
    pub version: i64,
}

/// Single-row read/write primitives for one ordered table.
///
/// `entries` must return rows sorted ascending by `order_number`, with equal
/// values broken by `version` descending (most recently written row first).
/// `write_order` must bump the row's `version`.
#[async_trait]
pub trait OrderedRows: Send + Sync {
    async fn entries(&self) -> Result<Vec<OrderEntry>, StoreError>;

    async fn count(&self) -> Result<i64, StoreError>;

    async fn write_order(&self, id: Uuid, order_number: i64) -> Result<(), StoreError>;

    /// Returns the number of rows removed (0 when the id is absent).
    async fn delete_row(&self, id: Uuid) -> Result<u64, StoreError>;
}

/// [`OrderedRows`] backed by one SQLite table. The table name is a
/// compile-time constant supplied by the owning model, never caller input.
#[derive(Clone)]
pub struct OrderColumn {
    pool: SqlitePool,
    table: &'static str,
}

impl OrderColumn {
    pub fn new(pool: SqlitePool, table: &'static str) -> Self {
        Self { pool, table }
    }
}

#[async_trait]
impl OrderedRows for OrderColumn {
    async fn entries(&self) -> Result<Vec<OrderEntry>, StoreError> {
        let sql = format!(
            "SELECT id, order_number, version FROM {} ORDER BY order_number ASC, version DESC",
            self.table
        );
        Ok(sqlx::query_as::<_, OrderEntry>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn count(&self) -> Result<i64, StoreError> {
        let sql = format!("SELECT COUNT(*) FROM {}", self.table);
        let (count,): (i64,) = sqlx::query_as(&sql).fetch_one(&self.pool).await?;
        Ok(count)
    }

    async fn write_order(&self, id: Uuid, order_number: i64) -> Result<(), StoreError> {
        let sql = format!(
            "UPDATE {} SET order_number = $1, version = version + 1, updated_at = CURRENT_TIMESTAMP WHERE id = $2",
            self.table
        );
        sqlx::query(&sql)
            .bind(order_number)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_row(&self, id: Uuid) -> Result<u64, StoreError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", self.table);
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_pool;

    async fn insert_raw(pool: &SqlitePool, id: Uuid, order_number: i64) {
        sqlx::query("INSERT INTO tailor_made (id, order_number) VALUES ($1, $2)")
            .bind(id)
            .bind(order_number)
            .execute(pool)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn entries_sort_by_order_then_version_desc() {
        let pool = test_pool().await;
        let rows = OrderColumn::new(pool.clone(), "tailor_made");
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        insert_raw(&pool, a, 0).await;
        insert_raw(&pool, b, 1).await;
        insert_raw(&pool, c, 2).await;

        // Writing c into slot 0 bumps its version, so it sorts before a.
        rows.write_order(c, 0).await.unwrap();
        let entries = rows.entries().await.unwrap();
        assert_eq!(
            entries.iter().map(|e| e.id).collect::<Vec<_>>(),
            vec![c, a, b]
        );
        assert_eq!(entries[0].version, 1);
        assert_eq!(entries[1].version, 0);
    }

    #[tokio::test]
    async fn delete_row_reports_missing_ids() {
        let pool = test_pool().await;
        let rows = OrderColumn::new(pool.clone(), "tailor_made");
        let id = Uuid::new_v4();
        insert_raw(&pool, id, 0).await;

        assert_eq!(rows.delete_row(id).await.unwrap(), 1);
        assert_eq!(rows.delete_row(id).await.unwrap(), 0);
        assert_eq!(rows.count().await.unwrap(), 0);
    }
}
