//! Finished-product inventory ledger
//!
//! One stock counter per unique finished SKU (category, model, size,
//! color of sole, color of strap). Rows appear lazily on the first
//! successful assembly; stock here is consumed by the external sales
//! subsystem through `decrement`. Same idempotent create-then-increment
//! contract as the component ledger.

use serde::Serialize;
use sqlx::{PgConnection, PgPool};

use crate::error::{AppError, AppResult};
use shared::models::FinishedSku;
use shared::validation::validate_stock_delta;

/// Finished-product ledger service
#[derive(Clone)]
pub struct FinishedLedgerService {
    db: PgPool,
}

/// One finished-product stock row
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct FinishedStockRow {
    pub id: i32,
    pub stock_pairs: i32,
    pub category_id: i32,
    pub model_id: i32,
    pub size_id: i32,
    pub color_sole_id: i32,
    pub color_strap_id: i32,
}

impl FinishedStockRow {
    pub fn sku(&self) -> FinishedSku {
        FinishedSku {
            category_id: self.category_id,
            model_id: self.model_id,
            size_id: self.size_id,
            color_sole_id: self.color_sole_id,
            color_strap_id: self.color_strap_id,
        }
    }
}

const STOCK_COLUMNS: &str =
    "id, stock_pairs, category_id, model_id, size_id, color_sole_id, color_strap_id";

impl FinishedLedgerService {
    /// Create a new FinishedLedgerService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Find or create the row for this SKU and add `delta_pairs` to it
    pub async fn upsert_and_increment(
        &self,
        sku: FinishedSku,
        delta_pairs: i32,
    ) -> AppResult<FinishedStockRow> {
        let mut conn = self.db.acquire().await?;
        upsert_and_increment(&mut conn, sku, delta_pairs).await
    }

    /// Subtract `delta_pairs`, used by sales fulfillment
    pub async fn decrement(
        &self,
        sku: FinishedSku,
        delta_pairs: i32,
    ) -> AppResult<FinishedStockRow> {
        validate_stock_delta(delta_pairs)
            .map_err(|msg| AppError::validation("delta_pairs", msg))?;

        let updated = sqlx::query_as::<_, FinishedStockRow>(&format!(
            r#"
            UPDATE finished_product_inventory
            SET stock_pairs = stock_pairs - $1
            WHERE category_id = $2 AND model_id = $3 AND size_id = $4
              AND color_sole_id = $5 AND color_strap_id = $6
              AND stock_pairs >= $1
            RETURNING {STOCK_COLUMNS}
            "#
        ))
        .bind(delta_pairs)
        .bind(sku.category_id)
        .bind(sku.model_id)
        .bind(sku.size_id)
        .bind(sku.color_sole_id)
        .bind(sku.color_strap_id)
        .fetch_optional(&self.db)
        .await?;

        match updated {
            Some(row) => Ok(row),
            None => {
                // An absent row holds zero stock; same contract as the
                // component ledger.
                let available = self
                    .try_find_by_sku(sku)
                    .await?
                    .map_or(0, |existing| existing.stock_pairs);
                Err(AppError::InsufficientStock {
                    component: sku.to_string(),
                    requested: delta_pairs,
                    available,
                })
            }
        }
    }

    /// Look up the stock row for a SKU
    pub async fn find_by_sku(&self, sku: FinishedSku) -> AppResult<FinishedStockRow> {
        self.try_find_by_sku(sku)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{}", sku)))
    }

    async fn try_find_by_sku(&self, sku: FinishedSku) -> AppResult<Option<FinishedStockRow>> {
        let row = sqlx::query_as::<_, FinishedStockRow>(&format!(
            r#"
            SELECT {STOCK_COLUMNS}
            FROM finished_product_inventory
            WHERE category_id = $1 AND model_id = $2 AND size_id = $3
              AND color_sole_id = $4 AND color_strap_id = $5
            "#
        ))
        .bind(sku.category_id)
        .bind(sku.model_id)
        .bind(sku.size_id)
        .bind(sku.color_sole_id)
        .bind(sku.color_strap_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row)
    }

    /// List stock rows, optionally scoped to a category and/or model
    pub async fn list(
        &self,
        category_id: Option<i32>,
        model_id: Option<i32>,
    ) -> AppResult<Vec<FinishedStockRow>> {
        let rows = sqlx::query_as::<_, FinishedStockRow>(
            r#"
            SELECT id, stock_pairs, category_id, model_id, size_id, color_sole_id, color_strap_id
            FROM finished_product_inventory
            WHERE ($1::int IS NULL OR category_id = $1)
              AND ($2::int IS NULL OR model_id = $2)
            ORDER BY category_id, model_id, size_id, color_sole_id, color_strap_id
            "#,
        )
        .bind(category_id)
        .bind(model_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }
}

/// Increment inside an existing connection or transaction, creating the
/// row on first assembly of a new finished SKU.
pub(crate) async fn upsert_and_increment(
    conn: &mut PgConnection,
    sku: FinishedSku,
    delta_pairs: i32,
) -> AppResult<FinishedStockRow> {
    validate_stock_delta(delta_pairs).map_err(|msg| AppError::validation("delta_pairs", msg))?;

    let row = sqlx::query_as::<_, FinishedStockRow>(&format!(
        r#"
        INSERT INTO finished_product_inventory
            (stock_pairs, category_id, model_id, size_id, color_sole_id, color_strap_id)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT ON CONSTRAINT uk_finished_sku
        DO UPDATE SET stock_pairs = finished_product_inventory.stock_pairs + EXCLUDED.stock_pairs
        RETURNING {STOCK_COLUMNS}
        "#
    ))
    .bind(delta_pairs)
    .bind(sku.category_id)
    .bind(sku.model_id)
    .bind(sku.size_id)
    .bind(sku.color_sole_id)
    .bind(sku.color_strap_id)
    .fetch_one(&mut *conn)
    .await?;

    tracing::debug!(sku = %sku, delta_pairs, stock_pairs = row.stock_pairs, "finished stock credited");
    Ok(row)
}
