//! Component inventory ledger
//!
//! One stock counter per unique component SKU (category, model,
//! component type, size, color). Rows are created lazily the first
//! time stock is credited for an unseen tuple; the unique index at the
//! storage boundary turns racing first-inserts into increments, so a
//! duplicate-key race is never surfaced to a caller. All deltas are
//! conditional SQL updates, never read-modify-write in application
//! memory.

use serde::Serialize;
use sqlx::{PgConnection, PgPool};

use crate::error::{AppError, AppResult};
use shared::models::{ComponentSku, PartRole};
use shared::validation::validate_stock_delta;

/// Component ledger service over the component inventory table
#[derive(Clone)]
pub struct ComponentLedgerService {
    db: PgPool,
}

/// One component stock row
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ComponentStockRow {
    pub id: i32,
    pub stock_pairs: i32,
    pub category_id: i32,
    pub model_id: i32,
    pub component_type_id: i32,
    pub size_id: i32,
    pub color_id: i32,
}

impl ComponentStockRow {
    pub fn sku(&self) -> ComponentSku {
        ComponentSku {
            category_id: self.category_id,
            model_id: self.model_id,
            component_type_id: self.component_type_id,
            size_id: self.size_id,
            color_id: self.color_id,
        }
    }
}

const STOCK_COLUMNS: &str =
    "id, stock_pairs, category_id, model_id, component_type_id, size_id, color_id";

impl ComponentLedgerService {
    /// Create a new ComponentLedgerService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Find or create the row for this SKU and add `delta_pairs` to it
    pub async fn upsert_and_increment(
        &self,
        sku: ComponentSku,
        delta_pairs: i32,
    ) -> AppResult<ComponentStockRow> {
        let mut conn = self.db.acquire().await?;
        upsert_and_increment(&mut conn, sku, delta_pairs).await
    }

    /// Subtract `delta_pairs` from the row for this SKU, failing if the
    /// row is absent or holds less than `delta_pairs`
    pub async fn decrement(
        &self,
        sku: ComponentSku,
        delta_pairs: i32,
    ) -> AppResult<ComponentStockRow> {
        let mut conn = self.db.acquire().await?;
        decrement(&mut conn, None, sku, delta_pairs).await
    }

    /// Look up the stock row for a SKU
    pub async fn find_by_sku(&self, sku: ComponentSku) -> AppResult<ComponentStockRow> {
        let mut conn = self.db.acquire().await?;
        find_by_sku(&mut conn, sku)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{}", sku)))
    }

    /// List stock rows, optionally scoped to a category and/or model
    pub async fn list(
        &self,
        category_id: Option<i32>,
        model_id: Option<i32>,
    ) -> AppResult<Vec<ComponentStockRow>> {
        let rows = sqlx::query_as::<_, ComponentStockRow>(
            r#"
            SELECT id, stock_pairs, category_id, model_id, component_type_id, size_id, color_id
            FROM component_inventory
            WHERE ($1::int IS NULL OR category_id = $1)
              AND ($2::int IS NULL OR model_id = $2)
            ORDER BY category_id, model_id, component_type_id, size_id, color_id
            "#,
        )
        .bind(category_id)
        .bind(model_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }
}

/// Increment inside an existing connection or transaction.
///
/// A single INSERT .. ON CONFLICT DO UPDATE statement, so two orders
/// crediting the same previously-unseen SKU race on the unique index
/// and both land as increments.
pub(crate) async fn upsert_and_increment(
    conn: &mut PgConnection,
    sku: ComponentSku,
    delta_pairs: i32,
) -> AppResult<ComponentStockRow> {
    validate_stock_delta(delta_pairs).map_err(|msg| AppError::validation("delta_pairs", msg))?;

    let row = sqlx::query_as::<_, ComponentStockRow>(&format!(
        r#"
        INSERT INTO component_inventory
            (stock_pairs, category_id, model_id, component_type_id, size_id, color_id)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT ON CONSTRAINT uk_component_sku
        DO UPDATE SET stock_pairs = component_inventory.stock_pairs + EXCLUDED.stock_pairs
        RETURNING {STOCK_COLUMNS}
        "#
    ))
    .bind(delta_pairs)
    .bind(sku.category_id)
    .bind(sku.model_id)
    .bind(sku.component_type_id)
    .bind(sku.size_id)
    .bind(sku.color_id)
    .fetch_one(&mut *conn)
    .await?;

    tracing::debug!(sku = %sku, delta_pairs, stock_pairs = row.stock_pairs, "component stock credited");
    Ok(row)
}

/// Decrement inside an existing connection or transaction.
///
/// The guard `stock_pairs >= delta` lives in the UPDATE itself; a miss
/// reports insufficient stock, with available 0 for a row that has
/// never been credited. `role` labels the short component in assembly
/// errors.
pub(crate) async fn decrement(
    conn: &mut PgConnection,
    role: Option<PartRole>,
    sku: ComponentSku,
    delta_pairs: i32,
) -> AppResult<ComponentStockRow> {
    validate_stock_delta(delta_pairs).map_err(|msg| AppError::validation("delta_pairs", msg))?;

    let updated = sqlx::query_as::<_, ComponentStockRow>(&format!(
        r#"
        UPDATE component_inventory
        SET stock_pairs = stock_pairs - $1
        WHERE category_id = $2 AND model_id = $3 AND component_type_id = $4
          AND size_id = $5 AND color_id = $6
          AND stock_pairs >= $1
        RETURNING {STOCK_COLUMNS}
        "#
    ))
    .bind(delta_pairs)
    .bind(sku.category_id)
    .bind(sku.model_id)
    .bind(sku.component_type_id)
    .bind(sku.size_id)
    .bind(sku.color_id)
    .fetch_optional(&mut *conn)
    .await?;

    let component = match role {
        Some(role) => format!("{} {}", role, sku),
        None => sku.to_string(),
    };

    match updated {
        Some(row) => {
            tracing::debug!(sku = %sku, delta_pairs, stock_pairs = row.stock_pairs, "component stock consumed");
            Ok(row)
        }
        None => {
            // An absent row holds zero stock, not a missing resource:
            // a retry after production can succeed.
            let available = find_by_sku(conn, sku)
                .await?
                .map_or(0, |existing| existing.stock_pairs);
            Err(AppError::InsufficientStock {
                component,
                requested: delta_pairs,
                available,
            })
        }
    }
}

pub(crate) async fn find_by_sku(
    conn: &mut PgConnection,
    sku: ComponentSku,
) -> AppResult<Option<ComponentStockRow>> {
    let row = sqlx::query_as::<_, ComponentStockRow>(&format!(
        r#"
        SELECT {STOCK_COLUMNS}
        FROM component_inventory
        WHERE category_id = $1 AND model_id = $2 AND component_type_id = $3
          AND size_id = $4 AND color_id = $5
        "#
    ))
    .bind(sku.category_id)
    .bind(sku.model_id)
    .bind(sku.component_type_id)
    .bind(sku.size_id)
    .bind(sku.color_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row)
}
