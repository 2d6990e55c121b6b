//! Production order pipeline
//!
//! A production order is the formal request to produce a batch of one
//! component type (soles or straps) for a series. Completing it
//! resolves the series bill of materials (the kit rows for series,
//! model, category and component type, one per size in the run) and
//! credits component inventory for each, all inside one transaction.
//! Cancellation touches no stock.

use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use sqlx::PgPool;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::services::component_ledger::{self, ComponentStockRow};
use crate::services::dimension::DimensionRegistry;
use shared::models::{ComponentSku, DimensionKind, OrderState, ProductionOrder};

/// Production order service
#[derive(Clone)]
pub struct ProductionOrderService {
    db: PgPool,
    registry: DimensionRegistry,
}

/// Input for creating a production order
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductionOrderInput {
    pub category_id: i32,
    pub model_id: i32,
    pub series_code_id: i32,
    pub component_type_id: i32,
    #[validate(range(min = 1, message = "quantity_pairs must be positive"))]
    pub quantity_pairs: i32,
    pub request_date: Option<NaiveDate>,
}

/// Database row for a production order
#[derive(Debug, sqlx::FromRow)]
struct ProductionOrderRow {
    id: i32,
    quantity_pairs: i32,
    request_date: NaiveDate,
    state: String,
    category_id: i32,
    model_id: i32,
    series_code_id: i32,
    component_type_id: i32,
}

impl ProductionOrderRow {
    fn into_order(self) -> AppResult<ProductionOrder> {
        let state = self
            .state
            .parse::<OrderState>()
            .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;
        Ok(ProductionOrder {
            id: self.id,
            quantity_pairs: self.quantity_pairs,
            request_date: self.request_date,
            state,
            category_id: self.category_id,
            model_id: self.model_id,
            series_code_id: self.series_code_id,
            component_type_id: self.component_type_id,
        })
    }
}

const ORDER_COLUMNS: &str = "id, quantity_pairs, request_date, state, category_id, model_id, \
                             series_code_id, component_type_id";

impl ProductionOrderService {
    /// Create a new ProductionOrderService instance
    pub fn new(db: PgPool) -> Self {
        let registry = DimensionRegistry::new(db.clone());
        Self { db, registry }
    }

    /// Create a PENDING production order
    pub async fn create(&self, input: CreateProductionOrderInput) -> AppResult<ProductionOrder> {
        input.validate()?;

        // Orders hold dimension ids by value; validate them up front.
        self.registry
            .ensure(DimensionKind::Category, input.category_id)
            .await?;
        self.registry.ensure(DimensionKind::Model, input.model_id).await?;
        self.registry
            .ensure(DimensionKind::ComponentType, input.component_type_id)
            .await?;
        self.registry.resolve_series_code(input.series_code_id).await?;

        let request_date = input
            .request_date
            .unwrap_or_else(|| Utc::now().date_naive());

        let row = sqlx::query_as::<_, ProductionOrderRow>(&format!(
            r#"
            INSERT INTO production_orders
                (quantity_pairs, request_date, state, category_id, model_id,
                 series_code_id, component_type_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(input.quantity_pairs)
        .bind(request_date)
        .bind(OrderState::Pending.as_str())
        .bind(input.category_id)
        .bind(input.model_id)
        .bind(input.series_code_id)
        .bind(input.component_type_id)
        .fetch_one(&self.db)
        .await?;

        let order = row.into_order()?;
        tracing::info!(order_id = order.id, quantity_pairs = order.quantity_pairs, "production order created");
        Ok(order)
    }

    /// Complete a PENDING order, crediting component stock for every
    /// size in the series bill of materials. One transaction: any
    /// failure leaves the order PENDING and the ledger untouched.
    pub async fn complete(&self, order_id: i32) -> AppResult<Vec<ComponentStockRow>> {
        let mut tx = self.db.begin().await?;

        let order = sqlx::query_as::<_, ProductionOrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM production_orders WHERE id = $1 FOR UPDATE"
        ))
        .bind(order_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("production order {}", order_id)))?
        .into_order()?;

        order.state.transition(OrderState::Completed)?;

        // The series bill of materials: one (size, color) per size in
        // the run for the ordered component type.
        let bom = sqlx::query_as::<_, (i32, i32)>(
            r#"
            SELECT size_id, color_id
            FROM series_kits
            WHERE series_code_id = $1 AND model_id = $2
              AND category_id = $3 AND component_type_id = $4
            ORDER BY size_id
            "#,
        )
        .bind(order.series_code_id)
        .bind(order.model_id)
        .bind(order.category_id)
        .bind(order.component_type_id)
        .fetch_all(&mut *tx)
        .await?;

        if bom.is_empty() {
            return Err(AppError::NotFound(format!(
                "bill of materials for series {} (model {}, category {}, component type {})",
                order.series_code_id, order.model_id, order.category_id, order.component_type_id
            )));
        }

        let mut credited = Vec::with_capacity(bom.len());
        for (size_id, color_id) in bom {
            let sku = ComponentSku {
                category_id: order.category_id,
                model_id: order.model_id,
                component_type_id: order.component_type_id,
                size_id,
                color_id,
            };
            credited.push(
                component_ledger::upsert_and_increment(&mut *tx, sku, order.quantity_pairs).await?,
            );
        }

        sqlx::query("UPDATE production_orders SET state = $1 WHERE id = $2")
            .bind(OrderState::Completed.as_str())
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            order_id,
            rows = credited.len(),
            quantity_pairs = order.quantity_pairs,
            "production order completed"
        );
        Ok(credited)
    }

    /// Cancel a PENDING order. No stock was ever touched, so there is
    /// nothing to compensate.
    pub async fn cancel(&self, order_id: i32) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let order = sqlx::query_as::<_, ProductionOrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM production_orders WHERE id = $1 FOR UPDATE"
        ))
        .bind(order_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("production order {}", order_id)))?
        .into_order()?;

        order.state.transition(OrderState::Cancelled)?;

        sqlx::query("UPDATE production_orders SET state = $1 WHERE id = $2")
            .bind(OrderState::Cancelled.as_str())
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(order_id, "production order cancelled");
        Ok(())
    }

    /// Get an order by id
    pub async fn get(&self, order_id: i32) -> AppResult<ProductionOrder> {
        sqlx::query_as::<_, ProductionOrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM production_orders WHERE id = $1"
        ))
        .bind(order_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("production order {}", order_id)))?
        .into_order()
    }

    /// List all orders, newest first
    pub async fn list(&self) -> AppResult<Vec<ProductionOrder>> {
        let rows = sqlx::query_as::<_, ProductionOrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM production_orders ORDER BY request_date DESC, id DESC"
        ))
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(ProductionOrderRow::into_order).collect()
    }
}
