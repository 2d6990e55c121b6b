//! Assembly order pipeline
//!
//! An assembly order converts component stock into finished-product
//! stock: completing it consumes one strap and one sole component per
//! pair and credits the finished SKU by the same amount. The two
//! decrements and the increment are one atomic unit; a shortage on
//! either component rolls the whole operation back and names the short
//! part. Which component-type dimensions play the strap and sole roles
//! comes from [`BomConfig`], not from a name convention baked into the
//! code.

use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use sqlx::PgPool;
use validator::Validate;

use crate::config::BomConfig;
use crate::error::{AppError, AppResult};
use crate::services::component_ledger;
use crate::services::dimension::DimensionRegistry;
use crate::services::finished_ledger::{self, FinishedStockRow};
use shared::models::{AssemblyOrder, DimensionKind, FinishedSku, OrderState, PartRole};

/// Assembly order service
#[derive(Clone)]
pub struct AssemblyOrderService {
    db: PgPool,
    registry: DimensionRegistry,
    bom: BomConfig,
}

/// Input for creating an assembly order
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAssemblyOrderInput {
    pub category_id: i32,
    pub model_id: i32,
    pub size_id: i32,
    pub color_sole_id: i32,
    pub color_strap_id: i32,
    #[validate(range(min = 1, message = "quantity_to_assemble must be positive"))]
    pub quantity_to_assemble: i32,
    pub request_date: Option<NaiveDate>,
}

/// Database row for an assembly order
#[derive(Debug, sqlx::FromRow)]
struct AssemblyOrderRow {
    id: i32,
    quantity_to_assemble: i32,
    request_date: NaiveDate,
    state: String,
    category_id: i32,
    model_id: i32,
    size_id: i32,
    color_sole_id: i32,
    color_strap_id: i32,
}

impl AssemblyOrderRow {
    fn into_order(self) -> AppResult<AssemblyOrder> {
        let state = self
            .state
            .parse::<OrderState>()
            .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;
        Ok(AssemblyOrder {
            id: self.id,
            sku: FinishedSku {
                category_id: self.category_id,
                model_id: self.model_id,
                size_id: self.size_id,
                color_sole_id: self.color_sole_id,
                color_strap_id: self.color_strap_id,
            },
            quantity_to_assemble: self.quantity_to_assemble,
            request_date: self.request_date,
            state,
        })
    }
}

const ORDER_COLUMNS: &str = "id, quantity_to_assemble, request_date, state, category_id, \
                             model_id, size_id, color_sole_id, color_strap_id";

impl AssemblyOrderService {
    /// Create a new AssemblyOrderService instance
    pub fn new(db: PgPool, bom: BomConfig) -> Self {
        let registry = DimensionRegistry::new(db.clone());
        Self { db, registry, bom }
    }

    /// Create a PENDING assembly order targeting a finished SKU. The
    /// SKU is stored as a value tuple; the finished inventory row is
    /// created lazily on first successful completion.
    pub async fn create(&self, input: CreateAssemblyOrderInput) -> AppResult<AssemblyOrder> {
        input.validate()?;

        self.registry
            .ensure(DimensionKind::Category, input.category_id)
            .await?;
        self.registry.ensure(DimensionKind::Model, input.model_id).await?;
        self.registry.ensure(DimensionKind::Size, input.size_id).await?;
        self.registry.ensure(DimensionKind::Color, input.color_sole_id).await?;
        self.registry.ensure(DimensionKind::Color, input.color_strap_id).await?;

        let request_date = input
            .request_date
            .unwrap_or_else(|| Utc::now().date_naive());

        let row = sqlx::query_as::<_, AssemblyOrderRow>(&format!(
            r#"
            INSERT INTO assembly_orders
                (quantity_to_assemble, request_date, state, category_id, model_id,
                 size_id, color_sole_id, color_strap_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(input.quantity_to_assemble)
        .bind(request_date)
        .bind(OrderState::Pending.as_str())
        .bind(input.category_id)
        .bind(input.model_id)
        .bind(input.size_id)
        .bind(input.color_sole_id)
        .bind(input.color_strap_id)
        .fetch_one(&self.db)
        .await?;

        let order = row.into_order()?;
        tracing::info!(
            order_id = order.id,
            quantity = order.quantity_to_assemble,
            "assembly order created"
        );
        Ok(order)
    }

    /// Complete a PENDING order: consume the strap and sole components
    /// and credit the finished SKU, all in one transaction. The strap
    /// decrement runs first and fails fast; the sole decrement and the
    /// finished-stock increment never apply without it.
    pub async fn complete(&self, order_id: i32) -> AppResult<FinishedStockRow> {
        let mut tx = self.db.begin().await?;

        let order = sqlx::query_as::<_, AssemblyOrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM assembly_orders WHERE id = $1 FOR UPDATE"
        ))
        .bind(order_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("assembly order {}", order_id)))?
        .into_order()?;

        order.state.transition(OrderState::Completed)?;

        let strap_type = self
            .registry
            .resolve_component_type(&self.bom.strap_component_type)
            .await?;
        let sole_type = self
            .registry
            .resolve_component_type(&self.bom.sole_component_type)
            .await?;

        let bom = order.sku.component_skus(strap_type.id, sole_type.id);
        let quantity = order.quantity_to_assemble;

        component_ledger::decrement(&mut *tx, Some(PartRole::Strap), bom.strap, quantity).await?;
        component_ledger::decrement(&mut *tx, Some(PartRole::Sole), bom.sole, quantity).await?;

        let finished = finished_ledger::upsert_and_increment(&mut *tx, order.sku, quantity).await?;

        sqlx::query("UPDATE assembly_orders SET state = $1 WHERE id = $2")
            .bind(OrderState::Completed.as_str())
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            order_id,
            quantity,
            stock_pairs = finished.stock_pairs,
            "assembly order completed"
        );
        Ok(finished)
    }

    /// Cancel a PENDING order with no ledger effect
    pub async fn cancel(&self, order_id: i32) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let order = sqlx::query_as::<_, AssemblyOrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM assembly_orders WHERE id = $1 FOR UPDATE"
        ))
        .bind(order_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("assembly order {}", order_id)))?
        .into_order()?;

        order.state.transition(OrderState::Cancelled)?;

        sqlx::query("UPDATE assembly_orders SET state = $1 WHERE id = $2")
            .bind(OrderState::Cancelled.as_str())
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(order_id, "assembly order cancelled");
        Ok(())
    }

    /// Get an order by id
    pub async fn get(&self, order_id: i32) -> AppResult<AssemblyOrder> {
        sqlx::query_as::<_, AssemblyOrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM assembly_orders WHERE id = $1"
        ))
        .bind(order_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("assembly order {}", order_id)))?
        .into_order()
    }

    /// List all orders, newest first
    pub async fn list(&self) -> AppResult<Vec<AssemblyOrder>> {
        let rows = sqlx::query_as::<_, AssemblyOrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM assembly_orders ORDER BY request_date DESC, id DESC"
        ))
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(AssemblyOrderRow::into_order).collect()
    }
}
