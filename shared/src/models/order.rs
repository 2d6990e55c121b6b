//! Production and assembly order models
//!
//! Both order kinds share the same three-state machine: they are
//! created PENDING and move exactly once to COMPLETED (with ledger side
//! effects) or CANCELLED (no side effects). Terminal states are
//! immutable; completing an already-completed order is a
//! double-crediting bug upstream, never an idempotent no-op.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::sku::FinishedSku;

/// Lifecycle state of a production or assembly order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderState {
    Pending,
    Completed,
    Cancelled,
}

/// Attempted transition out of a terminal state
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("order is {from}, cannot transition to {to}")]
pub struct InvalidTransition {
    pub from: OrderState,
    pub to: OrderState,
}

impl OrderState {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderState::Pending => "PENDING",
            OrderState::Completed => "COMPLETED",
            OrderState::Cancelled => "CANCELLED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderState::Completed | OrderState::Cancelled)
    }

    /// Validate a transition. Only PENDING -> COMPLETED and
    /// PENDING -> CANCELLED are legal.
    pub fn transition(self, to: OrderState) -> Result<OrderState, InvalidTransition> {
        match (self, to) {
            (OrderState::Pending, OrderState::Completed)
            | (OrderState::Pending, OrderState::Cancelled) => Ok(to),
            (from, to) => Err(InvalidTransition { from, to }),
        }
    }
}

impl std::fmt::Display for OrderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(OrderState::Pending),
            "COMPLETED" => Ok(OrderState::Completed),
            "CANCELLED" => Ok(OrderState::Cancelled),
            other => Err(format!("unknown order state: {}", other)),
        }
    }
}

/// A request to produce a batch of one component type for a series
///
/// Completion credits component inventory for every (size, color) in
/// the series bill of materials: a series is a size run, so a 50-pair
/// order yields 50 pairs of each size in the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionOrder {
    pub id: i32,
    pub quantity_pairs: i32,
    pub request_date: NaiveDate,
    pub state: OrderState,
    pub category_id: i32,
    pub model_id: i32,
    pub series_code_id: i32,
    pub component_type_id: i32,
}

/// A request to assemble finished pairs from component stock
///
/// Holds the target finished SKU as a plain value tuple; the inventory
/// row is created lazily on the first successful assembly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssemblyOrder {
    pub id: i32,
    #[serde(flatten)]
    pub sku: FinishedSku,
    pub quantity_to_assemble: i32,
    pub request_date: NaiveDate,
    pub state: OrderState,
}
