//! Validation helpers for inventory inputs
//!
//! Quantity and batch-shape checks shared by the core services and the
//! controller layer.

use crate::models::SeriesCombination;

/// Stock quantities are counted in pairs and must be strictly positive.
pub fn validate_quantity_pairs(quantity: i32) -> Result<(), &'static str> {
    if quantity <= 0 {
        return Err("Quantity in pairs must be positive");
    }
    Ok(())
}

/// A stock delta applied to a ledger row must be strictly positive;
/// direction is chosen by the operation (increment vs decrement), never
/// by the sign of the delta.
pub fn validate_stock_delta(delta: i32) -> Result<(), &'static str> {
    if delta <= 0 {
        return Err("Stock delta must be positive");
    }
    Ok(())
}

/// A series generation request must carry at least one combination.
pub fn validate_combinations(combinations: &[SeriesCombination]) -> Result<(), &'static str> {
    if combinations.is_empty() {
        return Err("No combinations to register");
    }
    Ok(())
}
