//! Series/kit matrix types
//!
//! A series assigns, per size, a strap color and a sole color for one
//! (model, category, series code). Flattened kit rows (one per size per
//! component type) seed component definitions before production orders
//! reference them; matrix cells are the row/column grid the frontend
//! edits.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// One requested combination when generating a series: for this size,
/// which strap color and which sole color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesCombination {
    pub size_id: i32,
    pub color_strap_id: i32,
    pub color_sole_id: i32,
}

/// The unique 6-key of a flattened kit row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KitKey {
    pub series_code_id: i32,
    pub model_id: i32,
    pub size_id: i32,
    pub color_id: i32,
    pub category_id: i32,
    pub component_type_id: i32,
}

/// Position key of a matrix cell, used to drop duplicate cells on save
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellKey {
    pub row_id: i32,
    pub column_id: i32,
    pub model_id: i32,
    pub category_id: i32,
    pub component_type_id: i32,
}

/// One cell of the size/type matrix: at (row, column) for a given
/// model, category and component type, use this color
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixCell {
    pub id: i32,
    pub row_id: i32,
    pub column_id: i32,
    pub model_id: i32,
    pub category_id: i32,
    pub component_type_id: i32,
    pub color_id: i32,
}

impl MatrixCell {
    pub fn position(&self) -> CellKey {
        CellKey {
            row_id: self.row_id,
            column_id: self.column_id,
            model_id: self.model_id,
            category_id: self.category_id,
            component_type_id: self.component_type_id,
        }
    }
}

/// Expand the requested combinations into the kit keys a generation run
/// wants present: a strap variant and a sole variant per size.
pub fn expand_combinations(
    series_code_id: i32,
    model_id: i32,
    category_id: i32,
    strap_type_id: i32,
    sole_type_id: i32,
    combinations: &[SeriesCombination],
) -> Vec<KitKey> {
    let mut keys = Vec::with_capacity(combinations.len() * 2);
    for combo in combinations {
        keys.push(KitKey {
            series_code_id,
            model_id,
            size_id: combo.size_id,
            color_id: combo.color_strap_id,
            category_id,
            component_type_id: strap_type_id,
        });
        keys.push(KitKey {
            series_code_id,
            model_id,
            size_id: combo.size_id,
            color_id: combo.color_sole_id,
            category_id,
            component_type_id: sole_type_id,
        });
    }
    keys
}

/// Set reconciliation for the generator: keep only the requested keys
/// that are not already present, dropping repeats within the request
/// itself. Input order is preserved, so re-running an overlapping
/// request yields exactly the truly-new keys.
pub fn missing_keys(existing: &HashSet<KitKey>, requested: &[KitKey]) -> Vec<KitKey> {
    let mut seen = existing.clone();
    let mut missing = Vec::new();
    for key in requested {
        if seen.insert(*key) {
            missing.push(*key);
        }
    }
    missing
}
