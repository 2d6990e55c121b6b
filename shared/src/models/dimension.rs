//! Dimension reference values
//!
//! Dimensions are the independently managed lookup values every SKU is
//! built from: category ("Kids", "Adults"), model, size ("25/26"),
//! color, component type ("Tira", "Planta"), and the row/column labels
//! of the series matrix. They are created and updated through the
//! dimension registry and are immutable once referenced by inventory.

use serde::{Deserialize, Serialize};

/// Kind of a plain (id, name) dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DimensionKind {
    Category,
    Model,
    Size,
    Color,
    ComponentType,
    Row,
    Column,
}

impl DimensionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DimensionKind::Category => "category",
            DimensionKind::Model => "model",
            DimensionKind::Size => "size",
            DimensionKind::Color => "color",
            DimensionKind::ComponentType => "component_type",
            DimensionKind::Row => "row",
            DimensionKind::Column => "column",
        }
    }
}

impl std::fmt::Display for DimensionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DimensionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "category" => Ok(DimensionKind::Category),
            "model" => Ok(DimensionKind::Model),
            "size" => Ok(DimensionKind::Size),
            "color" => Ok(DimensionKind::Color),
            "component_type" => Ok(DimensionKind::ComponentType),
            "row" => Ok(DimensionKind::Row),
            "column" => Ok(DimensionKind::Column),
            other => Err(format!("unknown dimension kind: {}", other)),
        }
    }
}

/// A labeled dimension value resolved from the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    pub id: i32,
    pub kind: DimensionKind,
    pub name: String,
}

/// A series code, e.g. "A1"
///
/// Unlike plain dimensions a series code also carries the letter of the
/// size band and its ordering position, used when laying out series
/// tables for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesCode {
    pub id: i32,
    pub code: String,
    pub letter: char,
    pub sort_order: i32,
}
