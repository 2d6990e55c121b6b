//! Stock-keeping-unit tuples
//!
//! A SKU is the unique tuple of dimension ids that identifies exactly
//! one inventory row. SKUs are plain value tuples, never live
//! references to dimension records; services resolve the ids through
//! the dimension registry when they need the labels.

use serde::{Deserialize, Serialize};

/// SKU of a raw component (sole or strap): the unique 5-tuple over
/// component inventory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentSku {
    pub category_id: i32,
    pub model_id: i32,
    pub component_type_id: i32,
    pub size_id: i32,
    pub color_id: i32,
}

impl std::fmt::Display for ComponentSku {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "component[cat={} model={} type={} size={} color={}]",
            self.category_id, self.model_id, self.component_type_id, self.size_id, self.color_id
        )
    }
}

/// SKU of an assembled finished product: the unique 5-tuple over
/// finished-product inventory
///
/// No component type here (the product is a complete sandal), but two
/// color fields: one for the sole, one for the strap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FinishedSku {
    pub category_id: i32,
    pub model_id: i32,
    pub size_id: i32,
    pub color_sole_id: i32,
    pub color_strap_id: i32,
}

impl FinishedSku {
    /// Resolve the bill of materials for one assembled pair: the strap
    /// component SKU and the sole component SKU this product consumes.
    ///
    /// The component-type ids come from configuration rather than a
    /// name match, so the mapping is explicit at the call site.
    pub fn component_skus(&self, strap_type_id: i32, sole_type_id: i32) -> ComponentBom {
        ComponentBom {
            strap: ComponentSku {
                category_id: self.category_id,
                model_id: self.model_id,
                component_type_id: strap_type_id,
                size_id: self.size_id,
                color_id: self.color_strap_id,
            },
            sole: ComponentSku {
                category_id: self.category_id,
                model_id: self.model_id,
                component_type_id: sole_type_id,
                size_id: self.size_id,
                color_id: self.color_sole_id,
            },
        }
    }
}

impl std::fmt::Display for FinishedSku {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "finished[cat={} model={} size={} sole={} strap={}]",
            self.category_id, self.model_id, self.size_id, self.color_sole_id, self.color_strap_id
        )
    }
}

/// The two component SKUs consumed when assembling one finished SKU
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentBom {
    pub strap: ComponentSku,
    pub sole: ComponentSku,
}

/// Which part of the sandal a component plays in an assembly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartRole {
    Strap,
    Sole,
}

impl PartRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartRole::Strap => "strap",
            PartRole::Sole => "sole",
        }
    }
}

impl std::fmt::Display for PartRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
