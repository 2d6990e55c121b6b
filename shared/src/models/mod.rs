//! Domain models for the footwear inventory platform

pub mod dimension;
pub mod order;
pub mod series;
pub mod sku;

pub use dimension::*;
pub use order::*;
pub use series::*;
pub use sku::*;
