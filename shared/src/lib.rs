//! Shared types and models for the Footwear Inventory Platform
//!
//! This crate contains the domain types shared between the inventory
//! core and the HTTP/controller layer that consumes it: dimension
//! references, SKU tuples, order state machine, and series/kit
//! combination types.

pub mod models;
pub mod validation;

pub use models::*;
pub use validation::*;
