//! Business logic services for the footwear inventory core

pub mod assembly;
pub mod component_ledger;
pub mod dimension;
pub mod finished_ledger;
pub mod production;
pub mod series_matrix;

pub use assembly::AssemblyOrderService;
pub use component_ledger::ComponentLedgerService;
pub use dimension::DimensionRegistry;
pub use finished_ledger::FinishedLedgerService;
pub use production::ProductionOrderService;
pub use series_matrix::SeriesMatrixService;
