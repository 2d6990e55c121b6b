//! Component and finished-goods ledger tests
//!
//! Pure-logic coverage of the ledger semantics:
//! - lazy row creation with increment (upsert)
//! - conditional decrement that never drives stock negative
//! - conservation across an assembly completion (strap + sole out,
//!   finished pair in)

use std::collections::HashMap;

use proptest::prelude::*;
use shared::models::{ComponentSku, FinishedSku, PartRole};
use shared::validation::{validate_quantity_pairs, validate_stock_delta};

const STRAP_TYPE: i32 = 10;
const SOLE_TYPE: i32 = 11;

fn strap_sku(size: i32, color: i32) -> ComponentSku {
    ComponentSku {
        category_id: 1,
        model_id: 2,
        component_type_id: STRAP_TYPE,
        size_id: size,
        color_id: color,
    }
}

// ============================================================================
// Ledger simulation
// ============================================================================

/// Failure modes of a ledger mutation.
#[derive(Debug, PartialEq, Eq)]
enum LedgerError {
    InvalidDelta,
    Insufficient { requested: i32, available: i32 },
}

/// In-memory model of the component ledger. Mirrors the database
/// semantics: increment creates the row lazily, decrement fails without
/// touching anything when stock is short. A row that was never credited
/// holds zero stock; consuming from it is a shortage with available 0,
/// not a missing resource.
#[derive(Default)]
struct Ledger {
    rows: HashMap<ComponentSku, i32>,
}

impl Ledger {
    fn increment(&mut self, sku: ComponentSku, delta: i32) -> Result<i32, LedgerError> {
        validate_stock_delta(delta).map_err(|_| LedgerError::InvalidDelta)?;
        let stock = self.rows.entry(sku).or_insert(0);
        *stock += delta;
        Ok(*stock)
    }

    fn decrement(&mut self, sku: ComponentSku, delta: i32) -> Result<i32, LedgerError> {
        validate_stock_delta(delta).map_err(|_| LedgerError::InvalidDelta)?;
        let available = self.rows.get(&sku).copied().unwrap_or(0);
        if available < delta {
            return Err(LedgerError::Insufficient {
                requested: delta,
                available,
            });
        }
        *self.rows.get_mut(&sku).unwrap() -= delta;
        Ok(available - delta)
    }

    fn stock(&self, sku: &ComponentSku) -> Option<i32> {
        self.rows.get(sku).copied()
    }

    fn total(&self) -> i64 {
        self.rows.values().map(|&s| s as i64).sum()
    }
}

/// Assembly completion against in-memory ledgers. All-or-nothing: a
/// short strap or sole leaves both ledgers untouched.
fn complete_assembly(
    components: &mut Ledger,
    finished: &mut HashMap<FinishedSku, i32>,
    sku: FinishedSku,
    quantity: i32,
) -> Result<i32, LedgerError> {
    validate_quantity_pairs(quantity).map_err(|_| LedgerError::InvalidDelta)?;
    let bom = sku.component_skus(STRAP_TYPE, SOLE_TYPE);

    for part in [bom.strap, bom.sole] {
        let available = components.stock(&part).unwrap_or(0);
        if available < quantity {
            return Err(LedgerError::Insufficient {
                requested: quantity,
                available,
            });
        }
    }

    components.decrement(bom.strap, quantity)?;
    components.decrement(bom.sole, quantity)?;
    let stock = finished.entry(sku).or_insert(0);
    *stock += quantity;
    Ok(*stock)
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn increment_creates_row_lazily() {
        let mut ledger = Ledger::default();
        let sku = strap_sku(37, 5);

        assert_eq!(ledger.stock(&sku), None);
        assert_eq!(ledger.increment(sku, 50), Ok(50));
        assert_eq!(ledger.stock(&sku), Some(50));
    }

    #[test]
    fn repeated_increments_accumulate() {
        let mut ledger = Ledger::default();
        let sku = strap_sku(37, 5);

        ledger.increment(sku, 50).unwrap();
        assert_eq!(ledger.increment(sku, 20), Ok(70));
    }

    /// A never-credited SKU is short stock with zero available, not a
    /// missing resource; producing it makes a retry succeed.
    #[test]
    fn decrement_on_missing_row_is_a_zero_available_shortage() {
        let mut ledger = Ledger::default();
        let sku = strap_sku(37, 5);

        assert_eq!(
            ledger.decrement(sku, 10),
            Err(LedgerError::Insufficient {
                requested: 10,
                available: 0,
            })
        );

        ledger.increment(sku, 10).unwrap();
        assert_eq!(ledger.decrement(sku, 10), Ok(0));
    }

    #[test]
    fn decrement_beyond_stock_fails_and_preserves_balance() {
        let mut ledger = Ledger::default();
        let sku = strap_sku(37, 5);
        ledger.increment(sku, 30).unwrap();

        assert_eq!(
            ledger.decrement(sku, 40),
            Err(LedgerError::Insufficient {
                requested: 40,
                available: 30,
            })
        );
        assert_eq!(ledger.stock(&sku), Some(30));
    }

    #[test]
    fn decrement_to_exactly_zero_is_allowed() {
        let mut ledger = Ledger::default();
        let sku = strap_sku(37, 5);
        ledger.increment(sku, 30).unwrap();

        assert_eq!(ledger.decrement(sku, 30), Ok(0));
    }

    #[test]
    fn zero_and_negative_deltas_are_rejected() {
        let mut ledger = Ledger::default();
        let sku = strap_sku(37, 5);
        ledger.increment(sku, 30).unwrap();

        assert!(ledger.increment(sku, 0).is_err());
        assert!(ledger.increment(sku, -5).is_err());
        assert!(ledger.decrement(sku, 0).is_err());
        assert_eq!(ledger.stock(&sku), Some(30));
    }

    #[test]
    fn distinct_size_or_color_is_a_distinct_row() {
        let mut ledger = Ledger::default();
        ledger.increment(strap_sku(37, 5), 10).unwrap();
        ledger.increment(strap_sku(38, 5), 20).unwrap();
        ledger.increment(strap_sku(37, 6), 30).unwrap();

        assert_eq!(ledger.stock(&strap_sku(37, 5)), Some(10));
        assert_eq!(ledger.stock(&strap_sku(38, 5)), Some(20));
        assert_eq!(ledger.stock(&strap_sku(37, 6)), Some(30));
    }

    #[test]
    fn finished_sku_resolves_strap_and_sole_components() {
        let sku = FinishedSku {
            category_id: 1,
            model_id: 2,
            size_id: 37,
            color_sole_id: 8,
            color_strap_id: 5,
        };
        let bom = sku.component_skus(STRAP_TYPE, SOLE_TYPE);

        assert_eq!(bom.strap.component_type_id, STRAP_TYPE);
        assert_eq!(bom.strap.color_id, 5);
        assert_eq!(bom.sole.component_type_id, SOLE_TYPE);
        assert_eq!(bom.sole.color_id, 8);
        assert_eq!(bom.strap.size_id, bom.sole.size_id);
    }
}

// ============================================================================
// Assembly completion scenarios
// ============================================================================

#[cfg(test)]
mod assembly_tests {
    use super::*;

    fn test_sku() -> FinishedSku {
        FinishedSku {
            category_id: 1,
            model_id: 2,
            size_id: 37,
            color_sole_id: 8,
            color_strap_id: 5,
        }
    }

    #[test]
    fn completion_moves_stock_from_components_to_finished() {
        let sku = test_sku();
        let bom = sku.component_skus(STRAP_TYPE, SOLE_TYPE);
        let mut components = Ledger::default();
        let mut finished = HashMap::new();

        components.increment(bom.strap, 50).unwrap();
        components.increment(bom.sole, 50).unwrap();

        let result = complete_assembly(&mut components, &mut finished, sku, 30);
        assert_eq!(result, Ok(30));
        assert_eq!(components.stock(&bom.strap), Some(20));
        assert_eq!(components.stock(&bom.sole), Some(20));
        assert_eq!(finished.get(&sku), Some(&30));
    }

    #[test]
    fn short_sole_leaves_strap_untouched() {
        let sku = test_sku();
        let bom = sku.component_skus(STRAP_TYPE, SOLE_TYPE);
        let mut components = Ledger::default();
        let mut finished = HashMap::new();

        components.increment(bom.strap, 50).unwrap();
        components.increment(bom.sole, 10).unwrap();

        let result = complete_assembly(&mut components, &mut finished, sku, 30);
        assert_eq!(
            result,
            Err(LedgerError::Insufficient {
                requested: 30,
                available: 10,
            })
        );
        assert_eq!(components.stock(&bom.strap), Some(50));
        assert_eq!(components.stock(&bom.sole), Some(10));
        assert!(finished.is_empty());
    }

    /// A sole that was never produced reads as zero stock, so the
    /// completion reports the full shortfall and touches nothing.
    #[test]
    fn never_produced_component_fails_completion_as_shortage() {
        let sku = test_sku();
        let bom = sku.component_skus(STRAP_TYPE, SOLE_TYPE);
        let mut components = Ledger::default();
        let mut finished = HashMap::new();

        components.increment(bom.strap, 50).unwrap();

        let result = complete_assembly(&mut components, &mut finished, sku, 30);
        assert_eq!(
            result,
            Err(LedgerError::Insufficient {
                requested: 30,
                available: 0,
            })
        );
        assert_eq!(components.stock(&bom.strap), Some(50));
    }

    #[test]
    fn completion_conserves_total_pairs() {
        let sku = test_sku();
        let bom = sku.component_skus(STRAP_TYPE, SOLE_TYPE);
        let mut components = Ledger::default();
        let mut finished = HashMap::new();

        components.increment(bom.strap, 40).unwrap();
        components.increment(bom.sole, 60).unwrap();
        let before = components.total();

        complete_assembly(&mut components, &mut finished, sku, 25).unwrap();

        let finished_total: i64 = finished.values().map(|&s| s as i64).sum();
        // each finished pair consumed one strap and one sole
        assert_eq!(components.total(), before - 2 * 25);
        assert_eq!(finished_total, 25);
    }

    #[test]
    fn same_role_in_part_labels() {
        assert_eq!(PartRole::Strap.to_string(), "strap");
        assert_eq!(PartRole::Sole.to_string(), "sole");
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn sku_strategy() -> impl Strategy<Value = ComponentSku> {
        (1i32..=3, 1i32..=3, 35i32..=42, 1i32..=6).prop_map(|(cat, model, size, color)| {
            ComponentSku {
                category_id: cat,
                model_id: model,
                component_type_id: STRAP_TYPE,
                size_id: size,
                color_id: color,
            }
        })
    }

    fn delta_strategy() -> impl Strategy<Value = i32> {
        1i32..=500
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Stock is always the sum of applied deltas for that SKU.
        #[test]
        fn prop_stock_is_sum_of_applied_deltas(
            ops in prop::collection::vec((sku_strategy(), delta_strategy(), any::<bool>()), 1..40)
        ) {
            let mut ledger = Ledger::default();
            let mut expected: HashMap<ComponentSku, i32> = HashMap::new();

            for (sku, delta, is_increment) in ops {
                if is_increment {
                    ledger.increment(sku, delta).unwrap();
                    *expected.entry(sku).or_insert(0) += delta;
                } else if ledger.decrement(sku, delta).is_ok() {
                    *expected.entry(sku).or_insert(0) -= delta;
                }
            }

            for (sku, stock) in &expected {
                prop_assert_eq!(ledger.stock(sku), Some(*stock));
            }
        }

        /// No sequence of operations drives any row negative.
        #[test]
        fn prop_stock_never_negative(
            ops in prop::collection::vec((sku_strategy(), delta_strategy(), any::<bool>()), 1..60)
        ) {
            let mut ledger = Ledger::default();
            for (sku, delta, is_increment) in ops {
                if is_increment {
                    ledger.increment(sku, delta).unwrap();
                } else {
                    let _ = ledger.decrement(sku, delta);
                }
                prop_assert!(ledger.rows.values().all(|&s| s >= 0));
            }
        }

        /// A failed decrement leaves the row exactly as it was.
        #[test]
        fn prop_failed_decrement_has_no_effect(
            sku in sku_strategy(),
            stock in 0i32..=100,
            extra in 1i32..=100
        ) {
            let mut ledger = Ledger::default();
            if stock > 0 {
                ledger.increment(sku, stock).unwrap();
            }

            let before = ledger.stock(&sku);
            prop_assert!(ledger.decrement(sku, stock + extra).is_err());
            prop_assert_eq!(ledger.stock(&sku), before);
        }

        /// Completing an assembly conserves pairs: components lose twice
        /// the quantity, finished goods gain it once.
        #[test]
        fn prop_assembly_conserves_pairs(
            strap_stock in 1i32..=200,
            sole_stock in 1i32..=200,
            quantity in 1i32..=200
        ) {
            let sku = FinishedSku {
                category_id: 1,
                model_id: 2,
                size_id: 37,
                color_sole_id: 8,
                color_strap_id: 5,
            };
            let bom = sku.component_skus(STRAP_TYPE, SOLE_TYPE);
            let mut components = Ledger::default();
            let mut finished = HashMap::new();

            components.increment(bom.strap, strap_stock).unwrap();
            components.increment(bom.sole, sole_stock).unwrap();

            let result = complete_assembly(&mut components, &mut finished, sku, quantity);

            if quantity <= strap_stock && quantity <= sole_stock {
                prop_assert!(result.is_ok());
                prop_assert_eq!(components.total(), (strap_stock + sole_stock - 2 * quantity) as i64);
                prop_assert_eq!(finished.get(&sku), Some(&quantity));
            } else {
                prop_assert!(result.is_err());
                prop_assert_eq!(components.total(), (strap_stock + sole_stock) as i64);
                prop_assert!(finished.is_empty());
            }
        }
    }
}
