//! Quantity delta computation for item-list updates.
//!
//! Updating an order's items must touch only what actually changed:
//! grown lines reserve the increase, shrunk lines restore the decrease,
//! removed lines restore their full quantity, new lines reserve their
//! full quantity. Unchanged lines produce no operation at all.

use domain::OrderLine;
use store::InventoryOp;

/// Computes the inventory operations that turn the reservation state of
/// `old` into that of `new`.
///
/// Reserves come first (in new-list order), restores after (in old-list
/// order), so a later compensation pass only ever has to unwind reserves.
pub fn compute_deltas(old: &[OrderLine], new: &[OrderLine]) -> Vec<InventoryOp> {
    let old_quantity = |line: &OrderLine| {
        old.iter()
            .find(|candidate| candidate.food_item_id == line.food_item_id)
            .map(|candidate| candidate.quantity)
            .unwrap_or(0)
    };
    let new_quantity = |line: &OrderLine| {
        new.iter()
            .find(|candidate| candidate.food_item_id == line.food_item_id)
            .map(|candidate| candidate.quantity)
            .unwrap_or(0)
    };

    let mut ops = Vec::new();
    for line in new {
        let previous = old_quantity(line);
        if line.quantity > previous {
            ops.push(InventoryOp::Reserve {
                food_item_id: line.food_item_id,
                quantity: line.quantity - previous,
            });
        }
    }
    for line in old {
        let current = new_quantity(line);
        if line.quantity > current {
            ops.push(InventoryOp::Restore {
                food_item_id: line.food_item_id,
                quantity: line.quantity - current,
            });
        }
    }
    ops
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::FoodItemId;

    fn line(food_item_id: FoodItemId, quantity: u32) -> OrderLine {
        OrderLine::new(food_item_id, 5.0, quantity)
    }

    #[test]
    fn grown_new_and_removed_lines_produce_exact_deltas() {
        let a = FoodItemId::new();
        let b = FoodItemId::new();
        let c = FoodItemId::new();

        let old = vec![line(a, 2), line(b, 1)];
        let new = vec![line(a, 3), line(c, 1)];

        assert_eq!(
            compute_deltas(&old, &new),
            vec![
                InventoryOp::Reserve { food_item_id: a, quantity: 1 },
                InventoryOp::Reserve { food_item_id: c, quantity: 1 },
                InventoryOp::Restore { food_item_id: b, quantity: 1 },
            ]
        );
    }

    #[test]
    fn unchanged_lines_produce_no_operations() {
        let a = FoodItemId::new();
        let old = vec![line(a, 2)];
        let new = vec![line(a, 2)];
        assert!(compute_deltas(&old, &new).is_empty());
    }

    #[test]
    fn shrunk_line_restores_the_difference() {
        let a = FoodItemId::new();
        let old = vec![line(a, 5)];
        let new = vec![line(a, 2)];
        assert_eq!(
            compute_deltas(&old, &new),
            vec![InventoryOp::Restore { food_item_id: a, quantity: 3 }]
        );
    }

    #[test]
    fn empty_old_list_reserves_everything() {
        let a = FoodItemId::new();
        let b = FoodItemId::new();
        let new = vec![line(a, 2), line(b, 1)];
        assert_eq!(
            compute_deltas(&[], &new),
            vec![
                InventoryOp::Reserve { food_item_id: a, quantity: 2 },
                InventoryOp::Reserve { food_item_id: b, quantity: 1 },
            ]
        );
    }
}
