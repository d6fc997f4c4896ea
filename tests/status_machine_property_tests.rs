//! Property-based tests for the order status machine
//!
//! These drive random status sequences through [`Order::transition_to`] and
//! check the invariants that must hold for any sequence:
//!
//! 1. Terminal states (completed, cancelled) never change again
//! 2. Live states (pending, ready) accept any next status
//! 3. Quantity and total price never change with status
//!
//! Authorization is covered by the service scenarios, not here.

use proptest::prelude::*;
use surplus_market::{
    error::ErrorKind,
    order::{Order, OrderStatus},
};

/// Strategy to generate a random status
fn status_strategy() -> impl Strategy<Value = OrderStatus> {
    prop::sample::select(OrderStatus::ALL.to_vec())
}

fn new_order(qty: u64, unit_price: u64) -> Order {
    Order::new(
        "order1prop".to_string(),
        "user1prop".to_string(),
        "listing1prop".to_string(),
        qty,
        qty * unit_price,
    )
}

proptest! {
    /// Property: once an order reaches a terminal state every later move fails
    #[test]
    fn prop_terminal_states_are_final(
        steps in prop::collection::vec(status_strategy(), 1..=12),
    ) {
        let mut order = new_order(1, 100);
        let mut terminal: Option<OrderStatus> = None;

        for next in steps {
            let result = order.transition_to(next);
            match terminal {
                Some(state) => {
                    prop_assert_eq!(result.unwrap_err().kind(), ErrorKind::InvalidStatusTransition);
                    prop_assert_eq!(order.status(), state);
                }
                None => {
                    prop_assert!(result.is_ok());
                    prop_assert_eq!(order.status(), next);
                    if next.is_terminal() {
                        terminal = Some(next);
                    }
                }
            }
        }
    }

    /// Property: status changes never touch quantity or price
    #[test]
    fn prop_status_changes_keep_quantity_and_price(
        qty in 1u64..=50,
        unit_price in 0u64..=10_000,
        steps in prop::collection::vec(status_strategy(), 0..=8),
    ) {
        let mut order = new_order(qty, unit_price);

        for next in steps {
            let _ = order.transition_to(next);
            prop_assert_eq!(order.qty(), qty);
            prop_assert_eq!(order.total_price(), qty * unit_price);
        }
    }

    /// Property: can_transition_to agrees with transition_to
    #[test]
    fn prop_can_transition_matches_outcome(
        from in status_strategy(),
        to in status_strategy(),
    ) {
        let mut order = new_order(1, 1);
        // reach `from` through the always-open pending state
        order.transition_to(from).unwrap();

        let allowed = from.can_transition_to(to);
        prop_assert_eq!(order.transition_to(to).is_ok(), allowed);
        prop_assert_eq!(allowed, !from.is_terminal());
    }
}
