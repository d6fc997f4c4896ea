//! Orders and the status machine they move through
use super::error::MarketError;
use super::types::TimeStamp;
use chrono::Utc;
use std::fmt;

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, Eq, Hash, PartialEq)]
pub enum OrderStatus {
    #[n(0)]
    Pending,
    #[n(1)]
    Ready,
    #[n(2)]
    Completed,
    #[n(3)]
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Ready,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Only terminal states block a move; any live order may take any status.
    pub fn can_transition_to(&self, _next: OrderStatus) -> bool {
        !self.is_terminal()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Ready => "ready",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Eq, PartialEq)]
pub struct Order {
    #[n(0)]
    pub id: String,
    #[n(1)]
    pub user_id: String,
    #[n(2)]
    pub listing_id: String,
    #[n(3)]
    qty: u64,
    #[n(4)]
    total_price: u64, // snapshotted at creation
    #[n(5)]
    status: OrderStatus,
    #[n(6)]
    pub created_at: TimeStamp<Utc>,
}

impl Order {
    /// A freshly placed order always starts out pending.
    pub fn new(id: String, user_id: String, listing_id: String, qty: u64, total_price: u64) -> Self {
        Self {
            id,
            user_id,
            listing_id,
            qty,
            total_price,
            status: OrderStatus::Pending,
            created_at: TimeStamp::new(),
        }
    }
    pub fn qty(&self) -> u64 {
        self.qty
    }
    pub fn total_price(&self) -> u64 {
        self.total_price
    }
    pub fn status(&self) -> OrderStatus {
        self.status
    }
    pub fn transition_to(&mut self, next: OrderStatus) -> Result<(), MarketError> {
        if !self.status.can_transition_to(next) {
            return Err(MarketError::InvalidStatusTransition {
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        self.status = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn order() -> Order {
        Order::new("order1".into(), "user1".into(), "listing1".into(), 2, 600)
    }

    #[test]
    fn new_orders_are_pending() {
        assert_eq!(order().status(), OrderStatus::Pending);
    }

    #[test]
    fn terminal_states_reject_everything() {
        for terminal in [OrderStatus::Completed, OrderStatus::Cancelled] {
            for next in OrderStatus::ALL {
                let mut o = order();
                o.status = terminal;
                let err = o.transition_to(next).unwrap_err();
                assert_eq!(err.kind(), ErrorKind::InvalidStatusTransition);
                assert_eq!(o.status(), terminal);
            }
        }
    }

    #[test]
    fn pending_can_skip_straight_to_completed() {
        let mut o = order();
        o.transition_to(OrderStatus::Completed).unwrap();
        assert_eq!(o.status(), OrderStatus::Completed);
    }

    #[test]
    fn transition_keeps_quantity_and_price() {
        let mut o = order();
        o.transition_to(OrderStatus::Ready).unwrap();
        assert_eq!((o.qty(), o.total_price()), (2, 600));
    }

    #[test]
    fn order_cbor_roundtrip() {
        let original = order();
        let encoding = minicbor::to_vec(&original).unwrap();
        let decoded: Order = minicbor::decode(&encoding).unwrap();
        assert_eq!(original, decoded);
    }
}
