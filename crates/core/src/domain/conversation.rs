use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::order::Order;

/// Current step of the ordering dialogue. One value per conversation; every
/// inbound message is interpreted against exactly one of these.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogueState {
    Start,
    Menu,
    BurgerQuantity,
    AddMore,
    BeverageTypeSoda,
    BeverageQuantitySoda,
    BeverageTypeJuice,
    BeverageQuantityJuice,
    BeverageQuantityGeneric,
    OrderType,
    DeliveryAddress,
    CustomerName,
    PaymentMethod,
}

/// One customer's ongoing session, keyed by the opaque transport address.
/// Created lazily on first contact, destroyed on exit or finalize; there is
/// no expiry.
#[derive(Clone, Debug)]
pub struct Conversation {
    pub id: String,
    pub state: DialogueState,
    pub order: Order,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: DialogueState::Start,
            order: Order::default(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Conversation, DialogueState};

    #[test]
    fn fresh_conversations_start_empty_at_start() {
        let conversation = Conversation::new("5521997624873@s.whatsapp.net");
        assert_eq!(conversation.state, DialogueState::Start);
        assert!(conversation.order.is_empty());
        assert!(conversation.order.pending.is_none());
    }
}
