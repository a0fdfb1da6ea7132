use serde::{Deserialize, Serialize};

use crate::catalog::ItemId;
use crate::money::Cents;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    Cash,
    Pix,
    Card,
}

impl PaymentMethod {
    /// Label used in messages and in the backend payload.
    pub fn label(self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Dinheiro",
            PaymentMethod::Pix => "PIX",
            PaymentMethod::Card => "Cartão",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    DineIn,
    Delivery,
}

impl OrderType {
    pub fn wire_value(self) -> &'static str {
        match self {
            OrderType::DineIn => "restaurante",
            OrderType::Delivery => "delivery",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OrderType::DineIn => "Restaurante",
            OrderType::Delivery => "Delivery",
        }
    }
}

/// One catalog item inside an order. The unit price is a snapshot taken when
/// the line was appended; later catalog changes must not touch it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: String,
    pub name: String,
    pub quantity: u32,
    pub unit_price_cents: Cents,
}

impl OrderLine {
    pub fn total_cents(&self) -> Cents {
        self.unit_price_cents * Cents::from(self.quantity)
    }
}

/// Transient selection memory bridging a two-step choice. A single optional
/// enum keeps the item slot and the beverage slot mutually exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pending {
    Item(ItemId),
    Beverage(ItemId),
}

/// The accumulating cart plus customer, payment, and delivery metadata for
/// one conversation. The total is always derived from the lines.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Order {
    pub customer_name: Option<String>,
    pub lines: Vec<OrderLine>,
    pub payment_method: Option<PaymentMethod>,
    pub order_type: Option<OrderType>,
    pub delivery_address: Option<String>,
    pub pending: Option<Pending>,
}

impl Order {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn total_cents(&self) -> Cents {
        self.lines.iter().map(OrderLine::total_cents).sum()
    }

    pub fn push_line(&mut self, id: String, name: String, quantity: u32, unit_price_cents: Cents) {
        self.lines.push(OrderLine { id, name, quantity, unit_price_cents });
    }
}

#[cfg(test)]
mod tests {
    use super::{Order, OrderType, PaymentMethod};

    #[test]
    fn total_is_derived_from_lines() {
        let mut order = Order::default();
        assert_eq!(order.total_cents(), 0);

        order.push_line("hamburguer-1".into(), "Hambúrguer Bovino Simples".into(), 2, 1800);
        order.push_line("refrigerante-2".into(), "Coca-Cola".into(), 1, 500);

        assert_eq!(order.total_cents(), 4100);
    }

    #[test]
    fn price_snapshots_are_independent_per_line() {
        let mut order = Order::default();
        order.push_line("suco-1".into(), "Suco de Limão".into(), 1, 600);
        order.push_line("suco-2".into(), "Suco de Limão".into(), 1, 700);

        assert_eq!(order.lines[0].unit_price_cents, 600);
        assert_eq!(order.lines[1].unit_price_cents, 700);
        assert_eq!(order.total_cents(), 1300);
    }

    #[test]
    fn labels_match_wire_vocabulary() {
        assert_eq!(PaymentMethod::Cash.label(), "Dinheiro");
        assert_eq!(PaymentMethod::Pix.label(), "PIX");
        assert_eq!(PaymentMethod::Card.label(), "Cartão");
        assert_eq!(OrderType::DineIn.wire_value(), "restaurante");
        assert_eq!(OrderType::Delivery.wire_value(), "delivery");
    }
}
