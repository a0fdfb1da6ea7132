//! Order finalization: payload assembly for the order backend, the
//! confirmation text on success, and the retry text on failure.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::order::{Order, OrderType, PaymentMethod};
use crate::errors::BackendError;
use crate::money::{cents_to_decimal, format_brl};

/// Digits-only phone derived from the transport address, with the leading
/// country code 55 stripped. `5521997624873@s.whatsapp.net` -> `21997624873`.
pub fn normalize_phone(conversation_id: &str) -> String {
    let raw = conversation_id.split('@').next().unwrap_or(conversation_id);
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    match digits.strip_prefix("55") {
        Some(rest) => rest.to_string(),
        None => digits,
    }
}

pub fn default_customer_name(phone: &str) -> String {
    format!("Cliente {phone}")
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct SubmissionItem {
    pub id: String,
    pub name: String,
    pub quantity: u32,
    /// Unit price in currency units; cents only exist inside the process.
    #[serde(rename = "price")]
    pub unit_price: Decimal,
}

/// The creation request sent to the order backend.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct OrderSubmission {
    pub customer_name: String,
    pub customer_phone: String,
    pub items: Vec<SubmissionItem>,
    pub total_price: Decimal,
    pub payment_method: String,
    pub order_type: String,
    pub delivery_address: Option<String>,
}

pub fn build_submission(conversation_id: &str, order: &Order) -> OrderSubmission {
    let phone = normalize_phone(conversation_id);
    let customer_name = order
        .customer_name
        .clone()
        .unwrap_or_else(|| default_customer_name(&phone));

    OrderSubmission {
        customer_name,
        customer_phone: phone,
        items: order
            .lines
            .iter()
            .map(|line| SubmissionItem {
                id: line.id.clone(),
                name: line.name.clone(),
                quantity: line.quantity,
                unit_price: cents_to_decimal(line.unit_price_cents),
            })
            .collect(),
        total_price: cents_to_decimal(order.total_cents()),
        payment_method: order
            .payment_method
            .map(PaymentMethod::label)
            .unwrap_or("Dinheiro")
            .to_string(),
        order_type: order
            .order_type
            .unwrap_or(OrderType::DineIn)
            .wire_value()
            .to_string(),
        delivery_address: order.delivery_address.clone(),
    }
}

/// What a successful backend submission returns. Everything past the order
/// id is optional queue metadata.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub order_id: String,
    pub display_id: Option<String>,
    pub daily_sequence: Option<u32>,
    pub customer_total_orders: Option<u32>,
    pub estimated_time: Option<u32>,
}

impl SubmissionReceipt {
    /// Backend display id, else the zero-padded daily sequence, else the
    /// first six characters of the order id upper-cased.
    pub fn display_label(&self) -> String {
        if let Some(display_id) = &self.display_id {
            return display_id.clone();
        }
        if let Some(sequence) = self.daily_sequence {
            return format!("#{sequence:03}");
        }
        let prefix: String = self.order_id.chars().take(6).collect();
        format!("#{}", prefix.to_uppercase())
    }

    /// Estimated preparation window in minutes: the backend estimate, else
    /// 20 minutes per order ahead in the daily queue, else a flat 20.
    pub fn estimated_window(&self) -> (u32, u32) {
        let estimate = self
            .estimated_time
            .or_else(|| self.daily_sequence.map(|sequence| sequence * 20))
            .unwrap_or(20);
        (estimate, estimate + 10)
    }
}

/// Port to the order-management backend.
#[async_trait]
pub trait OrderBackend: Send + Sync {
    async fn submit(&self, submission: &OrderSubmission) -> Result<SubmissionReceipt, BackendError>;
}

pub fn confirmation_message(order: &Order, receipt: &SubmissionReceipt) -> String {
    let sequence_info = receipt
        .daily_sequence
        .map(|sequence| format!("\n📍 *Posição na fila:* {sequence}º pedido do dia"))
        .unwrap_or_default();
    let customer_orders_info = receipt
        .customer_total_orders
        .map(|count| format!("\n🎉 *Este é seu {count}º pedido!*"))
        .unwrap_or_default();

    let order_type = order.order_type.unwrap_or(OrderType::DineIn);
    let type_emoji = match order_type {
        OrderType::Delivery => "🚴",
        OrderType::DineIn => "🍽️",
    };
    let payment = order.payment_method.map(PaymentMethod::label).unwrap_or("Dinheiro");

    let items: Vec<String> = order
        .lines
        .iter()
        .map(|line| {
            format!("{}x {} - {}", line.quantity, line.name, format_brl(line.total_cents()))
        })
        .collect();

    let (window_min, window_max) = receipt.estimated_window();

    format!(
        "✅ *PEDIDO CONFIRMADO!*\n\n\
         ━━━━━━━━━━━━━━━━━━━━\n\
         🆔 *PEDIDO {}*{sequence_info}{customer_orders_info}\n\
         ━━━━━━━━━━━━━━━━━━━━\n\n\
         📋 *Resumo:*\n{}\n\n\
         💰 *Total: {}*\n\
         {type_emoji} {} | 💳 {payment}\n\n\
         ⏰ *Tempo estimado: {window_min}-{window_max} minutos*\n\n\
         🍔 Seu pedido está sendo preparado!\n\n\
         *Obrigado pela preferência!* 😊",
        receipt.display_label(),
        items.join("\n"),
        format_brl(order.total_cents()),
        order_type.label(),
    )
}

pub fn submission_failed_message() -> String {
    "❌ Erro ao processar pedido. Tente novamente.".to_string()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::domain::order::{Order, OrderType, PaymentMethod};

    use super::{build_submission, confirmation_message, normalize_phone, SubmissionReceipt};

    fn order() -> Order {
        let mut order = Order::default();
        order.push_line("hamburguer-1".into(), "Hambúrguer Suíno Simples".into(), 2, 2000);
        order.push_line("refrigerante-2".into(), "Coca-Cola".into(), 1, 500);
        order.payment_method = Some(PaymentMethod::Pix);
        order.order_type = Some(OrderType::Delivery);
        order.delivery_address = Some("Rua das Flores, 123".into());
        order.customer_name = Some("Maria".into());
        order
    }

    #[test]
    fn phone_is_digits_only_with_country_code_stripped() {
        assert_eq!(normalize_phone("5521997624873@s.whatsapp.net"), "21997624873");
        assert_eq!(normalize_phone("+55 (21) 99762-4873@c.us"), "21997624873");
        assert_eq!(normalize_phone("11912345678@c.us"), "11912345678");
    }

    #[test]
    fn submission_payload_matches_the_wire_contract() {
        let submission = build_submission("5521997624873@s.whatsapp.net", &order());
        let value = serde_json::to_value(&submission).expect("serializes");

        assert_eq!(value["customer_name"], json!("Maria"));
        assert_eq!(value["customer_phone"], json!("21997624873"));
        assert_eq!(value["total_price"], json!("45.00"));
        assert_eq!(value["items"][0]["price"], json!("20.00"));
        assert_eq!(value["items"][0]["quantity"], json!(2));
        assert_eq!(value["payment_method"], json!("PIX"));
        assert_eq!(value["order_type"], json!("delivery"));
        assert_eq!(value["delivery_address"], json!("Rua das Flores, 123"));
    }

    #[test]
    fn missing_name_defaults_to_a_phone_placeholder() {
        let mut order = order();
        order.customer_name = None;
        let submission = build_submission("5521997624873@s.whatsapp.net", &order);
        assert_eq!(submission.customer_name, "Cliente 21997624873");
    }

    #[test]
    fn display_label_ladder_prefers_backend_then_sequence_then_id() {
        let full = SubmissionReceipt {
            order_id: "abcdef123".into(),
            display_id: Some("#042".into()),
            daily_sequence: Some(7),
            ..SubmissionReceipt::default()
        };
        assert_eq!(full.display_label(), "#042");

        let sequenced = SubmissionReceipt {
            order_id: "abcdef123".into(),
            daily_sequence: Some(7),
            ..SubmissionReceipt::default()
        };
        assert_eq!(sequenced.display_label(), "#007");

        let bare = SubmissionReceipt { order_id: "abcdef123".into(), ..SubmissionReceipt::default() };
        assert_eq!(bare.display_label(), "#ABCDEF");
    }

    #[test]
    fn estimated_window_falls_back_through_sequence_to_twenty_minutes() {
        let explicit = SubmissionReceipt {
            order_id: "x".into(),
            estimated_time: Some(35),
            daily_sequence: Some(3),
            ..SubmissionReceipt::default()
        };
        assert_eq!(explicit.estimated_window(), (35, 45));

        let sequenced = SubmissionReceipt {
            order_id: "x".into(),
            daily_sequence: Some(3),
            ..SubmissionReceipt::default()
        };
        assert_eq!(sequenced.estimated_window(), (60, 70));

        let bare = SubmissionReceipt { order_id: "x".into(), ..SubmissionReceipt::default() };
        assert_eq!(bare.estimated_window(), (20, 30));
    }

    #[test]
    fn confirmation_lists_items_queue_position_and_window() {
        let receipt = SubmissionReceipt {
            order_id: "abc123".into(),
            daily_sequence: Some(2),
            customer_total_orders: Some(5),
            ..SubmissionReceipt::default()
        };

        let text = confirmation_message(&order(), &receipt);
        assert!(text.contains("PEDIDO #002"));
        assert!(text.contains("2º pedido do dia"));
        assert!(text.contains("seu 5º pedido"));
        assert!(text.contains("2x Hambúrguer Suíno Simples - R$ 40,00"));
        assert!(text.contains("*Total: R$ 45,00*"));
        assert!(text.contains("Delivery | 💳 PIX"));
        assert!(text.contains("Tempo estimado: 40-50 minutos"));
    }
}
