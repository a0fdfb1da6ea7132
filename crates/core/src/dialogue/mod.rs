//! The per-conversation dialogue state machine. Transitions are pure: given
//! the conversation record, the inbound text, and a snapshot of ambient
//! context, `handle` mutates the record and returns the outbound replies
//! plus at most one side effect for the session layer to execute.

mod messages;

use crate::catalog::{Catalog, ItemFamily, ItemId};
use crate::domain::conversation::{Conversation, DialogueState};
use crate::domain::order::{OrderType, PaymentMethod, Pending};
use crate::extract::OrderExtractor;
use crate::status::StoreStatus;

/// Ambient facts sampled once per inbound message, before the transition
/// runs. Keeping them out of the engine keeps transitions deterministic.
#[derive(Clone, Debug)]
pub struct TurnContext {
    pub status: StoreStatus,
    /// Local hour of day, 0..=23. Drives the greeting salutation.
    pub hour: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuickReply {
    pub id: String,
    pub label: String,
}

impl QuickReply {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self { id: id.into(), label: label.into() }
    }
}

/// One outbound message. Quick replies are optional and capped at 3 by the
/// transport; the session layer degrades to plain text when they fail.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub quick_replies: Vec<QuickReply>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: text.into(), quick_replies: Vec::new() }
    }

    pub fn with_quick_replies(text: impl Into<String>, quick_replies: Vec<QuickReply>) -> Self {
        Self { text: text.into(), quick_replies }
    }
}

/// Side effect the session layer must execute after the transition. The
/// engine itself never performs I/O.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Remove the conversation; the next message starts fresh.
    EndConversation,
    /// The order is complete; submit it to the backend. On success the
    /// session sends the confirmation and removes the conversation; on
    /// failure it sends a retry message and leaves the state untouched.
    SubmitOrder,
    /// The customer asked for a human; flag the conversation as prioritized.
    AgentRequested,
}

/// Outcome of one transition.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Step {
    pub replies: Vec<Reply>,
    pub effect: Option<Effect>,
}

impl Step {
    fn reply(text: impl Into<String>) -> Self {
        Self { replies: vec![Reply::text(text)], effect: None }
    }

    fn replies(replies: Vec<Reply>) -> Self {
        Self { replies, effect: None }
    }

    fn with_effect(mut self, effect: Effect) -> Self {
        self.effect = Some(effect);
        self
    }
}

pub struct DialogueEngine {
    catalog: Catalog,
    extractor: OrderExtractor,
}

impl DialogueEngine {
    pub fn new(catalog: Catalog) -> Result<Self, regex::Error> {
        Ok(Self { catalog, extractor: OrderExtractor::new()? })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Runs one transition. Global commands win over state handlers.
    pub fn handle(&self, conversation: &mut Conversation, input: &str, ctx: &TurnContext) -> Step {
        let text = input.trim();
        let lower = text.to_lowercase();

        if lower == "sair" || lower == "encerrar" {
            return Step::reply(messages::farewell()).with_effect(Effect::EndConversation);
        }
        if lower == "resumo" || lower == "pedido" || lower == "ver pedido" {
            return Step::reply(messages::summary(&conversation.order));
        }

        match conversation.state {
            DialogueState::Start => self.on_start(conversation, text, &lower, ctx),
            DialogueState::Menu => self.on_menu(conversation, text, &lower, ctx),
            DialogueState::BurgerQuantity => self.on_burger_quantity(conversation, text, &lower),
            DialogueState::AddMore => self.on_add_more(conversation, &lower),
            DialogueState::BeverageTypeSoda => self.on_beverage_type(conversation, text, &lower, ItemFamily::Soda),
            DialogueState::BeverageTypeJuice => self.on_beverage_type(conversation, text, &lower, ItemFamily::Juice),
            DialogueState::BeverageQuantitySoda => self.on_beverage_quantity(conversation, text, &lower, ItemFamily::Soda),
            DialogueState::BeverageQuantityJuice => self.on_beverage_quantity(conversation, text, &lower, ItemFamily::Juice),
            DialogueState::BeverageQuantityGeneric => self.on_generic_quantity(conversation, text, &lower),
            DialogueState::OrderType => self.on_order_type(conversation, &lower),
            DialogueState::DeliveryAddress => self.on_delivery_address(conversation, text, &lower),
            DialogueState::CustomerName => self.on_customer_name(conversation, text, &lower),
            DialogueState::PaymentMethod => self.on_payment_method(conversation, &lower),
        }
    }

    fn on_start(&self, conversation: &mut Conversation, text: &str, lower: &str, ctx: &TurnContext) -> Step {
        // Closed store blocks everything at the entry point, buttons included.
        if !ctx.status.is_open {
            return Step::reply(messages::closed_store(&ctx.status));
        }

        if let Some(index) = lower.strip_prefix("btn_") {
            return self.on_start_button(conversation, index);
        }

        let extracted = self.extractor.extract(text, &self.catalog);
        if extracted.matched() {
            for line in &extracted.lines {
                conversation.order.push_line(
                    line.item.as_str().to_string(),
                    self.catalog.display_name(line.item).to_string(),
                    line.quantity,
                    self.catalog.price_cents(line.item),
                );
            }
            conversation.order.order_type = Some(extracted.order_type);
            if extracted.order_type == OrderType::Delivery {
                if let Some(address) = &extracted.address {
                    conversation.order.delivery_address = Some(address.clone());
                }
            }

            let mut message = messages::natural_items_added(&conversation.order);
            if extracted.order_type == OrderType::Delivery
                && conversation.order.delivery_address.is_none()
            {
                message.push_str(&messages::natural_delivery_address_suffix());
                conversation.state = DialogueState::DeliveryAddress;
            } else if conversation.order.customer_name.is_none() {
                message.push_str(&messages::natural_name_suffix());
                conversation.state = DialogueState::CustomerName;
            } else {
                message.push_str(&messages::natural_add_more_suffix());
                conversation.state = DialogueState::AddMore;
            }
            return Step::reply(message);
        }

        match lower {
            "oi" | "olá" | "ola" | "hello" | "hi" => {
                Step::replies(vec![messages::greeting(ctx.hour, !conversation.order.is_empty())])
            }
            "1" | "sim" | "s" | "cardapio" | "cardápio" => {
                conversation.state = DialogueState::Menu;
                Step::reply(messages::menu(&conversation.order, &self.catalog))
            }
            "2" => {
                if conversation.order.is_empty() {
                    Step::reply(messages::no_items_yet())
                } else {
                    Step::reply(messages::summary(&conversation.order))
                }
            }
            _ if lower == "3" || lower.contains("atendente") || lower.contains("falar") => {
                Step::reply(messages::agent_handoff()).with_effect(Effect::AgentRequested)
            }
            _ => Step::replies(vec![messages::greeting(ctx.hour, !conversation.order.is_empty())]),
        }
    }

    fn on_start_button(&self, conversation: &mut Conversation, index: &str) -> Step {
        match index {
            "0" => {
                conversation.state = DialogueState::Menu;
                Step::reply(messages::menu(&conversation.order, &self.catalog))
            }
            // The second button is "summary" when the order has items and
            // "talk to an agent" otherwise, mirroring the greeting buttons.
            "1" => {
                if conversation.order.is_empty() {
                    Step::reply(messages::agent_handoff()).with_effect(Effect::AgentRequested)
                } else {
                    Step::reply(messages::summary(&conversation.order))
                }
            }
            "2" => Step::reply(messages::agent_handoff()).with_effect(Effect::AgentRequested),
            _ => Step::default(),
        }
    }

    fn on_menu(&self, conversation: &mut Conversation, text: &str, lower: &str, ctx: &TurnContext) -> Step {
        if wants_back(lower) {
            if conversation.order.is_empty() {
                conversation.state = DialogueState::Start;
                return Step::replies(vec![messages::greeting(ctx.hour, false)]);
            }
            conversation.state = DialogueState::AddMore;
            return Step::reply(messages::add_more_with_summary(&conversation.order));
        }

        let choice = match text.parse::<u32>() {
            Ok(choice) => choice,
            Err(_) => {
                return Step::replies(vec![
                    Reply::text(messages::invalid_menu_choice()),
                    Reply::text(messages::menu(&conversation.order, &self.catalog)),
                ]);
            }
        };

        let burger = match choice {
            1 => Some(ItemId::HamburguerBovinoSimples),
            2 => Some(ItemId::HamburguerBovinoDuplo),
            3 => Some(ItemId::HamburguerSuinoSimples),
            4 => Some(ItemId::HamburguerSuinoDuplo),
            _ => None,
        };
        if let Some(item) = burger {
            if !self.catalog.is_available(item) {
                return Step::replies(vec![
                    Reply::text(messages::sold_out_menu_item(self.catalog.display_name(item))),
                    Reply::text(messages::menu(&conversation.order, &self.catalog)),
                ]);
            }
            conversation.order.pending = Some(Pending::Item(item));
            conversation.state = DialogueState::BurgerQuantity;
            return Step::reply(messages::burger_quantity_prompt(
                self.catalog.display_name(item),
                self.catalog.price_cents(item),
            ));
        }

        match choice {
            5 => {
                conversation.state = DialogueState::BeverageTypeSoda;
                Step::reply(messages::soda_menu())
            }
            6 => {
                conversation.state = DialogueState::BeverageTypeJuice;
                Step::reply(messages::juice_menu())
            }
            7 => {
                let item = ItemId::Agua;
                if !self.catalog.is_available(item) {
                    return Step::replies(vec![
                        Reply::text(messages::sold_out_menu_item(self.catalog.display_name(item))),
                        Reply::text(messages::menu(&conversation.order, &self.catalog)),
                    ]);
                }
                conversation.order.pending = Some(Pending::Beverage(item));
                conversation.state = DialogueState::BeverageQuantityGeneric;
                Step::reply(messages::water_quantity_prompt(
                    self.catalog.display_name(item),
                    self.catalog.price_cents(item),
                ))
            }
            _ => Step::replies(vec![
                Reply::text(messages::invalid_menu_choice()),
                Reply::text(messages::menu(&conversation.order, &self.catalog)),
            ]),
        }
    }

    fn on_burger_quantity(&self, conversation: &mut Conversation, text: &str, lower: &str) -> Step {
        if wants_back(lower) {
            conversation.order.pending = None;
            conversation.state = DialogueState::Menu;
            return Step::reply(messages::menu(&conversation.order, &self.catalog));
        }

        let Some(quantity) = parse_quantity(text) else {
            return Step::reply(messages::invalid_quantity_menu_back());
        };
        let Some(Pending::Item(item)) = conversation.order.pending else {
            // Pending slot lost (should not happen); recover via the menu.
            conversation.state = DialogueState::Menu;
            return Step::reply(messages::menu(&conversation.order, &self.catalog));
        };

        let name = self.catalog.display_name(item).to_string();
        let id = format!("{}-{}", item.family().line_id_prefix(), conversation.order.lines.len() + 1);
        conversation.order.push_line(id, name.clone(), quantity, self.catalog.price_cents(item));
        conversation.order.pending = None;
        conversation.state = DialogueState::AddMore;
        Step::reply(messages::item_added(quantity, &name))
    }

    fn on_add_more(&self, conversation: &mut Conversation, lower: &str) -> Step {
        if wants_back(lower) {
            conversation.state = DialogueState::Menu;
            return Step::reply(messages::menu(&conversation.order, &self.catalog));
        }
        match lower {
            "1" | "sim" | "s" => {
                conversation.state = DialogueState::Menu;
                Step::reply(messages::menu(&conversation.order, &self.catalog))
            }
            "2" | "nao" | "não" | "finalizar" => {
                conversation.state = DialogueState::OrderType;
                Step::reply(messages::order_type_prompt())
            }
            _ => Step::reply(messages::add_more_reprompt()),
        }
    }

    fn on_beverage_type(
        &self,
        conversation: &mut Conversation,
        text: &str,
        lower: &str,
        family: ItemFamily,
    ) -> Step {
        if wants_back(lower) {
            conversation.state = DialogueState::Menu;
            return Step::reply(messages::menu(&conversation.order, &self.catalog));
        }

        let options: [ItemId; 4] = match family {
            ItemFamily::Soda => [
                ItemId::RefrigeranteCoca,
                ItemId::RefrigerantePepsi,
                ItemId::RefrigeranteGuarana,
                ItemId::RefrigeranteFanta,
            ],
            _ => [
                ItemId::SucoLaranja,
                ItemId::SucoMaracuja,
                ItemId::SucoLimao,
                ItemId::SucoAbacaxi,
            ],
        };

        let item = match text.parse::<usize>() {
            Ok(choice @ 1..=4) => options[choice - 1],
            _ => return Step::reply(messages::invalid_beverage_choice()),
        };

        let submenu = match family {
            ItemFamily::Soda => messages::soda_menu(),
            _ => messages::juice_menu(),
        };
        if !self.catalog.is_available(item) {
            let sold_out = match family {
                ItemFamily::Soda => messages::sold_out_soda(self.catalog.display_name(item)),
                _ => messages::sold_out_juice(self.catalog.display_name(item)),
            };
            return Step::replies(vec![Reply::text(sold_out), Reply::text(submenu)]);
        }

        conversation.order.pending = Some(Pending::Beverage(item));
        conversation.state = match family {
            ItemFamily::Soda => DialogueState::BeverageQuantitySoda,
            _ => DialogueState::BeverageQuantityJuice,
        };
        Step::reply(messages::beverage_quantity_prompt(
            self.catalog.display_name(item),
            self.catalog.price_cents(item),
        ))
    }

    fn on_beverage_quantity(
        &self,
        conversation: &mut Conversation,
        text: &str,
        lower: &str,
        family: ItemFamily,
    ) -> Step {
        if wants_back(lower) {
            conversation.order.pending = None;
            conversation.state = match family {
                ItemFamily::Soda => DialogueState::BeverageTypeSoda,
                _ => DialogueState::BeverageTypeJuice,
            };
            return Step::reply(match family {
                ItemFamily::Soda => messages::soda_menu(),
                _ => messages::juice_menu(),
            });
        }

        let Some(quantity) = parse_quantity(text) else {
            return Step::reply(messages::invalid_quantity());
        };
        let Some(Pending::Beverage(item)) = conversation.order.pending else {
            conversation.state = DialogueState::Menu;
            return Step::reply(messages::menu(&conversation.order, &self.catalog));
        };

        let name = self.catalog.display_name(item).to_string();
        let id = format!("{}-{}", item.family().line_id_prefix(), conversation.order.lines.len() + 1);
        conversation.order.push_line(id, name.clone(), quantity, self.catalog.price_cents(item));
        conversation.order.pending = None;
        conversation.state = DialogueState::AddMore;
        Step::reply(messages::item_added(quantity, &name))
    }

    fn on_generic_quantity(&self, conversation: &mut Conversation, text: &str, lower: &str) -> Step {
        if wants_back(lower) {
            conversation.order.pending = None;
            conversation.state = DialogueState::Menu;
            return Step::reply(messages::menu(&conversation.order, &self.catalog));
        }

        let Some(quantity) = parse_quantity(text) else {
            return Step::reply(messages::invalid_quantity_menu_back());
        };
        let Some(Pending::Beverage(item)) = conversation.order.pending else {
            conversation.state = DialogueState::Menu;
            return Step::reply(messages::menu(&conversation.order, &self.catalog));
        };

        // Água is the only item routed here; its family maps to the generic
        // beverage prefix.
        let name = self.catalog.display_name(item).to_string();
        let id = format!("{}-{}", item.family().line_id_prefix(), conversation.order.lines.len() + 1);
        conversation.order.push_line(id, name.clone(), quantity, self.catalog.price_cents(item));
        conversation.order.pending = None;
        conversation.state = DialogueState::AddMore;
        Step::reply(messages::item_added(quantity, &name))
    }

    fn on_order_type(&self, conversation: &mut Conversation, lower: &str) -> Step {
        if wants_back(lower) {
            conversation.state = DialogueState::AddMore;
            return Step::reply(messages::add_more_with_summary(&conversation.order));
        }
        if lower == "1" || lower.contains("restaurante") || lower.contains("comer") {
            conversation.order.order_type = Some(OrderType::DineIn);
            conversation.state = DialogueState::CustomerName;
            return Step::reply(messages::dine_in_chosen());
        }
        if lower == "2" || lower.contains("delivery") || lower.contains("entrega") {
            conversation.order.order_type = Some(OrderType::Delivery);
            conversation.state = DialogueState::DeliveryAddress;
            return Step::reply(messages::delivery_chosen());
        }
        Step::reply(messages::invalid_order_type())
    }

    fn on_delivery_address(&self, conversation: &mut Conversation, text: &str, lower: &str) -> Step {
        if wants_back(lower) {
            conversation.state = DialogueState::OrderType;
            return Step::reply(messages::order_type_prompt());
        }
        if text.chars().count() > 10 {
            conversation.order.delivery_address = Some(text.to_string());
            conversation.state = DialogueState::CustomerName;
            return Step::reply(messages::address_registered(text));
        }
        Step::reply(messages::address_too_short())
    }

    fn on_customer_name(&self, conversation: &mut Conversation, text: &str, lower: &str) -> Step {
        if wants_back(lower) {
            if conversation.order.order_type == Some(OrderType::Delivery) {
                conversation.state = DialogueState::DeliveryAddress;
                return Step::reply(messages::address_prompt());
            }
            conversation.state = DialogueState::OrderType;
            return Step::reply(messages::order_type_prompt());
        }
        if text.is_empty() {
            return Step::reply(messages::name_required());
        }
        conversation.order.customer_name = Some(text.to_string());
        conversation.state = DialogueState::PaymentMethod;
        Step::reply(messages::payment_prompt(text))
    }

    fn on_payment_method(&self, conversation: &mut Conversation, lower: &str) -> Step {
        match parse_payment(lower) {
            Some(PaymentChoice::Back) => {
                conversation.state = DialogueState::CustomerName;
                let prompt = if conversation.order.order_type == Some(OrderType::Delivery) {
                    messages::name_prompt_after_delivery()
                } else {
                    messages::name_prompt()
                };
                Step::reply(prompt)
            }
            Some(PaymentChoice::Method(method)) => {
                conversation.order.payment_method = Some(method);
                // The session layer submits; confirmation or retry text comes
                // from the finalizer. State stays here so a failed submit can
                // be retried without re-entering anything.
                Step::default().with_effect(Effect::SubmitOrder)
            }
            None => Step::reply(messages::invalid_payment()),
        }
    }
}

enum PaymentChoice {
    Method(PaymentMethod),
    Back,
}

/// Substring matching, so "pagar com pix" works. Option 4 doubles as back.
fn parse_payment(lower: &str) -> Option<PaymentChoice> {
    if lower.contains('1') || lower.contains("dinheiro") || lower.contains("din") {
        return Some(PaymentChoice::Method(PaymentMethod::Cash));
    }
    if lower.contains('2') || lower.contains("pix") {
        return Some(PaymentChoice::Method(PaymentMethod::Pix));
    }
    if lower.contains('3') || lower.contains("cartao") || lower.contains("card") {
        return Some(PaymentChoice::Method(PaymentMethod::Card));
    }
    if lower.contains('4') || lower.contains("voltar") || lower.contains("volta") {
        return Some(PaymentChoice::Back);
    }
    None
}

fn wants_back(lower: &str) -> bool {
    lower == "voltar" || lower == "volta" || lower == "v" || lower == "0" || lower.contains("voltar")
}

/// Only base-10 integers in 1..=10; anything else is rejected uniformly.
fn parse_quantity(text: &str) -> Option<u32> {
    match text.trim().parse::<u32>() {
        Ok(quantity @ 1..=10) => Some(quantity),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use crate::catalog::{Catalog, ItemId};
    use crate::domain::conversation::{Conversation, DialogueState};
    use crate::domain::order::{OrderType, PaymentMethod, Pending};
    use crate::status::StoreStatus;

    use super::{DialogueEngine, Effect, TurnContext};

    fn engine() -> DialogueEngine {
        DialogueEngine::new(Catalog::new()).expect("engine builds")
    }

    fn open_ctx() -> TurnContext {
        TurnContext { status: StoreStatus::open(), hour: 14 }
    }

    fn closed_ctx() -> TurnContext {
        TurnContext {
            status: StoreStatus { is_open: false, ..StoreStatus::default() },
            hour: 14,
        }
    }

    fn conversation() -> Conversation {
        Conversation::new("5521997624873@s.whatsapp.net")
    }

    #[test]
    fn closed_store_blocks_entry_into_the_menu() {
        let engine = engine();
        let mut conversation = conversation();

        for input in ["1", "cardapio", "btn_0", "2 hamburguer suino"] {
            let step = engine.handle(&mut conversation, input, &closed_ctx());
            assert_eq!(conversation.state, DialogueState::Start, "input {input:?}");
            assert!(conversation.order.is_empty());
            assert!(step.replies[0].text.contains("LOJA FECHADA"));
        }

        // The cached status flipping open unblocks the same input.
        let step = engine.handle(&mut conversation, "1", &open_ctx());
        assert_eq!(conversation.state, DialogueState::Menu);
        assert!(step.replies[0].text.contains("NOSSO CARDÁPIO"));
    }

    #[test]
    fn exit_keywords_end_the_conversation_from_any_state() {
        let engine = engine();
        let mut conversation = conversation();
        engine.handle(&mut conversation, "1", &open_ctx());
        assert_eq!(conversation.state, DialogueState::Menu);

        let step = engine.handle(&mut conversation, "sair", &open_ctx());
        assert_eq!(step.effect, Some(Effect::EndConversation));
        assert!(step.replies[0].text.contains("Até logo"));
    }

    #[test]
    fn summary_keyword_does_not_change_state() {
        let engine = engine();
        let mut conversation = conversation();
        engine.handle(&mut conversation, "1", &open_ctx());

        let step = engine.handle(&mut conversation, "resumo", &open_ctx());
        assert_eq!(conversation.state, DialogueState::Menu);
        assert_eq!(step.replies[0].text, "Nenhum item adicionado ainda.");
    }

    #[test]
    fn menu_selection_then_quantity_appends_one_line() {
        let engine = engine();
        let mut conversation = conversation();
        engine.handle(&mut conversation, "1", &open_ctx());
        engine.handle(&mut conversation, "1", &open_ctx());
        assert_eq!(conversation.state, DialogueState::BurgerQuantity);
        assert_eq!(
            conversation.order.pending,
            Some(Pending::Item(ItemId::HamburguerBovinoSimples))
        );

        let step = engine.handle(&mut conversation, "3", &open_ctx());
        assert_eq!(conversation.state, DialogueState::AddMore);
        assert!(conversation.order.pending.is_none());
        assert_eq!(conversation.order.lines.len(), 1);
        assert_eq!(conversation.order.lines[0].quantity, 3);
        assert_eq!(conversation.order.lines[0].unit_price_cents, 1800);
        assert_eq!(conversation.order.lines[0].id, "hamburguer-1");
        assert!(step.replies[0].text.contains("3x Hambúrguer Bovino Simples adicionado"));
    }

    #[test]
    fn invalid_quantities_leave_state_and_order_untouched() {
        let engine = engine();
        let mut conversation = conversation();
        engine.handle(&mut conversation, "1", &open_ctx());
        engine.handle(&mut conversation, "2", &open_ctx());

        for input in ["0", "11", "-3", "abc", "2.5", ""] {
            let step = engine.handle(&mut conversation, input, &open_ctx());
            assert_eq!(conversation.state, DialogueState::BurgerQuantity, "input {input:?}");
            assert!(conversation.order.lines.is_empty());
            assert!(step.replies[0].text.contains("Quantidade inválida"));
        }
    }

    #[test]
    fn every_valid_quantity_is_accepted() {
        let engine = engine();
        for quantity in 1..=10u32 {
            let mut conversation = conversation();
            engine.handle(&mut conversation, "1", &open_ctx());
            engine.handle(&mut conversation, "4", &open_ctx());
            engine.handle(&mut conversation, &quantity.to_string(), &open_ctx());
            assert_eq!(conversation.state, DialogueState::AddMore);
            assert_eq!(conversation.order.lines[0].quantity, quantity);
            assert_eq!(conversation.order.total_cents(), 3000 * i64::from(quantity));
        }
    }

    #[test]
    fn back_from_burger_quantity_clears_pending_and_returns_to_menu() {
        let engine = engine();
        let mut conversation = conversation();
        engine.handle(&mut conversation, "1", &open_ctx());
        engine.handle(&mut conversation, "3", &open_ctx());
        assert!(conversation.order.pending.is_some());

        engine.handle(&mut conversation, "voltar", &open_ctx());
        assert_eq!(conversation.state, DialogueState::Menu);
        assert!(conversation.order.pending.is_none());
    }

    #[test]
    fn back_synonyms_are_all_recognized() {
        let engine = engine();
        for input in ["voltar", "volta", "v", "0", "quero voltar"] {
            let mut conversation = conversation();
            engine.handle(&mut conversation, "1", &open_ctx());
            engine.handle(&mut conversation, "1", &open_ctx());
            engine.handle(&mut conversation, input, &open_ctx());
            assert_eq!(conversation.state, DialogueState::Menu, "input {input:?}");
        }
    }

    #[test]
    fn soda_flow_reaches_add_more_with_a_priced_line() {
        let engine = engine();
        let mut conversation = conversation();
        engine.handle(&mut conversation, "1", &open_ctx());
        engine.handle(&mut conversation, "5", &open_ctx());
        assert_eq!(conversation.state, DialogueState::BeverageTypeSoda);

        engine.handle(&mut conversation, "3", &open_ctx());
        assert_eq!(conversation.state, DialogueState::BeverageQuantitySoda);
        assert_eq!(
            conversation.order.pending,
            Some(Pending::Beverage(ItemId::RefrigeranteGuarana))
        );

        engine.handle(&mut conversation, "2", &open_ctx());
        assert_eq!(conversation.state, DialogueState::AddMore);
        assert_eq!(conversation.order.lines[0].id, "refrigerante-1");
        assert_eq!(conversation.order.lines[0].name, "Guaraná");
        assert_eq!(conversation.order.total_cents(), 1000);
    }

    #[test]
    fn back_from_soda_quantity_returns_to_the_soda_submenu() {
        let engine = engine();
        let mut conversation = conversation();
        engine.handle(&mut conversation, "1", &open_ctx());
        engine.handle(&mut conversation, "5", &open_ctx());
        engine.handle(&mut conversation, "1", &open_ctx());

        let step = engine.handle(&mut conversation, "voltar", &open_ctx());
        assert_eq!(conversation.state, DialogueState::BeverageTypeSoda);
        assert!(conversation.order.pending.is_none());
        assert!(step.replies[0].text.contains("REFRIGERANTES"));
    }

    #[test]
    fn sold_out_selection_never_appends_and_reshows_the_submenu() {
        let catalog = Catalog::with_unavailable([ItemId::SucoLimao]);
        let engine = DialogueEngine::new(catalog).expect("engine builds");
        let mut conversation = conversation();
        engine.handle(&mut conversation, "1", &open_ctx());
        engine.handle(&mut conversation, "6", &open_ctx());

        let step = engine.handle(&mut conversation, "3", &open_ctx());
        assert_eq!(conversation.state, DialogueState::BeverageTypeJuice);
        assert!(conversation.order.lines.is_empty());
        assert!(conversation.order.pending.is_none());
        assert!(step.replies[0].text.contains("esgotado"));
        assert!(step.replies[1].text.contains("SUCOS"));
    }

    #[test]
    fn sold_out_burger_reshows_the_menu_without_appending() {
        let catalog = Catalog::with_unavailable([ItemId::HamburguerBovinoDuplo]);
        let engine = DialogueEngine::new(catalog).expect("engine builds");
        let mut conversation = conversation();
        engine.handle(&mut conversation, "1", &open_ctx());

        let step = engine.handle(&mut conversation, "2", &open_ctx());
        assert_eq!(conversation.state, DialogueState::Menu);
        assert!(conversation.order.lines.is_empty());
        assert!(conversation.order.pending.is_none());
        assert!(step.replies[0].text.contains("esgotado"));
        assert!(step.replies[1].text.contains("NOSSO CARDÁPIO"));
    }

    #[test]
    fn sold_out_water_reshows_the_menu_without_appending() {
        let catalog = Catalog::with_unavailable([ItemId::Agua]);
        let engine = DialogueEngine::new(catalog).expect("engine builds");
        let mut conversation = conversation();
        engine.handle(&mut conversation, "1", &open_ctx());

        let step = engine.handle(&mut conversation, "7", &open_ctx());
        assert_eq!(conversation.state, DialogueState::Menu);
        assert!(conversation.order.lines.is_empty());
        assert!(conversation.order.pending.is_none());
        assert!(step.replies[0].text.contains("esgotado"));
        assert!(step.replies[1].text.contains("NOSSO CARDÁPIO"));
    }

    #[test]
    fn water_uses_the_generic_quantity_path() {
        let engine = engine();
        let mut conversation = conversation();
        engine.handle(&mut conversation, "1", &open_ctx());
        engine.handle(&mut conversation, "7", &open_ctx());
        assert_eq!(conversation.state, DialogueState::BeverageQuantityGeneric);

        engine.handle(&mut conversation, "4", &open_ctx());
        assert_eq!(conversation.order.lines[0].id, "bebida-1");
        assert_eq!(conversation.order.lines[0].name, "Água");
        assert_eq!(conversation.order.total_cents(), 1200);
    }

    #[test]
    fn natural_language_order_with_address_skips_to_the_name_prompt() {
        let engine = engine();
        let mut conversation = conversation();

        let step = engine.handle(
            &mut conversation,
            "2 hamburguer suino e 1 coca, entrega rua das flores 123",
            &open_ctx(),
        );

        assert_eq!(conversation.state, DialogueState::CustomerName);
        assert_eq!(conversation.order.order_type, Some(OrderType::Delivery));
        assert_eq!(conversation.order.lines.len(), 2);
        assert_eq!(
            conversation.order.total_cents(),
            2 * 2000 + 500,
            "totals must follow bulk append",
        );
        let address = conversation.order.delivery_address.as_deref().expect("address captured");
        assert!(address.contains("rua das flores 123"));
        assert!(step.replies[0].text.contains("Itens adicionados"));
    }

    #[test]
    fn natural_language_delivery_without_address_asks_for_one() {
        let engine = engine();
        let mut conversation = conversation();
        engine.handle(&mut conversation, "1 agua para entregar", &open_ctx());
        assert_eq!(conversation.order.order_type, Some(OrderType::Delivery));
        assert_eq!(conversation.state, DialogueState::DeliveryAddress);
    }

    #[test]
    fn chatter_with_embedded_item_substrings_regreets_without_adding_lines() {
        let engine = engine();
        let mut conversation = conversation();

        let step = engine.handle(&mut conversation, "aguarde um momento por favor", &open_ctx());
        assert_eq!(conversation.state, DialogueState::Start);
        assert!(conversation.order.is_empty());
        assert!(step.replies[0].text.contains("Como podemos ajudar?"));
    }

    #[test]
    fn agent_request_is_surfaced_as_an_effect() {
        let engine = engine();
        let mut conversation = conversation();
        let step = engine.handle(&mut conversation, "3", &open_ctx());
        assert_eq!(step.effect, Some(Effect::AgentRequested));
        assert_eq!(conversation.state, DialogueState::Start);
    }

    #[test]
    fn start_buttons_map_to_menu_summary_and_agent() {
        let engine = engine();
        let mut conversation = conversation();

        // Without items the second button is the agent.
        let step = engine.handle(&mut conversation, "btn_1", &open_ctx());
        assert_eq!(step.effect, Some(Effect::AgentRequested));

        let step = engine.handle(&mut conversation, "btn_0", &open_ctx());
        assert_eq!(conversation.state, DialogueState::Menu);
        assert!(step.replies[0].text.contains("NOSSO CARDÁPIO"));
    }

    #[test]
    fn full_dine_in_flow_ends_in_a_submit_effect() {
        let engine = engine();
        let mut conversation = conversation();
        engine.handle(&mut conversation, "1", &open_ctx());
        engine.handle(&mut conversation, "2", &open_ctx());
        engine.handle(&mut conversation, "1", &open_ctx());
        engine.handle(&mut conversation, "2", &open_ctx());
        assert_eq!(conversation.state, DialogueState::OrderType);

        engine.handle(&mut conversation, "1", &open_ctx());
        assert_eq!(conversation.state, DialogueState::CustomerName);
        assert_eq!(conversation.order.order_type, Some(OrderType::DineIn));

        engine.handle(&mut conversation, "Maria", &open_ctx());
        assert_eq!(conversation.state, DialogueState::PaymentMethod);

        let step = engine.handle(&mut conversation, "pix", &open_ctx());
        assert_eq!(step.effect, Some(Effect::SubmitOrder));
        assert_eq!(conversation.order.payment_method, Some(PaymentMethod::Pix));
        assert_eq!(conversation.state, DialogueState::PaymentMethod);
    }

    #[test]
    fn delivery_flow_requires_a_long_enough_address() {
        let engine = engine();
        let mut conversation = conversation();
        engine.handle(&mut conversation, "1", &open_ctx());
        engine.handle(&mut conversation, "3", &open_ctx());
        engine.handle(&mut conversation, "1", &open_ctx());
        engine.handle(&mut conversation, "2", &open_ctx());
        engine.handle(&mut conversation, "2", &open_ctx());
        assert_eq!(conversation.state, DialogueState::DeliveryAddress);

        engine.handle(&mut conversation, "rua curta", &open_ctx());
        assert_eq!(conversation.state, DialogueState::DeliveryAddress);
        assert!(conversation.order.delivery_address.is_none());

        engine.handle(&mut conversation, "Rua das Flores, 123 - Centro", &open_ctx());
        assert_eq!(conversation.state, DialogueState::CustomerName);

        // Back from the name prompt returns to the address for delivery.
        engine.handle(&mut conversation, "voltar", &open_ctx());
        assert_eq!(conversation.state, DialogueState::DeliveryAddress);
    }

    #[test]
    fn payment_option_four_goes_back_to_the_name_prompt() {
        let engine = engine();
        let mut conversation = conversation();
        engine.handle(&mut conversation, "1", &open_ctx());
        engine.handle(&mut conversation, "1", &open_ctx());
        engine.handle(&mut conversation, "1", &open_ctx());
        engine.handle(&mut conversation, "2", &open_ctx());
        engine.handle(&mut conversation, "1", &open_ctx());
        engine.handle(&mut conversation, "João", &open_ctx());
        assert_eq!(conversation.state, DialogueState::PaymentMethod);

        engine.handle(&mut conversation, "4", &open_ctx());
        assert_eq!(conversation.state, DialogueState::CustomerName);
    }

    #[test]
    fn back_from_menu_with_items_lands_on_add_more() {
        let engine = engine();
        let mut conversation = conversation();
        engine.handle(&mut conversation, "1", &open_ctx());
        engine.handle(&mut conversation, "1", &open_ctx());
        engine.handle(&mut conversation, "2", &open_ctx());
        engine.handle(&mut conversation, "1", &open_ctx());
        assert_eq!(conversation.state, DialogueState::Menu);

        let step = engine.handle(&mut conversation, "voltar", &open_ctx());
        assert_eq!(conversation.state, DialogueState::AddMore);
        assert!(step.replies[0].text.contains("RESUMO DO PEDIDO"));
    }

    #[test]
    fn back_from_menu_without_items_regreets() {
        let engine = engine();
        let mut conversation = conversation();
        engine.handle(&mut conversation, "1", &open_ctx());
        let step = engine.handle(&mut conversation, "voltar", &open_ctx());
        assert_eq!(conversation.state, DialogueState::Start);
        assert!(step.replies[0].text.contains("Como podemos ajudar?"));
    }
}
