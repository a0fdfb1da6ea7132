//! Outbound PT-BR message templates. Pure string builders so the state
//! machine stays testable without a transport.

use crate::catalog::{Catalog, ItemId};
use crate::domain::order::Order;
use crate::money::format_brl;
use crate::status::StoreStatus;

use super::{QuickReply, Reply};

pub(super) fn greeting(hour: u32, has_items: bool) -> Reply {
    let salutation = if hour >= 18 {
        "Boa noite"
    } else if hour >= 12 {
        "Boa tarde"
    } else {
        "Bom dia"
    };

    let text = format!(
        "🍔 *BRASEIRO BURGUER*\n\n\
         {salutation}! 👋\n\n\
         Como podemos ajudar?\n\n\
         *Escolha uma opção:*\n\
         1️⃣ Ver cardápio e fazer pedido\n\
         2️⃣ Ver resumo do pedido atual\n\
         3️⃣ Falar com atendente\n\n\
         *Ou digite:*\n\
         • *1* ou *CARDÁPIO* para ver o cardápio\n\
         • *2* ou *RESUMO* para ver seu pedido\n\
         • *SAIR* para encerrar"
    );

    // The transport caps quick replies at three; without items the summary
    // option is pointless, so the agent button moves up.
    let quick_replies = if has_items {
        vec![
            QuickReply::new("btn_0", "1️⃣ Ver Cardápio"),
            QuickReply::new("btn_1", "2️⃣ Ver Resumo"),
            QuickReply::new("btn_2", "3️⃣ Falar com Atendente"),
        ]
    } else {
        vec![
            QuickReply::new("btn_0", "1️⃣ Ver Cardápio"),
            QuickReply::new("btn_1", "2️⃣ Falar com Atendente"),
        ]
    };

    Reply::with_quick_replies(text, quick_replies)
}

pub(super) fn closed_store(status: &StoreStatus) -> String {
    let mut text = String::from("🚫 *LOJA FECHADA*\n\n");
    if let Some(message) = &status.message {
        text.push_str(message);
        text.push_str("\n\n");
    }
    match &status.next_open_time {
        Some(next_open) => {
            text.push_str(&format!("⏰ *Horário de abertura:* {next_open}\n\n"));
        }
        None => text.push_str("⏰ Não há previsão de abertura no momento.\n\n"),
    }
    text.push_str("Obrigado por escolher Braseiro Burguer! 🍔\nVolte em breve! 👋");
    text
}

pub(super) fn menu(order: &Order, catalog: &Catalog) -> String {
    let body = format!(
        "🍔 *NOSSO CARDÁPIO*\n\n\
         *HAMBÚRGUERES:*\n\n\
         🍖 *Hambúrguer Bovino*\n\
         \u{20}  1️⃣ Simples - {}\n\
         \u{20}  2️⃣ Duplo - {}\n\n\
         🐷 *Hambúrguer Suíno*\n\
         \u{20}  3️⃣ Simples - {}\n\
         \u{20}  4️⃣ Duplo - {}\n\n\
         *BEBIDAS:*\n\
         \u{20}  5️⃣ Refrigerante - {}\n\
         \u{20}  6️⃣ Suco - {}\n\
         \u{20}  7️⃣ Água - {}\n\n\
         Digite o *NÚMERO* da opção desejada!",
        format_brl(catalog.price_cents(ItemId::HamburguerBovinoSimples)),
        format_brl(catalog.price_cents(ItemId::HamburguerBovinoDuplo)),
        format_brl(catalog.price_cents(ItemId::HamburguerSuinoSimples)),
        format_brl(catalog.price_cents(ItemId::HamburguerSuinoDuplo)),
        format_brl(catalog.price_cents(ItemId::RefrigeranteCoca)),
        format_brl(catalog.price_cents(ItemId::SucoLaranja)),
        format_brl(catalog.price_cents(ItemId::Agua)),
    );

    if order.is_empty() {
        format!("{body}\n\n⬅️ Digite *VOLTAR* para voltar ao início")
    } else {
        format!(
            "{}\n\n{body}\n\n⬅️ Digite *VOLTAR* para ver opções do pedido",
            summary(order)
        )
    }
}

pub(super) fn summary(order: &Order) -> String {
    if order.is_empty() {
        return "Nenhum item adicionado ainda.".to_string();
    }

    let mut text = String::from("📋 *RESUMO DO PEDIDO:*\n\n");
    for (index, line) in order.lines.iter().enumerate() {
        text.push_str(&format!(
            "{}. {}x {} - {}\n",
            index + 1,
            line.quantity,
            line.name,
            format_brl(line.total_cents())
        ));
    }
    text.push_str(&format!("\n💰 *Total: {}*", format_brl(order.total_cents())));
    text
}

pub(super) fn no_items_yet() -> String {
    "Você ainda não tem itens no pedido. Digite *1* ou *SIM* para começar!".to_string()
}

pub(super) fn soda_menu() -> String {
    "🥤 *REFRIGERANTES* - R$ 5,00 cada\n\n\
     1️⃣ Coca-Cola\n2️⃣ Pepsi\n3️⃣ Guaraná\n4️⃣ Fanta\n\n\
     Digite o número da opção:\n\n\
     ⬅️ Digite *VOLTAR* para voltar ao cardápio"
        .to_string()
}

pub(super) fn juice_menu() -> String {
    "🧃 *SUCOS* - R$ 6,00 cada\n\n\
     1️⃣ Laranja\n2️⃣ Maracujá\n3️⃣ Limão\n4️⃣ Abacaxi\n\n\
     Digite o número da opção:\n\n\
     ⬅️ Digite *VOLTAR* para voltar ao cardápio"
        .to_string()
}

pub(super) fn burger_quantity_prompt(name: &str, price_cents: i64) -> String {
    format!(
        "✅ {name} - {}\n\nQuantos hambúrgueres? (1 a 10)\n\n\
         ⬅️ Digite *VOLTAR* para voltar ao cardápio",
        format_brl(price_cents)
    )
}

pub(super) fn beverage_quantity_prompt(name: &str, price_cents: i64) -> String {
    format!(
        "✅ {name} - {}\n\nQuantas unidades? (1 a 10)\n\n\
         ⬅️ Digite *VOLTAR* para voltar",
        format_brl(price_cents)
    )
}

pub(super) fn water_quantity_prompt(name: &str, price_cents: i64) -> String {
    format!(
        "✅ {name} - {}\n\nQuantas unidades? (1 a 10)\n\n\
         ⬅️ Digite *VOLTAR* para voltar ao cardápio",
        format_brl(price_cents)
    )
}

pub(super) fn item_added(quantity: u32, name: &str) -> String {
    format!(
        "✅ {quantity}x {name} adicionado!\n\n\
         Deseja adicionar mais itens? (hambúrgueres ou bebidas)\n\n\
         1️⃣ Sim\n2️⃣ Não, finalizar pedido"
    )
}

pub(super) fn add_more_with_summary(order: &Order) -> String {
    format!(
        "{}\n\nDeseja adicionar mais itens?\n\n1️⃣ Sim\n2️⃣ Não, finalizar pedido",
        summary(order)
    )
}

pub(super) fn add_more_reprompt() -> String {
    "Digite *1* para adicionar mais itens, *2* para finalizar o pedido \
     ou *VOLTAR* para voltar ao cardápio."
        .to_string()
}

pub(super) fn natural_items_added(order: &Order) -> String {
    format!("✅ *Itens adicionados ao pedido!*\n\n{}\n\n", summary(order))
}

pub(super) fn natural_delivery_address_suffix() -> String {
    "📦 *Tipo: DELIVERY*\n\nPor favor, informe o endereço de entrega:".to_string()
}

pub(super) fn natural_name_suffix() -> String {
    "Por favor, informe seu nome:".to_string()
}

pub(super) fn natural_add_more_suffix() -> String {
    "Deseja adicionar mais itens?\n\n1️⃣ Sim\n2️⃣ Não, finalizar pedido".to_string()
}

pub(super) fn sold_out_menu_item(name: &str) -> String {
    format!("❌ *{name}* está esgotado no momento.\n\nPor favor, escolha outro item do cardápio.")
}

pub(super) fn sold_out_soda(name: &str) -> String {
    format!("❌ *{name}* está esgotado no momento.\n\nPor favor, escolha outro refrigerante.")
}

pub(super) fn sold_out_juice(name: &str) -> String {
    format!("❌ *{name}* está esgotado no momento.\n\nPor favor, escolha outro suco.")
}

pub(super) fn invalid_menu_choice() -> String {
    "❌ Opção inválida. Digite um número de 1 a 7.\n\n\
     ⬅️ Digite *VOLTAR* para voltar ao início"
        .to_string()
}

pub(super) fn invalid_beverage_choice() -> String {
    "❌ Opção inválida. Digite um número de 1 a 4.\n\n\
     ⬅️ Digite *VOLTAR* para voltar ao cardápio"
        .to_string()
}

pub(super) fn invalid_quantity_menu_back() -> String {
    "❌ Quantidade inválida. Digite um número de 1 a 10.\n\n\
     ⬅️ Digite *VOLTAR* para voltar ao cardápio"
        .to_string()
}

pub(super) fn invalid_quantity() -> String {
    "❌ Quantidade inválida. Digite um número de 1 a 10.\n\n\
     ⬅️ Digite *VOLTAR* para voltar"
        .to_string()
}

pub(super) fn order_type_prompt() -> String {
    "*TIPO DE PEDIDO:*\n\n\
     1️⃣ 🍽️ Comer no restaurante\n\
     2️⃣ 🚴 Delivery (entrega)\n\n\
     Digite o número da opção:"
        .to_string()
}

pub(super) fn invalid_order_type() -> String {
    "❌ Opção inválida. Digite 1 para restaurante ou 2 para delivery.\n\n\
     ⬅️ Digite *VOLTAR* para voltar"
        .to_string()
}

pub(super) fn dine_in_chosen() -> String {
    "✅ Pedido para comer no restaurante!\n\nQual seu nome?\n\n\
     ⬅️ Digite *VOLTAR* para voltar"
        .to_string()
}

pub(super) fn delivery_chosen() -> String {
    "✅ Pedido para delivery!\n\n\
     Por favor, informe seu *endereço completo* para entrega:\n\n\
     (Rua, número, bairro, complemento)\n\n\
     ⬅️ Digite *VOLTAR* para voltar"
        .to_string()
}

pub(super) fn address_prompt() -> String {
    "Por favor, informe seu *endereço completo* para entrega:\n\n\
     (Rua, número, bairro, complemento)\n\n\
     ⬅️ Digite *VOLTAR* para voltar"
        .to_string()
}

pub(super) fn address_too_short() -> String {
    "❌ Por favor, informe um endereço completo (rua, número, bairro).\n\n\
     ⬅️ Digite *VOLTAR* para voltar"
        .to_string()
}

pub(super) fn address_registered(address: &str) -> String {
    format!(
        "✅ Endereço registrado: {address}\n\nQual seu nome?\n\n\
         ⬅️ Digite *VOLTAR* para voltar"
    )
}

pub(super) fn name_prompt_after_delivery() -> String {
    "Qual seu nome?\n\n⬅️ Digite *VOLTAR* para voltar ao endereço".to_string()
}

pub(super) fn name_prompt() -> String {
    "Qual seu nome?\n\n⬅️ Digite *VOLTAR* para voltar".to_string()
}

pub(super) fn name_required() -> String {
    "Por favor, digite seu nome.\n\n⬅️ Digite *VOLTAR* para voltar".to_string()
}

pub(super) fn payment_prompt(customer_name: &str) -> String {
    format!(
        "✅ Nome: {customer_name}\n\n*MÉTODO DE PAGAMENTO:*\n\n\
         1️⃣ Dinheiro\n2️⃣ PIX\n3️⃣ Cartão\n4️⃣ Voltar ao pedido\n\n\
         Digite o número da opção:"
    )
}

pub(super) fn invalid_payment() -> String {
    "❌ Opção inválida. Digite 1, 2, 3 ou 4 (voltar).".to_string()
}

pub(super) fn agent_handoff() -> String {
    "Para falar com nosso atendente, envie uma mensagem ou ligue para \
     nosso número. Em breve retornaremos! 📞"
        .to_string()
}

pub(super) fn farewell() -> String {
    "👋 Obrigado! Até logo!".to_string()
}

#[cfg(test)]
mod tests {
    use crate::catalog::Catalog;
    use crate::domain::order::Order;
    use crate::status::StoreStatus;

    use super::*;

    #[test]
    fn greeting_offers_two_buttons_without_items_and_three_with() {
        let empty = greeting(9, false);
        assert!(empty.text.contains("Bom dia"));
        assert_eq!(empty.quick_replies.len(), 2);

        let with_items = greeting(19, true);
        assert!(with_items.text.contains("Boa noite"));
        assert_eq!(with_items.quick_replies.len(), 3);
        assert_eq!(with_items.quick_replies[1].id, "btn_1");
    }

    #[test]
    fn summary_lists_lines_with_totals() {
        let mut order = Order::default();
        order.push_line("hamburguer-1".into(), "Hambúrguer Bovino Simples".into(), 2, 1800);

        let text = summary(&order);
        assert!(text.contains("1. 2x Hambúrguer Bovino Simples - R$ 36,00"));
        assert!(text.contains("*Total: R$ 36,00*"));
    }

    #[test]
    fn empty_summary_has_a_placeholder() {
        assert_eq!(summary(&Order::default()), "Nenhum item adicionado ainda.");
    }

    #[test]
    fn menu_prices_come_from_the_catalog() {
        let text = menu(&Order::default(), &Catalog::new());
        assert!(text.contains("1️⃣ Simples - R$ 18,00"));
        assert!(text.contains("4️⃣ Duplo - R$ 30,00"));
        assert!(text.contains("7️⃣ Água - R$ 3,00"));
        assert!(text.contains("voltar ao início"));
    }

    #[test]
    fn closed_store_message_prefers_the_advertised_reopen_time() {
        let status = StoreStatus {
            is_open: false,
            next_open_time: Some("18h".into()),
            message: Some("Estamos em manutenção.".into()),
            last_checked: None,
        };
        let text = closed_store(&status);
        assert!(text.contains("Estamos em manutenção."));
        assert!(text.contains("*Horário de abertura:* 18h"));

        let bare = StoreStatus { is_open: false, ..StoreStatus::default() };
        assert!(closed_store(&bare).contains("Não há previsão de abertura"));
    }
}
