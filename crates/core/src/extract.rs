use regex::Regex;

use crate::catalog::{Catalog, ItemId};
use crate::domain::order::OrderType;

/// One quantity+item phrase recognized inside free text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExtractedLine {
    pub item: ItemId,
    pub quantity: u32,
}

/// Result of scanning one inbound message for a natural-language order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractedOrder {
    pub lines: Vec<ExtractedLine>,
    pub order_type: OrderType,
    pub address: Option<String>,
}

impl ExtractedOrder {
    /// The dialogue treats the message as a natural-language order only when
    /// at least one line was extracted.
    pub fn matched(&self) -> bool {
        !self.lines.is_empty()
    }
}

struct Rule {
    pattern: Regex,
    default_item: Option<ItemId>,
    variants: &'static [(&'static str, ItemId)],
}

const PROTEIN_VARIANTS: &[(&str, ItemId)] = &[
    ("bovino", ItemId::HamburguerBovinoSimples),
    ("boi", ItemId::HamburguerBovinoSimples),
    ("carne", ItemId::HamburguerBovinoSimples),
    ("suino", ItemId::HamburguerSuinoSimples),
    ("suíno", ItemId::HamburguerSuinoSimples),
    ("porco", ItemId::HamburguerSuinoSimples),
    ("porquinho", ItemId::HamburguerSuinoSimples),
];

/// Regex-table extractor for phrases like
/// "2 hamburguer suino e 1 coca, entrega rua das flores 123".
///
/// Rules are evaluated independently over the whole input and are not
/// mutually exclusive; templates are kept disjoint by vocabulary rather than
/// by code. The quantity group is optional and defaults to 1.
pub struct OrderExtractor {
    rules: Vec<Rule>,
    delivery_hint: Regex,
    address: Regex,
}

impl OrderExtractor {
    pub fn new() -> Result<Self, regex::Error> {
        let qty = r"(?:(\d+)\s*)?(?:x\s*)?";
        let burger = r"\bhamb[uú]rguer(?:s)?";

        let rule = |pattern: &str,
                    default_item: Option<ItemId>,
                    variants: &'static [(&str, ItemId)]|
         -> Result<Rule, regex::Error> {
            Ok(Rule { pattern: Regex::new(&format!("(?i){pattern}"))?, default_item, variants })
        };

        // Every item keyword is anchored with word boundaries: the quantity
        // prefix is optional, so an unanchored "agua" would otherwise match
        // inside "aguarde" and turn plain chatter into an order.
        let rules = vec![
            // Burger by protein only: size defaults to "simples".
            rule(
                &format!(r"{qty}{burger}\s*(?:de\s*)?(bovino|boi|carne|suino|suíno|porco|porquinho)\b"),
                None,
                PROTEIN_VARIANTS,
            )?,
            // Burger by protein and size.
            rule(
                &format!(r"{qty}{burger}\s*(?:bovino|boi|carne)\s*(?:simples|normal)\b"),
                Some(ItemId::HamburguerBovinoSimples),
                &[],
            )?,
            rule(
                &format!(r"{qty}{burger}\s*(?:bovino|boi|carne)\s*(?:duplo|duplos)\b"),
                Some(ItemId::HamburguerBovinoDuplo),
                &[],
            )?,
            rule(
                &format!(r"{qty}{burger}\s*(?:suino|suíno|porco)\s*(?:simples|normal)\b"),
                Some(ItemId::HamburguerSuinoSimples),
                &[],
            )?,
            rule(
                &format!(r"{qty}{burger}\s*(?:suino|suíno|porco)\s*(?:duplo|duplos)\b"),
                Some(ItemId::HamburguerSuinoDuplo),
                &[],
            )?,
            // Sodas by brand.
            rule(
                &format!(r"{qty}(?:refrigerante\s+)?\bcoca(?:[\s-]*cola)?\b"),
                Some(ItemId::RefrigeranteCoca),
                &[],
            )?,
            rule(
                &format!(r"{qty}(?:refrigerante\s+)?\bpepsi\b"),
                Some(ItemId::RefrigerantePepsi),
                &[],
            )?,
            rule(
                &format!(r"{qty}(?:refrigerante\s+)?\bguaran[aá]\b"),
                Some(ItemId::RefrigeranteGuarana),
                &[],
            )?,
            rule(
                &format!(r"{qty}(?:refrigerante\s+)?\bfanta\b"),
                Some(ItemId::RefrigeranteFanta),
                &[],
            )?,
            // Juices by flavor; the "suco de" prefix is optional.
            rule(
                &format!(r"{qty}(?:suco\s*(?:de\s*)?)?\blaranjas?\b"),
                Some(ItemId::SucoLaranja),
                &[],
            )?,
            rule(
                &format!(r"{qty}(?:suco\s*(?:de\s*)?)?\bmaracuj[aá]\b"),
                Some(ItemId::SucoMaracuja),
                &[],
            )?,
            rule(
                &format!(r"{qty}(?:suco\s*(?:de\s*)?)?\blim[aã]o\b"),
                Some(ItemId::SucoLimao),
                &[],
            )?,
            rule(
                &format!(r"{qty}(?:suco\s*(?:de\s*)?)?\babacaxi\b"),
                Some(ItemId::SucoAbacaxi),
                &[],
            )?,
            // Water.
            rule(&format!(r"{qty}\b[aá]gua\b"), Some(ItemId::Agua), &[])?,
        ];

        Ok(Self {
            rules,
            delivery_hint: Regex::new(r"(?i)\b(?:delivery|entregar?)\b")?,
            // The separator is mandatory so the optional final "r" of
            // "entregar" cannot backtrack into the address capture.
            address: Regex::new(r"(?i)(?:delivery|entregar?)[\s:]+([^,]+)")?,
        })
    }

    /// Scans `text` for quantity+item phrases, an order-type hint, and an
    /// address fragment. Items the catalog reports unavailable are dropped.
    pub fn extract(&self, text: &str, catalog: &Catalog) -> ExtractedOrder {
        let mut lines = Vec::new();

        for rule in &self.rules {
            for captures in rule.pattern.captures_iter(text) {
                let quantity = captures
                    .get(1)
                    .and_then(|raw| raw.as_str().parse::<u32>().ok())
                    .unwrap_or(1);

                let item = captures
                    .get(2)
                    .and_then(|keyword| {
                        let keyword = keyword.as_str().to_lowercase();
                        rule.variants
                            .iter()
                            .find(|(candidate, _)| *candidate == keyword)
                            .map(|(_, item)| *item)
                    })
                    .or(rule.default_item);

                if let Some(item) = item {
                    if catalog.is_available(item) {
                        lines.push(ExtractedLine { item, quantity });
                    }
                }
            }
        }

        let is_delivery = self.delivery_hint.is_match(text);
        let address = if is_delivery {
            self.address
                .captures(text)
                .and_then(|captures| captures.get(1))
                .map(|fragment| fragment.as_str().trim().to_string())
                .filter(|fragment| !fragment.is_empty())
        } else {
            None
        };

        ExtractedOrder {
            lines,
            order_type: if is_delivery { OrderType::Delivery } else { OrderType::DineIn },
            address,
        }
    }
}
