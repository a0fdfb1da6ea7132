use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::money::Cents;

/// Every item the dialogue can ever sell. Lookups keyed by this enum are
/// total, so price and name queries cannot fail for any id the state
/// machine produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemId {
    HamburguerBovinoSimples,
    HamburguerBovinoDuplo,
    HamburguerSuinoSimples,
    HamburguerSuinoDuplo,
    RefrigeranteCoca,
    RefrigerantePepsi,
    RefrigeranteGuarana,
    RefrigeranteFanta,
    SucoLaranja,
    SucoMaracuja,
    SucoLimao,
    SucoAbacaxi,
    Agua,
}

/// Broad menu family, used for display-line id prefixes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemFamily {
    Burger,
    Soda,
    Juice,
    Water,
}

impl ItemFamily {
    /// Prefix for the synthetic ids of lines added through the guided flow.
    pub fn line_id_prefix(self) -> &'static str {
        match self {
            ItemFamily::Burger => "hamburguer",
            ItemFamily::Soda => "refrigerante",
            ItemFamily::Juice => "suco",
            ItemFamily::Water => "bebida",
        }
    }
}

impl ItemId {
    pub const ALL: [ItemId; 13] = [
        ItemId::HamburguerBovinoSimples,
        ItemId::HamburguerBovinoDuplo,
        ItemId::HamburguerSuinoSimples,
        ItemId::HamburguerSuinoDuplo,
        ItemId::RefrigeranteCoca,
        ItemId::RefrigerantePepsi,
        ItemId::RefrigeranteGuarana,
        ItemId::RefrigeranteFanta,
        ItemId::SucoLaranja,
        ItemId::SucoMaracuja,
        ItemId::SucoLimao,
        ItemId::SucoAbacaxi,
        ItemId::Agua,
    ];

    /// Canonical wire/storage id.
    pub fn as_str(self) -> &'static str {
        match self {
            ItemId::HamburguerBovinoSimples => "hamburguer_bovino_simples",
            ItemId::HamburguerBovinoDuplo => "hamburguer_bovino_duplo",
            ItemId::HamburguerSuinoSimples => "hamburguer_suino_simples",
            ItemId::HamburguerSuinoDuplo => "hamburguer_suino_duplo",
            ItemId::RefrigeranteCoca => "refrigerante_coca",
            ItemId::RefrigerantePepsi => "refrigerante_pepsi",
            ItemId::RefrigeranteGuarana => "refrigerante_guarana",
            ItemId::RefrigeranteFanta => "refrigerante_fanta",
            ItemId::SucoLaranja => "suco_laranja",
            ItemId::SucoMaracuja => "suco_maracuja",
            ItemId::SucoLimao => "suco_limao",
            ItemId::SucoAbacaxi => "suco_abacaxi",
            ItemId::Agua => "agua",
        }
    }

    pub fn family(self) -> ItemFamily {
        match self {
            ItemId::HamburguerBovinoSimples
            | ItemId::HamburguerBovinoDuplo
            | ItemId::HamburguerSuinoSimples
            | ItemId::HamburguerSuinoDuplo => ItemFamily::Burger,
            ItemId::RefrigeranteCoca
            | ItemId::RefrigerantePepsi
            | ItemId::RefrigeranteGuarana
            | ItemId::RefrigeranteFanta => ItemFamily::Soda,
            ItemId::SucoLaranja | ItemId::SucoMaracuja | ItemId::SucoLimao | ItemId::SucoAbacaxi => {
                ItemFamily::Juice
            }
            ItemId::Agua => ItemFamily::Water,
        }
    }
}

/// Static price list plus an availability overlay. Absence of an explicit
/// flag means available.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    unavailable: HashSet<ItemId>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unavailable(items: impl IntoIterator<Item = ItemId>) -> Self {
        Self { unavailable: items.into_iter().collect() }
    }

    pub fn price_cents(&self, id: ItemId) -> Cents {
        match id {
            ItemId::HamburguerBovinoSimples => 1800,
            ItemId::HamburguerBovinoDuplo => 2800,
            ItemId::HamburguerSuinoSimples => 2000,
            ItemId::HamburguerSuinoDuplo => 3000,
            ItemId::RefrigeranteCoca
            | ItemId::RefrigerantePepsi
            | ItemId::RefrigeranteGuarana
            | ItemId::RefrigeranteFanta => 500,
            ItemId::SucoLaranja | ItemId::SucoMaracuja | ItemId::SucoLimao | ItemId::SucoAbacaxi => {
                600
            }
            ItemId::Agua => 300,
        }
    }

    pub fn display_name(&self, id: ItemId) -> &'static str {
        match id {
            ItemId::HamburguerBovinoSimples => "Hambúrguer Bovino Simples",
            ItemId::HamburguerBovinoDuplo => "Hambúrguer Bovino Duplo",
            ItemId::HamburguerSuinoSimples => "Hambúrguer Suíno Simples",
            ItemId::HamburguerSuinoDuplo => "Hambúrguer Suíno Duplo",
            ItemId::RefrigeranteCoca => "Coca-Cola",
            ItemId::RefrigerantePepsi => "Pepsi",
            ItemId::RefrigeranteGuarana => "Guaraná",
            ItemId::RefrigeranteFanta => "Fanta",
            ItemId::SucoLaranja => "Suco de Laranja",
            ItemId::SucoMaracuja => "Suco de Maracujá",
            ItemId::SucoLimao => "Suco de Limão",
            ItemId::SucoAbacaxi => "Suco de Abacaxi",
            ItemId::Agua => "Água",
        }
    }

    pub fn is_available(&self, id: ItemId) -> bool {
        !self.unavailable.contains(&id)
    }

    pub fn mark_unavailable(&mut self, id: ItemId) {
        self.unavailable.insert(id);
    }

    pub fn mark_available(&mut self, id: ItemId) {
        self.unavailable.remove(&id);
    }
}
