use rust_decimal::Decimal;

/// Currency amounts in integer centavos. Display conversion happens only at
/// the message/wire boundary so repeated additions never drift.
pub type Cents = i64;

/// Renders centavos as Brazilian currency, e.g. `R$ 18,00`.
pub fn format_brl(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let absolute = cents.unsigned_abs();
    format!("{sign}R$ {},{:02}", absolute / 100, absolute % 100)
}

/// Centavos as a two-decimal `Decimal` for JSON payloads.
pub fn cents_to_decimal(cents: Cents) -> Decimal {
    Decimal::new(cents, 2)
}
