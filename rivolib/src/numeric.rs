//! Locale-tolerant numeric normalization shared by the extractors and the builder.

use rust_decimal::Decimal;

/// Parses a Swedish-formatted amount ("12345,67" or "12345.67"). Absent, blank
/// or unparsable input yields zero — filings routinely omit optional figures.
pub fn parse_amount(s: Option<&str>) -> Decimal {
    let Some(s) = s else {
        return Decimal::ZERO;
    };
    let t = s.trim().replace(',', ".");
    if t.is_empty() {
        return Decimal::ZERO;
    }
    Decimal::from_str_exact(&t)
        .or_else(|_| t.parse())
        .unwrap_or(Decimal::ZERO)
}

/// Canonical digit-only form for personnummer, accounts, bankgiro and OCR
/// references.
pub fn digits_only(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}
