/// Currency labels offered by `pocketbook currency`. Display only; nothing is converted.
pub const CURRENCIES: &[&str] = &["USD", "EUR", "GBP", "JPY", "CAD", "AUD"];

fn symbol(code: &str) -> Option<&'static str> {
    match code {
        "USD" => Some("$"),
        "EUR" => Some("\u{20ac}"),
        "GBP" => Some("\u{a3}"),
        "JPY" => Some("\u{a5}"),
        "CAD" => Some("CA$"),
        "AUD" => Some("A$"),
        _ => None,
    }
}

/// Format an amount with thousands separators and the currency's symbol: $1,234.56.
/// Unknown codes are written after the number: 1,234.56 CHF.
pub fn money(val: f64, currency: &str) -> String {
    let cents = format!("{:.2}", val.abs());
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((&cents, "00"));
    let negative = val < 0.0 && cents != "0.00";

    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    let sign = if negative { "-" } else { "" };
    match symbol(currency) {
        Some(sym) => format!("{sign}{sym}{with_commas}.{dec_part}"),
        None => format!("{sign}{with_commas}.{dec_part} {currency}"),
    }
}

pub fn format_bytes(size: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut value = size as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{size} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_formatting() {
        assert_eq!(money(1234.56, "USD"), "$1,234.56");
        assert_eq!(money(-500.00, "USD"), "-$500.00");
        assert_eq!(money(0.0, "USD"), "$0.00");
        assert_eq!(money(1000000.99, "USD"), "$1,000,000.99");
        assert_eq!(money(42.10, "USD"), "$42.10");
    }

    #[test]
    fn test_money_uses_currency_label() {
        assert_eq!(money(12.5, "EUR"), "\u{20ac}12.50");
        assert_eq!(money(-3.0, "AUD"), "-A$3.00");
        assert_eq!(money(1500.0, "CHF"), "1,500.00 CHF");
    }

    #[test]
    fn test_money_no_negative_zero() {
        assert_eq!(money(-0.001, "USD"), "$0.00");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
    }
}
