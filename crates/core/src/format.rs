//! Display formatting for money and Brazilian phone numbers.

use crate::error::ChurrosError;

/// Format an amount in centavos as Brazilian reais, e.g. `R$ 1.234,56`.
pub fn format_brl(cents: i64) -> String {
    let abs = cents.unsigned_abs();
    let reais = abs / 100;
    let centavos = abs % 100;

    let digits = reais.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if cents < 0 { "-" } else { "" };
    format!("{sign}R$ {grouped},{centavos:02}")
}

/// Parse a phone number and return its display form, or fail if the digit
/// count doesn't match a Brazilian landline or mobile number.
///
/// Accepts 10 digits (landline), 11 digits (mobile), and either of those
/// prefixed with the `55` country code.
pub fn parse_phone(input: &str) -> Result<String, ChurrosError> {
    let digits: String = input.chars().filter(char::is_ascii_digit).collect();

    let (country, national) = match digits.len() {
        12 | 13 if digits.starts_with("55") => (true, &digits[2..]),
        10 | 11 => (false, digits.as_str()),
        _ => return Err(ChurrosError::InvalidPhone(input.to_string())),
    };

    let (area, local) = national.split_at(2);
    let split = local.len() - 4;
    let formatted = format!("({area}) {}-{}", &local[..split], &local[split..]);

    Ok(if country {
        format!("+55 {formatted}")
    } else {
        formatted
    })
}

/// Lenient form of [`parse_phone`]: numbers that don't parse are returned as
/// their bare digits.
pub fn format_phone(input: &str) -> String {
    parse_phone(input).unwrap_or_else(|_| input.chars().filter(char::is_ascii_digit).collect())
}
