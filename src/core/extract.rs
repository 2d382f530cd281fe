// src/core/extract.rs
// Field extractors: plain text in, normalized value out. No DOM here.

/// Concatenate every run of ASCII digits in `text`, in order.
/// "第2024001期" -> "2024001"; "" / "no digits" -> "".
pub fn extract_digits(text: &str) -> String {
    text.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Currency text to whole units, truncated.
/// "¥1,234,567.89元" -> 1234567. Absent or digit-free text -> 0.
pub fn extract_amount(text: Option<&str>) -> u64 {
    let Some(text) = text else { return 0 };

    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, '¥' | '￥' | '元' | ','))
        .collect();

    match first_decimal(&cleaned) {
        // `as` saturates and truncates toward zero
        Some(v) => v.trunc() as u64,
        None => 0,
    }
}

/// First `\d+(\.\d*)?` in `s`, parsed.
fn first_decimal(s: &str) -> Option<f64> {
    let b = s.as_bytes();
    let start = b.iter().position(u8::is_ascii_digit)?;

    let mut end = start;
    while end < b.len() && b[end].is_ascii_digit() { end += 1; }
    if end < b.len() && b[end] == b'.' {
        end += 1;
        while end < b.len() && b[end].is_ascii_digit() { end += 1; }
    }
    s[start..end].parse::<f64>().ok()
}

/// Leading integer of a trimmed text node: " 07 " -> 7, "12+" -> 12, "x" -> None.
pub fn parse_leading_int(text: &str) -> Option<u32> {
    let t = text.trim();
    let end = t.find(|c: char| !c.is_ascii_digit()).unwrap_or(t.len());
    t[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_decimal_stops_at_second_dot() {
        assert_eq!(first_decimal("a1.5.7"), Some(1.5));
        assert_eq!(first_decimal("12."), Some(12.0));
        assert_eq!(first_decimal(".5"), Some(5.0));
        assert_eq!(first_decimal("none"), None);
    }

    #[test]
    fn amount_saturates_instead_of_wrapping() {
        let huge = "9".repeat(40);
        assert_eq!(extract_amount(Some(&huge)), u64::MAX);
    }
}
