//! Numeric input accepted during exercise entry.
//!
//! Counts must be plain digits (`^[0-9]+$`) and weights digits with an
//! optional fractional part (`^[0-9]+(\.[0-9]+)?$`), both after trimming.

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Parse a set or rep count. Values that overflow `u32` are rejected.
pub fn parse_count(input: &str) -> Option<u32> {
    let input = input.trim();
    if !is_digits(input) {
        return None;
    }
    input.parse().ok()
}

pub fn parse_weight(input: &str) -> Option<f64> {
    let input = input.trim();
    let (whole, fraction) = match input.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (input, None),
    };
    if !is_digits(whole) || fraction.is_some_and(|f| !is_digits(f)) {
        return None;
    }
    input.parse::<f64>().ok().filter(|weight| weight.is_finite())
}
