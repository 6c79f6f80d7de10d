//! Chilean RUT normalization, modulo-11 check digit, and display formatting.

/// Body digits plus check character.
const MAX_RUT_CHARS: usize = 9;

/// Strip dots, dashes and whitespace, then uppercase the remainder.
pub fn normalize_rut(raw: &str) -> String {
    raw.chars()
        .filter(|ch| *ch != '.' && *ch != '-' && !ch.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Check character for a string of body digits; `None` when `digits` is empty or
/// contains anything but ASCII digits.
pub fn calculate_verification_digit(digits: &str) -> Option<char> {
    if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }

    let sum: u32 = digits
        .bytes()
        .rev()
        .map(|byte| u32::from(byte - b'0'))
        .zip((2..=7).cycle())
        .map(|(digit, weight)| digit * weight)
        .sum();

    match 11 - (sum % 11) {
        11 => Some('0'),
        10 => Some('K'),
        raw => char::from_digit(raw, 10),
    }
}

/// Split a normalized RUT into body and check character.
fn split(normalized: &str) -> Option<(&str, char)> {
    let check = normalized.chars().last()?;
    let body = &normalized[..normalized.len() - check.len_utf8()];
    if body.is_empty() {
        return None;
    }
    Some((body, check))
}

pub fn is_valid_rut(raw: &str) -> bool {
    let normalized = normalize_rut(raw);
    match split(&normalized) {
        Some((body, check)) => calculate_verification_digit(body) == Some(check),
        None => false,
    }
}

/// Render as `12.345.678-5`. Inputs too short to split are returned normalized.
pub fn format_rut(raw: &str) -> String {
    let normalized = normalize_rut(raw);
    match split(&normalized) {
        Some((body, check)) => format!("{}-{}", group_thousands(body), check),
        None => normalized,
    }
}

/// Formatter for a RUT being typed: keeps digits and a trailing `K`, caps the
/// length, then formats. Applying it to its own output is a no-op.
pub fn format_rut_input(raw: &str) -> String {
    let candidates: Vec<char> = raw
        .chars()
        .flat_map(char::to_uppercase)
        .filter(|ch| ch.is_ascii_digit() || *ch == 'K')
        .collect();

    let last = candidates.len().saturating_sub(1);
    let cleaned: String = candidates
        .iter()
        .enumerate()
        .filter(|(index, ch)| **ch != 'K' || *index == last)
        .map(|(_, ch)| *ch)
        .take(MAX_RUT_CHARS)
        .collect();

    if cleaned.len() < 2 {
        return cleaned;
    }
    format_rut(&cleaned)
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    grouped
}
