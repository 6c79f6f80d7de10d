use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
    })
}

fn phone_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[+]?[0-9\s-]{8,}$").expect("phone pattern compiles")
    })
}

pub fn is_valid_email(value: &str) -> bool {
    email_pattern().is_match(value.trim())
}

pub fn is_valid_phone(value: &str) -> bool {
    phone_pattern().is_match(value.trim())
}

pub fn parse_birth_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}
