use regex::Regex;
use std::sync::OnceLock;

fn e164() -> &'static Regex {
    static E164: OnceLock<Regex> = OnceLock::new();
    E164.get_or_init(|| Regex::new(r"^\+[1-9][0-9]{7,14}$").unwrap())
}

/// E.164: a plus sign followed by 8 to 15 digits
pub fn is_valid_phone(phone: &str) -> bool {
    e164().is_match(phone)
}

/// identities created from a bare number carry the number as their name
pub fn looks_like_phone(name: Option<&str>) -> bool {
    match name {
        None => true,
        Some(name) => name.starts_with('+'),
    }
}
