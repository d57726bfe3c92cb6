//! Channel id canonicalisation
//!
//! Gateways report the same channel as `0x0A`, `0x0a` or `10` depending on
//! firmware and payload section. Everything is folded to the lowercase
//! `0x` + two hex digit form used as the catalog key.

/// Canonicalise a channel id. Never fails; ids that are neither hex nor
/// decimal come back lowercased and will simply miss the catalog.
pub fn normalize_id(raw: &str) -> String {
    let raw = raw.trim();
    if raw.starts_with("0x") || raw.starts_with("0X") {
        return raw.to_lowercase();
    }
    match raw.parse::<u64>() {
        Ok(n) => format!("0x{n:02x}"),
        Err(_) => raw.to_lowercase(),
    }
}
