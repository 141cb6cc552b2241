//! Item domain model.
//!
//! # Responsibility
//! - Define the single record kept in a shopping list.
//! - Coerce free-form quantity input into a number.
//!
//! # Invariants
//! - `id` is generated once and never reused for another item.
//! - `created_at` is set once at creation and never changes.
//! - Non-finite quantities are written as JSON `null` and read back as NaN.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Quantity used when edit input leaves the quantity blank.
pub const DEFAULT_QUANTITY: f64 = 1.0;

static DECIMAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?$").expect("valid decimal regex")
});
static RADIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^0([xXoObB])([0-9a-fA-F]+)$").expect("valid radix regex"));

/// Opaque item identifier.
///
/// New ids are UUID v4 strings, but any text read back from storage is
/// accepted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Generates a fresh process-unique id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ItemId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ItemId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// One named, quantified, completable list entry.
///
/// Field names on the wire follow the stored `v1` layout:
/// `id, name, qty, done, createdAt`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    /// Display name, always trimmed and non-empty when created by the store.
    pub name: String,
    /// May be NaN when the user typed something that is not a number.
    #[serde(with = "qty_wire")]
    pub qty: f64,
    pub done: bool,
    /// Unix epoch milliseconds.
    #[serde(rename = "createdAt")]
    pub created_at: i64,
}

impl Item {
    /// Creates a pending item with a generated id.
    pub fn new(name: impl Into<String>, qty: f64, created_at: i64) -> Self {
        Self::with_id(ItemId::generate(), name, qty, created_at)
    }

    /// Creates a pending item with a caller-provided id.
    pub fn with_id(id: ItemId, name: impl Into<String>, qty: f64, created_at: i64) -> Self {
        Self {
            id,
            name: name.into(),
            qty,
            done: false,
            created_at,
        }
    }

    pub fn toggle(&mut self) {
        self.done = !self.done;
    }

    pub fn is_pending(&self) -> bool {
        !self.done
    }
}

/// Normalizes a user-entered name.
///
/// Returns `None` for empty or whitespace-only input.
pub fn normalize_name(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Coerces quantity text into a number.
///
/// - `None` or blank input yields [`DEFAULT_QUANTITY`].
/// - Decimal, exponent, `Infinity` and `0x`/`0o`/`0b` literals are accepted.
/// - Anything else yields NaN. The value is kept, not rejected.
pub fn parse_quantity(input: Option<&str>) -> f64 {
    let Some(raw) = input else {
        return DEFAULT_QUANTITY;
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return DEFAULT_QUANTITY;
    }

    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    if DECIMAL_RE.is_match(trimmed) {
        return trimmed.parse::<f64>().unwrap_or(f64::NAN);
    }

    if let Some(captures) = RADIX_RE.captures(trimmed) {
        let radix = match captures[1].to_ascii_lowercase().as_str() {
            "x" => 16,
            "o" => 8,
            _ => 2,
        };
        return parse_radix_digits(&captures[2], radix);
    }

    f64::NAN
}

fn parse_radix_digits(digits: &str, radix: u32) -> f64 {
    digits
        .chars()
        .try_fold(0.0_f64, |acc, ch| {
            ch.to_digit(radix)
                .map(|digit| acc * f64::from(radix) + f64::from(digit))
        })
        .unwrap_or(f64::NAN)
}

mod qty_wire {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_name, parse_quantity, DEFAULT_QUANTITY};

    #[test]
    fn blank_quantity_defaults_to_one() {
        assert_eq!(parse_quantity(None), DEFAULT_QUANTITY);
        assert_eq!(parse_quantity(Some("   ")), DEFAULT_QUANTITY);
    }

    #[test]
    fn decimal_and_exponent_forms_parse() {
        assert_eq!(parse_quantity(Some(" 12 ")), 12.0);
        assert_eq!(parse_quantity(Some("-0.5")), -0.5);
        assert_eq!(parse_quantity(Some(".25")), 0.25);
        assert_eq!(parse_quantity(Some("3.")), 3.0);
        assert_eq!(parse_quantity(Some("1e3")), 1000.0);
    }

    #[test]
    fn radix_literals_parse() {
        assert_eq!(parse_quantity(Some("0x1F")), 31.0);
        assert_eq!(parse_quantity(Some("0o17")), 15.0);
        assert_eq!(parse_quantity(Some("0b101")), 5.0);
    }

    #[test]
    fn infinity_keywords_are_case_sensitive() {
        assert_eq!(parse_quantity(Some("Infinity")), f64::INFINITY);
        assert_eq!(parse_quantity(Some("-Infinity")), f64::NEG_INFINITY);
        assert!(parse_quantity(Some("inf")).is_nan());
        assert!(parse_quantity(Some("infinity")).is_nan());
    }

    #[test]
    fn garbage_becomes_nan() {
        assert!(parse_quantity(Some("two")).is_nan());
        assert!(parse_quantity(Some("NaN")).is_nan());
        assert!(parse_quantity(Some("1,5")).is_nan());
        assert!(parse_quantity(Some("0b102")).is_nan());
        assert!(parse_quantity(Some("-0x10")).is_nan());
    }

    #[test]
    fn normalize_name_trims_and_rejects_blank() {
        assert_eq!(normalize_name("  Milk \n").as_deref(), Some("Milk"));
        assert_eq!(normalize_name(" \t "), None);
        assert_eq!(normalize_name(""), None);
    }
}
