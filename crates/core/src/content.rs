//! Bilingual JSON document resolution.
//!
//! Stored content is a JSON object keyed by locale code. Reading a document
//! overlays the stored payload for one locale onto a default payload so
//! that fields an editor never set still render.

use serde_json::{Map, Value};

use crate::types::Locale;

/// Overlay `overlay` onto `base`.
///
/// - objects merge key by key, recursively;
/// - keys only present in `overlay` are added;
/// - `null` in the overlay keeps the base value;
/// - a value of a different JSON kind than the base keeps the base value,
///   unless the base itself is `null`;
/// - arrays and scalars of the same kind replace the base.
#[must_use]
pub fn deep_merge(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (_, Value::Null) => base.clone(),
        (Value::Null, _) => overlay.clone(),
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            let mut merged = base_map.clone();
            for (key, value) in overlay_map {
                let next = match base_map.get(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value.clone(),
                };
                merged.insert(key.clone(), next);
            }
            Value::Object(merged)
        }
        (Value::Array(_), Value::Array(_))
        | (Value::String(_), Value::String(_))
        | (Value::Number(_), Value::Number(_))
        | (Value::Bool(_), Value::Bool(_)) => overlay.clone(),
        _ => base.clone(),
    }
}

/// The stored payload for `locale`, if `data` is a locale-keyed object.
#[must_use]
pub fn locale_payload(data: &Value, locale: Locale) -> Option<&Value> {
    data.as_object()?.get(locale.code())
}

/// Resolve one locale of a stored document against its default.
///
/// A missing or malformed record yields the default unchanged.
#[must_use]
pub fn resolve_locale(default: &Value, record: Option<&Value>, locale: Locale) -> Value {
    let fallback = locale_payload(default, locale).unwrap_or(&Value::Null);
    match record.and_then(|data| locale_payload(data, locale)) {
        Some(stored) => deep_merge(fallback, stored),
        None => fallback.clone(),
    }
}

/// Resolve both locales into a `{ "en": .., "ar": .. }` object.
#[must_use]
pub fn resolve_all(default: &Value, record: Option<&Value>) -> Value {
    let mut out = Map::new();
    for locale in Locale::ALL {
        out.insert(
            locale.code().to_owned(),
            resolve_locale(default, record, locale),
        );
    }
    Value::Object(out)
}

/// Whether `name` is usable as a content type key.
///
/// Keys start with an ASCII letter and continue with letters, digits, `_`
/// or `-`, up to 64 characters.
#[must_use]
pub fn is_valid_content_type(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    first.is_ascii_alphabetic()
        && name.len() <= 64
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
