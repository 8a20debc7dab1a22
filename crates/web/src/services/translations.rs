//! Translation bundles shipped with the server.
//!
//! `locales/en.json` and `locales/ar.json` hold the UI strings the client
//! renders with. Editors override individual keys through the `translations`
//! content record, which is deep-merged over these bundles on read.

use std::path::Path;

use serde_json::{Map, Value};

use outpost_core::Locale;

/// Load every locale file under `dir` into `{"en": {...}, "ar": {...}}`.
///
/// A missing or malformed file yields an empty object for that locale.
#[must_use]
pub fn load_bundle(dir: &Path) -> Value {
    let mut bundle = Map::new();
    for locale in Locale::ALL {
        bundle.insert(locale.code().to_owned(), load_locale(dir, locale));
    }
    Value::Object(bundle)
}

fn load_locale(dir: &Path, locale: Locale) -> Value {
    let path = dir.join(format!("{}.json", locale.code()));
    let text = match std::fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Translation file not readable");
            return Value::Object(Map::new());
        }
    };

    match serde_json::from_str::<Value>(&text) {
        Ok(value @ Value::Object(_)) => value,
        Ok(_) => {
            tracing::warn!(path = %path.display(), "Translation file is not a JSON object");
            Value::Object(Map::new())
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Translation file is not valid JSON");
            Value::Object(Map::new())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;

    use serde_json::json;

    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "outpost-translations-{name}-{}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_loads_both_locales() {
        let dir = scratch_dir("both");
        std::fs::write(dir.join("en.json"), r#"{"nav": {"home": "Home"}}"#).unwrap();
        std::fs::write(dir.join("ar.json"), r#"{"nav": {"home": "الرئيسية"}}"#).unwrap();

        let bundle = load_bundle(&dir);
        assert_eq!(bundle["en"]["nav"]["home"], "Home");
        assert_eq!(bundle["ar"]["nav"]["home"], "الرئيسية");

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_missing_and_malformed_files_are_empty() {
        let dir = scratch_dir("broken");
        std::fs::write(dir.join("en.json"), "{ not json").unwrap();

        let bundle = load_bundle(&dir);
        assert_eq!(bundle, json!({ "en": {}, "ar": {} }));

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_shipped_bundles_parse() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("locales");
        let bundle = load_bundle(&dir);
        for locale in Locale::ALL {
            let strings = bundle[locale.code()].as_object().unwrap();
            assert!(!strings.is_empty(), "{locale} bundle is empty");
        }
    }
}
