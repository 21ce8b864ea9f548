//! Flat key/value machine configuration.

use std::collections::BTreeMap;

/// A configuration profile: `jkcemu.*` keys mapped to string values.
///
/// Values are read once at construction through the typed accessors.
/// Unknown or malformed values fall back to the caller's default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Profile {
    entries: BTreeMap<String, String>,
}

impl Profile {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_owned(), value.to_owned());
    }

    /// The trimmed value, or `""` when absent.
    #[must_use]
    pub fn get_str(&self, key: &str) -> &str {
        self.entries.get(key).map_or("", |v| v.trim())
    }

    /// Boolean value. Accepts `1/Y/YES/TRUE/ON` and `0/N/NO/FALSE/OFF` in
    /// any case.
    #[must_use]
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.get_str(key).to_ascii_uppercase().as_str() {
            "1" | "Y" | "YES" | "TRUE" | "ON" => true,
            "0" | "N" | "NO" | "FALSE" | "OFF" => false,
            _ => default,
        }
    }

    #[must_use]
    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        self.get_str(key).parse().unwrap_or(default)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Profile {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_spellings() {
        let p: Profile = [("a", " y "), ("b", "False"), ("c", "maybe"), ("d", "1")]
            .into_iter()
            .collect();
        assert!(p.get_bool("a", false));
        assert!(!p.get_bool("b", true));
        assert!(p.get_bool("c", true));
        assert!(!p.get_bool("c", false));
        assert!(p.get_bool("d", false));
        assert!(p.get_bool("missing", true));
    }

    #[test]
    fn int_falls_back_on_garbage() {
        let p = Profile::new().with("n", " 48 ").with("x", "48k");
        assert_eq!(p.get_int("n", 16), 48);
        assert_eq!(p.get_int("x", 16), 16);
        assert_eq!(p.get_str("missing"), "");
    }
}
