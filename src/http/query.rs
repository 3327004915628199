//! Form-style `key=value&key=value` scanning shared by the query string and
//! urlencoded POST bodies.

use percent_encoding::percent_decode_str;

/// Ordered key/value pairs. Keys are unique; inserting an existing key
/// replaces its value in place, so the last occurrence wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Variables {
    pairs: Vec<(String, String)>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.pairs.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Variables {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut vars = Variables::new();
        for (k, v) in iter {
            vars.insert(k, v);
        }
        vars
    }
}

/// Splits `input` into decoded pairs.
///
/// A `#` ends the scan, trailing `?`/`&` are dropped, empty segments are
/// skipped and a segment without `=` gets an empty value.
pub fn parse_pairs(input: &str) -> Variables {
    let mut vars = Variables::new();

    let input = input.split('#').next().unwrap_or_default();
    let input = input.trim_end_matches(['?', '&']);

    for segment in input.split('&') {
        if segment.is_empty() {
            continue;
        }

        let (key, value) = segment.split_once('=').unwrap_or((segment, ""));
        let key = key.trim_end_matches(['=', '&']);
        if key.is_empty() {
            continue;
        }

        vars.insert(decode_component(key), decode_component(value));
    }

    vars
}

/// Decodes one form component: `+` becomes a space, then a single pass of
/// percent-decoding. Invalid UTF-8 is replaced rather than rejected.
pub fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

/// Decodes a URL path. Unlike form components, `+` is kept literally.
pub fn decode_path(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}
