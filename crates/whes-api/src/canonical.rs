// Canonical path+query construction for request signing.
//
// The signature input embeds this exact string, so the output must be
// byte-deterministic: keys sorted, values percent-encoded with the
// upstream character set, list values joined with a literal comma.

use std::collections::BTreeMap;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use url::Url;

/// Everything outside ASCII alphanumerics and `_ . - ~ /` is encoded as
/// uppercase `%XX` over UTF-8 bytes. Note `/` stays literal while `+` and
/// space do not.
const CANONICAL_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~')
    .remove(b'/');

/// A query parameter value: one scalar or an ordered list of scalars.
///
/// Lists keep their element order through canonicalization (only keys are
/// sorted) and encode as comma-joined elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Single(String),
    List(Vec<String>),
}

impl ParamValue {
    fn to_canonical(&self) -> String {
        match self {
            Self::Single(value) => encode(value),
            Self::List(items) => {
                let encoded: Vec<String> = items.iter().map(|item| encode(item)).collect();
                encoded.join(",")
            }
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Single(value.to_owned())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

fn encode(raw: &str) -> String {
    utf8_percent_encode(raw, CANONICAL_ENCODE_SET).to_string()
}

/// Build the canonical `path` or `path?query` string for `url` plus
/// `extra` parameters.
///
/// Query pairs already on the URL follow HTTP list semantics: repeats
/// accumulate in occurrence order and pairs with a blank value are
/// dropped. Extra parameters replace URL parameters wholesale on key
/// collision. Identical inputs always yield byte-identical output.
pub fn canonical_path_and_query(url: &Url, extra: &[(&str, ParamValue)]) -> String {
    let mut from_url: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (key, value) in url.query_pairs() {
        if value.is_empty() {
            continue;
        }
        from_url
            .entry(key.into_owned())
            .or_default()
            .push(value.into_owned());
    }

    let mut merged: BTreeMap<String, ParamValue> = from_url
        .into_iter()
        .map(|(key, values)| (key, ParamValue::List(values)))
        .collect();
    for (key, value) in extra {
        merged.insert((*key).to_owned(), value.clone());
    }

    if merged.is_empty() {
        return url.path().to_owned();
    }

    let query: Vec<String> = merged
        .iter()
        .map(|(key, value)| format!("{}={}", encode(key), value.to_canonical()))
        .collect();
    format!("{}?{}", url.path(), query.join("&"))
}
