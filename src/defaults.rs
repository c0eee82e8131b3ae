//! Static default subdomain list.
//!
//! The list a zone starts with, and returns to on reset, is made of
//! platform-reserved names plus a pool of pre-registered user labels.

use hickory_proto::rr::Name;

/// Labels reserved by the platform, relative to the apex.
/// The empty label stands for the apex itself.
pub const RESERVED_LABELS: &[&str] = &["", "ns1", "pipe", "test001"];

const BUILTIN_LABELS: &str = include_str!("../data/default_labels.txt");

/// Pre-registered user labels shipped with the crate.
pub fn builtin_labels() -> impl Iterator<Item = &'static str> {
    BUILTIN_LABELS
        .lines()
        .map(str::trim)
        .filter(|label| !label.is_empty() && !label.starts_with('#'))
}

/// Normalize a name into the form stored in the subdomain set: the
/// lowercase wire (ASCII, punycode) form, terminated by a dot.
///
/// `bücher.example.test` and `XN--BCHER-KVA.example.test.` share one key.
pub fn normalize(name: &str) -> String {
    let name = name.trim();
    let mut key = match Name::from_utf8(name) {
        Ok(parsed) => parsed.to_lowercase().to_ascii(),
        Err(_) => name.to_ascii_lowercase(),
    };
    if !key.ends_with('.') {
        key.push('.');
    }
    key
}

/// Join a single label with the zone apex. An empty label yields the apex.
pub fn qualify(label: &str, apex: &str) -> String {
    let apex = normalize(apex);
    let label = label.trim().trim_end_matches('.');
    if label.is_empty() {
        apex
    } else {
        normalize(&format!("{label}.{apex}"))
    }
}

/// Build the default name list for `apex`.
///
/// `labels` replaces the built-in user pool when given. The reserved names
/// and the nameserver are always included.
pub fn default_names(apex: &str, nameserver: &str, labels: Option<&[String]>) -> Vec<String> {
    let mut names: Vec<String> = RESERVED_LABELS
        .iter()
        .map(|label| qualify(label, apex))
        .collect();
    names.push(normalize(nameserver));

    match labels {
        Some(labels) => names.extend(labels.iter().map(|label| qualify(label, apex))),
        None => names.extend(builtin_labels().map(|label| qualify(label, apex))),
    }

    names
}
