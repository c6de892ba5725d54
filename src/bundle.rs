//! Bundle identity and in-memory message bundles.
//!
//! A [`BundleIdentity`] names one physical resource bundle (base name plus
//! optional locale) and doubles as the cache and dedup key on both the
//! runtime and generation paths. A [`MessageBundle`] is the loaded form:
//! an immutable key → text map tagged with the locale it was resolved for
//! and whether it was fabricated in memory rather than read from a file.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::I18nError;
use crate::locale::Locale;

/// Declared storage format of a message contract's backing bundle.
///
/// Only `Property` bundles are ever written to disk. `None` marks contracts
/// that live purely in memory (fabricated on first use), while `Xml` and
/// `Xliff` are accepted in manifests but rejected by the generator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BundleKind {
    None,
    #[default]
    Property,
    Xml,
    Xliff,
}

impl fmt::Display for BundleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BundleKind::None => "none",
            BundleKind::Property => "property",
            BundleKind::Xml => "xml",
            BundleKind::Xliff => "xliff",
        };
        f.write_str(name)
    }
}

/// Identity of one resource bundle: base name plus optional locale.
///
/// The canonical string form `baseName_locale` (or just `baseName` when no
/// locale is attached) is the cache key, so two identities are equal
/// exactly when their canonical strings are equal, regardless of how the
/// name and locale were split. The declared kind rides along as metadata
/// and does not participate in equality.
#[derive(Debug, Clone)]
pub struct BundleIdentity {
    base_name: String,
    locale: Option<Locale>,
    kind: BundleKind,
    canonical: String,
}

impl BundleIdentity {
    pub fn new(base_name: &str, locale: Option<Locale>, kind: BundleKind) -> BundleIdentity {
        let canonical = match &locale {
            Some(locale) => format!("{}_{}", base_name, locale),
            None => base_name.to_string(),
        };
        BundleIdentity {
            base_name: base_name.to_string(),
            locale,
            kind,
            canonical,
        }
    }

    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    pub fn locale(&self) -> Option<&Locale> {
        self.locale.as_ref()
    }

    pub fn kind(&self) -> BundleKind {
        self.kind
    }

    /// The cache/dedup key, e.g. `app/Messages_en_US`.
    pub fn canonical(&self) -> &str {
        &self.canonical
    }
}

impl fmt::Display for BundleIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

impl PartialEq for BundleIdentity {
    fn eq(&self, other: &BundleIdentity) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for BundleIdentity {}

impl Hash for BundleIdentity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

/// An immutable key → text map resolved for one locale.
#[derive(Debug, Clone)]
pub struct MessageBundle {
    entries: BTreeMap<String, String>,
    locale: Locale,
    fabricated: bool,
}

impl MessageBundle {
    /// Parse a flat `key=value` properties payload into a bundle.
    ///
    /// Supports `#`/`!` comment lines, blank lines, trailing-backslash line
    /// continuation, `=`/`:` separators (first unescaped one wins) and the
    /// escapes `\n` `\t` `\r` `\f` `\\` `\uXXXX`. A line without a
    /// separator becomes a key with empty text. `resource` only labels
    /// parse errors.
    pub fn from_properties(
        resource: &str,
        text: &str,
        locale: Locale,
    ) -> Result<MessageBundle, I18nError> {
        let entries = parse_properties(resource, text)?;
        Ok(MessageBundle {
            entries,
            locale,
            fabricated: false,
        })
    }

    /// Build an in-memory bundle that has no file backing.
    pub fn fabricated(entries: BTreeMap<String, String>, locale: Locale) -> MessageBundle {
        MessageBundle {
            entries,
            locale,
            fabricated: true,
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    pub fn is_fabricated(&self) -> bool {
        self.fabricated
    }
}

fn parse_properties(resource: &str, text: &str) -> Result<BTreeMap<String, String>, I18nError> {
    let mut entries = BTreeMap::new();
    let mut lines = text.lines();

    while let Some(raw) = lines.next() {
        let mut line = raw.trim_start().to_string();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }

        // A logical line continues while it ends in an odd number of
        // backslashes; the continuation's leading whitespace is dropped.
        while ends_with_odd_backslashes(&line) {
            line.pop();
            match lines.next() {
                Some(next) => line.push_str(next.trim_start()),
                None => break,
            }
        }

        let (raw_key, raw_value) = split_key_value(&line);
        let key = unescape(resource, raw_key)?;
        let value = unescape(resource, raw_value)?;
        entries.insert(key, value);
    }

    Ok(entries)
}

fn ends_with_odd_backslashes(line: &str) -> bool {
    line.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

fn split_key_value(line: &str) -> (&str, &str) {
    let mut escaped = false;
    for (idx, ch) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '=' | ':' => {
                let key = line[..idx].trim_end();
                let value = line[idx + ch.len_utf8()..].trim_start();
                return (key, value);
            }
            _ => {}
        }
    }
    (line.trim_end(), "")
}

fn unescape(resource: &str, input: &str) -> Result<String, I18nError> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{000c}'),
            Some('u') => {
                let code: String = chars.by_ref().take(4).collect();
                if code.len() < 4 {
                    return Err(malformed(resource, "truncated \\u escape"));
                }
                let value = u32::from_str_radix(&code, 16)
                    .map_err(|_| malformed(resource, "non-hex \\u escape"))?;
                match char::from_u32(value) {
                    Some(decoded) => out.push(decoded),
                    None => return Err(malformed(resource, "\\u escape is not a character")),
                }
            }
            // Unknown escapes drop the backslash and keep the character.
            Some(other) => out.push(other),
            None => {}
        }
    }

    Ok(out)
}

fn malformed(resource: &str, reason: &str) -> I18nError {
    I18nError::MalformedResource {
        name: resource.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> MessageBundle {
        MessageBundle::from_properties("test", text, Locale::new("en", "", "")).unwrap()
    }

    // ==================== Identity Tests ====================

    #[test]
    fn test_canonical_with_locale() {
        let identity = BundleIdentity::new(
            "app/Messages",
            Some(Locale::new("en", "US", "")),
            BundleKind::Property,
        );
        assert_eq!(identity.canonical(), "app/Messages_en_US");
    }

    #[test]
    fn test_canonical_without_locale() {
        let identity = BundleIdentity::new("app/Messages", None, BundleKind::Property);
        assert_eq!(identity.canonical(), "app/Messages");
    }

    #[test]
    fn test_equality_follows_canonical_string() {
        let split = BundleIdentity::new(
            "Messages",
            Some(Locale::new("en", "", "")),
            BundleKind::Property,
        );
        let joined = BundleIdentity::new("Messages_en", None, BundleKind::None);
        assert_eq!(split, joined);
    }

    #[test]
    fn test_kind_does_not_affect_equality() {
        let property = BundleIdentity::new("Messages", None, BundleKind::Property);
        let none = BundleIdentity::new("Messages", None, BundleKind::None);
        assert_eq!(property, none);
    }

    // ==================== Properties Parsing Tests ====================

    #[test]
    fn test_parse_simple_pairs() {
        let bundle = parse("greeting=Hello\nfarewell=Goodbye\n");
        assert_eq!(bundle.get("greeting"), Some("Hello"));
        assert_eq!(bundle.get("farewell"), Some("Goodbye"));
        assert_eq!(bundle.len(), 2);
    }

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let bundle = parse("# comment\n\n! also a comment\nkey=value\n");
        assert_eq!(bundle.len(), 1);
        assert_eq!(bundle.get("key"), Some("value"));
    }

    #[test]
    fn test_parse_colon_separator() {
        let bundle = parse("key: value");
        assert_eq!(bundle.get("key"), Some("value"));
    }

    #[test]
    fn test_parse_first_separator_wins() {
        let bundle = parse("url=http://example.com");
        assert_eq!(bundle.get("url"), Some("http://example.com"));
    }

    #[test]
    fn test_parse_escaped_separator_in_key() {
        let bundle = parse("a\\=b=c");
        assert_eq!(bundle.get("a=b"), Some("c"));
    }

    #[test]
    fn test_parse_line_without_separator() {
        let bundle = parse("orphan");
        assert_eq!(bundle.get("orphan"), Some(""));
    }

    #[test]
    fn test_parse_trims_around_separator() {
        let bundle = parse("  key   =   value with spaces  ");
        // Leading value whitespace is dropped, trailing is kept.
        assert_eq!(bundle.get("key"), Some("value with spaces  "));
    }

    #[test]
    fn test_parse_line_continuation() {
        let bundle = parse("key=first \\\n    second");
        assert_eq!(bundle.get("key"), Some("first second"));
    }

    #[test]
    fn test_parse_double_backslash_is_not_continuation() {
        let bundle = parse("key=ends with backslash\\\\\nother=x");
        assert_eq!(bundle.get("key"), Some("ends with backslash\\"));
        assert_eq!(bundle.get("other"), Some("x"));
    }

    #[test]
    fn test_parse_escapes() {
        let bundle = parse("key=line one\\nline two\\tindented");
        assert_eq!(bundle.get("key"), Some("line one\nline two\tindented"));
    }

    #[test]
    fn test_parse_unicode_escape() {
        let bundle = parse("key=se\\u00f1or");
        assert_eq!(bundle.get("key"), Some("señor"));
    }

    #[test]
    fn test_parse_unknown_escape_drops_backslash() {
        let bundle = parse("key=\\q");
        assert_eq!(bundle.get("key"), Some("q"));
    }

    #[test]
    fn test_parse_bad_unicode_escape_is_error() {
        let result = MessageBundle::from_properties("r", "key=\\uZZZZ", Locale::new("en", "", ""));
        assert!(matches!(
            result,
            Err(I18nError::MalformedResource { .. })
        ));
    }

    // ==================== Bundle Tests ====================

    #[test]
    fn test_fabricated_flag() {
        let mut entries = BTreeMap::new();
        entries.insert("key".to_string(), "text".to_string());
        let bundle = MessageBundle::fabricated(entries, Locale::new("es", "", ""));
        assert!(bundle.is_fabricated());
        assert_eq!(bundle.locale().to_string(), "es");
        assert_eq!(bundle.get("key"), Some("text"));
    }

    #[test]
    fn test_file_backed_bundle_is_not_fabricated() {
        let bundle = parse("key=value");
        assert!(!bundle.is_fabricated());
    }

    #[test]
    fn test_keys_are_sorted() {
        let bundle = parse("zebra=1\napple=2\nmango=3");
        let keys: Vec<&str> = bundle.keys().collect();
        assert_eq!(keys, vec!["apple", "mango", "zebra"]);
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(BundleKind::Property.to_string(), "property");
        assert_eq!(BundleKind::None.to_string(), "none");
        assert_eq!(BundleKind::Xliff.to_string(), "xliff");
    }
}
