//! Locale value type and candidate name expansion.
//!
//! A [`Locale`] is a language/country/variant triple. Candidate expansion
//! turns a bundle base name plus a locale into the ordered list of resource
//! names to probe when loading, most specific first, so `Messages_en_US`
//! is tried before `Messages_en` before `Messages`.

use std::fmt;
use std::str::FromStr;

use crate::error::I18nError;

/// A language/country/variant triple identifying a translation audience.
///
/// Components are normalized on construction: the language code is
/// lowercased and the country code is uppercased, so `("en", "us")` and
/// `("EN", "US")` compare equal and both render as `en_US`. The variant is
/// kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Locale {
    language: String,
    country: String,
    variant: String,
}

impl Locale {
    /// Create a locale from its components. Empty strings stand for absent
    /// components.
    pub fn new(language: &str, country: &str, variant: &str) -> Locale {
        Locale {
            language: language.to_lowercase(),
            country: country.to_uppercase(),
            variant: variant.to_string(),
        }
    }

    /// Parse an underscore-separated tag such as `en`, `en_US` or
    /// `en_US_POSIX`. Segments past the third are ignored.
    ///
    /// # Returns
    /// * `Ok(Locale)` with normalized components
    /// * `Err` if the tag is empty or whitespace
    pub fn parse(tag: &str) -> Result<Locale, I18nError> {
        if tag.trim().is_empty() {
            return Err(I18nError::InvalidArgument(
                "locale tag must not be empty".to_string(),
            ));
        }
        let mut parts = tag.split('_');
        let language = parts.next().unwrap_or("");
        let country = parts.next().unwrap_or("");
        let variant = parts.next().unwrap_or("");
        Ok(Locale::new(language, country, variant))
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn variant(&self) -> &str {
        &self.variant
    }

    /// True when all three components are empty. Such a locale cannot be
    /// expanded into candidate names.
    pub fn is_empty(&self) -> bool {
        self.language.is_empty() && self.country.is_empty() && self.variant.is_empty()
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let has_language = !self.language.is_empty();
        let has_country = !self.country.is_empty();
        let has_variant = !self.variant.is_empty();

        f.write_str(&self.language)?;
        if has_country || (has_language && has_variant) {
            write!(f, "_{}", self.country)?;
        }
        if has_variant && (has_language || has_country) {
            write!(f, "_{}", self.variant)?;
        }
        Ok(())
    }
}

impl FromStr for Locale {
    type Err = I18nError;

    fn from_str(tag: &str) -> Result<Locale, I18nError> {
        Locale::parse(tag)
    }
}

/// Expand a bundle base name into the ordered candidate resource names for
/// a locale, most specific first.
///
/// Each non-empty locale component appends `_component` to the running stem
/// and contributes one candidate, then the list is reversed so the fully
/// qualified name comes first and the bare base name last. The suffix (for
/// example `.properties`) is appended to every candidate and may be empty.
///
/// For base name `app.Messages`, locale `en_US_POSIX` and suffix
/// `.properties`:
///
/// 1. `app.Messages_en_US_POSIX.properties`
/// 2. `app.Messages_en_US.properties`
/// 3. `app.Messages_en.properties`
/// 4. `app.Messages.properties`
///
/// # Returns
/// * `Ok(Vec<String>)` with `1 + count of non-empty components` entries
/// * `Err` if the base name is empty or every locale component is empty
pub fn expand(name: &str, locale: &Locale, suffix: &str) -> Result<Vec<String>, I18nError> {
    if name.is_empty() {
        return Err(I18nError::InvalidArgument(
            "bundle base name must not be empty".to_string(),
        ));
    }
    if locale.is_empty() {
        return Err(I18nError::InvalidArgument(
            "locale must have at least one non-empty component".to_string(),
        ));
    }

    let mut candidates = Vec::with_capacity(4);
    let mut stem = String::from(name);
    candidates.push(format!("{}{}", stem, suffix));

    if !locale.language.is_empty() {
        stem.push('_');
        stem.push_str(&locale.language);
        candidates.push(format!("{}{}", stem, suffix));
    }
    if !locale.country.is_empty() {
        stem.push('_');
        stem.push_str(&locale.country);
        candidates.push(format!("{}{}", stem, suffix));
    }
    if !locale.variant.is_empty() {
        stem.push('_');
        stem.push_str(&locale.variant);
        candidates.push(format!("{}{}", stem, suffix));
    }

    candidates.reverse();
    Ok(candidates)
}

/// The locale each candidate from [`expand`] corresponds to, in the same
/// order: the full locale for the most specific name down to the empty
/// locale for the bare base name. Used to tag a loaded bundle with the
/// locale of the candidate that actually matched.
pub(crate) fn truncations(locale: &Locale) -> Vec<Locale> {
    let mut locales = Vec::with_capacity(4);
    let mut current = Locale::default();
    locales.push(current.clone());

    if !locale.language.is_empty() {
        current.language = locale.language.clone();
        locales.push(current.clone());
    }
    if !locale.country.is_empty() {
        current.country = locale.country.clone();
        locales.push(current.clone());
    }
    if !locale.variant.is_empty() {
        current.variant = locale.variant.clone();
        locales.push(current.clone());
    }

    locales.reverse();
    locales
}
