//! URL slugs for categories, products, stores, events and franchise plans.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Slug`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SlugError {
    #[error("slug cannot be empty")]
    Empty,
    #[error("slug must be at most {max} characters")]
    TooLong { max: usize },
    #[error("slug cannot contain whitespace or '/'")]
    InvalidCharacter,
}

/// A path segment identifying a record in public URLs (`/events/{slug}`).
///
/// Admins type slugs by hand, so only the characters that would break a URL
/// path segment are rejected. Uniqueness is enforced by the database.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    pub const MAX_LENGTH: usize = 200;

    /// Parse a slug, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`SlugError`] if the trimmed input is empty, too long, or
    /// contains whitespace or a `/`.
    pub fn parse(s: &str) -> Result<Self, SlugError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(SlugError::Empty);
        }
        if s.chars().count() > Self::MAX_LENGTH {
            return Err(SlugError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if s.chars().any(|c| c.is_whitespace() || c == '/') {
            return Err(SlugError::InvalidCharacter);
        }
        Ok(Self(s.to_owned()))
    }

    /// Derive a slug from a display name.
    ///
    /// # Errors
    ///
    /// Returns [`SlugError::Empty`] when the name has no letters, digits or
    /// CJK ideographs to keep.
    pub fn from_name(name: &str) -> Result<Self, SlugError> {
        Self::parse(&slugify(name))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Slug {
    type Error = SlugError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Slug> for String {
    fn from(slug: Slug) -> Self {
        slug.0
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

const fn is_cjk_ideograph(c: char) -> bool {
    matches!(c, '\u{4e00}'..='\u{9fa5}')
}

/// Lowercase `name` and collapse every run of characters other than ASCII
/// letters, digits and CJK ideographs into a single `-`.
///
/// Leading and trailing dashes are removed.
///
/// ```
/// use teainn_core::slugify;
///
/// assert_eq!(slugify("Standard Plan"), "standard-plan");
/// assert_eq!(slugify("  旗艦店 Plan!! "), "旗艦店-plan");
/// ```
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() || is_cjk_ideograph(c) {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c);
        } else {
            pending_dash = true;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_ascii() {
        assert_eq!(slugify("Premium Franchise"), "premium-franchise");
        assert_eq!(slugify("Plan #2 (2024)"), "plan-2-2024");
    }

    #[test]
    fn test_slugify_keeps_cjk() {
        assert_eq!(slugify("標準加盟方案"), "標準加盟方案");
        assert_eq!(slugify("小型 店面"), "小型-店面");
    }

    #[test]
    fn test_slugify_trims_dashes() {
        assert_eq!(slugify("--hello--"), "hello");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_slugify_drops_other_scripts() {
        // Kana and full-width punctuation fall outside the kept ranges.
        assert_eq!(slugify("おちゃ tea"), "tea");
        assert_eq!(slugify("奶茶，紅茶"), "奶茶-紅茶");
    }

    #[test]
    fn test_parse_trims() {
        assert_eq!(
            Slug::parse("  pure-tea ").map(Slug::into_inner),
            Ok("pure-tea".to_owned())
        );
    }

    #[test]
    fn test_parse_rejects() {
        assert_eq!(Slug::parse("   "), Err(SlugError::Empty));
        assert_eq!(Slug::parse("a b"), Err(SlugError::InvalidCharacter));
        assert_eq!(Slug::parse("a/b"), Err(SlugError::InvalidCharacter));
        assert!(matches!(
            Slug::parse(&"x".repeat(201)),
            Err(SlugError::TooLong { .. })
        ));
    }

    #[test]
    fn test_from_name_empty() {
        assert_eq!(Slug::from_name("???"), Err(SlugError::Empty));
    }
}
