//! Resource identifier handling
//!
//! Decodes DBpedia resource URIs into readable strings and classifies them by
//! language edition.

use serde::{Deserialize, Serialize};

const RESOURCE_SEGMENT: &str = "/resource/";

/// Decode a resource identifier into a readable string.
///
/// The path after `/resource/` is percent-decoded and underscores become
/// spaces. A trailing parenthesized qualifier (`Name_(qualifier)`) is
/// stripped, or returned on its own when `want_qualifier` is set. With
/// `want_qualifier` and no qualifier present the result is `None`.
///
/// ```
/// use dbpedia_indexer::uri::uri_to_string;
///
/// let uri = "http://dbpedia.org/resource/Mercury_(planet)";
/// assert_eq!(uri_to_string(uri, false).as_deref(), Some("Mercury"));
/// assert_eq!(uri_to_string(uri, true).as_deref(), Some("planet"));
/// assert_eq!(uri_to_string("http://dbpedia.org/resource/Venus", true), None);
/// ```
pub fn uri_to_string(uri: &str, want_qualifier: bool) -> Option<String> {
    let decoded = percent_decode(uri);
    let segment = match decoded.rfind(RESOURCE_SEGMENT) {
        Some(pos) => &decoded[pos + RESOURCE_SEGMENT.len()..],
        None => decoded.rsplit('/').next().unwrap_or_default(),
    };
    let text = collapse(&segment.replace('_', " "));

    match split_qualifier(&text) {
        Some((_, qualifier)) if want_qualifier => Some(collapse(qualifier)),
        Some((base, _)) => Some(collapse(base)),
        None if want_qualifier => None,
        None => Some(text),
    }
}

/// Whether the identifier ends in a `_(qualifier)` suffix
pub fn has_qualifier(uri: &str) -> bool {
    uri_to_string(uri, true).is_some()
}

/// Remove a trailing ` (qualifier)` from a label
pub fn strip_qualifier(label: &str) -> &str {
    match split_qualifier(label.trim_end()) {
        Some((base, _)) => base,
        None => label,
    }
}

/// Split `"Base (qualifier)"` into its parts. The qualifier must be the
/// final parenthesized group and be preceded by a space.
fn split_qualifier(text: &str) -> Option<(&str, &str)> {
    let inner_end = text.strip_suffix(')')?;
    let open = inner_end.rfind(" (")?;
    let qualifier = &inner_end[open + 2..];
    if qualifier.trim().is_empty() {
        return None;
    }
    Some((text[..open].trim_end(), qualifier))
}

fn percent_decode(uri: &str) -> String {
    match urlencoding::decode(uri) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => {
            String::from_utf8_lossy(&urlencoding::decode_binary(uri.as_bytes())).into_owned()
        }
    }
}

fn collapse(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// One DBpedia language edition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageEdition {
    /// Two-letter language code written to the `lang` field
    pub lang: String,
    /// Prefix shared by every resource of the edition
    pub resource_prefix: String,
    /// Namespace label of category pages (e.g. `Category:`)
    pub category_prefix: String,
    /// Qualifier marking disambiguation pages
    #[serde(default = "default_disambiguation_marker")]
    pub disambiguation_marker: String,
}

fn default_disambiguation_marker() -> String {
    "(disambiguation)".to_string()
}

impl LanguageEdition {
    pub fn english() -> Self {
        Self {
            lang: "en".to_string(),
            resource_prefix: "http://dbpedia.org/resource/".to_string(),
            category_prefix: "Category:".to_string(),
            disambiguation_marker: default_disambiguation_marker(),
        }
    }

    pub fn dutch() -> Self {
        Self {
            lang: "nl".to_string(),
            resource_prefix: "http://nl.dbpedia.org/resource/".to_string(),
            category_prefix: "Categorie:".to_string(),
            disambiguation_marker: "(doorverwijspagina)".to_string(),
        }
    }

    /// Whether the identifier is a resource of this edition
    pub fn contains(&self, uri: &str) -> bool {
        uri.starts_with(&self.resource_prefix)
    }

    /// The readable category name when `uri` is a category page of this
    /// edition, without the namespace label.
    pub fn category_name(&self, uri: &str) -> Option<String> {
        let rest = uri.strip_prefix(&self.resource_prefix)?;
        let decoded = percent_decode(rest);
        let name = decoded.strip_prefix(&self.category_prefix)?;
        Some(collapse(&name.replace('_', " ")))
    }
}

/// Which of the two configured editions an identifier belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditionRole {
    Primary,
    Secondary,
}

/// The pair of editions being cross-linked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Editions {
    pub primary: LanguageEdition,
    pub secondary: LanguageEdition,
}

impl Default for Editions {
    fn default() -> Self {
        Self {
            primary: LanguageEdition::english(),
            secondary: LanguageEdition::dutch(),
        }
    }
}

impl Editions {
    pub fn role_of(&self, uri: &str) -> Option<EditionRole> {
        if self.primary.contains(uri) {
            Some(EditionRole::Primary)
        } else if self.secondary.contains(uri) {
            Some(EditionRole::Secondary)
        } else {
            None
        }
    }

    pub fn get(&self, role: EditionRole) -> &LanguageEdition {
        match role {
            EditionRole::Primary => &self.primary,
            EditionRole::Secondary => &self.secondary,
        }
    }

    /// Language code for the `lang` field: the primary code when the
    /// identifier matches the primary prefix, the secondary code otherwise.
    pub fn lang_of(&self, uri: &str) -> &str {
        match self.role_of(uri) {
            Some(EditionRole::Primary) => &self.primary.lang,
            _ => &self.secondary.lang,
        }
    }
}
