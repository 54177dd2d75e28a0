//! Family-name extraction from person labels
//!
//! Picks the most likely last name from a label by scanning its tokens from
//! the end, skipping numbers, Roman numerals (regnal numbers) and well-known
//! suffixes, then prepending Dutch/German name particles.

use regex::Regex;
use std::sync::LazyLock;

/// Suffixes that never qualify as a last name
const SUFFIXES: &[&str] = &["jr", "sr", "z", "zn", "fils"];

/// Particles that belong to a compound surname (`van der Berg`)
const PARTICLES: &[&str] = &["van", "de", "der", "het", "von"];

/// Roman numerals in regular form
static ROMAN_NUMERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^M{0,4}(CM|CD|D?C{0,3})(XC|XL|L?X{0,3})(IX|IV|V?I{0,3})$")
        .expect("valid roman numeral regex")
});

/// Extract the probable last name from a label.
///
/// With `exclude_first_token` the first token is presumed to be a given name:
/// reaching it ends the scan without a match, and it is never taken as a
/// particle either.
///
/// ```
/// use dbpedia_indexer::last_name::get_last_part;
///
/// assert_eq!(get_last_part("Louis XIV", false).as_deref(), Some("Louis"));
/// assert_eq!(get_last_part("Louis XIV", true), None);
/// assert_eq!(
///     get_last_part("Johan Van Der Berg", true).as_deref(),
///     Some("Van Der Berg")
/// );
/// ```
pub fn get_last_part(label: &str, exclude_first_token: bool) -> Option<String> {
    let tokens: Vec<&str> = label.split_whitespace().collect();

    let mut found = None;
    for (idx, token) in tokens.iter().enumerate().rev() {
        if exclude_first_token && idx == 0 {
            break;
        }
        if is_skippable(token) {
            continue;
        }
        found = Some(idx);
        break;
    }
    let idx = found?;

    let lowest = usize::from(exclude_first_token);
    let mut start = idx;
    while start > lowest && is_particle(tokens[start - 1]) {
        start -= 1;
    }

    Some(tokens[start..=idx].join(" "))
}

fn is_skippable(token: &str) -> bool {
    if token.chars().all(|c| c.is_ascii_digit()) {
        return true;
    }
    let lower = token.to_lowercase();
    SUFFIXES.contains(&lower.as_str()) || ROMAN_NUMERAL.is_match(token)
}

fn is_particle(token: &str) -> bool {
    PARTICLES.contains(&token.to_lowercase().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_last_name() {
        assert_eq!(get_last_part("ada lovelace", true).as_deref(), Some("lovelace"));
        assert_eq!(get_last_part("ada lovelace", false).as_deref(), Some("lovelace"));
    }

    #[test]
    fn test_skips_numbers_suffixes_and_numerals() {
        assert_eq!(
            get_last_part("martin luther king jr", true).as_deref(),
            Some("king")
        );
        assert_eq!(get_last_part("willem 2", false).as_deref(), Some("willem"));
        assert_eq!(
            get_last_part("jan pieterszoon coen zn", true).as_deref(),
            Some("coen")
        );
        assert_eq!(get_last_part("Louis XIV", false).as_deref(), Some("Louis"));
        assert_eq!(get_last_part("henry viii", false).as_deref(), Some("henry"));
    }

    #[test]
    fn test_first_token_excluded() {
        assert_eq!(get_last_part("Louis XIV", true), None);
        assert_eq!(get_last_part("Madonna", true), None);
        assert_eq!(get_last_part("Madonna", false).as_deref(), Some("Madonna"));
    }

    #[test]
    fn test_particles_prepended() {
        assert_eq!(
            get_last_part("Johan Van Der Berg", true).as_deref(),
            Some("Van Der Berg")
        );
        assert_eq!(
            get_last_part("ludwig van beethoven", true).as_deref(),
            Some("van beethoven")
        );
        assert_eq!(
            get_last_part("pieter de hooch ii", true).as_deref(),
            Some("de hooch")
        );
    }

    #[test]
    fn test_first_token_never_taken_as_particle() {
        assert_eq!(get_last_part("van gogh", true).as_deref(), Some("gogh"));
        assert_eq!(get_last_part("van gogh", false).as_deref(), Some("van gogh"));
    }

    #[test]
    fn test_empty_label() {
        assert_eq!(get_last_part("", false), None);
        assert_eq!(get_last_part("1990 2000", false), None);
    }
}
