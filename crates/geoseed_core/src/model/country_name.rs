//! Country name normalization between display and dataset identifier forms.
//!
//! # Responsibility
//! - Map a human-readable country name ("Costa Rica") to the compact
//!   identifier that keys its dataset ("CostaRica"), and back.
//! - Patch names the automatic transform cannot recover through a fixed
//!   exception table.
//!
//! # Invariants
//! - Exception entries round-trip exactly in both directions.
//! - Outside the exception table, identifier -> display splits words at
//!   uppercase boundaries and display -> identifier removes spaces.
//! - The exception table is immutable after first use.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

/// Identifier -> display pairs that do not follow plain CamelCase.
const NAME_EXCEPTIONS: &[(&str, &str)] = &[("AntiguaandBarbuda", "Antigua and Barbuda")];

static EXCEPTIONS_BY_IDENTIFIER: Lazy<BTreeMap<&'static str, &'static str>> =
    Lazy::new(|| NAME_EXCEPTIONS.iter().copied().collect());
static EXCEPTIONS_BY_DISPLAY: Lazy<BTreeMap<&'static str, &'static str>> = Lazy::new(|| {
    NAME_EXCEPTIONS
        .iter()
        .map(|(identifier, display)| (*display, *identifier))
        .collect()
});

// A leading lowercase run counts as a word; every other word starts uppercase.
static CAMEL_WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\p{Ll}+|\p{Lu}\p{Ll}*").expect("valid camel word regex"));

/// Converts a dataset identifier into its display name.
///
/// ```
/// use geoseed_core::identifier_to_display;
///
/// assert_eq!(identifier_to_display("CostaRica"), "Costa Rica");
/// assert_eq!(identifier_to_display("AntiguaandBarbuda"), "Antigua and Barbuda");
/// ```
pub fn identifier_to_display(identifier: &str) -> String {
    if let Some(display) = EXCEPTIONS_BY_IDENTIFIER.get(identifier) {
        return (*display).to_string();
    }

    CAMEL_WORD_RE
        .find_iter(identifier)
        .map(|word| word.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Converts a display name into the identifier that keys its dataset.
pub fn display_to_identifier(display: &str) -> String {
    if let Some(identifier) = EXCEPTIONS_BY_DISPLAY.get(display) {
        return (*identifier).to_string();
    }

    display.replace(' ', "")
}

/// Returns the identifier -> display exception pairs.
pub fn name_exceptions() -> &'static [(&'static str, &'static str)] {
    NAME_EXCEPTIONS
}

#[cfg(test)]
mod tests {
    use super::{display_to_identifier, identifier_to_display, name_exceptions};

    #[test]
    fn camel_case_identifiers_split_into_words() {
        assert_eq!(identifier_to_display("Mexico"), "Mexico");
        assert_eq!(identifier_to_display("CostaRica"), "Costa Rica");
        assert_eq!(
            identifier_to_display("CentralAfricanRepublic"),
            "Central African Republic"
        );
    }

    #[test]
    fn single_uppercase_letters_become_words() {
        assert_eq!(identifier_to_display("USA"), "U S A");
    }

    #[test]
    fn leading_lowercase_run_is_kept() {
        assert_eq!(identifier_to_display("eSwatini"), "e Swatini");
    }

    #[test]
    fn non_letters_are_dropped_from_display() {
        assert_eq!(identifier_to_display("Guinea-Bissau"), "Guinea Bissau");
    }

    #[test]
    fn exception_entries_round_trip() {
        for (identifier, display) in name_exceptions() {
            assert_eq!(identifier_to_display(identifier), *display);
            assert_eq!(display_to_identifier(display), *identifier);
        }
    }

    #[test]
    fn conjunctions_outside_the_exception_table_stay_lossy() {
        assert_eq!(
            identifier_to_display("BosniaandHerzegovina"),
            "Bosniaand Herzegovina"
        );
    }

    #[test]
    fn display_names_drop_spaces() {
        assert_eq!(display_to_identifier("Costa Rica"), "CostaRica");
        assert_eq!(display_to_identifier("Mexico"), "Mexico");
        assert_eq!(display_to_identifier(""), "");
    }
}
