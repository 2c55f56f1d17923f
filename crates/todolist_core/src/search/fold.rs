//! Name folding for case- and diacritic-insensitive matching.
//!
//! # Responsibility
//! - Map display names to a comparison key (`fold_name`).
//! - Expose the same key as a deterministic SQLite scalar function so the
//!   search predicate and name ordering run inside the store.
//!
//! # Invariants
//! - `fold_name` is pure: the same input always yields the same key.
//! - Folding never panics on arbitrary UTF-8 input.

use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// SQL name of the registered folding function.
pub const FOLD_NAME_SQL_FN: &str = "fold_name";

/// Returns the comparison key for `value`.
///
/// The key is the NFD decomposition with combining marks removed, lowercased.
/// `"Café"` and `"CAFE"` fold to the same key.
pub fn fold_name(value: &str) -> String {
    value
        .nfd()
        .filter(|ch| !is_combining_mark(*ch))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Returns the folded needle for a search, or `None` for blank input.
///
/// Non-blank input keeps its surrounding whitespace, so `"ema "` only
/// matches names where `ema` ends a word.
pub fn fold_needle(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        return None;
    }
    Some(fold_name(value))
}

/// Returns whether `haystack` contains `needle` after folding both sides.
pub fn folded_contains(haystack: &str, needle: &str) -> bool {
    fold_name(haystack).contains(&fold_name(needle))
}

/// Registers `fold_name(text)` on one connection.
pub fn register_fold_function(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        FOLD_NAME_SQL_FN,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let value = ctx.get::<Option<String>>(0)?;
            Ok(value.map(|text| fold_name(&text)))
        },
    )
}

#[cfg(test)]
mod tests {
    use super::{fold_name, fold_needle, folded_contains, register_fold_function};
    use rusqlite::Connection;

    #[test]
    fn fold_strips_case_and_diacritics() {
        assert_eq!(fold_name("Café"), "cafe");
        assert_eq!(fold_name("ÉMAIL"), "email");
        assert_eq!(fold_name("Straße"), "straße");
    }

    #[test]
    fn blank_needle_is_none() {
        assert_eq!(fold_needle(""), None);
        assert_eq!(fold_needle("   "), None);
        assert_eq!(fold_needle("Éma").as_deref(), Some("ema"));
        assert_eq!(fold_needle(" Éma ").as_deref(), Some(" ema "));
    }

    #[test]
    fn folded_contains_matches_substrings() {
        assert!(folded_contains("Crème brûlée", "BRULE"));
        assert!(!folded_contains("Report", "ema"));
    }

    #[test]
    fn sql_function_matches_rust_folding() {
        let conn = Connection::open_in_memory().unwrap();
        register_fold_function(&conn).unwrap();
        let folded: String = conn
            .query_row("SELECT fold_name('Naïve Ångström');", [], |row| row.get(0))
            .unwrap();
        assert_eq!(folded, fold_name("Naïve Ångström"));
        let null_value: Option<String> = conn
            .query_row("SELECT fold_name(NULL);", [], |row| row.get(0))
            .unwrap();
        assert_eq!(null_value, None);
    }
}
