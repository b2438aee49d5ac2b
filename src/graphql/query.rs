//! Query text rewriting

use regex::Regex;
use std::sync::LazyLock;

static LINE_BREAKS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t\r]*\n\s*").unwrap());

static CURSOR_ARGUMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r",\s*after:\s*\$cursor\b|after:\s*\$cursor\b\s*,?\s*").unwrap()
});

static CURSOR_DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r",\s*\$cursor:\s*String!?|\$cursor:\s*String!?\s*,?\s*").unwrap()
});

static CURSOR_ONLY_LIST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(\s*(?:after:\s*\$cursor\b|\$cursor:\s*String!?)\s*\)").unwrap()
});

/// Collapse line breaks and the indentation around them into single spaces.
///
/// `"a\n  b\n  c"` becomes `"a b c"`.
pub fn sanitize_query(query: &str) -> String {
    LINE_BREAKS.replace_all(query, " ").trim().to_string()
}

/// Remove the `after: $cursor` argument and the `$cursor: String!`
/// declaration so a first-page query is valid without a cursor value.
///
/// A list holding nothing but the cursor fragment is dropped with its
/// parentheses; every other `()` in the query is left alone.
pub fn strip_cursor(query: &str) -> String {
    let query = CURSOR_ONLY_LIST.replace_all(query, "");
    let query = CURSOR_ARGUMENT.replace_all(&query, "");
    CURSOR_DECLARATION.replace_all(&query, "").into_owned()
}

/// Sanitize a query and strip the cursor fragments when no cursor is set
pub fn prepare_query(query: &str, has_cursor: bool) -> String {
    let query = sanitize_query(query);
    if has_cursor {
        query
    } else {
        strip_cursor(&query)
    }
}
