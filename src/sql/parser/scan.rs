//! Scanning helpers shared by the statement parsers.
//!
//! The dialect has no tokenizer: each statement is taken apart with a few
//! keyword searches and comma splits over the raw text.

/// Case-insensitive prefix test
pub fn starts_with_ci(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len() && s.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

/// Byte offset of the first case-insensitive occurrence of an ASCII needle
pub fn find_ci(haystack: &str, needle: &str) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|w| w.eq_ignore_ascii_case(needle.as_bytes()))
}

/// Splits on commas outside quotes, trims items and drops empty ones.
///
/// A quote only opens a quoted region as the first non-blank character of an
/// item or of the text after an `=`; elsewhere it is an ordinary character.
pub fn split_list(s: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut quote: Option<char> = None;
    let mut at_value_start = true;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') if at_value_start => quote = Some(c),
            (None, ',') => {
                items.push(&s[start..i]);
                start = i + 1;
                at_value_start = true;
                continue;
            }
            (None, '=') => {
                at_value_start = true;
                continue;
            }
            (None, c) if c.is_whitespace() => continue,
            _ => {}
        }
        at_value_start = false;
    }
    items.push(&s[start..]);
    items
        .into_iter()
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .collect()
}

/// Takes a leading identifier, ending at whitespace or `(`.
/// Returns the identifier and the rest with leading whitespace removed.
pub fn take_ident(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    let end = s
        .find(|c: char| c.is_whitespace() || c == '(')
        .unwrap_or(s.len());
    (&s[..end], s[end..].trim_start())
}

/// Strips one surrounding quote pair. A trailing quote is only removed
/// when the text also opened with one.
pub fn strip_quotes(s: &str) -> (&str, bool) {
    match s.chars().next() {
        Some(q @ ('\'' | '"')) => {
            let inner = &s[q.len_utf8()..];
            let inner = inner
                .strip_suffix('\'')
                .or_else(|| inner.strip_suffix('"'))
                .unwrap_or(inner);
            (inner, true)
        }
        _ => (s, false),
    }
}

#[cfg(test)]
mod tests {
    use super::{find_ci, split_list, starts_with_ci, strip_quotes, take_ident};

    #[test]
    fn test_keyword_search() {
        assert!(starts_with_ci("select * from t", "SELECT"));
        assert!(!starts_with_ci("sel", "SELECT"));
        assert_eq!(find_ci("a from t where x=1", "WHERE"), Some(9));
        assert_eq!(find_ci("nothing here", "WHERE"), None);
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list(" a , b,, c "), vec!["a", "b", "c"]);
        assert_eq!(split_list("1, 'x, y', \"z,\""), vec!["1", "'x, y'", "\"z,\""]);
        assert!(split_list("  ").is_empty());
        assert_eq!(split_list("O'Brien, 5"), vec!["O'Brien", "5"]);
        assert_eq!(split_list("name=it's, n=1"), vec!["name=it's", "n=1"]);
        assert_eq!(split_list("a = 'x, y', b=2"), vec!["a = 'x, y'", "b=2"]);
    }

    #[test]
    fn test_take_ident() {
        assert_eq!(take_ident("  users (id INT)"), ("users", "(id INT)"));
        assert_eq!(take_ident("t(a)"), ("t", "(a)"));
        assert_eq!(take_ident("t"), ("t", ""));
    }

    #[test]
    fn test_strip_quotes() {
        assert_eq!(strip_quotes("'abc'"), ("abc", true));
        assert_eq!(strip_quotes("\"abc\""), ("abc", true));
        assert_eq!(strip_quotes("'abc"), ("abc", true));
        assert_eq!(strip_quotes("abc'"), ("abc'", false));
    }
}
