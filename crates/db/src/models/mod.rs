pub mod consultant;
pub mod worker;

/// Trimmed, non-empty view of an optional filter value.
pub(crate) fn filter_value(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Wrap `value` for a `LIKE ... ESCAPE '\'` substring match.
pub(crate) fn like_pattern(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    escaped.push('%');
    for ch in value.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_value_drops_blank() {
        assert_eq!(filter_value(&None), None);
        assert_eq!(filter_value(&Some("   ".to_string())), None);
        assert_eq!(filter_value(&Some(" drilling ".to_string())), Some("drilling"));
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("rock"), "%rock%");
        assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }
}
