//! Escaping text for string and template literals.

use crate::config::QuoteStyle;

/// Returns `text` as a quoted string literal using `quote`.
///
/// Escapes the backslash, the chosen quote, line terminators and other
/// control characters. The other quote character is left alone.
#[must_use]
pub fn escape_string(text: &str, quote: QuoteStyle) -> String {
    let delimiter = quote.as_char();
    let mut escaped = String::with_capacity(text.len().saturating_add(2));
    escaped.push(delimiter);
    for character in text.chars() {
        match character {
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            '\u{8}' => escaped.push_str("\\b"),
            '\u{c}' => escaped.push_str("\\f"),
            '\u{b}' => escaped.push_str("\\v"),
            '\u{2028}' => escaped.push_str("\\u2028"),
            '\u{2029}' => escaped.push_str("\\u2029"),
            quote_char if quote_char == delimiter => {
                escaped.push('\\');
                escaped.push(quote_char);
            }
            control if control.is_ascii_control() => {
                escaped.push_str(&format!("\\x{:02x}", u32::from(control)));
            }
            other => escaped.push(other),
        }
    }
    escaped.push(delimiter);
    escaped
}

/// Escapes raw template text so it can sit between backticks.
///
/// Backticks and `${` that are not already escaped gain a backslash.
/// Existing escapes are kept as written.
#[must_use]
pub fn escape_template_element_raw(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    // Set while an odd run of backslashes precedes the current character.
    let mut pending_escape = false;
    let mut characters = raw.chars().peekable();
    while let Some(character) = characters.next() {
        let needs_escape = !pending_escape
            && (character == '`' || (character == '$' && characters.peek() == Some(&'{')));
        if needs_escape {
            escaped.push('\\');
        }
        escaped.push(character);
        pending_escape = character == '\\' && !pending_escape;
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("plain", QuoteStyle::Single, "'plain'")]
    #[case("it's", QuoteStyle::Single, r"'it\'s'")]
    #[case("it's", QuoteStyle::Double, r#""it's""#)]
    #[case(r#"say "hi""#, QuoteStyle::Double, r#""say \"hi\"""#)]
    #[case("a\\b", QuoteStyle::Single, r"'a\\b'")]
    #[case("line\nbreak\r\t", QuoteStyle::Single, r"'line\nbreak\r\t'")]
    #[case("\u{8}\u{b}\u{c}", QuoteStyle::Single, r"'\b\v\f'")]
    #[case("\u{0}\u{1b}", QuoteStyle::Single, r"'\x00\x1b'")]
    #[case("\u{2028}\u{2029}", QuoteStyle::Double, r#""\u2028\u2029""#)]
    #[case("héllo", QuoteStyle::Single, "'héllo'")]
    fn escapes_strings(#[case] text: &str, #[case] quote: QuoteStyle, #[case] expected: &str) {
        assert_eq!(escape_string(text, quote), expected);
    }

    #[rstest]
    #[case("plain", "plain")]
    #[case("a`b", r"a\`b")]
    #[case(r"a\`b", r"a\`b")]
    #[case(r"a\\`b", r"a\\\`b")]
    #[case("${x}", r"\${x}")]
    #[case(r"\${x}", r"\${x}")]
    #[case("$x {", "$x {")]
    #[case("cost: $", "cost: $")]
    fn escapes_template_raw(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(escape_template_element_raw(raw), expected);
    }
}
