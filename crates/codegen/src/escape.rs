//! C literal helpers.

/// Quote `s` as a C string literal, escaping what C requires.
pub fn c_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\{:03o}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Quote DSL description text. The text was lifted from a C string literal
/// with its escapes intact, so it is wrapped as is.
pub fn c_text(text: Option<&str>) -> String {
    match text {
        Some(t) => format!("\"{}\"", t),
        None => "NULL".to_string(),
    }
}

/// Make `s` safe to place inside a `/* */` comment.
pub fn c_comment(s: &str) -> String {
    s.replace("*/", "* /").replace("/*", "/ *")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_quotes_and_backslashes() {
        assert_eq!(c_string(r#"a"b\c"#), r#""a\"b\\c""#);
        assert_eq!(c_string("x\ty\n"), r#""x\ty\n""#);
        assert_eq!(c_string("\u{1}"), r#""\001""#);
    }

    #[test]
    fn description_text_keeps_its_escapes() {
        assert_eq!(c_text(Some(r#"flips \"burgers\""#)), r#""flips \"burgers\"""#);
        assert_eq!(c_text(None), "NULL");
    }

    #[test]
    fn comments_cannot_be_closed_early() {
        assert_eq!(c_comment("a */ b /* c"), "a * / b / * c");
    }
}
