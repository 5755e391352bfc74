//! Line scanner.
//!
//! Spec files are processed one physical line at a time. The scanner
//! classifies each line into its indentation, leading keyword (the head),
//! first quoted text and its comment-free code, while carrying block comment
//! state from one line to the next.

/// Where a line sits relative to block comments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommentState {
    /// The line starts outside any block comment. It may open one.
    #[default]
    None,
    /// The line starts inside a block comment and does not close it.
    Inside,
    /// The line starts inside a block comment and closes it.
    JustClosed,
}

/// One physical line, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedLine {
    /// Count of leading spaces and tabs.
    pub indent: usize,
    /// First token of the code, cut at a quote, a parenthesis or whitespace.
    pub head: String,
    /// First double-quoted run of the code, escapes kept verbatim.
    pub text: Option<String>,
    /// The line with trailing whitespace removed.
    pub raw: String,
    /// The line with comments removed, trimmed on both ends.
    pub code: String,
    pub comment: CommentState,
}

impl ClassifiedLine {
    /// Lines wholly inside a block comment are never shown to the builder.
    pub fn is_hidden(&self) -> bool {
        self.comment == CommentState::Inside
    }

    /// Blank or comment-only lines.
    pub fn is_blank(&self) -> bool {
        self.code.is_empty()
    }

    /// The first `{` after the head outside strings, and what follows it on
    /// this line up to its matching `}` when there is one.
    pub fn body_on_line(&self) -> Option<InlineBody<'_>> {
        let code = &self.code[self.head.len()..];
        let open = find_unquoted(code, '{')?;
        let rest = &code[open + 1..];

        let mut depth = 1i32;
        let mut quote: Option<char> = None;
        let mut escaped = false;
        for (i, c) in rest.char_indices() {
            if let Some(q) = quote {
                match c {
                    _ if escaped => escaped = false,
                    '\\' => escaped = true,
                    _ if c == q => quote = None,
                    _ => {}
                }
                continue;
            }
            match c {
                '"' | '\'' => quote = Some(c),
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(InlineBody {
                            content: rest[..i].trim(),
                            closed: true,
                        });
                    }
                }
                _ => {}
            }
        }
        Some(InlineBody {
            content: rest.trim(),
            closed: false,
        })
    }

    /// The words of the code between the head and the first `{`.
    pub fn words_after_head(&self) -> Vec<&str> {
        let code = &self.code[self.head.len()..];
        let end = find_unquoted(code, '{').unwrap_or(code.len());
        code[..end].split_whitespace().collect()
    }
}

/// Code following the `{` of a DSL line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InlineBody<'a> {
    pub content: &'a str,
    /// The matching `}` is on the same line.
    pub closed: bool,
}

/// Stateful scanner: feed it the lines of one file in order.
#[derive(Debug, Default)]
pub struct Scanner {
    in_comment: bool,
}

impl Scanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn classify(&mut self, line: &str) -> ClassifiedLine {
        let started_inside = self.in_comment;
        let mut closed = false;
        let code = self.strip_comments(line, &mut closed);
        let code = code.trim().to_string();

        let comment = match (started_inside, closed) {
            (false, _) => CommentState::None,
            (true, true) => CommentState::JustClosed,
            (true, false) => CommentState::Inside,
        };

        ClassifiedLine {
            indent: line
                .chars()
                .take_while(|c| *c == ' ' || *c == '\t')
                .count(),
            head: extract_head(&code).to_string(),
            text: extract_text(&code),
            raw: line.trim_end().to_string(),
            code,
            comment,
        }
    }

    fn strip_comments(&mut self, line: &str, closed: &mut bool) -> String {
        let chars: Vec<char> = line.chars().collect();
        let mut out = String::with_capacity(line.len());
        let mut quote: Option<char> = None;
        let mut pos = 0usize;

        while pos < chars.len() {
            let c = chars[pos];
            let next = chars.get(pos + 1).copied();

            if self.in_comment {
                if c == '*' && next == Some('/') {
                    self.in_comment = false;
                    *closed = true;
                    out.push(' ');
                    pos += 2;
                } else {
                    pos += 1;
                }
                continue;
            }

            if let Some(q) = quote {
                out.push(c);
                if c == '\\' {
                    if let Some(n) = next {
                        out.push(n);
                        pos += 1;
                    }
                } else if c == q {
                    quote = None;
                }
                pos += 1;
                continue;
            }

            match (c, next) {
                ('/', Some('*')) => {
                    self.in_comment = true;
                    pos += 2;
                }
                ('/', Some('/')) => break,
                ('"', _) | ('\'', _) => {
                    quote = Some(c);
                    out.push(c);
                    pos += 1;
                }
                _ => {
                    out.push(c);
                    pos += 1;
                }
            }
        }
        out
    }
}

/// Classify every line of a source text.
pub fn scan(source: &str) -> Vec<ClassifiedLine> {
    let mut scanner = Scanner::new();
    source.lines().map(|l| scanner.classify(l)).collect()
}

fn extract_head(code: &str) -> &str {
    let end = code
        .find(|c: char| c == '"' || c == '(' || c == ')' || c.is_whitespace())
        .unwrap_or(code.len());
    &code[..end]
}

fn find_unquoted(code: &str, target: char) -> Option<usize> {
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (i, c) in code.char_indices() {
        if let Some(q) = quote {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                _ if c == q => quote = None,
                _ => {}
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            _ if c == target => return Some(i),
            _ => {}
        }
    }
    None
}

fn extract_text(code: &str) -> Option<String> {
    let start = code.find('"')? + 1;
    let mut escaped = false;
    for (i, c) in code[start..].char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => return Some(code[start..start + i].trim_end().to_string()),
            _ => {}
        }
    }
    None
}

/// Split code into `;`-terminated statements at parenthesis and brace depth
/// zero. A trailing statement without `;` is kept.
pub fn split_statements(code: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0usize;
    for (i, c) in code.char_indices() {
        if let Some(q) = quote {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                _ if c == q => quote = None,
                _ => {}
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' | '{' => depth += 1,
            ')' | '}' => depth -= 1,
            ';' if depth <= 0 => {
                out.push(code[start..=i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    let tail = code[start..].trim();
    if !tail.is_empty() {
        out.push(tail);
    }
    out.retain(|s| !s.is_empty());
    out
}

/// True once `statement` ends with a `;` outside strings and with every
/// parenthesis closed.
pub fn statement_complete(statement: &str) -> bool {
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for c in statement.chars() {
        if let Some(q) = quote {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                _ if c == q => quote = None,
                _ => {}
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' => depth += 1,
            ')' => depth -= 1,
            _ => {}
        }
    }
    quote.is_none() && depth <= 0 && statement.trim_end().ends_with(';')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_dsl_line() {
        let line = Scanner::new().classify("  describe \"a stack\" {   ");
        assert_eq!(line.indent, 2);
        assert_eq!(line.head, "describe");
        assert_eq!(line.text.as_deref(), Some("a stack"));
        assert_eq!(line.raw, "  describe \"a stack\" {");
        assert!(line.body_on_line().is_some());
        assert_eq!(line.comment, CommentState::None);
    }

    #[test]
    fn words_after_head_drop_the_brace() {
        let line = Scanner::new().classify("  before each offline {");
        assert_eq!(line.words_after_head(), vec!["each", "offline"]);
        let line = Scanner::new().classify("after all{");
        assert_eq!(line.words_after_head(), vec!["all"]);
    }

    #[test]
    fn one_line_body_is_found() {
        let line = Scanner::new().classify(r#"  it "x {y}" { ensure(f("}") i== 2); }"#);
        assert_eq!(
            line.body_on_line(),
            Some(InlineBody {
                content: r#"ensure(f("}") i== 2);"#,
                closed: true,
            })
        );
        let line = Scanner::new().classify("it \"empty\" {}");
        assert_eq!(line.body_on_line().map(|b| b.content), Some(""));
        let line = Scanner::new().classify("it \"open\" { int a;");
        assert!(!line.body_on_line().unwrap().closed);
        assert!(Scanner::new().classify("it \"later\"").body_on_line().is_none());
    }

    #[test]
    fn hook_words_stop_at_brace() {
        let line = Scanner::new().classify("before each {}");
        assert_eq!(line.words_after_head(), vec!["each"]);
    }

    #[test]
    fn statements_split_at_top_level_semicolons() {
        assert_eq!(
            split_statements(r#"int a = f(1; 2); ensure(s === ";");  x()"#),
            vec!["int a = f(1; 2);", r#"ensure(s === ";");"#, "x()"]
        );
        assert!(split_statements("  ").is_empty());
    }

    #[test]
    fn head_stops_at_parenthesis() {
        let line = Scanner::new().classify("\tensure(1 == 1);");
        assert_eq!(line.indent, 1);
        assert_eq!(line.head, "ensure");
        assert_eq!(line.text, None);
    }

    #[test]
    fn text_keeps_escapes() {
        let line = Scanner::new().classify(r#"it "says \"hi\"" {"#);
        assert_eq!(line.text.as_deref(), Some(r#"says \"hi\""#));
    }

    #[test]
    fn trailing_line_comment_is_not_code() {
        let line = Scanner::new().classify("it \"x\" // not { a body");
        assert_eq!(line.code, "it \"x\"");
        assert!(line.body_on_line().is_none());
    }

    #[test]
    fn comment_markers_inside_strings_are_kept() {
        let line = Scanner::new().classify(r#"ensure(s === "http://x/*y");"#);
        assert_eq!(line.code, r#"ensure(s === "http://x/*y");"#);
    }

    #[test]
    fn block_comment_state_spans_lines() {
        let lines = scan("int a; /* start\n  it \"hidden\"\nend */ int b;\nint c;");
        assert_eq!(lines[0].comment, CommentState::None);
        assert_eq!(lines[0].code, "int a;");
        assert_eq!(lines[1].comment, CommentState::Inside);
        assert!(lines[1].is_hidden());
        assert_eq!(lines[2].comment, CommentState::JustClosed);
        assert_eq!(lines[2].code, "int b;");
        assert_eq!(lines[3].comment, CommentState::None);
    }

    #[test]
    fn statement_completion_tracks_parentheses() {
        assert!(!statement_complete("ensure(strcmp(a,"));
        assert!(!statement_complete("ensure(f(\"x;\")"));
        assert!(statement_complete("ensure(f(\"x;\"));"));
        assert!(statement_complete("ensure(a === \"(\");"));
    }
}
