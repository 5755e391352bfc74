//! Assertion translator.
//!
//! Turns the argument of an `ensure(...)`/`expect(...)` statement into a C
//! block that evaluates each operand once, records the outcome through the
//! runtime and jumps to the unit's cleanup label on failure.

pub mod operator;

pub use operator::{NumericType, Operator, StringMatch};

/// Cleanup label used by failing assertions in examples, before-each hooks
/// and dispatched hooks.
pub const OVER_LABEL: &str = "rdz_over";
/// Cleanup label used by failing assertions in after-each hooks, which are
/// spliced after [`OVER_LABEL`].
pub const DONE_LABEL: &str = "rdz_done";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assertion {
    /// Left operand, or the whole expression for the boolean form.
    pub left: String,
    pub operator: Option<Operator>,
    pub right: String,
    pub local_line: u32,
    pub global_line: u32,
}

impl Assertion {
    /// Parse the statement following the `ensure`/`expect` keyword, e.g.
    /// `(get_name(1) === "Kurt");`.
    pub fn parse(statement: &str, local_line: u32, global_line: u32) -> Assertion {
        let expr = unwrap_statement(statement);
        match find_operator(expr) {
            Some((at, token, operator)) => Assertion {
                left: expr[..at].trim().to_string(),
                operator: Some(operator),
                right: expr[at + token.len()..].trim().to_string(),
                local_line,
                global_line,
            },
            None => Assertion {
                left: expr.trim().to_string(),
                operator: None,
                right: String::new(),
                local_line,
                global_line,
            },
        }
    }

    /// Emit the C block for this assertion, each line prefixed with `indent`.
    pub fn to_c(&self, indent: &str, label: &str) -> String {
        let lines = match self.operator {
            None => self.boolean_lines(label),
            Some(Operator::Numeric { ty, negated }) => self.numeric_lines(ty, negated, label),
            Some(Operator::Text {
                kind,
                negated,
                case_insensitive,
                free_left,
                free_right,
            }) => self.text_lines(
                kind,
                negated,
                case_insensitive,
                (free_left, free_right),
                label,
            ),
        };

        let mut out = format!("{}{{\n", indent);
        for line in lines {
            out.push_str(&format!("{}  {}\n", indent, line));
        }
        out.push_str(&format!("{}}}\n", indent));
        out
    }

    fn record(&self, ok: &str, message: &str, operands: &str) -> String {
        format!(
            "rdz_record(rdz_nid, {}, {}, {}, {}, {});",
            ok, message, operands, self.local_line, self.global_line
        )
    }

    fn boolean_lines(&self, label: &str) -> Vec<String> {
        vec![
            format!("int rdz_r = ({}) ? 1 : 0;", self.left),
            self.record("rdz_r", "NULL", "NULL, NULL"),
            format!("if ( ! rdz_r) goto {};", label),
        ]
    }

    fn numeric_lines(&self, ty: NumericType, negated: bool, label: &str) -> Vec<String> {
        let (cmp, not) = if negated { ("!=", "not ") } else { ("==", "") };
        vec![
            format!("{} rdz_a = ({});", ty.c_type(), self.left),
            format!("{} rdz_b = ({});", ty.c_type(), self.right),
            format!("int rdz_r = (rdz_a {} rdz_b);", cmp),
            format!(
                "char *rdz_m = rdz_r ? NULL : rdz_sprintf(\"expected {conv}\\n      {not}to equal {conv}\", rdz_a, rdz_b);",
                conv = ty.conversion(),
                not = not
            ),
            self.record("rdz_r", "rdz_m", "NULL, NULL"),
            format!("if ( ! rdz_r) goto {};", label),
        ]
    }

    fn text_lines(
        &self,
        kind: StringMatch,
        negated: bool,
        case_insensitive: bool,
        (free_left, free_right): (bool, bool),
        label: &str,
    ) -> Vec<String> {
        let args = format!(
            "{}, {}, {}",
            kind.c_constant(),
            negated as u8,
            case_insensitive as u8
        );
        let mut lines = vec![
            format!("const char *rdz_a = ({});", self.left),
            format!("const char *rdz_b = ({});", self.right),
            format!("int rdz_r = rdz_compare({}, rdz_a, rdz_b);", args),
            format!(
                "char *rdz_m = rdz_r == 1 ? NULL : rdz_message({}, rdz_r, rdz_a, rdz_b);",
                args
            ),
            self.record("rdz_r == 1", "rdz_m", "rdz_a, rdz_b"),
        ];
        if free_left {
            lines.push("free((void *)rdz_a);".to_string());
        }
        if free_right {
            lines.push("free((void *)rdz_b);".to_string());
        }
        lines.push(format!("if (rdz_r != 1) goto {};", label));
        lines
    }
}

// -- Helpers --

/// Strip the trailing `;` and one pair of enclosing parentheses.
fn unwrap_statement(statement: &str) -> &str {
    let s = statement.trim().trim_end_matches(';').trim_end();
    if s.starts_with('(') && matching_paren(s) == Some(s.len() - 1) {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

/// Byte index of the parenthesis closing the one at index 0.
fn matching_paren(s: &str) -> Option<usize> {
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (i, c) in s.char_indices() {
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
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// First whitespace-delimited operator token outside strings and nested
/// parentheses.
fn find_operator(expr: &str) -> Option<(usize, &str, Operator)> {
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut prev_space = true;

    for (i, c) in expr.char_indices() {
        if let Some(q) = quote {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                _ if c == q => quote = None,
                _ => {}
            }
            prev_space = false;
            continue;
        }
        if depth == 0 && prev_space && !c.is_whitespace() {
            let token = expr[i..]
                .split(char::is_whitespace)
                .next()
                .unwrap_or_default();
            let has_right = !expr[i + token.len()..].trim().is_empty();
            if i > 0 && has_right {
                if let Some(op) = Operator::parse(token) {
                    return Some((i, token, op));
                }
            }
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' => depth += 1,
            ')' => depth -= 1,
            _ => {}
        }
        prev_space = c.is_whitespace();
    }
    None
}
