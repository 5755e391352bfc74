//! Comparison operator tokens.
//!
//! String operators: `===`, `!==` and `[!][~^$>]==`, followed by any of
//! the flags `i` (case-insensitive), `f` (free the left operand) and `F`
//! (free both).
//! Typed numeric operators: `<t>==` or `<t>!==` where `<t>` names a C type
//! by its printf conversion.

/// How two strings are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringMatch {
    Equal,
    Match,
    StartsWith,
    EndsWith,
    Contains,
}

impl StringMatch {
    fn from_sigil(c: char) -> Option<Self> {
        Some(match c {
            '~' => StringMatch::Match,
            '^' => StringMatch::StartsWith,
            '$' => StringMatch::EndsWith,
            '>' => StringMatch::Contains,
            _ => return None,
        })
    }

    /// Name of the matching constant in the C prelude.
    pub fn c_constant(self) -> &'static str {
        match self {
            StringMatch::Equal => "RDZ_OP_EQUAL",
            StringMatch::Match => "RDZ_OP_MATCH",
            StringMatch::StartsWith => "RDZ_OP_STARTS",
            StringMatch::EndsWith => "RDZ_OP_ENDS",
            StringMatch::Contains => "RDZ_OP_CONTAINS",
        }
    }
}

/// C types accepted by the typed numeric operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericType {
    Char,
    Short,
    Decimal,
    Fixed,
    Exponent,
    Integer,
    Long,
    LongLong,
    Unsigned,
    Octal,
    UnsignedLong,
    UnsignedLongLong,
    Size,
    SignedSize,
}

impl NumericType {
    const ALL: [NumericType; 14] = [
        NumericType::Char,
        NumericType::Short,
        NumericType::Decimal,
        NumericType::Fixed,
        NumericType::Exponent,
        NumericType::Integer,
        NumericType::Long,
        NumericType::LongLong,
        NumericType::Unsigned,
        NumericType::Octal,
        NumericType::UnsignedLong,
        NumericType::UnsignedLongLong,
        NumericType::Size,
        NumericType::SignedSize,
    ];

    /// The operator prefix, e.g. `lu` in `lu==`.
    pub fn token(self) -> &'static str {
        match self {
            NumericType::Char => "c",
            NumericType::Short => "s",
            NumericType::Decimal => "d",
            NumericType::Fixed => "f",
            NumericType::Exponent => "e",
            NumericType::Integer => "i",
            NumericType::Long => "li",
            NumericType::LongLong => "lli",
            NumericType::Unsigned => "u",
            NumericType::Octal => "o",
            NumericType::UnsignedLong => "lu",
            NumericType::UnsignedLongLong => "llu",
            NumericType::Size => "zu",
            NumericType::SignedSize => "zd",
        }
    }

    pub fn c_type(self) -> &'static str {
        match self {
            NumericType::Char => "char",
            NumericType::Short => "short",
            NumericType::Decimal | NumericType::Integer => "int",
            NumericType::Fixed | NumericType::Exponent => "double",
            NumericType::Long => "long",
            NumericType::LongLong => "long long",
            NumericType::Unsigned | NumericType::Octal => "unsigned int",
            NumericType::UnsignedLong => "unsigned long",
            NumericType::UnsignedLongLong => "unsigned long long",
            NumericType::Size => "size_t",
            NumericType::SignedSize => "ssize_t",
        }
    }

    /// printf conversion used in failure messages.
    pub fn conversion(self) -> &'static str {
        match self {
            NumericType::Char => "'%c'",
            NumericType::Short => "%hd",
            NumericType::Decimal => "%d",
            NumericType::Fixed => "%f",
            NumericType::Exponent => "%e",
            NumericType::Integer => "%i",
            NumericType::Long => "%li",
            NumericType::LongLong => "%lli",
            NumericType::Unsigned => "%u",
            NumericType::Octal => "0%o",
            NumericType::UnsignedLong => "%lu",
            NumericType::UnsignedLongLong => "%llu",
            NumericType::Size => "%zu",
            NumericType::SignedSize => "%zd",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        NumericType::ALL.into_iter().find(|t| t.token() == token)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Text {
        kind: StringMatch,
        negated: bool,
        case_insensitive: bool,
        free_left: bool,
        free_right: bool,
    },
    Numeric {
        ty: NumericType,
        negated: bool,
    },
}

impl Operator {
    /// Parse one whitespace-delimited token. Anything that is not an
    /// operator yields `None`.
    pub fn parse(token: &str) -> Option<Operator> {
        if let Some(op) = Self::parse_text(token) {
            return Some(op);
        }
        let (prefix, negated) = if let Some(p) = token.strip_suffix("!==") {
            (p, true)
        } else {
            (token.strip_suffix("==")?, false)
        };
        let ty = NumericType::from_token(prefix)?;
        Some(Operator::Numeric { ty, negated })
    }

    fn parse_text(token: &str) -> Option<Operator> {
        let (kind, negated, flags) = if let Some(flags) = token.strip_prefix("===") {
            (StringMatch::Equal, false, flags)
        } else if let Some(flags) = token.strip_prefix("!==") {
            (StringMatch::Equal, true, flags)
        } else {
            let (negated, rest) = match token.strip_prefix('!') {
                Some(rest) => (true, rest),
                None => (false, token),
            };
            let mut chars = rest.chars();
            let kind = StringMatch::from_sigil(chars.next()?)?;
            (kind, negated, chars.as_str().strip_prefix("==")?)
        };

        let mut op = (false, false, false);
        for flag in flags.chars() {
            match flag {
                'i' => op.0 = true,
                'f' => op.1 = true,
                'F' => op.2 = true,
                _ => return None,
            }
        }
        let (case_insensitive, free_left, free_both) = op;
        Some(Operator::Text {
            kind,
            negated,
            case_insensitive,
            free_left: free_left || free_both,
            free_right: free_both,
        })
    }
}
