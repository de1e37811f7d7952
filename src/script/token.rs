//! Tokens and lex states for the linker-script front end.

/// Which character class/operator set is active for the next `peek`/`next` call.
/// The lexer is context-sensitive: the parser tells it which state applies at each
/// call site rather than the lexer guessing from surrounding syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LexState {
    /// Identifier characters include `letters digits _. $ / \ ~ = + [ ] * ? - ! ^ :`;
    /// used for general identifiers and keywords
    Default,
    /// Like `Default` but `:` is excluded, since `:` separates an output-section
    /// header from its attributes
    SectionName,
    /// Identifier characters restricted to `[A-Za-z0-9_.$]`; multi-char operators are
    /// recognized as single tokens
    Expr,
}

/// One lexical token. Identifier/number/string tokens borrow directly from the
/// mapped script buffer (zero-copy); punctuation tokens are represented by their
/// exact text too, since the punctuation alphabet is small and uniform treatment
/// keeps the parser's `consume`/`expect` calls simple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// An identifier, keyword, or wildcard pattern (lexed the same way; the parser
    /// decides which this is from context)
    Ident(&'a str),
    /// A quoted string; content is returned with the surrounding quotes stripped.
    /// Quoted tokens are always literal (no glob expansion) wherever they are used
    /// as a file or section pattern
    Quoted(&'a str),
    /// An integer literal, already parsed (hex `0x...`/`...H`, decimal, or
    /// `K`/`M`-suffixed)
    Number(u64),
    /// A single- or multi-character punctuation/operator token (`(`, `)`, `{`, `}`,
    /// `;`, `,`, `:`, `==`, `<<=`,...), including the special single-token
    /// `/DISCARD/`
    Punct(&'a str),
    /// End of the (possibly `INCLUDE`-nested) input
    Eof,
}

impl<'a> Token<'a> {
    /// The raw text this token was lexed from, for diagnostics.
    pub fn text(&self) -> String {
        match self {
            Token::Ident(s) | Token::Quoted(s) | Token::Punct(s) => s.to_string(),
            Token::Number(n) => n.to_string(),
            Token::Eof => "<eof>".to_string(),
        }
    }

    /// True if this token is the given punctuation or bare-identifier keyword text.
    pub fn is(&self, text: &str) -> bool {
        match self {
            Token::Ident(s) | Token::Punct(s) => *s == text,
            _ => false,
        }
    }
}

/// Default-mode identifier character predicate.
pub fn is_default_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
        c,
        '_' | '.' | '$' | '/' | '\\' | '~' | '=' | '+' | '[' | ']' | '*' | '?' | '-' | '!' | '^' | ':'
    )
}

/// `SectionName`-mode identifier character predicate: `Default` minus `:`.
pub fn is_section_name_ident_char(c: char) -> bool {
    c != ':' && is_default_ident_char(c)
}

/// `Expr`-mode identifier character predicate.
pub fn is_expr_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '$')
}

/// Multi-character operators recognized as a single token in `Expr` mode, longest
/// first so the lexer's greedy match picks the longest valid operator.
pub const MULTI_CHAR_OPERATORS: &[&str] = &[
    "<<=", ">>=", "==", "!=", "<=", ">=", "<<", ">>", "&&", "||", "+=", "-=", "*=", "/=", "&=", "|=", "^=",
];
