/// Strip `//` comments from RPAL source, up to but not including the
/// newline. Line structure is preserved so token positions keep their line
/// numbers. `//` inside a string literal is left alone.
pub fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    let mut quote: Option<char> = None;

    while let Some(c) = chars.next() {
        match quote {
            Some(q) => {
                out.push(c);
                if c == '\\' {
                    // escaped character, never terminates the literal
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                } else if c == q {
                    quote = None;
                }
            }
            None => {
                if c == '\'' || c == '"' {
                    quote = Some(c);
                    out.push(c);
                } else if c == '/' && chars.peek() == Some(&'/') {
                    while let Some(&next) = chars.peek() {
                        if next == '\n' {
                            break;
                        }
                        chars.next();
                    }
                } else {
                    out.push(c);
                }
            }
        }
    }

    out
}

/// Expand the escape sequences of a quoted string literal and drop the
/// enclosing quotes. `\t`, `\n`, `\\` and `\'` expand to their characters;
/// any other `\x` stays a literal backslash followed by `x`.
pub fn unescape_string_literal(raw: &str) -> String {
    let mut chars = raw.chars();
    // enclosing quotes are part of the raw lexeme
    chars.next();
    chars.next_back();

    let mut out = String::new();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('\\') => out.push('\\'),
            Some('\'') => out.push('\''),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[lachs::token]
pub enum Token {
    // keywords
    #[terminal("let")]
    Let,
    #[terminal("where")]
    Where,
    #[terminal("within")]
    Within,
    #[terminal("aug")]
    Aug,
    #[terminal("fn")]
    FnKw,
    #[terminal("in")]
    In,
    // worded operators
    #[terminal("and")]
    And,
    #[terminal("or")]
    Or,
    #[terminal("not")]
    Not,
    #[terminal("gr")]
    Gr,
    #[terminal("ge")]
    Ge,
    #[terminal("ls")]
    Ls,
    #[terminal("le")]
    Le,
    #[terminal("eq")]
    EqKw,
    #[terminal("ne")]
    Ne,
    // boolean literals, consumed by the parser as the integers 1 and 0
    #[terminal("true")]
    True,
    #[terminal("false")]
    False,
    // delimiters
    #[terminal("(")]
    LParen,
    #[terminal(")")]
    RParen,
    #[terminal(",")]
    Comma,
    #[literal("[a-zA-Z][a-zA-Z0-9_]*")]
    Ident,
    #[literal("[0-9]+")]
    Integer,
    #[literal(r#""([^"\\]|\\.)*""#)]
    DoubleQuoteString,
    #[literal(r"'([^'\\]|\\.)*'")]
    SingleQuoteString,
    // greedy run of operator symbols; `,` is split off above
    #[literal(r"[+\-*<>&.@/:=~|$!#%^_\[}{?]+")]
    Operator,
}

impl Token {
    /// Returns a human-readable description of the token
    pub fn describe(&self) -> String {
        match self {
            Token::Let(_) => "'let'".to_string(),
            Token::Where(_) => "'where'".to_string(),
            Token::Within(_) => "'within'".to_string(),
            Token::Aug(_) => "'aug'".to_string(),
            Token::FnKw(_) => "'fn'".to_string(),
            Token::In(_) => "'in'".to_string(),
            Token::And(_) => "'and'".to_string(),
            Token::Or(_) => "'or'".to_string(),
            Token::Not(_) => "'not'".to_string(),
            Token::Gr(_) => "'gr'".to_string(),
            Token::Ge(_) => "'ge'".to_string(),
            Token::Ls(_) => "'ls'".to_string(),
            Token::Le(_) => "'le'".to_string(),
            Token::EqKw(_) => "'eq'".to_string(),
            Token::Ne(_) => "'ne'".to_string(),
            Token::True(_) => "'true'".to_string(),
            Token::False(_) => "'false'".to_string(),
            Token::LParen(_) => "'('".to_string(),
            Token::RParen(_) => "')'".to_string(),
            Token::Comma(_) => "','".to_string(),
            Token::Ident(inner) => format!("identifier '{}'", inner.value),
            Token::Integer(inner) => format!("integer '{}'", inner.value),
            Token::DoubleQuoteString(inner) => format!("string {}", inner.value),
            Token::SingleQuoteString(inner) => format!("string {}", inner.value),
            Token::Operator(inner) => format!("'{}'", inner.value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_line_comment() {
        let stripped = strip_comments("let x = 1 // bind x\nin Print x");
        assert_eq!(stripped, "let x = 1 \nin Print x");
    }

    #[test]
    fn keeps_slashes_inside_strings() {
        let stripped = strip_comments("Print 'http://x' // real comment");
        assert_eq!(stripped, "Print 'http://x' ");
    }

    #[test]
    fn comment_keeps_line_structure() {
        let stripped = strip_comments("// first\n// second\nPrint 1");
        assert_eq!(stripped, "\n\nPrint 1");
    }

    #[test]
    fn unescapes_known_sequences() {
        assert_eq!(unescape_string_literal(r"'a\tb\nc'"), "a\tb\nc");
        assert_eq!(unescape_string_literal(r"'don\'t'"), "don't");
        assert_eq!(unescape_string_literal(r"'back\\slash'"), "back\\slash");
    }

    #[test]
    fn unknown_escape_keeps_backslash() {
        assert_eq!(unescape_string_literal(r"'a\qb'"), "a\\qb");
    }

    #[test]
    fn drops_enclosing_quotes_only() {
        assert_eq!(unescape_string_literal("\"hello\""), "hello");
        assert_eq!(unescape_string_literal("''"), "");
    }
}
