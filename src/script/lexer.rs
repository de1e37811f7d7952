//! Script lexer: a buffer stack supporting `INCLUDE`/`INCLUDE_OPTIONAL`, three lex
//! states, and zero-copy tokens.

use std::collections::HashSet;

use crate::diag::Diag;

use super::token::{
    is_default_ident_char, is_expr_ident_char, is_section_name_ident_char, LexState, Token,
    MULTI_CHAR_OPERATORS,
};

/// One entry on the `INCLUDE` buffer stack: a file's source text plus the lexer's
/// cursor into it.
#[derive(Clone)]
struct Buffer<'a> {
    file: String,
    source: &'a str,
    pos: usize,
    line: u32,
}

/// The script lexer. Holds a stack of buffers (the active one is the top); pushing
/// enters an `INCLUDE`d file, popping restores the includer. `active_includes`
/// detects cycles by filename.
pub struct Lexer<'a> {
    stack: Vec<Buffer<'a>>,
    active_includes: HashSet<String>,
    cached: Option<(LexState, Token<'a>)>,
    prev: Option<Token<'a>>,
    fatal: bool,
}

impl<'a> Lexer<'a> {
    /// Start lexing `source`, attributing diagnostics to `file`.
    pub fn new(file: impl Into<String>, source: &'a str) -> Self {
        let file = file.into();
        let mut active = HashSet::new();
        active.insert(file.clone());
        Self {
            stack: vec![Buffer {
                    file,
                    source,
                    pos: 0,
                    line: 1,
            }],
            active_includes: active,
            cached: None,
            prev: None,
            fatal: false,
        }
    }

    /// Push a new `INCLUDE`d file onto the buffer stack, failing with
    /// [`Diag::IncludeCycle`] if `file` is already an ancestor of the current stack.
    pub fn push_include(&mut self, file: impl Into<String>, source: &'a str) -> Result<(), Diag> {
        let file = file.into();
        if self.active_includes.contains(&file) {
            let mut cycle: Vec<&str> = self.stack.iter().map(|b| b.file.as_str()).collect();
            cycle.push(&file);
            return Err(Diag::IncludeCycle {
                    cycle: cycle.join(" -> "),
            });
        }
        self.active_includes.insert(file.clone());
        self.stack.push(Buffer {
                file,
                source,
                pos: 0,
                line: 1,
        });
        self.cached = None;
        Ok(())
    }

    /// The file and line of the currently active buffer, for diagnostics.
    pub fn location(&self) -> (String, u32) {
        #[allow(clippy::unwrap_used)]
        let top = self.stack.last().unwrap();
        (top.file.clone(), top.line)
    }

    /// True at end of the outermost file, or once a fatal diagnostic has been raised.
    pub fn at_eof(&mut self) -> bool {
        self.fatal || matches!(self.peek(LexState::Default), Ok(Token::Eof))
    }

    fn pop_exhausted_buffers(&mut self) {
        while self.stack.len() > 1 {
            #[allow(clippy::unwrap_used)]
            let top = self.stack.last().unwrap();
            if top.pos >= top.source.len() {
                #[allow(clippy::unwrap_used)]
                let popped = self.stack.pop().unwrap();
                self.active_includes.remove(&popped.file);
            } else {
                break;
            }
        }
    }

    fn skip_trivia(&mut self, state: LexState) -> Result<(), Diag> {
        loop {
            self.pop_exhausted_buffers();
            #[allow(clippy::unwrap_used)]
            let top = self.stack.last_mut().unwrap();
            let bytes = top.source.as_bytes();
            let start_line = top.line;
            let mut advanced = false;
            while top.pos < bytes.len() {
                let rest = &top.source[top.pos..];
                if rest.starts_with("/* ") || rest.starts_with("/*") {
                    if let Some(end) = rest.find("*/") {
                        top.line += rest[..end].matches('\n').count() as u32;
                        top.pos += end + 2;
                        advanced = true;
                        continue;
                    } else {
                        return Err(Diag::UnclosedComment {
                                file: top.file.clone(),
                                line: start_line,
                        });
                    }
                } else if rest.starts_with("//") || rest.starts_with('#') {
                    let end = rest.find('\n').unwrap_or(rest.len());
                    top.pos += end;
                    advanced = true;
                    continue;
                }
                let c = rest.chars().next();
                match c {
                    Some(c) if c.is_whitespace() => {
                        if c == '\n' {
                            top.line += 1;
                        }
                        top.pos += c.len_utf8();
                        advanced = true;
                    }
                    _ => break,
                }
            }
            if !advanced {
                break;
            }
        }
        let _ = state;
        Ok(())
    }

    fn read_token(&mut self, state: LexState) -> Result<Token<'a>, Diag> {
        self.skip_trivia(state)?;
        self.pop_exhausted_buffers();
        #[allow(clippy::unwrap_used)]
        let top = self.stack.last_mut().unwrap();
        if top.pos >= top.source.len() {
            if self.stack.len() == 1 {
                return Ok(Token::Eof);
            }
        }
        #[allow(clippy::unwrap_used)]
        let top = self.stack.last_mut().unwrap();
        let rest = &top.source[top.pos..];
        if rest.is_empty() {
            return Ok(Token::Eof);
        }

        // /DISCARD/ is a single token even in Expr mode.
        if rest.starts_with("/DISCARD/") {
            top.pos += "/DISCARD/".len();
            return Ok(Token::Punct(&rest[.."/DISCARD/".len()]));
        }

        let mut chars = rest.char_indices();
        let (_, first) = chars.next().expect("checked non-empty above");

        if first == '"' {
            let line = top.line;
            let mut end = None;
            for (i, c) in chars {
                if c == '"' {
                    end = Some(i);
                    break;
                }
                if c == '\n' {
                    top.line += 1;
                }
            }
            return match end {
                Some(end) => {
                    let content = &rest[1..end];
                    top.pos += end + 1;
                    Ok(Token::Quoted(content))
                }
                None => Err(Diag::UnclosedQuote {
                        file: top.file.clone(),
                        line,
                }),
            };
        }

        if state == LexState::Expr {
            for op in MULTI_CHAR_OPERATORS {
                if rest.starts_with(op) {
                    top.pos += op.len();
                    return Ok(Token::Punct(&rest[..op.len()]));
                }
            }
        }

        if first.is_ascii_digit() {
            return Ok(self.read_number(top, rest));
        }

        let is_ident_char: fn(char) -> bool = match state {
            LexState::Default => is_default_ident_char,
            LexState::SectionName => is_section_name_ident_char,
            LexState::Expr => is_expr_ident_char,
        };

        if is_ident_char(first) {
            let end = rest
                .char_indices()
                .find(|(_, c)| !is_ident_char(*c))
                .map(|(i, _)| i)
                .unwrap_or(rest.len());
            let text = &rest[..end];
            top.pos += end;
            return Ok(Token::Ident(text));
        }

        // Single-character punctuation fallback.
        let len = first.len_utf8();
        top.pos += len;
        Ok(Token::Punct(&rest[..len]))
    }

    fn read_number(&self, top: &mut Buffer<'a>, rest: &'a str) -> Token<'a> {
        if rest.starts_with("0x") || rest.starts_with("0X") {
            let end = rest[2..]
                .find(|c: char| !c.is_ascii_hexdigit())
                .map(|i| i + 2)
                .unwrap_or(rest.len());
            let value = u64::from_str_radix(&rest[2..end], 16).unwrap_or(0);
            top.pos += end;
            return Token::Number(value);
        }
        let digits_end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let digits = &rest[..digits_end];
        let suffix = rest[digits_end..].chars().next();
        match suffix {
            Some('H') | Some('h') => {
                let value = u64::from_str_radix(digits, 16).unwrap_or(0);
                top.pos += digits_end + 1;
                Token::Number(value)
            }
            Some('K') | Some('k') => {
                let value = digits.parse::<u64>().unwrap_or(0) * 1024;
                top.pos += digits_end + 1;
                Token::Number(value)
            }
            Some('M') | Some('m') => {
                let value = digits.parse::<u64>().unwrap_or(0) * 1024 * 1024;
                top.pos += digits_end + 1;
                Token::Number(value)
            }
            _ => {
                let value = digits.parse::<u64>().unwrap_or(0);
                top.pos += digits_end;
                Token::Number(value)
            }
        }
    }

    /// Peek the next token under `state` without consuming it. The cache is
    /// invalidated automatically if a later call asks under a different state.
    pub fn peek(&mut self, state: LexState) -> Result<Token<'a>, Diag> {
        if let Some((cached_state, tok)) = &self.cached {
            if *cached_state == state {
                return Ok(tok.clone());
            }
        }
        let tok = self.read_token(state)?;
        self.cached = Some((state, tok.clone()));
        Ok(tok)
    }

    /// Consume and return the next token under `state`.
    pub fn next(&mut self, state: LexState) -> Result<Token<'a>, Diag> {
        let tok = self.peek(state)?;
        self.cached = None;
        self.prev = Some(tok.clone());
        Ok(tok)
    }

    /// The token most recently returned by [`Lexer::next`], one step of lookbehind.
    pub fn prev(&self) -> Option<Token<'a>> {
        self.prev.clone()
    }

    /// Peek two tokens ahead without consuming either, lexing the first under
    /// `first_state` and the second under `second_state`. Used by the parser to
    /// disambiguate a leading identifier as either a symbol assignment (followed by
    /// an assignment operator) or the start of an input-section description.
    pub fn peek2(&mut self, first_state: LexState, second_state: LexState) -> Result<(Token<'a>, Token<'a>), Diag> {
        let saved_stack = self.stack.clone();
        let saved_active = self.active_includes.clone();
        let saved_cached = self.cached.clone();
        let saved_prev = self.prev.clone();
        let first = self.next(first_state)?;
        let second = self.peek(second_state)?;
        self.stack = saved_stack;
        self.active_includes = saved_active;
        self.cached = saved_cached;
        self.prev = saved_prev;
        Ok((first, second))
    }

    /// Consume the next token under `state` if it equals `text`; otherwise leave the
    /// position unchanged and return `false`.
    pub fn consume(&mut self, state: LexState, text: &str) -> Result<bool, Diag> {
        if self.peek(state)?.is(text) {
            self.next(state)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Consume the next token under `state`, requiring it to equal `text`; records a
    /// fatal [`Diag::UnexpectedToken`] otherwise.
    pub fn expect(&mut self, state: LexState, text: &str) -> Result<(), Diag> {
        let tok = self.peek(state)?;
        if tok.is(text) {
            self.next(state)?;
            Ok(())
        } else {
            self.fatal = true;
            let (file, line) = self.location();
            Err(Diag::UnexpectedToken {
                    file,
                    line,
                    found: tok.text(),
                    expected: text.to_string(),
            })
        }
    }

    /// Like [`Lexer::expect`], but records the diagnostic into `diags` and continues
    /// parsing (non-fatal recovery) rather than returning early.
    pub fn expect_but_continue(
        &mut self,
        state: LexState,
        text: &str,
        diags: &crate::diag::Diagnostics,
    ) -> Result<(), Diag> {
        let tok = self.peek(state)?;
        if tok.is(text) {
            self.next(state)?;
            Ok(())
        } else {
            let (file, line) = self.location();
            diags.emit(Diag::UnexpectedToken {
                    file,
                    line,
                    found: tok.text(),
                    expected: text.to_string(),
            });
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod test {
    use super::*;

    #[test]
    fn lexes_identifiers_and_punctuation() {
        let mut lexer = Lexer::new("t.ld", "SECTIONS {.text : { *(.text) } }");
        assert_eq!(lexer.next(LexState::Default).unwrap(), Token::Ident("SECTIONS"));
        assert_eq!(lexer.next(LexState::Default).unwrap(), Token::Punct("{"));
        assert_eq!(lexer.next(LexState::SectionName).unwrap(), Token::Ident(".text"));
        assert_eq!(lexer.next(LexState::Default).unwrap(), Token::Punct(":"));
    }

    #[test]
    fn skips_comments_and_tracks_lines() {
        let mut lexer = Lexer::new("t.ld", "/* c */\nfoo # trailing\nbar");
        assert_eq!(lexer.next(LexState::Default).unwrap(), Token::Ident("foo"));
        assert_eq!(lexer.location().1, 2);
        assert_eq!(lexer.next(LexState::Default).unwrap(), Token::Ident("bar"));
    }

    #[test]
    fn unclosed_comment_is_fatal() {
        let mut lexer = Lexer::new("t.ld", "/* never closed");
        assert!(matches!(
                lexer.next(LexState::Default),
                Err(Diag::UnclosedComment {.. })
        ));
    }

    #[test]
    fn unclosed_quote_is_fatal() {
        let mut lexer = Lexer::new("t.ld", "\"never closed");
        assert!(matches!(
                lexer.next(LexState::Default),
                Err(Diag::UnclosedQuote {.. })
        ));
    }

    #[test]
    fn quoted_token_strips_quotes() {
        let mut lexer = Lexer::new("t.ld", "\"libc.a\"");
        assert_eq!(lexer.next(LexState::Default).unwrap(), Token::Quoted("libc.a"));
    }

    #[test]
    fn discard_is_a_single_token_in_expr_mode() {
        let mut lexer = Lexer::new("t.ld", "/DISCARD/ : { *(.comment) }");
        assert_eq!(lexer.next(LexState::Expr).unwrap(), Token::Punct("/DISCARD/"));
    }

    #[test]
    fn multi_char_operators_lex_as_single_tokens() {
        let mut lexer = Lexer::new("t.ld", ". += 4; a <<= 2; b == c");
        assert_eq!(lexer.next(LexState::Expr).unwrap(), Token::Ident("."));
        assert_eq!(lexer.next(LexState::Expr).unwrap(), Token::Punct("+="));
    }

    #[test]
    fn number_literals_parse_hex_and_suffixes() {
        let mut lexer = Lexer::new("t.ld", "0x1000 4K 2M 10");
        assert_eq!(lexer.next(LexState::Expr).unwrap(), Token::Number(0x1000));
        assert_eq!(lexer.next(LexState::Expr).unwrap(), Token::Number(4096));
        assert_eq!(lexer.next(LexState::Expr).unwrap(), Token::Number(2 * 1024 * 1024));
        assert_eq!(lexer.next(LexState::Expr).unwrap(), Token::Number(10));
    }

    #[test]
    fn include_cycle_is_detected() {
        let mut lexer = Lexer::new("a.ld", "");
        assert!(lexer.push_include("b.ld", "").is_ok());
        assert!(matches!(
                lexer.push_include("a.ld", ""),
                Err(Diag::IncludeCycle {.. })
        ));
    }

    #[test]
    fn consume_advances_only_on_match() {
        let mut lexer = Lexer::new("t.ld", "ENTRY ( _start )");
        assert!(!lexer.consume(LexState::Default, "SECTIONS").unwrap());
        assert!(lexer.consume(LexState::Default, "ENTRY").unwrap());
    }
}
