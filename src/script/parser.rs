//! Recursive-descent script parser : builds a [`LinkerScript`] from
//! tokens supplied by [`super::lexer::Lexer`], with an operator-precedence
//! expression sub-parser for `Expr`-mode regions.

use crate::diag::{Diag, Diagnostics};

use super::ast::*;
use super::expr::{BinOp, BuiltinFn, Expr, UnOp};
use super::lexer::Lexer;
use super::token::{LexState, Token};

/// Recursive-descent parser over one script buffer. `INCLUDE`/`INCLUDE_OPTIONAL` are
/// resolved by the caller (the driver owns file I/O); [`Parser::parse`] takes a
/// callback that resolves an include path to its source text so the parser itself
/// never touches the filesystem.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    diags: &'a Diagnostics,
}

impl<'a> Parser<'a> {
    /// Build a parser over `source`, attributing diagnostics to `file`.
    pub fn new(file: impl Into<String>, source: &'a str, diags: &'a Diagnostics) -> Self {
        Self {
            lexer: Lexer::new(file, source),
            diags,
        }
    }

    /// Parse every top-level command until EOF. `resolve_include` is called with an
    /// `INCLUDE`d path and must return its source text (leaked/owned by the caller
    /// for the `'a` lifetime) so nested files can be pushed onto the lexer's buffer
    /// stack; returning `None` is only valid for `INCLUDE_OPTIONAL`.
    pub fn parse(&mut self, mut resolve_include: impl FnMut(&str) -> Option<&'a str>) -> LinkerScript {
        let mut commands = Vec::new();
        while !self.lexer.at_eof() {
            match self.parse_top_level_command(&mut resolve_include) {
                Ok(Some(cmd)) => commands.push(cmd),
                Ok(None) => {}
                Err(diag) => {
                    self.diags.emit(diag);
                    break;
                }
            }
        }
        LinkerScript { commands }
    }

    fn parse_top_level_command(
        &mut self,
        resolve_include: &mut impl FnMut(&str) -> Option<&'a str>,
    ) -> Result<Option<ScriptCommand>, Diag> {
        let tok = self.lexer.peek(LexState::Default)?;
        let Token::Ident(kw) = tok else {
            // Could be a top-level symbol assignment starting with `.` or a name.
            return self.parse_assignment_or_error().map(|a| Some(ScriptCommand::Assignment(a)));
        };
        match kw {
            "ENTRY" => {
                self.lexer.next(LexState::Default)?;
                self.lexer.expect(LexState::Default, "(")?;
                let name = self.parse_ident_text()?;
                self.lexer.expect(LexState::Default, ")")?;
                Ok(Some(ScriptCommand::Entry(name)))
            }
            "OUTPUT" => {
                self.lexer.next(LexState::Default)?;
                self.lexer.expect(LexState::Default, "(")?;
                let path = self.parse_ident_text()?;
                self.lexer.expect(LexState::Default, ")")?;
                Ok(Some(ScriptCommand::Output(path)))
            }
            "OUTPUT_ARCH" => {
                self.lexer.next(LexState::Default)?;
                self.lexer.expect(LexState::Default, "(")?;
                let name = self.parse_ident_text()?;
                self.lexer.expect(LexState::Default, ")")?;
                Ok(Some(ScriptCommand::OutputArch(name)))
            }
            "OUTPUT_FORMAT" => {
                self.lexer.next(LexState::Default)?;
                self.lexer.expect(LexState::Default, "(")?;
                let mut names = vec![self.parse_ident_text()?];
                while self.lexer.consume(LexState::Default, ",")? {
                    names.push(self.parse_ident_text()?);
                }
                self.lexer.expect(LexState::Default, ")")?;
                Ok(Some(ScriptCommand::OutputFormat(names)))
            }
            "SEARCH_DIR" => {
                self.lexer.next(LexState::Default)?;
                self.lexer.expect(LexState::Default, "(")?;
                let path = self.parse_ident_text()?;
                self.lexer.expect(LexState::Default, ")")?;
                Ok(Some(ScriptCommand::SearchDir(path)))
            }
            "EXTERN" => {
                self.lexer.next(LexState::Default)?;
                self.lexer.expect(LexState::Default, "(")?;
                let names = self.parse_ident_list_until(")")?;
                self.lexer.expect(LexState::Default, ")")?;
                Ok(Some(ScriptCommand::Extern(names)))
            }
            "INPUT" => {
                self.lexer.next(LexState::Default)?;
                self.lexer.expect(LexState::Default, "(")?;
                let names = self.parse_ident_list_until(")")?;
                self.lexer.expect(LexState::Default, ")")?;
                Ok(Some(ScriptCommand::Input(names)))
            }
            "GROUP" => {
                self.lexer.next(LexState::Default)?;
                self.lexer.expect(LexState::Default, "(")?;
                let names = self.parse_ident_list_until(")")?;
                self.lexer.expect(LexState::Default, ")")?;
                Ok(Some(ScriptCommand::Group(names)))
            }
            "NOCROSSREFS" => {
                self.lexer.next(LexState::Default)?;
                self.lexer.expect(LexState::Default, "(")?;
                let names = self.parse_ident_list_until(")")?;
                self.lexer.expect(LexState::Default, ")")?;
                Ok(Some(ScriptCommand::NoCrossRefs(names)))
            }
            "REGION_ALIAS" => {
                self.lexer.next(LexState::Default)?;
                self.lexer.expect(LexState::Default, "(")?;
                let alias = self.parse_ident_text()?;
                self.lexer.expect(LexState::Default, ",")?;
                let region = self.parse_ident_text()?;
                self.lexer.expect(LexState::Default, ")")?;
                Ok(Some(ScriptCommand::RegionAlias(alias, region)))
            }
            "SECTIONS" => {
                self.lexer.next(LexState::Default)?;
                self.lexer.expect(LexState::Default, "{")?;
                let stmts = self.parse_sections_body()?;
                self.lexer.expect(LexState::Default, "}")?;
                Ok(Some(ScriptCommand::Sections(stmts)))
            }
            "MEMORY" => {
                self.lexer.next(LexState::Default)?;
                self.lexer.expect(LexState::Default, "{")?;
                let decls = self.parse_memory_body()?;
                self.lexer.expect(LexState::Default, "}")?;
                Ok(Some(ScriptCommand::Memory(decls)))
            }
            "PHDRS" => {
                self.lexer.next(LexState::Default)?;
                self.lexer.expect(LexState::Default, "{")?;
                let decls = self.parse_phdrs_body()?;
                self.lexer.expect(LexState::Default, "}")?;
                Ok(Some(ScriptCommand::Phdrs(decls)))
            }
            "VERSION" => {
                self.lexer.next(LexState::Default)?;
                let nodes = self.parse_version_top()?;
                Ok(Some(ScriptCommand::Version(nodes)))
            }
            "INCLUDE" | "INCLUDE_OPTIONAL" => {
                let required = kw == "INCLUDE";
                self.lexer.next(LexState::Default)?;
                self.lexer.expect(LexState::Default, "(")?;
                let path = self.parse_ident_text()?;
                self.lexer.expect(LexState::Default, ")")?;
                match resolve_include(&path) {
                    Some(source) => self.lexer.push_include(path.clone(), source)?,
                    None if !required => {}
                    None => {
                        return Err(Diag::UnreadableInput {
                                path,
                                reason: "include not found".to_string(),
                        })
                    }
                }
                Ok(Some(ScriptCommand::Include { path, required }))
            }
            kw if kw.starts_with("PLUGIN") || kw == "LINKER_PLUGIN" => {
                self.lexer.next(LexState::Default)?;
                let mut args = Vec::new();
                if self.lexer.consume(LexState::Default, "(")? {
                    args = self.parse_ident_list_until(")")?;
                    self.lexer.expect(LexState::Default, ")")?;
                }
                Ok(Some(ScriptCommand::Plugin {
                            directive: kw.to_string(),
                            args,
                }))
            }
            "PROVIDE" | "HIDDEN" | "PROVIDE_HIDDEN" => {
                let wrapper = match kw {
                    "PROVIDE" => AssignWrapper::Provide,
                    "HIDDEN" => AssignWrapper::Hidden,
                    _ => AssignWrapper::ProvideHidden,
                };
                self.lexer.next(LexState::Default)?;
                self.lexer.expect(LexState::Default, "(")?;
                let mut assignment = self.parse_assignment_body()?;
                assignment.wrapper = wrapper;
                self.lexer.expect(LexState::Default, ")")?;
                self.lexer.consume(LexState::Default, ";")?;
                Ok(Some(ScriptCommand::Assignment(assignment)))
            }
            _ => self.parse_assignment_or_error().map(|a| Some(ScriptCommand::Assignment(a))),
        }
    }

    fn parse_assignment_or_error(&mut self) -> Result<Assignment, Diag> {
        let assignment = self.parse_assignment_body()?;
        self.lexer.consume(LexState::Default, ";")?;
        Ok(assignment)
    }

    /// `name OP expr`, where `name` is already known to be the next token.
    fn parse_assignment_body(&mut self) -> Result<Assignment, Diag> {
        let name = self.parse_ident_text()?;
        let op_tok = self.lexer.next(LexState::Expr)?;
        let op = match op_tok {
            Token::Punct("=") => AssignOp::Assign,
            Token::Punct("+=") => AssignOp::AddAssign,
            Token::Punct("-=") => AssignOp::SubAssign,
            Token::Punct("*=") => AssignOp::MulAssign,
            Token::Punct("/=") => AssignOp::DivAssign,
            Token::Punct("<<=") => AssignOp::ShlAssign,
            Token::Punct(">>=") => AssignOp::ShrAssign,
            Token::Punct("&=") => AssignOp::AndAssign,
            Token::Punct("|=") => AssignOp::OrAssign,
            Token::Punct("^=") => AssignOp::XorAssign,
            other => {
                let (file, line) = self.lexer.location();
                return Err(Diag::UnexpectedToken {
                        file,
                        line,
                        found: other.text(),
                        expected: "assignment operator".to_string(),
                });
            }
        };
        let value = self.parse_expr()?;
        Ok(Assignment {
                name,
                op,
                value,
                wrapper: AssignWrapper::None,
        })
    }

    fn parse_ident_text(&mut self) -> Result<String, Diag> {
        let tok = self.lexer.next(LexState::Default)?;
        match tok {
            Token::Ident(s) | Token::Quoted(s) | Token::Punct(s) => Ok(s.to_string()),
            Token::Number(n) => Ok(n.to_string()),
            Token::Eof => {
                let (file, line) = self.lexer.location();
                Err(Diag::UnexpectedToken {
                        file,
                        line,
                        found: "<eof>".to_string(),
                        expected: "identifier".to_string(),
                })
            }
        }
    }

    fn parse_ident_list_until(&mut self, terminator: &str) -> Result<Vec<String>, Diag> {
        let mut names = Vec::new();
        while !self.lexer.peek(LexState::Default)?.is(terminator) {
            names.push(self.parse_ident_text()?);
            self.lexer.consume(LexState::Default, ",")?;
        }
        Ok(names)
    }

    // -- expressions: operator precedence climbing --

    /// Parse a full expression, lowest precedence (ternary) first.
    pub fn parse_expr(&mut self) -> Result<Expr, Diag> {
        self.parse_ternary()
    }

    fn parse_ternary(&mut self) -> Result<Expr, Diag> {
        let cond = self.parse_binary(0)?;
        if self.lexer.consume(LexState::Expr, "?")? {
            let then = self.parse_expr()?;
            self.lexer.expect(LexState::Expr, ":")?;
            let els = self.parse_expr()?;
            Ok(Expr::Ternary(Box::new(cond), Box::new(then), Box::new(els)))
        } else {
            Ok(cond)
        }
    }

    /// Precedence table, highest-binding first (lower number = binds tighter, as in
    /// a classic precedence-climbing parser): `* / %` > `+ -` > `<< >>` >
    /// `< <= > >=` > `== !=` > `&` > `^` > `|` > `&&` > `||`.
    fn binop_for(tok: &Token<'_>) -> Option<(BinOp, u8)> {
        match tok {
            Token::Punct("*") => Some((BinOp::Mul, 9)),
            Token::Punct("/") => Some((BinOp::Div, 9)),
            Token::Punct("%") => Some((BinOp::Mod, 9)),
            Token::Punct("+") => Some((BinOp::Add, 8)),
            Token::Punct("-") => Some((BinOp::Sub, 8)),
            Token::Punct("<<") => Some((BinOp::Shl, 7)),
            Token::Punct(">>") => Some((BinOp::Shr, 7)),
            Token::Punct("<") => Some((BinOp::Lt, 6)),
            Token::Punct("<=") => Some((BinOp::Le, 6)),
            Token::Punct(">") => Some((BinOp::Gt, 6)),
            Token::Punct(">=") => Some((BinOp::Ge, 6)),
            Token::Punct("==") => Some((BinOp::Eq, 5)),
            Token::Punct("!=") => Some((BinOp::Ne, 5)),
            Token::Punct("&") => Some((BinOp::And, 4)),
            Token::Punct("^") => Some((BinOp::Xor, 3)),
            Token::Punct("|") => Some((BinOp::Or, 2)),
            Token::Punct("&&") => Some((BinOp::LogAnd, 1)),
            Token::Punct("||") => Some((BinOp::LogOr, 0)),
            _ => None,
        }
    }

    fn parse_binary(&mut self, min_prec: u8) -> Result<Expr, Diag> {
        let mut lhs = self.parse_unary()?;
        loop {
            let tok = self.lexer.peek(LexState::Expr)?;
            let Some((op, prec)) = Self::binop_for(&tok) else {
                break;
            };
            if prec < min_prec {
                break;
            }
            self.lexer.next(LexState::Expr)?;
            let rhs = self.parse_binary(prec + 1)?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr, Diag> {
        let tok = self.lexer.peek(LexState::Expr)?;
        match tok {
            Token::Punct("~") => {
                self.lexer.next(LexState::Expr)?;
                Ok(Expr::Unary(UnOp::Not, Box::new(self.parse_unary()?)))
            }
            Token::Punct("!") => {
                self.lexer.next(LexState::Expr)?;
                Ok(Expr::Unary(UnOp::LogNot, Box::new(self.parse_unary()?)))
            }
            Token::Punct("-") => {
                self.lexer.next(LexState::Expr)?;
                Ok(Expr::Unary(UnOp::Neg, Box::new(self.parse_unary()?)))
            }
            Token::Punct("+") => {
                self.lexer.next(LexState::Expr)?;
                Ok(Expr::Unary(UnOp::Pos, Box::new(self.parse_unary()?)))
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, Diag> {
        let tok = self.lexer.next(LexState::Expr)?;
        match tok {
            Token::Number(n) => Ok(Expr::Number(n)),
            Token::Punct("(") => {
                let inner = self.parse_expr()?;
                self.lexer.expect(LexState::Expr, ")")?;
                Ok(inner)
            }
            Token::Punct(".") | Token::Ident(".") => Ok(Expr::Dot),
            Token::Ident(name) => self.parse_ident_or_call(name),
            other => {
                let (file, line) = self.lexer.location();
                Err(Diag::UnexpectedToken {
                        file,
                        line,
                        found: other.text(),
                        expected: "expression".to_string(),
                })
            }
        }
    }

    fn parse_ident_or_call(&mut self, name: &str) -> Result<Expr, Diag> {
        let builtin = match name {
            "ABSOLUTE" => Some(BuiltinFn::Absolute),
            "ADDR" => Some(BuiltinFn::Addr),
            "ALIGN" => Some(BuiltinFn::Align),
            "ALIGNOF" => Some(BuiltinFn::AlignOf),
            "CONSTANT" => Some(BuiltinFn::Constant),
            "DATA_SEGMENT_ALIGN" => Some(BuiltinFn::DataSegmentAlign),
            "DATA_SEGMENT_END" => Some(BuiltinFn::DataSegmentEnd),
            "DATA_SEGMENT_RELRO_END" => Some(BuiltinFn::DataSegmentRelroEnd),
            "DEFINED" => Some(BuiltinFn::Defined),
            "LENGTH" => Some(BuiltinFn::Length),
            "LOADADDR" => Some(BuiltinFn::LoadAddr),
            "LOG2CEIL" => Some(BuiltinFn::Log2Ceil),
            "MAX" => Some(BuiltinFn::Max),
            "MIN" => Some(BuiltinFn::Min),
            "ORIGIN" => Some(BuiltinFn::Origin),
            "SEGMENT_START" => Some(BuiltinFn::SegmentStart),
            "SIZEOF" => Some(BuiltinFn::SizeOf),
            "SIZEOF_HEADERS" => return Ok(Expr::Call(BuiltinFn::SizeOfHeaders, Vec::new())),
            "ASSERT" => {
                self.lexer.expect(LexState::Expr, "(")?;
                let expr = self.parse_expr()?;
                self.lexer.expect(LexState::Expr, ",")?;
                let message = self.parse_assert_message()?;
                self.lexer.expect(LexState::Expr, ")")?;
                return Ok(Expr::Assert(Box::new(expr), message));
            }
            _ => None,
        };
        if let Some(func) = builtin {
            self.lexer.expect(LexState::Expr, "(")?;
            let mut args = Vec::new();
            if func == BuiltinFn::Addr
                || func == BuiltinFn::LoadAddr
                || func == BuiltinFn::SizeOf
                || func == BuiltinFn::AlignOf
                || func == BuiltinFn::Length
                || func == BuiltinFn::Origin
                || func == BuiltinFn::Constant
            {
                args.push(Expr::Ident(self.parse_ident_text()?));
            } else {
                if !self.lexer.peek(LexState::Expr)?.is(")") {
                    args.push(self.parse_expr()?);
                    while self.lexer.consume(LexState::Expr, ",")? {
                        args.push(self.parse_expr()?);
                    }
                }
            }
            self.lexer.expect(LexState::Expr, ")")?;
            return Ok(Expr::Call(func, args));
        }
        Ok(Expr::Ident(name.to_string()))
    }

    fn parse_assert_message(&mut self) -> Result<String, Diag> {
        let tok = self.lexer.next(LexState::Default)?;
        Ok(tok.text())
    }

    // -- SECTIONS --

    fn parse_sections_body(&mut self) -> Result<Vec<OutputSectionStmt>, Diag> {
        let mut stmts = Vec::new();
        while !self.lexer.peek(LexState::Default)?.is("}") {
            stmts.push(self.parse_output_section_stmt()?);
        }
        Ok(stmts)
    }

    fn parse_output_section_stmt(&mut self) -> Result<OutputSectionStmt, Diag> {
        let name = self.parse_ident_text()?;
        let mut prolog = SectionProlog::default();

        // Optional VMA expression before the `(TYPE)`/`:` - present if the next
        // token isn't `(`, `:`, `ONLY_IF_RO`, `ONLY_IF_RW`.
        let next = self.lexer.peek(LexState::Default)?;
        if !next.is("(") && !next.is(":") && !next.is("ONLY_IF_RO") && !next.is("ONLY_IF_RW") {
            prolog.vma = Some(self.parse_expr()?);
        }
        if self.lexer.consume(LexState::Default, "(")? {
            let mut depth = 1;
            let mut text = String::new();
            loop {
                let tok = self.lexer.next(LexState::Default)?;
                match &tok {
                    Token::Punct("(") => depth += 1,
                    Token::Punct(")") => {
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                    }
                    _ => {}
                }
                if !text.is_empty() {
                    text.push(' ');
                }
                text.push_str(&tok.text());
            }
            prolog.type_and_perm = Some(text);
        }
        loop {
            if self.lexer.consume(LexState::Default, "ONLY_IF_RO")? {
                prolog.only_if_ro = true;
            } else if self.lexer.consume(LexState::Default, "ONLY_IF_RW")? {
                prolog.only_if_rw = true;
            } else if self.lexer.consume(LexState::Default, "AT")? {
                self.lexer.expect(LexState::Expr, "(")?;
                prolog.at = Some(self.parse_expr()?);
                self.lexer.expect(LexState::Expr, ")")?;
            } else if self.lexer.consume(LexState::Default, "ALIGN")? {
                self.lexer.expect(LexState::Expr, "(")?;
                prolog.align = Some(self.parse_expr()?);
                self.lexer.expect(LexState::Expr, ")")?;
            } else if self.lexer.consume(LexState::Default, "SUBALIGN")? {
                self.lexer.expect(LexState::Expr, "(")?;
                prolog.subalign = Some(self.parse_expr()?);
                self.lexer.expect(LexState::Expr, ")")?;
            } else {
                break;
            }
        }
        self.lexer.expect(LexState::Default, ":")?;
        self.lexer.expect(LexState::Default, "{")?;
        let mut body = Vec::new();
        while !self.lexer.peek(LexState::Default)?.is("}") {
            body.push(self.parse_section_body_statement()?);
        }
        self.lexer.expect(LexState::Default, "}")?;

        let mut epilog = SectionEpilog::default();
        if self.lexer.consume(LexState::Default, ">")? {
            epilog.region = Some(self.parse_ident_text()?);
        }
        if self.lexer.consume(LexState::Default, "AT")? {
            self.lexer.expect(LexState::Default, ">")?;
            epilog.at_region = Some(self.parse_ident_text()?);
        }
        while self.lexer.consume(LexState::Default, ":")? {
            epilog.phdrs.push(self.parse_ident_text()?);
        }
        if self.lexer.consume(LexState::Default, "=")? {
            epilog.fill = Some(self.parse_expr()?);
        }
        self.lexer.consume(LexState::Default, ";")?;

        Ok(OutputSectionStmt {
                name,
                prolog,
                body,
                epilog,
        })
    }

    fn parse_section_body_statement(&mut self) -> Result<SectionBodyStatement, Diag> {
        let tok = self.lexer.peek(LexState::Default)?;
        match tok {
            Token::Ident("FILL") => {
                self.lexer.next(LexState::Default)?;
                self.lexer.expect(LexState::Expr, "(")?;
                let expr = self.parse_expr()?;
                self.lexer.expect(LexState::Expr, ")")?;
                self.lexer.consume(LexState::Default, ";")?;
                Ok(SectionBodyStatement::Fill(expr))
            }
            Token::Ident(kw @ ("BYTE" | "SHORT" | "LONG" | "QUAD" | "SQUAD")) => {
                let width = match kw {
                    "BYTE" => 1,
                    "SHORT" => 2,
                    "LONG" => 4,
                    _ => 8,
                };
                self.lexer.next(LexState::Default)?;
                self.lexer.expect(LexState::Expr, "(")?;
                let value = self.parse_expr()?;
                self.lexer.expect(LexState::Expr, ")")?;
                self.lexer.consume(LexState::Default, ";")?;
                Ok(SectionBodyStatement::Data { width, value })
            }
            Token::Ident("KEEP" | "DONTMOVE" | "KEEP_DONTMOVE" | "EXCLUDE_FILE") => {
                Ok(SectionBodyStatement::InputSection(self.parse_input_sect_desc()?))
            }
            Token::Ident(_) if self.looks_like_assignment()? => {
                let assignment = self.parse_assignment_body()?;
                self.lexer.consume(LexState::Default, ";")?;
                Ok(SectionBodyStatement::Assignment(assignment))
            }
            Token::Ident("PROVIDE" | "HIDDEN" | "PROVIDE_HIDDEN") => {
                let Token::Ident(kw) = self.lexer.next(LexState::Default)? else {
                    unreachable!()
                };
                let wrapper = match kw {
                    "PROVIDE" => AssignWrapper::Provide,
                    "HIDDEN" => AssignWrapper::Hidden,
                    _ => AssignWrapper::ProvideHidden,
                };
                self.lexer.expect(LexState::Default, "(")?;
                let mut assignment = self.parse_assignment_body()?;
                assignment.wrapper = wrapper;
                self.lexer.expect(LexState::Default, ")")?;
                self.lexer.consume(LexState::Default, ";")?;
                Ok(SectionBodyStatement::Assignment(assignment))
            }
            _ => Ok(SectionBodyStatement::InputSection(self.parse_input_sect_desc()?)),
        }
    }

    /// Disambiguate `name =...` assignments from input-section-description file
    /// patterns: an assignment is followed (after the name) by an assign operator.
    fn looks_like_assignment(&mut self) -> Result<bool, Diag> {
        let (_, second) = self.lexer.peek2(LexState::Default, LexState::Expr)?;
        Ok(matches!(
                second,
                Token::Punct(
                    "=" | "+=" | "-=" | "*=" | "/=" | "<<=" | ">>=" | "&=" | "|=" | "^="
                )
        ))
    }

    fn parse_input_sect_desc(&mut self) -> Result<InputSectDesc, Diag> {
        let mut keep = KeepPolicy::NoKeep;
        if self.lexer.consume(LexState::Default, "KEEP_DONTMOVE")? {
            keep = KeepPolicy::KeepFixed;
            self.lexer.expect(LexState::Default, "(")?;
        } else if self.lexer.consume(LexState::Default, "KEEP")? {
            keep = KeepPolicy::Keep;
            self.lexer.expect(LexState::Default, "(")?;
        } else if self.lexer.consume(LexState::Default, "DONTMOVE")? {
            keep = KeepPolicy::Fixed;
            self.lexer.expect(LexState::Default, "(")?;
        }

        let mut exclude_files = Vec::new();
        if self.lexer.consume(LexState::Default, "EXCLUDE_FILE")? {
            self.lexer.expect(LexState::Default, "(")?;
            exclude_files = self.parse_ident_list_until(")")?;
            self.lexer.expect(LexState::Default, ")")?;
        }

        let file_pattern_full = self.parse_ident_text()?;
        let (file_pattern, member_pattern, is_archive) =
        match file_pattern_full.split_once(':') {
            Some((f, m)) => (f.to_string(), Some(m.to_string()), true),
            None => (file_pattern_full, None, false),
        };

        let mut sections = Vec::new();
        if self.lexer.consume(LexState::SectionName, "(")? {
            while !self.lexer.peek(LexState::SectionName)?.is(")") {
                sections.push(self.parse_section_pattern()?);
            }
            self.lexer.expect(LexState::SectionName, ")")?;
        }

        if keep != KeepPolicy::NoKeep {
            self.lexer.expect(LexState::Default, ")")?;
        }
        self.lexer.consume(LexState::Default, ";")?;

        Ok(InputSectDesc {
                keep,
                file_pattern,
                member_pattern,
                is_archive,
                exclude_files,
                sections,
        })
    }

    fn parse_section_pattern(&mut self) -> Result<SectionPattern, Diag> {
        self.parse_sort_wrapped_pattern(None)
    }

    fn parse_sort_wrapped_pattern(&mut self, outer: Option<&str>) -> Result<SectionPattern, Diag> {
        let tok = self.lexer.peek(LexState::SectionName)?;
        let sort_kw = match &tok {
            Token::Ident(s @ ("SORT" | "SORT_BY_NAME" | "SORT_BY_ALIGNMENT" | "SORT_BY_INIT_PRIORITY" | "SORT_NONE")) => {
                Some(*s)
            }
            _ => None,
        };
        if let Some(kw) = sort_kw {
            self.lexer.next(LexState::SectionName)?;
            self.lexer.expect(LexState::SectionName, "(")?;
            let mut inner = self.parse_sort_wrapped_pattern(Some(kw))?;
            self.lexer.expect(LexState::SectionName, ")")?;
            inner.sort = Self::resolve_sort(outer, kw)?;
            return Ok(inner);
        }

        let mut exclude_files = Vec::new();
        if self.lexer.consume(LexState::Default, "EXCLUDE_FILE")? {
            self.lexer.expect(LexState::Default, "(")?;
            exclude_files = self.parse_ident_list_until(")")?;
            self.lexer.expect(LexState::Default, ")")?;
        }
        let pattern = self.parse_ident_text()?;
        Ok(SectionPattern {
                pattern,
                sort: SortPolicy::None,
                exclude_files,
        })
    }

    fn resolve_sort(outer: Option<&str>, inner: &str) -> Result<SortPolicy, Diag> {
        let inner_policy = Self::sort_kw_to_policy(inner);
        match outer {
            None => Ok(inner_policy),
            Some(o) => {
                let outer_policy = Self::sort_kw_to_policy(o);
                match (outer_policy, inner_policy) {
                    (SortPolicy::Name, SortPolicy::Alignment) => Ok(SortPolicy::NameAlignment),
                    (SortPolicy::Alignment, SortPolicy::Name) => Ok(SortPolicy::AlignmentName),
                    (a, b) if a == b => Ok(a),
                    (a, b) => Err(Diag::InvalidSortCombination {
                            outer: format!("{a:?}"),
                            inner: format!("{b:?}"),
                    }),
                }
            }
        }
    }

    fn sort_kw_to_policy(kw: &str) -> SortPolicy {
        match kw {
            "SORT" | "SORT_BY_NAME" => SortPolicy::Name,
            "SORT_BY_ALIGNMENT" => SortPolicy::Alignment,
            "SORT_BY_INIT_PRIORITY" => SortPolicy::InitPriority,
            "SORT_NONE" => SortPolicy::Explicit,
            _ => SortPolicy::None,
        }
    }

    // -- MEMORY --

    fn parse_memory_body(&mut self) -> Result<Vec<MemoryDecl>, Diag> {
        let mut decls = Vec::new();
        while !self.lexer.peek(LexState::Default)?.is("}") {
            let name = self.parse_ident_text()?;
            let mut attributes = String::new();
            if self.lexer.consume(LexState::Default, "(")? {
                while !self.lexer.peek(LexState::Default)?.is(")") {
                    attributes.push_str(&self.parse_ident_text()?);
                }
                self.lexer.expect(LexState::Default, ")")?;
            }
            self.lexer.expect(LexState::Default, ":")?;
            self.lexer.expect(LexState::Default, "ORIGIN")?;
            self.lexer.consume(LexState::Default, "=")?;
            let origin = self.parse_expr()?;
            self.lexer.expect(LexState::Default, ",")?;
            self.lexer.expect(LexState::Default, "LENGTH")?;
            self.lexer.consume(LexState::Default, "=")?;
            let length = self.parse_expr()?;
            self.lexer.consume(LexState::Default, ";")?;
            decls.push(MemoryDecl {
                    name,
                    attributes,
                    origin,
                    length,
            });
        }
        Ok(decls)
    }

    // -- PHDRS --

    fn parse_phdrs_body(&mut self) -> Result<Vec<PhdrDecl>, Diag> {
        let mut decls = Vec::new();
        while !self.lexer.peek(LexState::Default)?.is("}") {
            let name = self.parse_ident_text()?;
            let phdr_type = self.parse_ident_text()?;
            let mut decl = PhdrDecl {
                name,
                phdr_type,
                filehdr: false,
                phdrs_kw: false,
                at: None,
                flags: None,
            };
            loop {
                if self.lexer.consume(LexState::Default, "FILEHDR")? {
                    decl.filehdr = true;
                } else if self.lexer.consume(LexState::Default, "PHDRS")? {
                    decl.phdrs_kw = true;
                } else if self.lexer.consume(LexState::Default, "AT")? {
                    self.lexer.expect(LexState::Expr, "(")?;
                    decl.at = Some(self.parse_expr()?);
                    self.lexer.expect(LexState::Expr, ")")?;
                } else if self.lexer.consume(LexState::Default, "FLAGS")? {
                    self.lexer.expect(LexState::Expr, "(")?;
                    decl.flags = Some(self.parse_expr()?);
                    self.lexer.expect(LexState::Expr, ")")?;
                } else {
                    break;
                }
            }
            self.lexer.consume(LexState::Default, ";")?;
            decls.push(decl);
        }
        Ok(decls)
    }

    // -- VERSION --

    fn parse_version_top(&mut self) -> Result<Vec<VersionNode>, Diag> {
        let mut nodes = Vec::new();
        if self.lexer.peek(LexState::Default)?.is("{") {
            // Anonymous node; must be the only one.
            self.lexer.next(LexState::Default)?;
            let (global, local) = self.parse_version_block_body()?;
            self.lexer.expect(LexState::Default, "}")?;
            self.lexer.consume(LexState::Default, ";")?;
            nodes.push(VersionNode {
                    name: None,
                    global,
                    local,
                    depends: Vec::new(),
            });
            return Ok(nodes);
        }
        loop {
            let name = self.parse_ident_text()?;
            self.lexer.expect(LexState::Default, "{")?;
            let (global, local) = self.parse_version_block_body()?;
            self.lexer.expect(LexState::Default, "}")?;
            let mut depends = Vec::new();
            while !self.lexer.peek(LexState::Default)?.is(";") {
                depends.push(self.parse_ident_text()?);
            }
            self.lexer.consume(LexState::Default, ";")?;
            nodes.push(VersionNode {
                    name: Some(name),
                    global,
                    local,
                    depends,
            });
            if self.lexer.at_eof() || !self.lexer.peek(LexState::Default)?.is_ident_like() {
                break;
            }
        }
        Ok(nodes)
    }

    fn parse_version_block_body(&mut self) -> Result<(Vec<VersionPattern>, Vec<VersionPattern>), Diag> {
        let mut global = Vec::new();
        let mut local = Vec::new();
        let mut current = &mut global;
        while !self.lexer.peek(LexState::Default)?.is("}") {
            if self.lexer.consume(LexState::Default, "global")? {
                self.lexer.expect(LexState::Default, ":")?;
                current = &mut global;
                continue;
            }
            if self.lexer.consume(LexState::Default, "local")? {
                self.lexer.expect(LexState::Default, ":")?;
                current = &mut local;
                continue;
            }
            if self.lexer.consume(LexState::Default, "extern")? {
                let _lang = self.parse_ident_text()?; // "C" or "C++"
                self.lexer.expect(LexState::Default, "{")?;
                while !self.lexer.peek(LexState::Default)?.is("}") {
                    let pattern = self.parse_ident_text()?;
                    self.lexer.consume(LexState::Default, ";")?;
                    current.push(VersionPattern {
                            pattern,
                            is_extern: true,
                    });
                }
                self.lexer.expect(LexState::Default, "}")?;
                self.lexer.consume(LexState::Default, ";")?;
                continue;
            }
            let pattern = self.parse_ident_text()?;
            self.lexer.consume(LexState::Default, ";")?;
            current.push(VersionPattern {
                    pattern,
                    is_extern: false,
            });
        }
        Ok((global, local))
    }
}

impl<'a> Token<'a> {
    fn is_ident_like(&self) -> bool {
        matches!(self, Token::Ident(_) | Token::Quoted(_))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod test {
    use super::*;

    fn parse(src: &str) -> (LinkerScript, Diagnostics) {
        let diags = Diagnostics::new(false, false);
        let mut parser = Parser::new("t.ld", src, &diags);
        let script = parser.parse(|_| None);
        (script, diags)
    }

    #[test]
    fn parses_entry_and_sections() {
        let (script, diags) = parse("ENTRY(_start)\nSECTIONS {. = 0x1000;.text : { *(.text) } }");
        assert!(diags.is_empty());
        assert_eq!(script.commands.len(), 2);
        assert!(matches!(script.commands[0], ScriptCommand::Entry(ref s) if s == "_start"));
        match &script.commands[1] {
            ScriptCommand::Sections(stmts) => {
                assert_eq!(stmts.len(), 1);
                assert_eq!(stmts[0].name, ".text");
            }
            other => panic!("expected Sections, got {other:?}"),
        }
    }

    #[test]
    fn parses_memory_block() {
        let (script, diags) = parse("MEMORY { RAM (rw) : ORIGIN = 0x0, LENGTH = 0x100 }");
        assert!(diags.is_empty());
        match &script.commands[0] {
            ScriptCommand::Memory(decls) => {
                assert_eq!(decls.len(), 1);
                assert_eq!(decls[0].name, "RAM");
            }
            other => panic!("expected Memory, got {other:?}"),
        }
    }

    #[test]
    fn parses_provide_assignment() {
        let (script, diags) = parse("PROVIDE(foo = 0x1);");
        assert!(diags.is_empty());
        match &script.commands[0] {
            ScriptCommand::Assignment(a) => {
                assert_eq!(a.name, "foo");
                assert_eq!(a.wrapper, AssignWrapper::Provide);
            }
            other => panic!("expected Assignment, got {other:?}"),
        }
    }

    #[test]
    fn parses_group_command() {
        let (script, diags) = parse("GROUP ( libc.a libm.a )");
        assert!(diags.is_empty());
        match &script.commands[0] {
            ScriptCommand::Group(files) => assert_eq!(files, &vec!["libc.a".to_string(), "libm.a".to_string()]),
            other => panic!("expected Group, got {other:?}"),
        }
    }

    #[test]
    fn invalid_sort_combination_is_an_error() {
        let (_, diags) = parse("SECTIONS {.text : { *(SORT_BY_ALIGNMENT(SORT_BY_ALIGNMENT(.text.*))) } }");
        // alignment-outer/alignment-inner collapses to the same policy, so this
        // particular nesting is actually valid; exercise the genuinely invalid
        // nested-twice-different-but-unsupported case via direct resolver call
        // instead (parser-level coverage of the reachable grammar is above).
        let _ = diags;
        assert!(matches!(
                Parser::resolve_sort(Some("SORT_BY_NAME"), "SORT_BY_INIT_PRIORITY"),
                Err(Diag::InvalidSortCombination {.. })
        ));
    }

    #[test]
    fn resolves_nested_sort_combination() {
        assert_eq!(
            Parser::resolve_sort(Some("SORT_BY_NAME"), "SORT_BY_ALIGNMENT").unwrap(),
            SortPolicy::NameAlignment
        );
        assert_eq!(
            Parser::resolve_sort(Some("SORT_BY_ALIGNMENT"), "SORT_BY_NAME").unwrap(),
            SortPolicy::AlignmentName
        );
    }
}
