//! Parser for MinnieML source texts.
//!
//! # Architecture
//!
//! The parser reads characters directly through [`cursor::Cursor`]; trivia
//! (whitespace and comments) is skipped between tokens rather than
//! materialized. Expressions are parsed as flat term sequences with no
//! precedence applied; the semantic rewriter turns them into curried
//! application trees later.
//!
//! # Recovery
//!
//! Parsing is total: a malformed member becomes a `ParsingMemberError`
//! node preserving its source text, and parsing resumes at the next
//! plausible member boundary (past a top-level `;`, or at the next
//! declaration keyword). Only an unclosed block comment fails the whole
//! module, because everything after it is swallowed.

mod cursor;
mod members;
mod terms;
mod types;

#[cfg(test)]
mod tests;

use mml_ast::{Member, Module, ParsingIdError, ParsingMemberError, SrcSpan};

use crate::diagnostics::{Diagnostics, ParserError};

pub(crate) use cursor::Checkpoint;
pub(crate) use members::mangle_operator;

use cursor::{Cursor, is_binding_start, is_ident_continue, is_type_start};

/// How a member production gave up.
#[derive(Debug)]
pub(crate) enum Abort {
    /// Malformed member; recover at the next boundary.
    Member { message: String, span: SrcSpan },
    /// An identifier that breaks the lexical rules.
    InvalidId {
        lexeme: String,
        message: String,
        span: SrcSpan,
    },
    /// The rest of the module is unparseable.
    Fatal { message: String, span: SrcSpan },
}

pub(crate) type PResult<T> = Result<T, Abort>;

/// Parses a source text into a module. Total: syntax errors become error
/// members plus diagnostics, never a failed return.
pub fn parse(source: &str, module_name: &str) -> (Module, Diagnostics) {
    let mut parser = Parser::new(source);
    let module = parser.parse_module(module_name);
    (module, parser.diag)
}

pub(crate) struct Parser {
    pub(crate) cur: Cursor,
    pub(crate) diag: Diagnostics,
}

const MEMBER_KEYWORDS: &[&str] = &["let", "fn", "op", "type", "struct", "module"];

impl Parser {
    fn new(source: &str) -> Self {
        Self {
            cur: Cursor::new(source),
            diag: Diagnostics::new(),
        }
    }

    fn parse_module(&mut self, default_name: &str) -> Module {
        let mut module = Module::new(default_name);

        let mut pending_doc = match self.trivia() {
            Ok(doc) => doc,
            Err(fatal) => {
                self.report_fatal(fatal);
                return module;
            }
        };

        // Optional `module Name =` header; the header name wins.
        if self.cur.at_word("module") {
            self.cur.eat_word("module");
            if let Err(fatal) = self.trivia() {
                self.report_fatal(fatal);
                return module;
            }
            if let Some(name) = self.lex_type_ident() {
                module.name = name;
            }
            let _ = self.trivia();
            self.cur.eat_char('=');
            module.doc_comment = pending_doc.take();
        }

        loop {
            let doc = match self.trivia() {
                Ok(doc) => doc.or(pending_doc.take()),
                Err(fatal) => {
                    self.report_fatal(fatal);
                    break;
                }
            };
            if self.cur.at_eof() {
                break;
            }
            // A stray or module-closing `;` between members.
            if self.cur.eat_char(';') {
                continue;
            }

            let start = self.cur.checkpoint();
            match self.parse_member(doc) {
                Ok(parsed) => module.members.extend(parsed),
                Err(Abort::Fatal { message, span }) => {
                    self.diag.error(ParserError::Failure { message, span });
                    break;
                }
                Err(abort) => {
                    let member = self.recover_member(start, abort);
                    module.members.push(member);
                }
            }
        }

        module
    }

    fn report_fatal(&mut self, span: SrcSpan) {
        self.diag.error(ParserError::Failure {
            message: "unclosed block comment".to_owned(),
            span,
        });
    }

    /// Consumes to the next member boundary and wraps what was consumed in
    /// an error member.
    fn recover_member(&mut self, start: Checkpoint, abort: Abort) -> Member {
        loop {
            if self.trivia().is_err() || self.cur.at_eof() {
                break;
            }
            if self.at_member_keyword() {
                break;
            }
            if self.cur.eat_char(';') {
                break;
            }
            self.cur.bump();
        }

        let failed_code = self.cur.slice_from(start).trim().to_owned();
        let span = self.cur.span_from(start);
        match abort {
            Abort::InvalidId { lexeme, message, span } => Member::IdError(ParsingIdError {
                invalid_id: lexeme,
                message,
                span,
            }),
            Abort::Member { message, span: err_span } => Member::ParseError(ParsingMemberError {
                failed_code,
                message,
                span: span.merge(err_span),
            }),
            Abort::Fatal { message, span } => Member::ParseError(ParsingMemberError {
                failed_code,
                message,
                span,
            }),
        }
    }

    pub(crate) fn at_member_keyword(&self) -> bool {
        MEMBER_KEYWORDS.iter().any(|kw| self.cur.at_word(kw))
    }

    /// Member keywords that terminate a binding body (`let` continues a
    /// statement sequence instead).
    pub(crate) fn at_body_terminator_keyword(&self) -> bool {
        ["fn", "op", "type", "struct", "module"]
            .iter()
            .any(|kw| self.cur.at_word(kw))
    }

    pub(crate) fn trivia(&mut self) -> Result<Option<String>, SrcSpan> {
        self.cur.skip_trivia()
    }

    /// Skips trivia, turning an unclosed comment into a fatal abort.
    pub(crate) fn trivia_or_abort(&mut self) -> PResult<Option<String>> {
        self.trivia().map_err(|span| Abort::Fatal {
            message: "unclosed block comment".to_owned(),
            span,
        })
    }

    /// Lexes a lowercase/underscore-led identifier. Returns `None` when the
    /// cursor is not at one.
    pub(crate) fn lex_binding_ident(&mut self) -> Option<String> {
        if !self.cur.peek().is_some_and(is_binding_start) {
            return None;
        }
        let mut out = String::new();
        while let Some(c) = self.cur.peek() {
            if is_ident_continue(c) {
                out.push(c);
                self.cur.bump();
            } else {
                break;
            }
        }
        Some(out)
    }

    pub(crate) fn lex_type_ident(&mut self) -> Option<String> {
        if !self.cur.peek().is_some_and(is_type_start) {
            return None;
        }
        let mut out = String::new();
        while let Some(c) = self.cur.peek() {
            if c.is_ascii_alphanumeric() {
                out.push(c);
                self.cur.bump();
            } else {
                break;
            }
        }
        Some(out)
    }

    /// Expects a binding identifier; a digit-led lexeme aborts with the
    /// invalid-identifier flavor so it surfaces as a `ParsingIdError`.
    pub(crate) fn expect_binding_ident(&mut self, what: &str) -> PResult<String> {
        let start = self.cur.checkpoint();
        if self.cur.peek().is_some_and(|c| c.is_ascii_digit()) {
            let mut lexeme = String::new();
            while let Some(c) = self.cur.peek() {
                if is_ident_continue(c) {
                    lexeme.push(c);
                    self.cur.bump();
                } else {
                    break;
                }
            }
            return Err(Abort::InvalidId {
                message: format!("`{lexeme}` cannot start with a digit"),
                lexeme,
                span: self.cur.span_from(start),
            });
        }
        self.lex_binding_ident().ok_or_else(|| Abort::Member {
            message: format!("expected {what}"),
            span: self.cur.span_from(start),
        })
    }

    pub(crate) fn expect_char(&mut self, c: char, context: &str) -> PResult<()> {
        self.trivia_or_abort()?;
        if self.cur.eat_char(c) {
            Ok(())
        } else {
            Err(Abort::Member {
                message: format!("expected `{c}` {context}"),
                span: SrcSpan::new(self.cur.point(), self.cur.point()),
            })
        }
    }
}
