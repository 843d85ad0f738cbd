//! Expression productions.
//!
//! Expressions come out flat: `a + b * 3` is a five-term sequence, and the
//! semantic rewriter applies precedence later. Binding bodies are
//! `;`-separated statement sequences; a `let` statement scopes over the
//! rest of its sequence and therefore requires a continuation.

use mml_ast::{
    Cond, Expr, LetBind, LiteralBool, LiteralFloat, LiteralInt, LiteralString, LiteralUnit,
    MemEffect, NativeImpl, Placeholder, Ref, Seq, SourceOrigin, SrcSpan, Term, TermError,
    TermGroup, TermTuple,
};

use super::cursor::{RESERVED, is_binding_start, is_ident_continue, is_operator_char, is_type_start};
use super::{Abort, PResult, Parser};

impl Parser {
    /// Parses a binding body: one or more `;`-separated statements.
    ///
    /// Returns the body and whether the terminating `;` was consumed. The
    /// sequence continues past a `;` when the next token starts a term, or
    /// starts a `let` while a local binding is open; it stops at a
    /// declaration keyword or end of input.
    pub(crate) fn parse_body(&mut self) -> PResult<(Expr, bool)> {
        self.trivia_or_abort()?;
        let start = self.cur.checkpoint();
        let mut items: Vec<Expr> = Vec::new();
        let mut open_lets = 0usize;
        let terminated;

        loop {
            self.trivia_or_abort()?;

            if self.cur.at_word("let") {
                items.push(self.parse_let_stmt()?);
                open_lets += 1;
                self.trivia_or_abort()?;
                if self.cur.at_eof() || self.at_body_terminator_keyword() {
                    return Err(Abort::Member {
                        message: "binding body cannot end with a local binding".to_owned(),
                        span: self.cur.span_from(start),
                    });
                }
                continue;
            }

            items.push(self.parse_expr()?);
            self.trivia_or_abort()?;
            if !self.cur.eat_char(';') {
                terminated = false;
                break;
            }

            // Peek past trivia to decide whether the sequence continues;
            // the checkpoint keeps doc comments intact for the next member.
            let cp = self.cur.checkpoint();
            self.trivia_or_abort()?;
            let continues = !self.cur.at_eof()
                && !self.at_body_terminator_keyword()
                && !(self.cur.at_word("let") && open_lets == 0)
                && self.at_statement_start();
            self.cur.restore(cp);
            if continues {
                continue;
            }
            terminated = true;
            break;
        }

        let span = self.cur.span_from(start);
        let expr = if items.len() == 1 {
            items.pop().expect("one item")
        } else {
            Expr::new(vec![Term::Seq(Seq {
                items,
                span,
                type_spec: None,
            })], span)
        };
        Ok((expr, terminated))
    }

    fn parse_let_stmt(&mut self) -> PResult<Expr> {
        let start = self.cur.checkpoint();
        self.cur.eat_word("let");
        self.trivia_or_abort()?;
        let name = self.expect_binding_ident("a binding name")?;
        self.trivia_or_abort()?;
        let type_asc = if self.cur.eat_char(':') {
            self.trivia_or_abort()?;
            Some(self.parse_type()?)
        } else {
            None
        };
        self.expect_char('=', "in local binding")?;
        let value = self.parse_expr()?;
        self.trivia_or_abort()?;
        if !self.cur.eat_char(';') {
            return Err(Abort::Member {
                message: "expected `;` after local binding".to_owned(),
                span: SrcSpan::new(self.cur.point(), self.cur.point()),
            });
        }
        let span = self.cur.span_from(start);
        Ok(Expr::new(
            vec![Term::Let(LetBind {
                name,
                id: None,
                value: Box::new(value),
                span,
                type_asc,
                type_spec: None,
                source: SourceOrigin::Source,
            })],
            span,
        ))
    }

    /// A single expression: a flat run of terms, precedence unapplied.
    pub(crate) fn parse_expr(&mut self) -> PResult<Expr> {
        self.trivia_or_abort()?;
        let start = self.cur.checkpoint();
        let mut end = self.cur.point();
        let mut terms = Vec::new();
        loop {
            self.trivia_or_abort()?;
            if self.at_expr_stop() {
                break;
            }
            terms.push(self.parse_term()?);
            end = self.cur.point();
        }
        if terms.is_empty() {
            return Err(Abort::Member {
                message: "expected an expression".to_owned(),
                span: SrcSpan::new(self.cur.point(), self.cur.point()),
            });
        }
        Ok(Expr::new(
            terms,
            SrcSpan::new(super::cursor::Cursor::point_of(start), end),
        ))
    }

    fn at_expr_stop(&self) -> bool {
        match self.cur.peek() {
            None => true,
            Some(';') | Some(')') | Some(',') | Some('}') => true,
            Some(_) => ["then", "else", "end", "let", "fn", "op", "type", "struct", "module",
                "match"]
            .iter()
            .any(|kw| self.cur.at_word(kw)),
        }
    }

    fn at_statement_start(&self) -> bool {
        if self.cur.at_word("let") {
            return true;
        }
        if self.at_expr_stop() {
            return false;
        }
        match self.cur.peek() {
            Some(c) => {
                c == '"'
                    || c.is_ascii_digit()
                    || c == '('
                    || c == '@'
                    || (c == '.' && self.cur.peek_at(1).is_some_and(|d| d.is_ascii_digit()))
                    || is_binding_start(c)
                    || is_type_start(c)
                    || is_operator_char(c)
            }
            None => false,
        }
    }

    fn parse_term(&mut self) -> PResult<Term> {
        let start = self.cur.checkpoint();
        let Some(c) = self.cur.peek() else {
            return Err(Abort::Member {
                message: "expected a term".to_owned(),
                span: SrcSpan::new(self.cur.point(), self.cur.point()),
            });
        };

        if c == '"' {
            return self.parse_string();
        }
        if c.is_ascii_digit() || (c == '.' && self.cur.peek_at(1).is_some_and(|d| d.is_ascii_digit()))
        {
            return self.parse_number();
        }
        if c == '(' {
            return self.parse_parens();
        }
        if self.cur.at_word("if") {
            return self.parse_cond();
        }
        if self.cur.at_word("true") || self.cur.at_word("false") {
            let value = self.cur.eat_word("true");
            if !value {
                self.cur.eat_word("false");
            }
            return Ok(Term::LiteralBool(LiteralBool {
                value,
                span: self.cur.span_from(start),
            }));
        }
        if c == '@' {
            let attrs = self.parse_native_marker()?;
            let mem_effect = match attrs.mem.as_deref() {
                Some("alloc") => MemEffect::Alloc,
                Some("static") => MemEffect::Static,
                _ => MemEffect::NoAlloc,
            };
            return Ok(Term::Native(NativeImpl {
                mem_effect,
                template: None,
                span: self.cur.span_from(start),
            }));
        }
        if is_binding_start(c) {
            return self.parse_ref_or_placeholder(start);
        }
        if is_type_start(c) {
            let name = self.lex_type_ident().expect("type ident start");
            let r = Ref::named(name, self.cur.span_from(start));
            return Ok(Term::Ref(r));
        }
        if is_operator_char(c) {
            let mut name = String::new();
            while let Some(oc) = self.cur.peek() {
                if is_operator_char(oc) {
                    name.push(oc);
                    self.cur.bump();
                } else {
                    break;
                }
            }
            if name == "???" {
                return Ok(Term::Hole(mml_ast::Hole {
                    span: self.cur.span_from(start),
                    type_spec: None,
                }));
            }
            return Ok(Term::Ref(Ref::named(name, self.cur.span_from(start))));
        }

        Err(Abort::Member {
            message: format!("unexpected character `{c}`"),
            span: SrcSpan::new(self.cur.point(), self.cur.point()),
        })
    }

    fn parse_ref_or_placeholder(&mut self, start: super::Checkpoint) -> PResult<Term> {
        let name = self.lex_binding_ident().expect("binding ident start");
        if name == "_" {
            return Ok(Term::Placeholder(Placeholder {
                span: self.cur.span_from(start),
            }));
        }
        if RESERVED.contains(&name.as_str()) {
            return Err(Abort::Member {
                message: format!("keyword `{name}` cannot appear in an expression"),
                span: self.cur.span_from(start),
            });
        }

        let mut r = Ref::named(name, self.cur.span_from(start));
        while self.cur.peek() == Some('.')
            && self.cur.peek_at(1).is_some_and(is_binding_start)
        {
            self.cur.bump(); // '.'
            let field = self.lex_binding_ident().expect("binding ident start");
            let mut outer = Ref::named(field, self.cur.span_from(start));
            outer.qualifier = Some(Box::new(r));
            r = outer;
        }
        Ok(Term::Ref(r))
    }

    fn parse_string(&mut self) -> PResult<Term> {
        let start = self.cur.checkpoint();
        self.cur.bump(); // '"'
        let mut value = String::new();
        loop {
            match self.cur.peek() {
                Some('"') => {
                    self.cur.bump();
                    break;
                }
                Some(_) => {
                    if let Some(c) = self.cur.bump() {
                        value.push(c);
                    }
                }
                None => {
                    return Err(Abort::Member {
                        message: "unterminated string literal".to_owned(),
                        span: self.cur.span_from(start),
                    });
                }
            }
        }
        Ok(Term::LiteralString(LiteralString {
            value,
            span: self.cur.span_from(start),
        }))
    }

    fn parse_number(&mut self) -> PResult<Term> {
        let start = self.cur.checkpoint();
        let mut text = String::new();
        let mut is_float = false;

        if self.cur.peek() == Some('.') {
            is_float = true;
            text.push('.');
            self.cur.bump();
        }
        while let Some(c) = self.cur.peek() {
            if c.is_ascii_digit() {
                text.push(c);
                self.cur.bump();
            } else {
                break;
            }
        }
        if !is_float
            && self.cur.peek() == Some('.')
            && self.cur.peek_at(1).is_some_and(|c| c.is_ascii_digit())
        {
            is_float = true;
            text.push('.');
            self.cur.bump();
            while let Some(c) = self.cur.peek() {
                if c.is_ascii_digit() {
                    text.push(c);
                    self.cur.bump();
                } else {
                    break;
                }
            }
        }

        // `123abc` is not a number and not an identifier either.
        if self.cur.peek().is_some_and(is_ident_continue) {
            while let Some(c) = self.cur.peek() {
                if is_ident_continue(c) {
                    text.push(c);
                    self.cur.bump();
                } else {
                    break;
                }
            }
            return Ok(Term::Error(TermError {
                message: format!("`{text}` is not a valid number or identifier"),
                failed_code: text,
                span: self.cur.span_from(start),
            }));
        }

        let span = self.cur.span_from(start);
        if is_float {
            match text.parse::<f64>() {
                Ok(value) => Ok(Term::LiteralFloat(LiteralFloat { value, span })),
                Err(_) => Ok(Term::Error(TermError {
                    message: format!("`{text}` is not a valid float literal"),
                    failed_code: text,
                    span,
                })),
            }
        } else {
            match text.parse::<i64>() {
                Ok(value) => Ok(Term::LiteralInt(LiteralInt { value, span })),
                Err(_) => Ok(Term::Error(TermError {
                    message: format!("integer literal `{text}` is out of range"),
                    failed_code: text,
                    span,
                })),
            }
        }
    }

    fn parse_parens(&mut self) -> PResult<Term> {
        let start = self.cur.checkpoint();
        self.cur.bump(); // '('
        self.trivia_or_abort()?;
        if self.cur.eat_char(')') {
            return Ok(Term::LiteralUnit(LiteralUnit {
                span: self.cur.span_from(start),
            }));
        }

        let mut items = vec![self.parse_expr()?];
        loop {
            self.trivia_or_abort()?;
            if self.cur.eat_char(',') {
                items.push(self.parse_expr()?);
                continue;
            }
            if self.cur.eat_char(')') {
                break;
            }
            return Err(Abort::Member {
                message: "expected `)`".to_owned(),
                span: SrcSpan::new(self.cur.point(), self.cur.point()),
            });
        }

        let span = self.cur.span_from(start);
        if items.len() == 1 {
            Ok(Term::Group(TermGroup {
                inner: Box::new(items.pop().expect("one item")),
                span,
                type_spec: None,
            }))
        } else {
            Ok(Term::Tuple(TermTuple {
                items,
                span,
                type_spec: None,
            }))
        }
    }

    fn parse_cond(&mut self) -> PResult<Term> {
        let start = self.cur.checkpoint();
        self.cur.eat_word("if");
        let cond = self.parse_expr()?;
        self.trivia_or_abort()?;
        if !self.cur.eat_word("then") {
            return Err(Abort::Member {
                message: "expected `then` in conditional".to_owned(),
                span: SrcSpan::new(self.cur.point(), self.cur.point()),
            });
        }
        let if_true = self.parse_expr()?;
        self.trivia_or_abort()?;
        if !self.cur.eat_word("else") {
            return Err(Abort::Member {
                message: "expected `else` in conditional".to_owned(),
                span: SrcSpan::new(self.cur.point(), self.cur.point()),
            });
        }
        let if_false = self.parse_expr()?;
        self.trivia_or_abort()?;
        self.cur.eat_word("end");
        Ok(Term::Cond(Cond {
            cond: Box::new(cond),
            if_true: Box::new(if_true),
            if_false: Box::new(if_false),
            span: self.cur.span_from(start),
            type_spec: None,
        }))
    }
}
