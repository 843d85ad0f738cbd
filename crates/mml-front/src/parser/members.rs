//! Member productions: `let`, `fn`, `op`, `type`, and `struct`.

use indexmap::IndexMap;

use mml_ast::{
    Associativity, BindingArity, BindingMeta, BindingOrigin, Bnd, DataConstructor, Expr, Field,
    FnParam, Lambda, Member, NativeRep, SourceOrigin, SrcSpan, Term, Type, TypeAlias, TypeDef,
    TypeRef, TypeStruct, Visibility,
};

use crate::stdlib::FN_PRECEDENCE;

use super::cursor::{RESERVED, is_operator_char};
use super::{Abort, PResult, Parser};

impl Parser {
    pub(crate) fn parse_member(&mut self, doc: Option<String>) -> PResult<Vec<Member>> {
        if self.cur.at_word("let") {
            return Ok(vec![self.parse_let(doc)?]);
        }
        if self.cur.at_word("fn") {
            return Ok(vec![self.parse_fn(doc)?]);
        }
        if self.cur.at_word("op") {
            return Ok(vec![self.parse_op(doc)?]);
        }
        if self.cur.at_word("type") {
            return Ok(vec![self.parse_type_decl(doc)?]);
        }
        if self.cur.at_word("struct") {
            return self.parse_struct(doc);
        }

        let here = self.cur.point();
        if self.cur.peek().is_some_and(|c| c.is_ascii_digit()) {
            // Something like `123invalid` where a declaration should start.
            self.expect_binding_ident("a declaration")?;
        }
        Err(Abort::Member {
            message: "expected a declaration (`let`, `fn`, `op`, `type`, or `struct`)".to_owned(),
            span: SrcSpan::new(here, here),
        })
    }

    fn parse_let(&mut self, doc: Option<String>) -> PResult<Member> {
        let start = self.cur.checkpoint();
        self.cur.eat_word("let");
        self.trivia_or_abort()?;
        let name = self.expect_binding_ident("a binding name")?;
        self.check_not_reserved(&name, start)?;

        self.trivia_or_abort()?;
        let type_asc = if self.cur.eat_char(':') {
            self.trivia_or_abort()?;
            Some(self.parse_type()?)
        } else {
            None
        };

        self.expect_char('=', "in binding")?;
        let (value, terminated) = self.parse_body()?;
        if !terminated {
            self.expect_member_end()?;
        }

        Ok(Member::Bnd(Bnd {
            id: None,
            name,
            value,
            type_asc,
            type_spec: None,
            meta: None,
            doc_comment: doc,
            visibility: Visibility::Public,
            span: self.cur.span_from(start),
            source: SourceOrigin::Source,
        }))
    }

    fn parse_fn(&mut self, doc: Option<String>) -> PResult<Member> {
        let start = self.cur.checkpoint();
        self.cur.eat_word("fn");
        self.trivia_or_abort()?;
        let name = self.expect_binding_ident("a function name")?;
        self.check_not_reserved(&name, start)?;

        let params = self.parse_params()?;
        self.trivia_or_abort()?;
        let ret = if self.cur.eat_char(':') {
            self.trivia_or_abort()?;
            Some(self.parse_type()?)
        } else {
            None
        };

        self.expect_char('=', "in function definition")?;
        let (body, terminated) = self.parse_body()?;
        if !terminated {
            self.expect_member_end()?;
        }

        let span = self.cur.span_from(start);
        let arity = BindingArity::of(params.len());
        let mut lambda = Lambda::new(params, body, span);
        lambda.type_asc = ret;

        Ok(Member::Bnd(Bnd {
            id: None,
            name: name.clone(),
            value: Expr::single(Term::Lambda(lambda)),
            type_asc: None,
            type_spec: None,
            meta: Some(BindingMeta {
                origin: BindingOrigin::Function,
                arity,
                precedence: FN_PRECEDENCE,
                assoc: Associativity::Left,
                original_name: name.clone(),
                mangled_name: name,
            }),
            doc_comment: doc,
            visibility: Visibility::Public,
            span,
            source: SourceOrigin::Source,
        }))
    }

    fn parse_op(&mut self, doc: Option<String>) -> PResult<Member> {
        let start = self.cur.checkpoint();
        self.cur.eat_word("op");
        self.trivia_or_abort()?;
        let name = self.lex_operator_name().ok_or_else(|| Abort::Member {
            message: "expected an operator name".to_owned(),
            span: SrcSpan::new(self.cur.point(), self.cur.point()),
        })?;

        let params = self.parse_params()?;
        if params.is_empty() || params.len() > 2 {
            return Err(Abort::Member {
                message: format!(
                    "operator `{name}` must take one or two parameters, found {}",
                    params.len()
                ),
                span: self.cur.span_from(start),
            });
        }

        self.trivia_or_abort()?;
        let ret = if self.cur.eat_char(':') {
            self.trivia_or_abort()?;
            Some(self.parse_type()?)
        } else {
            None
        };

        self.trivia_or_abort()?;
        let declared_prec = self.lex_int_literal();
        self.trivia_or_abort()?;
        let declared_assoc = if self.cur.eat_word("left") {
            Some(Associativity::Left)
        } else if self.cur.eat_word("right") {
            Some(Associativity::Right)
        } else {
            None
        };

        self.expect_char('=', "in operator definition")?;
        let (body, terminated) = self.parse_body()?;
        if !terminated {
            self.expect_member_end()?;
        }

        let span = self.cur.span_from(start);
        let arity = if params.len() == 1 {
            BindingArity::Unary
        } else {
            BindingArity::Binary
        };
        let (default_prec, default_assoc) = match arity {
            BindingArity::Unary => (95, Associativity::Right),
            _ => (50, Associativity::Left),
        };
        let precedence = declared_prec.unwrap_or(default_prec);
        let assoc = declared_assoc.unwrap_or(default_assoc);

        let mangled = mangle_operator(&name, params.len());
        let mut lambda = Lambda::new(params, body, span);
        lambda.type_asc = ret;

        Ok(Member::Bnd(Bnd {
            id: None,
            name: mangled.clone(),
            value: Expr::single(Term::Lambda(lambda)),
            type_asc: None,
            type_spec: None,
            meta: Some(BindingMeta {
                origin: BindingOrigin::Operator,
                arity,
                precedence,
                assoc,
                original_name: name,
                mangled_name: mangled,
            }),
            doc_comment: doc,
            visibility: Visibility::Public,
            span,
            source: SourceOrigin::Source,
        }))
    }

    fn parse_type_decl(&mut self, doc: Option<String>) -> PResult<Member> {
        let start = self.cur.checkpoint();
        self.cur.eat_word("type");
        self.trivia_or_abort()?;
        let name = self.expect_type_name()?;
        self.expect_char('=', "in type declaration")?;
        self.trivia_or_abort()?;

        if self.cur.at_word("@native") || (self.cur.peek() == Some('@')) {
            let (rep, heap) = self.parse_native_type_rep()?;
            self.expect_member_end()?;
            return Ok(Member::TypeDef(TypeDef {
                name,
                id: None,
                rep,
                heap,
                doc_comment: doc,
                visibility: Visibility::Public,
                span: self.cur.span_from(start),
                source: SourceOrigin::Source,
            }));
        }

        let aliased = self.parse_type()?;
        self.expect_member_end()?;
        Ok(Member::TypeAlias(TypeAlias {
            name,
            id: None,
            aliased,
            type_spec: None,
            doc_comment: doc,
            visibility: Visibility::Public,
            span: self.cur.span_from(start),
            source: SourceOrigin::Source,
        }))
    }

    fn parse_struct(&mut self, doc: Option<String>) -> PResult<Vec<Member>> {
        let start = self.cur.checkpoint();
        self.cur.eat_word("struct");
        self.trivia_or_abort()?;
        let name = self.expect_type_name()?;

        self.expect_char('{', "to open the field list")?;
        let mut fields: Vec<Field> = Vec::new();
        loop {
            self.trivia_or_abort()?;
            if self.cur.eat_char('}') {
                break;
            }
            let fstart = self.cur.checkpoint();
            let fname = self.expect_binding_ident("a field name")?;
            self.expect_char(':', "after the field name")?;
            self.trivia_or_abort()?;
            let fty = self.parse_type()?;
            fields.push(Field {
                name: fname,
                id: None,
                type_asc: fty,
                type_spec: None,
                span: self.cur.span_from(fstart),
                source: SourceOrigin::Source,
            });
            self.trivia_or_abort()?;
            if self.cur.eat_char(',') {
                continue;
            }
            self.expect_char('}', "to close the field list")?;
            break;
        }
        self.expect_member_end()?;

        if fields.is_empty() {
            return Err(Abort::Member {
                message: format!("struct `{name}` needs at least one field"),
                span: self.cur.span_from(start),
            });
        }

        let span = self.cur.span_from(start);
        let ctor = synthesize_constructor(&name, &fields);
        Ok(vec![
            Member::TypeStruct(TypeStruct {
                name,
                id: None,
                fields,
                doc_comment: doc,
                visibility: Visibility::Public,
                span,
                source: SourceOrigin::Source,
            }),
            ctor,
        ])
    }

    fn expect_type_name(&mut self) -> PResult<String> {
        let start = self.cur.checkpoint();
        if self.cur.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.expect_binding_ident("a type name")?;
        }
        self.lex_type_ident().ok_or_else(|| Abort::Member {
            message: "expected a type name (capitalized)".to_owned(),
            span: self.cur.span_from(start),
        })
    }

    fn check_not_reserved(&self, name: &str, start: super::Checkpoint) -> PResult<()> {
        if RESERVED.contains(&name) {
            return Err(Abort::Member {
                message: format!("`{name}` is a reserved word"),
                span: self.cur.span_from(start),
            });
        }
        Ok(())
    }

    pub(crate) fn parse_params(&mut self) -> PResult<Vec<FnParam>> {
        self.expect_char('(', "to open the parameter list")?;
        let mut params = Vec::new();
        self.trivia_or_abort()?;
        if self.cur.eat_char(')') {
            return Ok(params);
        }
        loop {
            self.trivia_or_abort()?;
            let pstart = self.cur.checkpoint();
            let consuming = self.cur.eat_char('~');
            let name = self.expect_binding_ident("a parameter name")?;
            self.trivia_or_abort()?;
            let type_asc = if self.cur.eat_char(':') {
                self.trivia_or_abort()?;
                Some(self.parse_type()?)
            } else {
                None
            };
            params.push(FnParam {
                name,
                id: None,
                type_asc,
                type_spec: None,
                consuming,
                span: self.cur.span_from(pstart),
                source: SourceOrigin::Source,
            });
            self.trivia_or_abort()?;
            if self.cur.eat_char(',') {
                continue;
            }
            self.expect_char(')', "to close the parameter list")?;
            break;
        }
        Ok(params)
    }

    fn lex_operator_name(&mut self) -> Option<String> {
        if self.cur.peek().is_some_and(is_operator_char) {
            let mut out = String::new();
            while let Some(c) = self.cur.peek() {
                if is_operator_char(c) {
                    out.push(c);
                    self.cur.bump();
                } else {
                    break;
                }
            }
            return Some(out);
        }
        self.lex_binding_ident()
    }

    pub(crate) fn lex_int_literal(&mut self) -> Option<u32> {
        if !self.cur.peek().is_some_and(|c| c.is_ascii_digit()) {
            return None;
        }
        let mut digits = String::new();
        while let Some(c) = self.cur.peek() {
            if c.is_ascii_digit() {
                digits.push(c);
                self.cur.bump();
            } else {
                break;
            }
        }
        digits.parse().ok()
    }

    /// `@native` with an optional `[k=v, ...]` attribute list and optional
    /// `{ field: Type, ... }` struct block.
    fn parse_native_type_rep(&mut self) -> PResult<(NativeRep, bool)> {
        let attrs = self.parse_native_marker()?;
        self.trivia_or_abort()?;

        if self.cur.eat_char('{') {
            let mut fields = IndexMap::new();
            loop {
                self.trivia_or_abort()?;
                if self.cur.eat_char('}') {
                    break;
                }
                let fname = self.expect_binding_ident("a field name")?;
                self.expect_char(':', "after the field name")?;
                self.trivia_or_abort()?;
                let fty = self.parse_type()?;
                fields.insert(fname, fty);
                self.trivia_or_abort()?;
                if self.cur.eat_char(',') {
                    continue;
                }
                self.expect_char('}', "to close the native struct")?;
                break;
            }
            let heap = attrs.mem.as_deref() == Some("heap");
            return Ok((NativeRep::Struct { fields }, heap));
        }

        let heap = attrs.mem.as_deref() == Some("heap");
        match attrs.t {
            Some(t) if t.starts_with('*') => Ok((
                NativeRep::Pointer {
                    pointee: t[1..].to_owned(),
                },
                heap,
            )),
            Some(t) => Ok((NativeRep::Primitive { llvm: t }, heap)),
            None => Err(Abort::Member {
                message: "native type needs `t=...` or a struct block".to_owned(),
                span: SrcSpan::new(self.cur.point(), self.cur.point()),
            }),
        }
    }

    /// Consumes `@native` plus its attribute list, if any.
    pub(crate) fn parse_native_marker(&mut self) -> PResult<NativeAttrs> {
        let start = self.cur.checkpoint();
        self.cur.eat_char('@');
        if !self.cur.eat_word("native") {
            return Err(Abort::Member {
                message: "expected `@native`".to_owned(),
                span: self.cur.span_from(start),
            });
        }
        let mut attrs = NativeAttrs::default();
        if self.cur.eat_char('[') {
            loop {
                self.trivia_or_abort()?;
                if self.cur.eat_char(']') {
                    break;
                }
                let key = self.expect_binding_ident("an attribute name")?;
                self.expect_char('=', "in attribute")?;
                self.trivia_or_abort()?;
                let mut value = String::new();
                while let Some(c) = self.cur.peek() {
                    if c == ',' || c == ']' || c.is_whitespace() {
                        break;
                    }
                    value.push(c);
                    self.cur.bump();
                }
                match key.as_str() {
                    "t" => attrs.t = Some(value),
                    "mem" => attrs.mem = Some(value),
                    _ => {}
                }
                self.trivia_or_abort()?;
                if self.cur.eat_char(',') {
                    continue;
                }
                self.expect_char(']', "to close the attribute list")?;
                break;
            }
        }
        Ok(attrs)
    }

    pub(crate) fn expect_member_end(&mut self) -> PResult<()> {
        self.trivia_or_abort()?;
        if self.cur.eat_char(';') {
            Ok(())
        } else {
            Err(Abort::Member {
                message: "expected `;` to end the declaration".to_owned(),
                span: SrcSpan::new(self.cur.point(), self.cur.point()),
            })
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct NativeAttrs {
    pub t: Option<String>,
    pub mem: Option<String>,
}

/// Struct constructors are synthesized while parsing: construction is a
/// plain curried call of `__mk_<Struct>`, resolvable under the struct's
/// surface name.
fn synthesize_constructor(struct_name: &str, fields: &[Field]) -> Member {
    let mangled = format!("__mk_{struct_name}");
    let params: Vec<FnParam> = fields
        .iter()
        .map(|f| FnParam {
            name: f.name.clone(),
            id: None,
            type_asc: Some(f.type_asc.clone()),
            type_spec: None,
            consuming: false,
            span: SrcSpan::synthetic(),
            source: SourceOrigin::Synth,
        })
        .collect();

    let body = Expr::single(Term::DataConstructor(DataConstructor {
        struct_name: struct_name.to_owned(),
        span: SrcSpan::synthetic(),
    }));
    let arity = BindingArity::of(params.len());
    let mut lambda = Lambda::new(params, body, SrcSpan::synthetic());
    lambda.type_asc = Some(Type::Ref(TypeRef::named(
        struct_name,
        SrcSpan::synthetic(),
    )));

    Member::Bnd(Bnd {
        id: None,
        name: mangled.clone(),
        value: Expr::single(Term::Lambda(lambda)),
        type_asc: None,
        type_spec: None,
        meta: Some(BindingMeta {
            origin: BindingOrigin::Constructor,
            arity,
            precedence: FN_PRECEDENCE,
            assoc: Associativity::Left,
            original_name: struct_name.to_owned(),
            mangled_name: mangled,
        }),
        doc_comment: None,
        visibility: Visibility::Public,
        span: SrcSpan::synthetic(),
        source: SourceOrigin::Synth,
    })
}

/// Operator names mangle their arity in so unary and binary forms of the
/// same symbol share the module namespace without colliding: `-` becomes
/// `op.minus.1` or `op.minus.2`.
pub(crate) fn mangle_operator(name: &str, arity: usize) -> String {
    let stem: String = if name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        name.to_owned()
    } else {
        name.chars().map(symbol_word).collect()
    };
    format!("op.{stem}.{arity}")
}

fn symbol_word(c: char) -> &'static str {
    match c {
        '=' => "eq",
        '!' => "bang",
        '#' => "hash",
        '$' => "dollar",
        '%' => "percent",
        '^' => "caret",
        '&' => "amp",
        '*' => "star",
        '+' => "plus",
        '<' => "lt",
        '>' => "gt",
        '?' => "quest",
        '/' => "slash",
        '\\' => "bslash",
        '|' => "pipe",
        '~' => "tilde",
        '-' => "minus",
        _ => "sym",
    }
}
