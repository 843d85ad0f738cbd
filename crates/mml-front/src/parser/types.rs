//! Type expression productions.
//!
//! `->` is right-associative and binds loosest; `|` and `&` sit between it
//! and the primaries. Parenthesized lists of two or more are tuples; one
//! element is a group; `()` is the unit type.

use mml_ast::{SrcSpan, Type, TypeRef};

use super::cursor::is_type_start;
use super::{Abort, PResult, Parser};

impl Parser {
    pub(crate) fn parse_type(&mut self) -> PResult<Type> {
        self.trivia_or_abort()?;
        let lhs = self.parse_union_type()?;
        self.trivia_or_abort()?;
        if self.cur.peek() == Some('-') && self.cur.peek_at(1) == Some('>') {
            self.cur.bump();
            self.cur.bump();
            let rhs = self.parse_type()?;
            return Ok(Type::fun(vec![lhs], rhs));
        }
        Ok(lhs)
    }

    fn parse_union_type(&mut self) -> PResult<Type> {
        let first = self.parse_intersection_type()?;
        let mut parts = vec![first];
        loop {
            self.trivia_or_abort()?;
            if self.cur.peek() == Some('|') {
                self.cur.bump();
                self.trivia_or_abort()?;
                parts.push(self.parse_intersection_type()?);
            } else {
                break;
            }
        }
        if parts.len() == 1 {
            Ok(parts.pop().expect("one part"))
        } else {
            Ok(Type::Union(parts))
        }
    }

    fn parse_intersection_type(&mut self) -> PResult<Type> {
        let first = self.parse_type_primary()?;
        let mut parts = vec![first];
        loop {
            self.trivia_or_abort()?;
            if self.cur.peek() == Some('&') {
                self.cur.bump();
                self.trivia_or_abort()?;
                parts.push(self.parse_type_primary()?);
            } else {
                break;
            }
        }
        if parts.len() == 1 {
            Ok(parts.pop().expect("one part"))
        } else {
            Ok(Type::Intersection(parts))
        }
    }

    fn parse_type_primary(&mut self) -> PResult<Type> {
        self.trivia_or_abort()?;
        let start = self.cur.checkpoint();

        if self.cur.eat_char('(') {
            self.trivia_or_abort()?;
            if self.cur.eat_char(')') {
                return Ok(Type::Unit);
            }
            let mut items = vec![self.parse_type()?];
            loop {
                self.trivia_or_abort()?;
                if self.cur.eat_char(',') {
                    items.push(self.parse_type()?);
                    continue;
                }
                if self.cur.eat_char(')') {
                    break;
                }
                return Err(Abort::Member {
                    message: "expected `)` in type".to_owned(),
                    span: SrcSpan::new(self.cur.point(), self.cur.point()),
                });
            }
            if items.len() == 1 {
                return Ok(Type::Group(Box::new(items.pop().expect("one item"))));
            }
            return Ok(Type::Tuple(items));
        }

        if self.cur.peek().is_some_and(is_type_start) {
            let name = self.lex_type_ident().expect("type ident start");
            return Ok(Type::Ref(TypeRef::named(name, self.cur.span_from(start))));
        }

        Err(Abort::Member {
            message: "expected a type".to_owned(),
            span: SrcSpan::new(self.cur.point(), self.cur.point()),
        })
    }
}
