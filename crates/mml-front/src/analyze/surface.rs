//! Lifts error nodes left behind by the parser into diagnostics.
//!
//! The parser reports only fatal failures itself; everything else lives in
//! the tree as error nodes. Surfacing them here keeps `analyze` usable as
//! a standalone entry point while the combined parse-then-analyze path
//! still reports each defect exactly once.

use mml_ast::{Member, Module, Term, visit};

use crate::diagnostics::{Diagnostics, ParserError, SemanticError};

pub fn run(module: &Module, diag: &mut Diagnostics) {
    for member in &module.members {
        match member {
            Member::ParseError(err) => {
                diag.error(SemanticError::MemberErrorFound {
                    message: err.message.clone(),
                    span: err.span,
                });
            }
            Member::IdError(err) => {
                diag.error(SemanticError::ParsingIdErrorFound {
                    invalid_id: err.invalid_id.clone(),
                    span: err.span,
                });
            }
            Member::Bnd(bnd) => {
                visit::walk_expr(&bnd.value, &mut |term| match term {
                    Term::Error(err) => {
                        diag.error(ParserError::TermError {
                            message: err.message.clone(),
                            span: err.span,
                        });
                    }
                    Term::Invalid(inv) => {
                        diag.error(SemanticError::InvalidExpressionFound {
                            reason: inv.reason.clone(),
                            span: inv.span,
                        });
                    }
                    _ => {}
                });
            }
            _ => {}
        }
    }
}
