//! Duplicate declaration detection.
//!
//! Declarations group by a key that mangles what may legitimately
//! coexist: operators key on their arity, so unary and binary `-` are two
//! distinct declarations, while functions and plain values key on name
//! alone. First declaration wins; later hits are wrapped as duplicates
//! and reported with every offending span.

use indexmap::IndexMap;

use mml_ast::{
    BindingArity, BindingOrigin, Bnd, DuplicateMember, InvalidMember, Member, Module,
    SourceOrigin, SrcSpan,
};

use crate::diagnostics::{Diagnostics, SemanticError};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum DupKey {
    /// Callables: operators carry their arity, everything else does not.
    Callable {
        origin: BindingOrigin,
        name: String,
        arity: Option<BindingArity>,
    },
    Value(String),
    Type { kind: &'static str, name: String },
}

fn member_source(member: &Member) -> SourceOrigin {
    match member {
        Member::Bnd(b) => b.source,
        Member::TypeDef(t) => t.source,
        Member::TypeAlias(t) => t.source,
        Member::TypeStruct(t) => t.source,
        _ => SourceOrigin::Source,
    }
}

fn member_key(member: &Member) -> Option<(DupKey, String)> {
    match member {
        Member::Bnd(bnd) => match &bnd.meta {
            Some(meta) => {
                let arity = match meta.origin {
                    BindingOrigin::Operator => Some(meta.arity),
                    _ => None,
                };
                Some((
                    DupKey::Callable {
                        origin: meta.origin,
                        name: meta.original_name.clone(),
                        arity,
                    },
                    meta.original_name.clone(),
                ))
            }
            None => Some((DupKey::Value(bnd.name.clone()), bnd.name.clone())),
        },
        Member::TypeDef(t) => Some((
            DupKey::Type {
                kind: "type",
                name: t.name.clone(),
            },
            t.name.clone(),
        )),
        Member::TypeAlias(t) => Some((
            DupKey::Type {
                kind: "alias",
                name: t.name.clone(),
            },
            t.name.clone(),
        )),
        Member::TypeStruct(t) => Some((
            DupKey::Type {
                kind: "struct",
                name: t.name.clone(),
            },
            t.name.clone(),
        )),
        _ => None,
    }
}

pub fn run(mut module: Module, diag: &mut Diagnostics) -> Module {
    let mut groups: IndexMap<DupKey, Vec<(usize, SrcSpan, String)>> = IndexMap::new();
    for (i, member) in module.members.iter().enumerate() {
        // Synthesized members (the prelude) are shadowable, not collidable.
        if member_source(member) == SourceOrigin::Synth {
            continue;
        }
        if let Some((key, name)) = member_key(member) {
            groups.entry(key).or_default().push((i, member.span(), name));
        }
    }

    let mut wrapped: IndexMap<usize, SrcSpan> = IndexMap::new();
    for (_, occurrences) in groups {
        if occurrences.len() < 2 {
            continue;
        }
        let name = occurrences[0].2.clone();
        let spans: Vec<SrcSpan> = occurrences.iter().map(|(_, s, _)| *s).collect();
        diag.error(SemanticError::DuplicateName {
            name,
            spans: spans.clone(),
        });
        let first_span = spans[0];
        for (idx, span, _) in occurrences.into_iter().skip(1) {
            wrapped.insert(idx, first_span.merge(span));
        }
    }

    let members = std::mem::take(&mut module.members);
    module.members = members
        .into_iter()
        .enumerate()
        .map(|(i, member)| {
            if wrapped.contains_key(&i) {
                let span = member.span();
                let first_span = wrapped[&i];
                Member::Duplicate(DuplicateMember {
                    member: Box::new(member),
                    first_span,
                    span,
                })
            } else {
                check_params(member, diag)
            }
        })
        .collect();

    module
}

/// A lambda with two parameters of the same name is rejected wholesale.
fn check_params(member: Member, diag: &mut Diagnostics) -> Member {
    let Member::Bnd(bnd) = &member else {
        return member;
    };
    let Some(dup) = duplicated_param(bnd) else {
        return member;
    };

    let (name, spans) = dup;
    diag.error(SemanticError::DuplicateName {
        name: name.clone(),
        spans,
    });
    let span = member.span();
    Member::Invalid(InvalidMember {
        member: Box::new(member),
        reason: format!("parameter `{name}` is declared twice"),
        span,
    })
}

fn duplicated_param(bnd: &Bnd) -> Option<(String, Vec<SrcSpan>)> {
    let lambda = bnd.lambda()?;
    let mut seen: IndexMap<&str, Vec<SrcSpan>> = IndexMap::new();
    for param in &lambda.params {
        seen.entry(param.name.as_str()).or_default().push(param.span);
    }
    seen.into_iter()
        .find(|(_, spans)| spans.len() > 1)
        .map(|(name, spans)| (name.to_owned(), spans))
}
