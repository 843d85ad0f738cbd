//! Resolvable-index construction.
//!
//! Used twice: to seed the index right after id assignment, and as the
//! final rebuild once every rewriting phase has run. Entries are
//! snapshots of the current nodes keyed by their stable ids.

use mml_ast::{
    Member, Module, Resolvable, ResolvableType, ResolvablesIndex, Term, visit,
};

use crate::diagnostics::Diagnostics;

pub fn run(mut module: Module, _diag: &mut Diagnostics) -> Module {
    module.resolvables = build_index(&module.members);
    module
}

pub fn build_index(members: &[Member]) -> ResolvablesIndex {
    let mut index = ResolvablesIndex::new();
    for member in members {
        match member {
            Member::Bnd(bnd) => {
                if let Some(id) = &bnd.id {
                    index.insert_value(id.clone(), Resolvable::Binding(bnd.clone()));
                }
                visit::walk_expr(&bnd.value, &mut |term| match term {
                    Term::Lambda(lambda) => {
                        for param in &lambda.params {
                            if let Some(id) = &param.id {
                                index.insert_value(id.clone(), Resolvable::Param(param.clone()));
                            }
                        }
                    }
                    Term::Let(l) => {
                        if let Some(id) = &l.id {
                            index.insert_value(id.clone(), Resolvable::Let(l.clone()));
                        }
                    }
                    _ => {}
                });
            }
            Member::TypeDef(def) => {
                if let Some(id) = &def.id {
                    index.insert_type(id.clone(), ResolvableType::Def(def.clone()));
                }
            }
            Member::TypeAlias(alias) => {
                if let Some(id) = &alias.id {
                    index.insert_type(id.clone(), ResolvableType::Alias(alias.clone()));
                }
            }
            Member::TypeStruct(st) => {
                if let Some(id) = &st.id {
                    index.insert_type(id.clone(), ResolvableType::Struct(st.clone()));
                }
                for field in &st.fields {
                    if let Some(id) = &field.id {
                        index.insert_value(id.clone(), Resolvable::Field(field.clone()));
                    }
                }
            }
            Member::Duplicate(_) | Member::Invalid(_) => {}
            Member::ParseError(_) | Member::IdError(_) => {}
        }
    }
    index
}
