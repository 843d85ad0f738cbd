//! Entry-point validation.
//!
//! The entry point must be a nullary callable returning `Unit`. Its
//! absence or wrong shape is only an error when the configuration asks
//! for an executable.

use mml_ast::{BindingArity, Member, Module, ResolvableId, SrcSpan, Type, TypeRef};

use crate::diagnostics::{Diagnostics, SemanticError};
use crate::state::AnalyzerConfig;

pub fn run(module: &Module, config: &AnalyzerConfig, diag: &mut Diagnostics) -> Option<String> {
    let wanted = config.entry_point_name.as_str();
    let found = module.members.iter().find_map(|m| match m {
        Member::Bnd(bnd) if bnd.surface_name() == wanted => Some(bnd),
        _ => None,
    });

    let Some(bnd) = found else {
        if config.require_entry_point {
            diag.error(SemanticError::InvalidEntryPoint {
                reason: format!("no `{wanted}` function defined"),
                span: SrcSpan::synthetic(),
            });
        }
        return None;
    };

    let Some(meta) = &bnd.meta else {
        if config.require_entry_point {
            diag.error(SemanticError::InvalidEntryPoint {
                reason: format!("`{wanted}` must be a function"),
                span: bnd.span,
            });
        }
        return None;
    };

    if meta.arity != BindingArity::Nullary {
        if config.require_entry_point {
            diag.error(SemanticError::InvalidEntryPoint {
                reason: format!("`{wanted}` must take no parameters"),
                span: bnd.span,
            });
        }
        return None;
    }

    let unit = Type::Ref(TypeRef::resolved("Unit", ResolvableId::stdlib("Unit")));
    let ret = bnd.lambda().and_then(|l| match &l.type_spec {
        Some(Type::Fn(f)) => Some((*f.ret).clone()),
        _ => l.type_asc.clone(),
    });
    if !ret.is_some_and(|t| t.same_type(&unit)) {
        if config.require_entry_point {
            diag.error(SemanticError::InvalidEntryPoint {
                reason: format!("`{wanted}` must return `Unit`"),
                span: bnd.span,
            });
        }
        return None;
    }

    Some(bnd.name.clone())
}
