//! Shared helpers for unit tests.

use mml_ast::{Bnd, Expr, Module, Term};

use crate::diagnostics::Diagnostics;
use crate::state::{AnalyzerConfig, CompilerState};

pub fn parsed(source: &str) -> (Module, Diagnostics) {
    crate::parser::parse(source, "Test")
}

pub fn analyzed(source: &str) -> CompilerState {
    crate::pipeline::compile(source, "Test", AnalyzerConfig::default())
}

pub fn binding<'m>(module: &'m Module, name: &str) -> &'m Bnd {
    module
        .bindings()
        .find(|b| b.name == name || b.surface_name() == name)
        .unwrap_or_else(|| panic!("no binding named `{name}`"))
}

/// Compact structural rendering for shape assertions.
pub fn expr_sexpr(expr: &Expr) -> String {
    match expr.terms.as_slice() {
        [term] => term_sexpr(term),
        terms => format!(
            "(terms {})",
            terms.iter().map(term_sexpr).collect::<Vec<_>>().join(" ")
        ),
    }
}

pub fn term_sexpr(term: &Term) -> String {
    match term {
        Term::Ref(r) => {
            let mut name = r.name.clone();
            let mut q = r.qualifier.as_deref();
            while let Some(base) = q {
                name = format!("{}.{name}", base.name);
                q = base.qualifier.as_deref();
            }
            format!("(ref {name})")
        }
        Term::App(app) => format!("(app {} {})", term_sexpr(&app.func), term_sexpr(&app.arg)),
        Term::Lambda(l) => {
            let params: Vec<String> = l
                .params
                .iter()
                .map(|p| {
                    if p.consuming {
                        format!("~{}", p.name)
                    } else {
                        p.name.clone()
                    }
                })
                .collect();
            format!("(fn [{}] {})", params.join(" "), expr_sexpr(&l.body))
        }
        Term::Cond(c) => format!(
            "(if {} {} {})",
            expr_sexpr(&c.cond),
            expr_sexpr(&c.if_true),
            expr_sexpr(&c.if_false)
        ),
        Term::Group(g) => format!("(group {})", expr_sexpr(&g.inner)),
        Term::Tuple(t) => format!(
            "(tuple {})",
            t.items.iter().map(expr_sexpr).collect::<Vec<_>>().join(" ")
        ),
        Term::Expr(e) => format!("(expr {})", expr_sexpr(e)),
        Term::Seq(s) => format!(
            "(seq {})",
            s.items.iter().map(expr_sexpr).collect::<Vec<_>>().join(" ")
        ),
        Term::Let(l) => format!("(let {} {})", l.name, expr_sexpr(&l.value)),
        Term::LiteralInt(l) => format!("(int {})", l.value),
        Term::LiteralFloat(l) => format!("(float {})", l.value),
        Term::LiteralString(l) => format!("(str {:?})", l.value),
        Term::LiteralBool(l) => format!("(bool {})", l.value),
        Term::LiteralUnit(_) => "(unit)".to_owned(),
        Term::Placeholder(_) => "(_)".to_owned(),
        Term::Hole(_) => "(hole)".to_owned(),
        Term::DataConstructor(d) => format!("(mk {})", d.struct_name),
        Term::DataDestructor(d) => format!("(unmk {})", d.struct_name),
        Term::Native(_) => "(native)".to_owned(),
        Term::Invalid(_) => "(invalid)".to_owned(),
        Term::Error(_) => "(error)".to_owned(),
    }
}
