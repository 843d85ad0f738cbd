use mml_ast::{SrcPoint, SrcSpan};

use super::{CompilationError, CompilerWarning, Diagnostics, SemanticError, TypeError};

fn span(l1: u32, c1: u32, l2: u32, c2: u32) -> SrcSpan {
    SrcSpan::new(SrcPoint::new(l1, c1), SrcPoint::new(l2, c2))
}

#[test]
fn errors_accumulate_in_order() {
    let mut diag = Diagnostics::new();
    diag.error(SemanticError::UndefinedRef {
        name: "y".into(),
        span: span(1, 9, 1, 10),
    });
    diag.error(TypeError::UntypedHoleInBinding {
        span: span(2, 1, 2, 4),
    });

    assert_eq!(diag.error_count(), 2);
    assert!(matches!(
        diag.errors()[0],
        CompilationError::Semantic(SemanticError::UndefinedRef { .. })
    ));
    assert!(matches!(
        diag.errors()[1],
        CompilationError::Semantic(SemanticError::TypeCheckingError(
            TypeError::UntypedHoleInBinding { .. }
        ))
    ));
}

#[test]
fn warnings_do_not_count_as_errors() {
    let mut diag = Diagnostics::new();
    diag.warning(CompilerWarning::UnusedBinding {
        name: "tmp".into(),
        span: span(1, 1, 1, 4),
    });
    assert!(!diag.has_errors());
    assert_eq!(diag.warning_count(), 1);
}

#[test]
fn plain_format_shows_span_and_message() {
    let mut diag = Diagnostics::new();
    diag.error(SemanticError::UndefinedRef {
        name: "y".into(),
        span: span(1, 9, 1, 10),
    });
    let out = diag.printer().render();
    assert_eq!(out, "error at 1:9..1:10: `y` is not defined");
}

#[test]
fn snippet_rendering_includes_the_offending_line() {
    let source = "let x = y + 1;\n";
    let mut diag = Diagnostics::new();
    diag.error(SemanticError::UndefinedRef {
        name: "y".into(),
        span: span(1, 9, 1, 10),
    });
    let out = diag.printer().source(source).render();
    assert!(out.contains("`y` is not defined"), "got: {out}");
    assert!(out.contains("let x = y + 1;"), "got: {out}");
}

#[test]
fn duplicate_name_renders_every_span() {
    let source = "let a = 1;\nlet a = 2;\n";
    let mut diag = Diagnostics::new();
    diag.error(SemanticError::DuplicateName {
        name: "a".into(),
        spans: vec![span(1, 1, 1, 10), span(2, 1, 2, 10)],
    });
    let out = diag.printer().source(source).render();
    assert!(out.contains("declared more than once"), "got: {out}");
    assert!(out.contains("also declared here"), "got: {out}");
}

#[test]
fn messages_are_stable() {
    let err = CompilationError::from(TypeError::TypeMismatch {
        expected: "Int".into(),
        actual: "String".into(),
        span: span(1, 1, 1, 2),
    });
    assert_eq!(
        err.to_string(),
        "type mismatch: expected `Int`, found `String`"
    );
}

#[test]
fn extend_preserves_relative_order() {
    let mut a = Diagnostics::new();
    a.error(SemanticError::UndefinedRef {
        name: "one".into(),
        span: span(1, 1, 1, 2),
    });
    let mut b = Diagnostics::new();
    b.error(SemanticError::UndefinedRef {
        name: "two".into(),
        span: span(2, 1, 2, 2),
    });
    a.extend(b);
    assert_eq!(a.error_count(), 2);
    assert!(a.errors()[0].to_string().contains("one"));
    assert!(a.errors()[1].to_string().contains("two"));
}
