//! The closed diagnostic taxonomy.
//!
//! Two top-level families: parser and semantic, with type and ownership
//! errors nested under the semantic side. Every variant carries the spans
//! needed to point back into the source. Messages are stable strings,
//! rendered through `thiserror`.

use mml_ast::SrcSpan;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParserError {
    /// The module could not be parsed at all, e.g. an unclosed block
    /// comment swallowing the rest of the file.
    #[error("parsing failed: {message}")]
    Failure { message: String, span: SrcSpan },

    #[error("unexpected parser state: {message}")]
    Unknown { message: String, span: SrcSpan },

    #[error("malformed member: {message}")]
    MemberError {
        failed_code: String,
        message: String,
        span: SrcSpan,
    },

    #[error("invalid identifier `{invalid_id}`: {message}")]
    IdError {
        invalid_id: String,
        message: String,
        span: SrcSpan,
    },

    #[error("malformed term: {message}")]
    TermError { message: String, span: SrcSpan },
}

impl ParserError {
    pub fn span(&self) -> SrcSpan {
        match self {
            ParserError::Failure { span, .. }
            | ParserError::Unknown { span, .. }
            | ParserError::MemberError { span, .. }
            | ParserError::IdError { span, .. }
            | ParserError::TermError { span, .. } => *span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TypeError {
    #[error("parameter `{name}` is missing a type")]
    MissingParameterType { name: String, span: SrcSpan },

    #[error("function `{name}` is missing a return type")]
    MissingReturnType { name: String, span: SrcSpan },

    #[error("recursive function `{name}` must declare its return type")]
    RecursiveFunctionMissingReturnType { name: String, span: SrcSpan },

    #[error("operator parameter `{name}` is missing a type")]
    MissingOperatorParameterType { name: String, span: SrcSpan },

    #[error("operator `{name}` is missing a return type")]
    MissingOperatorReturnType { name: String, span: SrcSpan },

    #[error("type mismatch: expected `{expected}`, found `{actual}`")]
    TypeMismatch {
        expected: String,
        actual: String,
        span: SrcSpan,
    },

    #[error("not enough arguments: expected {expected}, found {actual}")]
    UndersaturatedApplication {
        expected: usize,
        actual: usize,
        span: SrcSpan,
    },

    #[error("too many arguments: expected {expected}, found {actual}")]
    OversaturatedApplication {
        expected: usize,
        actual: usize,
        span: SrcSpan,
    },

    #[error("cannot apply a value of type `{fn_type}` to an argument of type `{arg_type}`")]
    InvalidApplication {
        fn_type: String,
        arg_type: String,
        span: SrcSpan,
    },

    #[error("selection requires a struct value, found `{base_type}`")]
    InvalidSelection { base_type: String, span: SrcSpan },

    #[error("no field `{field}` on `{base_type}`")]
    UnknownField {
        field: String,
        base_type: String,
        span: SrcSpan,
    },

    #[error("conditional branches disagree: `{if_true}` vs `{if_false}`")]
    ConditionalBranchTypeMismatch {
        if_true: String,
        if_false: String,
        span: SrcSpan,
    },

    #[error("cannot determine the type of either conditional branch")]
    ConditionalBranchTypeUnknown { span: SrcSpan },

    #[error("cannot resolve type `{name}`")]
    UnresolvableType { name: String, span: SrcSpan },

    #[error("incompatible types `{first}` and `{second}` in {context}")]
    IncompatibleTypes {
        first: String,
        second: String,
        context: String,
        span: SrcSpan,
    },

    #[error("hole needs an expected type from its context")]
    UntypedHoleInBinding { span: SrcSpan },
}

impl TypeError {
    pub fn span(&self) -> SrcSpan {
        match self {
            TypeError::MissingParameterType { span, .. }
            | TypeError::MissingReturnType { span, .. }
            | TypeError::RecursiveFunctionMissingReturnType { span, .. }
            | TypeError::MissingOperatorParameterType { span, .. }
            | TypeError::MissingOperatorReturnType { span, .. }
            | TypeError::TypeMismatch { span, .. }
            | TypeError::UndersaturatedApplication { span, .. }
            | TypeError::OversaturatedApplication { span, .. }
            | TypeError::InvalidApplication { span, .. }
            | TypeError::InvalidSelection { span, .. }
            | TypeError::UnknownField { span, .. }
            | TypeError::ConditionalBranchTypeMismatch { span, .. }
            | TypeError::ConditionalBranchTypeUnknown { span }
            | TypeError::UnresolvableType { span, .. }
            | TypeError::IncompatibleTypes { span, .. }
            | TypeError::UntypedHoleInBinding { span } => *span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OwnershipError {
    #[error("`{name}` used after being moved")]
    UseAfterMove { name: String, span: SrcSpan },

    #[error("`{name}` is consumed here but used again later")]
    ConsumingParamNotLastUse { name: String, span: SrcSpan },

    #[error("`{name}` has consuming parameters and cannot be partially applied")]
    PartialApplicationWithConsuming { name: String, span: SrcSpan },

    #[error("conditional branches produce irreconcilable ownership for `{name}`")]
    ConditionalOwnershipMismatch { name: String, span: SrcSpan },

    #[error("`{name}` is borrowed and cannot escape through a return")]
    BorrowEscapeViaReturn { name: String, span: SrcSpan },
}

impl OwnershipError {
    pub fn span(&self) -> SrcSpan {
        match self {
            OwnershipError::UseAfterMove { span, .. }
            | OwnershipError::ConsumingParamNotLastUse { span, .. }
            | OwnershipError::PartialApplicationWithConsuming { span, .. }
            | OwnershipError::ConditionalOwnershipMismatch { span, .. }
            | OwnershipError::BorrowEscapeViaReturn { span, .. } => *span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SemanticError {
    #[error("`{name}` is not defined")]
    UndefinedRef { name: String, span: SrcSpan },

    #[error("type `{name}` is not defined")]
    UndefinedTypeRef { name: String, span: SrcSpan },

    /// `spans` lists the first declaration followed by every duplicate.
    #[error("`{name}` is declared more than once")]
    DuplicateName { name: String, spans: Vec<SrcSpan> },

    #[error("invalid expression: {reason}")]
    InvalidExpression { reason: String, span: SrcSpan },

    #[error("dangling terms `{terms}`: {message}")]
    DanglingTerms {
        terms: String,
        message: String,
        span: SrcSpan,
    },

    #[error("member failed to parse: {message}")]
    MemberErrorFound { message: String, span: SrcSpan },

    #[error("invalid identifier `{invalid_id}`")]
    ParsingIdErrorFound { invalid_id: String, span: SrcSpan },

    #[error("invalid expression carried over: {reason}")]
    InvalidExpressionFound { reason: String, span: SrcSpan },

    #[error("invalid entry point: {reason}")]
    InvalidEntryPoint { reason: String, span: SrcSpan },

    #[error(transparent)]
    TypeCheckingError(#[from] TypeError),

    #[error(transparent)]
    OwnershipError(#[from] OwnershipError),
}

impl SemanticError {
    pub fn span(&self) -> SrcSpan {
        match self {
            SemanticError::UndefinedRef { span, .. }
            | SemanticError::UndefinedTypeRef { span, .. }
            | SemanticError::InvalidExpression { span, .. }
            | SemanticError::DanglingTerms { span, .. }
            | SemanticError::MemberErrorFound { span, .. }
            | SemanticError::ParsingIdErrorFound { span, .. }
            | SemanticError::InvalidExpressionFound { span, .. }
            | SemanticError::InvalidEntryPoint { span, .. } => *span,
            SemanticError::DuplicateName { spans, .. } => {
                spans.first().copied().unwrap_or_else(SrcSpan::synthetic)
            }
            SemanticError::TypeCheckingError(e) => e.span(),
            SemanticError::OwnershipError(e) => e.span(),
        }
    }

    /// Every span this diagnostic points at.
    pub fn spans(&self) -> Vec<SrcSpan> {
        match self {
            SemanticError::DuplicateName { spans, .. } => spans.clone(),
            other => vec![other.span()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompilationError {
    #[error(transparent)]
    Parser(#[from] ParserError),

    #[error(transparent)]
    Semantic(#[from] SemanticError),
}

impl CompilationError {
    pub fn span(&self) -> SrcSpan {
        match self {
            CompilationError::Parser(e) => e.span(),
            CompilationError::Semantic(e) => e.span(),
        }
    }

    pub fn spans(&self) -> Vec<SrcSpan> {
        match self {
            CompilationError::Parser(e) => vec![e.span()],
            CompilationError::Semantic(e) => e.spans(),
        }
    }
}

impl From<TypeError> for CompilationError {
    fn from(e: TypeError) -> Self {
        CompilationError::Semantic(SemanticError::TypeCheckingError(e))
    }
}

impl From<OwnershipError> for CompilationError {
    fn from(e: OwnershipError) -> Self {
        CompilationError::Semantic(SemanticError::OwnershipError(e))
    }
}

/// Warnings are reserved: they never gate code emission.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompilerWarning {
    #[error("`{name}` is never used")]
    UnusedBinding { name: String, span: SrcSpan },
}

impl CompilerWarning {
    pub fn span(&self) -> SrcSpan {
        match self {
            CompilerWarning::UnusedBinding { span, .. } => *span,
        }
    }
}
