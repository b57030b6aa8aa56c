//! Errors for query translation.

/// A type for translation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("Method '{0}' cannot be translated to SQL.")]
    UnsupportedMethod(String),
    #[error("Operator '{0}' is not supported here.")]
    UnsupportedOperator(String),
    #[error("Expression '{0}' cannot be translated to SQL.")]
    UnsupportedExpression(String),
    #[error("Sort key '{0}' does not reduce to a field.")]
    UnsupportedSortKey(String),
    #[error("Select translated twice: a plan can only narrow its columns once.")]
    SelectTranslatedTwice,
    #[error("then_sort_by({0}) has no sort_by before it.")]
    ThenSortWithoutSort(String),
    #[error("'{0}' tests membership of an empty collection inside a larger predicate.")]
    EmptyInList(String),
    #[error("Field '{0}' is not declared on the row.")]
    FieldNotFound(String),
    #[error("Row mutator #{0} is not registered on the plan.")]
    MutatorNotFound(usize),
    #[error("Collections can only be used with Contains: '{0}'.")]
    ArrayNotSupported(String),
    #[error("Parameter '{0}' collides with a generated parameter.")]
    ParameterNameCollision(String),
}
