//! Type definitions of a MySQL AST representation.
//!
//! The base SQL of a query is never parsed, so statements are represented as the clauses
//! the compiler appends to it rather than as a full `SELECT`.

use query_engine_metadata::metadata::Literal;

/// Raw SQL, written by the caller and emitted verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawSql(pub String);

/// A generated select list, `SELECT <expression> AS <alias>, ...`
#[derive(Debug, Clone, PartialEq)]
pub struct SelectList {
    pub columns: Vec<(ColumnAlias, Expression)>,
    /// Caller supplied SQL placed after the columns.
    pub after_columns: Vec<RawSql>,
}

/// Which clause a filter is appended as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterClause {
    Where,
    Having,
}

/// A WHERE or HAVING clause. The conditions are joined with AND.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub clause: FilterClause,
    pub conditions: Vec<Expression>,
}

/// An ORDER BY clause
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub elements: Vec<OrderByElement>,
}

/// A single element in an ORDER BY clause
#[derive(Debug, Clone, PartialEq)]
pub struct OrderByElement {
    pub target: Expression,
    pub direction: OrderByDirection,
}

/// A direction for a single ORDER BY element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderByDirection {
    Asc,
    Desc,
}

/// LIMIT and OFFSET clauses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limit {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// `SELECT <select list> FROM (<inner>) AS <alias>`, used to narrow the columns of an
/// already built statement.
#[derive(Debug, Clone, PartialEq)]
pub struct OuterSelect {
    pub select_list: OuterSelectList,
    pub after_columns: Vec<RawSql>,
    pub inner: RawSql,
    pub alias: TableAlias,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OuterSelectList {
    Columns(Vec<ColumnAlias>),
    CountStar,
}

/// A scalar expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// AND clause
    And {
        left: Box<Expression>,
        right: Box<Expression>,
    },
    /// OR clause
    Or {
        left: Box<Expression>,
        right: Box<Expression>,
    },
    /// NOT clause
    Not(Box<Expression>),
    /// A binary operation on two scalar expression
    BinaryOperation {
        left: Box<Expression>,
        operator: BinaryOperator,
        right: Box<Expression>,
    },
    /// A binary operation on a scalar expression and an array of scalar expressions
    BinaryArrayOperation {
        left: Box<Expression>,
        operator: BinaryArrayOperator,
        right: Vec<Expression>,
    },
    /// An unary operation on a scalar expression
    UnaryOperation {
        expression: Box<Expression>,
        operator: UnaryOperator,
    },
    /// A scalar function call
    FunctionCall {
        function: Function,
        args: Vec<Expression>,
    },
    /// A column reference
    ColumnReference(ColumnReference),
    /// A value, bound as a parameter
    Value(Literal),
    /// SQL text that is part of the generated syntax, such as the `'%'` of a LIKE pattern
    RawSql(RawSql),
}

/// An unary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    IsNull,
    IsNotNull,
    Negate,
}

/// A binary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Equals,
    NotEquals,
    LessThan,
    LessThanOrEqualTo,
    GreaterThan,
    GreaterThanOrEqualTo,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Like,
}

/// A binary operator when the rhs is an array
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryArrayOperator {
    In,
}

/// A scalar function
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Function {
    Concat,
    If,
    Now,
    UtcTimestamp,
    CurDate,
    Uuid,
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
    DayOfWeek,
    DayOfYear,
    Upper,
    Lower,
    Trim,
}

/// A database table's column name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnName(pub String);

/// A reference to a column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnReference {
    /// a column name, quoted when printed unless already quoted or qualified
    Column(ColumnName),
    /// a raw SQL fragment standing in for a column, never quoted
    Mapped(RawSql),
}

/// aliases that we give to relations
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableAlias {
    pub name: String,
}

/// aliases that we give to columns
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnAlias {
    pub name: String,
}

