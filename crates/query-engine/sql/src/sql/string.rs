//! Type definitions of a low-level SQL string representation.

use std::borrow::Cow;

use indexmap::IndexMap;
use query_engine_metadata::metadata::Literal;

/// Prefix of every generated parameter name.
pub const PARAMETER_PREFIX: &str = "@P";
/// Index of the first parameter of a statement.
pub const FIRST_PARAMETER_INDEX: u32 = 1000;

/// A low-level representation of a SQL string, with named parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SQL {
    pub sql: String,
    pub params: Parameters,
}

impl Default for SQL {
    fn default() -> Self {
        Self::new()
    }
}

/// Values bound to the placeholders of one statement, in the order they were bound.
/// Names run `@P1000`, `@P1001`, ... and are never reused.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    values: IndexMap<String, Literal>,
    next_index: u32,
}

impl Default for Parameters {
    fn default() -> Self {
        Self::new()
    }
}

impl Parameters {
    pub fn new() -> Parameters {
        Parameters {
            values: IndexMap::new(),
            next_index: FIRST_PARAMETER_INDEX,
        }
    }

    /// Bind a value to the next placeholder and return the placeholder.
    pub fn bind(&mut self, value: Literal) -> String {
        let name = format!("{PARAMETER_PREFIX}{}", self.next_index);
        self.next_index += 1;
        self.values.insert(name.clone(), value);
        name
    }

    pub fn get(&self, name: &str) -> Option<&Literal> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Literal)> {
        self.values.iter()
    }

    pub fn into_inner(self) -> IndexMap<String, Literal> {
        self.values
    }
}

/// Quote an identifier with backticks, unless it is already quoted or qualified
/// with a dot, in which case it is assumed to be valid SQL already.
pub fn quote_identifier(name: &str) -> Cow<'_, str> {
    if name.contains('`') || name.contains('.') {
        Cow::Borrowed(name)
    } else {
        Cow::Owned(format!("`{name}`"))
    }
}

impl SQL {
    /// Create an empty SQL string.
    pub fn new() -> SQL {
        SQL {
            sql: String::new(),
            params: Parameters::new(),
        }
    }

    /// Append a SQL syntax string.
    pub fn append_syntax(&mut self, sql: &str) {
        self.sql.push_str(sql);
    }

    /// Append an identifier, quoted when needed.
    pub fn append_identifier(&mut self, sql: &str) {
        self.sql.push_str(&quote_identifier(sql));
    }

    /// Bind a value and append its placeholder.
    pub fn append_param(&mut self, value: Literal) {
        let placeholder = self.params.bind(value);
        self.sql.push_str(&placeholder);
    }

    /// Start a clause on its own line, without ever producing an empty line.
    pub fn start_line(&mut self) {
        if !self.sql.is_empty() && !self.sql.ends_with('\n') {
            self.sql.push('\n');
        }
    }

    /// Take the text written so far, keeping the parameters.
    pub fn take_text(&mut self) -> String {
        std::mem::take(&mut self.sql)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameters_are_numbered_from_one_thousand() {
        let mut sql = SQL::new();
        sql.append_param(Literal::Int(1));
        sql.append_syntax(", ");
        sql.append_param(Literal::Null);
        assert_eq!(sql.sql, "@P1000, @P1001");
        assert_eq!(sql.params.get("@P1001"), Some(&Literal::Null));
        assert_eq!(sql.params.len(), 2);
    }

    #[test]
    fn quoting_is_idempotent() {
        assert_eq!(quote_identifier("Name"), "`Name`");
        assert_eq!(quote_identifier(&quote_identifier("Name")), "`Name`");
        assert_eq!(quote_identifier("db.Name"), "db.Name");
    }

    #[test]
    fn start_line_never_doubles_line_breaks() {
        let mut sql = SQL::new();
        sql.start_line();
        sql.append_syntax("SELECT 1\n");
        sql.start_line();
        sql.append_syntax("LIMIT 1");
        sql.start_line();
        assert_eq!(sql.sql, "SELECT 1\nLIMIT 1\n");
    }

    #[test]
    fn taking_text_keeps_parameters() {
        let mut sql = SQL::new();
        sql.append_param(Literal::Int(1));
        assert_eq!(sql.take_text(), "@P1000");
        sql.append_param(Literal::Int(2));
        assert_eq!(sql.sql, "@P1001");
    }
}
