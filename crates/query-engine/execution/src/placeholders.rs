//! Rewrite named placeholders to the positional `?` placeholders MySQL binds.
//!
//! Statements name their parameters `@P1000` or `@CustomerId`, but the MySQL protocol
//! binds values by position. Every placeholder is replaced by `?`, and the names are
//! returned in the order they occur, so the same parameter can be bound more than once.
//! Text inside quotes and comments is never rewritten. Names that are not parameters
//! are left alone, as they are user variables.

use query_engine_translation::translation::query::Statement;

/// A statement with positional placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Positional {
    pub sql: String,
    /// The parameter behind each `?`, in order.
    pub names: Vec<String>,
}

/// Whether a name looks like a generated parameter, `@P` followed by digits.
pub fn is_generated(name: &str) -> bool {
    name.strip_prefix("@P")
        .is_some_and(|index| !index.is_empty() && index.chars().all(|c| c.is_ascii_digit()))
}

/// Rewrite the placeholders of a statement. Generated names are always placeholders, so
/// that one without a value is reported rather than read as a user variable.
pub fn for_statement(statement: &Statement) -> Positional {
    to_positional(&statement.query.statement_sql, |name| {
        is_generated(name) || statement.parameter(name).is_some()
    })
}

/// Replace every `@name` for which `is_parameter` holds by `?`.
pub fn to_positional(sql: &str, is_parameter: impl Fn(&str) -> bool) -> Positional {
    let mut output = String::with_capacity(sql.len());
    let mut names = vec![];
    let mut chars = sql.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        match c {
            '\'' | '"' | '`' => {
                output.push(c);
                copy_quoted(&mut chars, &mut output, c);
            }
            '-' if is_line_comment(&sql[start..]) => {
                copy_comment(&mut chars, &mut output, "--", "\n");
            }
            '#' => copy_comment(&mut chars, &mut output, "#", "\n"),
            '/' if sql[start..].starts_with("/*") => {
                copy_comment(&mut chars, &mut output, "/*", "*/");
            }
            // system variables, such as @@session.sql_mode
            '@' if sql[start + 1..].starts_with('@') => {
                output.push_str("@@");
                chars.next();
            }
            '@' => {
                let name_end = sql[start + 1..]
                    .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '$'))
                    .map_or(sql.len(), |offset| start + 1 + offset);
                let name = &sql[start..name_end];
                if name.len() > 1 && is_parameter(name) {
                    output.push('?');
                    names.push(name.to_string());
                } else {
                    output.push_str(name);
                }
                while chars.peek().is_some_and(|(index, _)| *index < name_end) {
                    chars.next();
                }
            }
            _ => output.push(c),
        }
    }

    Positional { sql: output, names }
}

/// `--` starts a comment when whitespace, or the end of the statement, follows it.
fn is_line_comment(sql: &str) -> bool {
    sql.strip_prefix("--")
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
}

/// Copy a quoted string, identifier or the rest of the statement if it is never closed.
/// The opening quote has already been copied. Quotes are escaped by doubling them, or
/// with a backslash inside strings.
fn copy_quoted(
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    output: &mut String,
    quote: char,
) {
    while let Some((_, c)) = chars.next() {
        output.push(c);
        if c == '\\' && quote != '`' {
            if let Some((_, escaped)) = chars.next() {
                output.push(escaped);
            }
        } else if c == quote {
            match chars.peek() {
                Some((_, next)) if *next == quote => {
                    output.push(quote);
                    chars.next();
                }
                _ => return,
            }
        }
    }
}

/// Copy a comment, from its opener up to and including its terminator. The first
/// character of the opener has already been read.
fn copy_comment(
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    output: &mut String,
    opener: &str,
    terminator: &str,
) {
    output.push_str(opener);
    for _ in 1..opener.chars().count() {
        chars.next();
    }
    let mut body = String::new();
    for (_, c) in chars.by_ref() {
        body.push(c);
        if body.ends_with(terminator) {
            break;
        }
    }
    output.push_str(&body);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewrite(sql: &str) -> Positional {
        to_positional(sql, |name| {
            is_generated(name) || name.eq_ignore_ascii_case("@MinimumAge")
        })
    }

    #[test]
    fn placeholders_become_positional() {
        let positional = rewrite("SELECT * FROM t WHERE `Age` >= @MinimumAge HAVING (`Id` = @P1000);");
        assert_eq!(
            positional.sql,
            "SELECT * FROM t WHERE `Age` >= ? HAVING (`Id` = ?);"
        );
        assert_eq!(positional.names, vec!["@MinimumAge", "@P1000"]);
    }

    #[test]
    fn repeated_placeholders_are_bound_each_time() {
        let positional = rewrite("SELECT @P1000, @P1000");
        assert_eq!(positional.sql, "SELECT ?, ?");
        assert_eq!(positional.names, vec!["@P1000", "@P1000"]);
    }

    #[test]
    fn quoted_text_is_left_alone() {
        let positional = rewrite(
            "SELECT '@P1000', 'it''s @P1001', \"\\\"@P1002\", `@P1003` FROM t WHERE x = @P1004",
        );
        assert_eq!(
            positional.sql,
            "SELECT '@P1000', 'it''s @P1001', \"\\\"@P1002\", `@P1003` FROM t WHERE x = ?"
        );
        assert_eq!(positional.names, vec!["@P1004"]);
    }

    #[test]
    fn comments_are_left_alone() {
        let positional = rewrite("SELECT 1 -- @P1000\n/* @P1001 */ # @P1002\n, @P1003");
        assert_eq!(
            positional.sql,
            "SELECT 1 -- @P1000\n/* @P1001 */ # @P1002\n, ?"
        );
        assert_eq!(positional.names, vec!["@P1003"]);
    }

    #[test]
    fn line_comments_start_with_any_whitespace() {
        let positional = rewrite("SELECT 1 --\t@P1000\n, 2 --\n, @P1001 - -@P1002 --@P1003");
        assert_eq!(
            positional.sql,
            "SELECT 1 --\t@P1000\n, 2 --\n, ? - -? --?"
        );
        assert_eq!(positional.names, vec!["@P1001", "@P1002", "@P1003"]);
    }

    #[test]
    fn user_and_system_variables_are_left_alone() {
        let positional = rewrite("SELECT @rank := @rank + 1, @@session.sql_mode, @P1000");
        assert_eq!(
            positional.sql,
            "SELECT @rank := @rank + 1, @@session.sql_mode, ?"
        );
        assert_eq!(positional.names, vec!["@P1000"]);
    }

    #[test]
    fn generated_names_are_recognized() {
        assert!(is_generated("@P1000"));
        assert!(!is_generated("@P"));
        assert!(!is_generated("@Price"));
    }
}
