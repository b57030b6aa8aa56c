//! Translate the sort operations of a plan to an ORDER BY clause.

use query_engine_plan::plan::OrderDirection;
use query_engine_sql::sql;

use super::node::Node;
use crate::translation::error::Error;
use crate::translation::helpers::Env;

/// A sort operation with its key already simplified.
#[derive(Debug, Clone, PartialEq)]
pub struct SortStep {
    pub key: Node,
    pub direction: OrderDirection,
    /// `sort_by` rather than `then_sort_by`.
    pub primary: bool,
}

/// One key of the final ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct SortKey {
    pub logical_field: String,
    pub physical_column: sql::ast::ColumnReference,
    pub ascending: bool,
    /// Position of the sort operation among all the sort operations of the plan.
    pub sequence_index: usize,
}

/// Convert the sort operations of a plan, in the order they were specified, to a SQL
/// ORDER BY clause.
///
/// Each `sort_by` starts an ordering that its `then_sort_by`s refine. A later ordering
/// takes precedence, and the earlier ones are kept after it as tie-breakers. A field
/// appears once, where it was last specified.
pub fn translate_order_by(
    env: &Env,
    steps: &[SortStep],
) -> Result<(Vec<SortKey>, sql::ast::OrderBy), Error> {
    let mut orderings: Vec<Vec<SortKey>> = vec![];
    let mut current: Vec<SortKey> = vec![];

    // Walk back from the last sort, so that each ordering is closed by its `sort_by`.
    for (sequence_index, step) in steps.iter().enumerate().rev() {
        current.insert(0, translate_sort_key(env, step, sequence_index)?);
        if step.primary {
            orderings.push(std::mem::take(&mut current));
        }
    }
    if let Some(orphan) = current.first() {
        return Err(Error::ThenSortWithoutSort(orphan.logical_field.clone()));
    }

    let keys = dedup_keys(&orderings.concat());
    let elements = keys
        .iter()
        .map(|key| sql::ast::OrderByElement {
            target: sql::ast::Expression::ColumnReference(key.physical_column.clone()),
            direction: if key.ascending {
                sql::ast::OrderByDirection::Asc
            } else {
                sql::ast::OrderByDirection::Desc
            },
        })
        .collect();
    Ok((keys, sql::ast::OrderBy { elements }))
}

fn translate_sort_key(env: &Env, step: &SortStep, sequence_index: usize) -> Result<SortKey, Error> {
    match &step.key {
        Node::Field(name) => Ok(SortKey {
            logical_field: name.clone(),
            physical_column: env.column(name)?,
            ascending: step.direction == OrderDirection::Asc,
            sequence_index,
        }),
        other => Err(Error::UnsupportedSortKey(other.to_string())),
    }
}

/// Keep only the latest sort of each field. Field names are compared
/// ignoring case.
fn dedup_keys(keys: &[SortKey]) -> Vec<SortKey> {
    let is_latest = |key: &SortKey| {
        !keys.iter().any(|other| {
            other.sequence_index > key.sequence_index
                && other.logical_field.eq_ignore_ascii_case(&key.logical_field)
        })
    };
    keys.iter().filter(|key| is_latest(*key)).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translation::helpers::{AssemblyMode, ColumnNameResolver};
    use query_engine_metadata::metadata::{ColumnMapping, ColumnMappings, RecordInfo};

    fn step(field: &str, direction: OrderDirection, primary: bool) -> SortStep {
        SortStep {
            key: Node::Field(field.to_string()),
            direction,
            primary,
        }
    }

    fn order_by(mappings: &ColumnMappings, steps: &[SortStep]) -> Result<String, Error> {
        let fields = RecordInfo::empty();
        let env = Env::new(
            ColumnNameResolver::new(mappings),
            &fields,
            AssemblyMode::Having,
        );
        let (_, order_by) = translate_order_by(&env, steps)?;
        let mut sql = sql::string::SQL::new();
        order_by.to_sql(&mut sql);
        Ok(sql.sql)
    }

    #[test]
    fn chains_keep_their_order() {
        let steps = [
            step("A", OrderDirection::Asc, true),
            step("B", OrderDirection::Desc, false),
            step("C", OrderDirection::Asc, false),
        ];
        assert_eq!(
            order_by(&ColumnMappings::empty(), &steps),
            Ok("ORDER BY `A` ASC, `B` DESC, `C` ASC".to_string())
        );
    }

    #[test]
    fn a_repeated_field_keeps_its_latest_position() {
        let steps = [
            step("A", OrderDirection::Asc, true),
            step("B", OrderDirection::Asc, false),
            step("a", OrderDirection::Desc, false),
        ];
        assert_eq!(
            order_by(&ColumnMappings::empty(), &steps),
            Ok("ORDER BY `B` ASC, `a` DESC".to_string())
        );
    }

    #[test]
    fn later_orderings_come_first() {
        let steps = [
            step("Name", OrderDirection::Asc, true),
            step("Id", OrderDirection::Desc, false),
            step("InsertedAt", OrderDirection::Desc, true),
            step("Id", OrderDirection::Asc, false),
        ];
        assert_eq!(
            order_by(&ColumnMappings::empty(), &steps),
            Ok("ORDER BY `InsertedAt` DESC, `Id` ASC, `Name` ASC".to_string())
        );
    }

    #[test]
    fn keys_read_renamed_columns() {
        let mut mappings = ColumnMappings::empty();
        mappings.insert("Name", ColumnMapping::Column("p.name".into()));
        assert_eq!(
            order_by(&mappings, &[step("Name", OrderDirection::Desc, true)]),
            Ok("ORDER BY p.name DESC".to_string())
        );
    }

    #[test]
    fn then_sort_needs_a_sort() {
        assert_eq!(
            order_by(
                &ColumnMappings::empty(),
                &[step("Name", OrderDirection::Asc, false)]
            ),
            Err(Error::ThenSortWithoutSort("Name".to_string()))
        );
    }

    #[test]
    fn keys_must_be_fields() {
        let steps = [SortStep {
            key: Node::Literal(1.into()),
            direction: OrderDirection::Asc,
            primary: true,
        }];
        assert_eq!(
            order_by(&ColumnMappings::empty(), &steps),
            Err(Error::UnsupportedSortKey("1".to_string()))
        );
    }
}
