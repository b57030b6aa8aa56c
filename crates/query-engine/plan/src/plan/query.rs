//! The fluent query plan builder.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use query_engine_metadata::metadata::{
    ColumnMapping, ColumnMappings, CommandLocale, CommandRegion, Literal, NativeQueryInfo,
    RecordInfo,
};

use super::node::{MutatorId, OrderDirection, PlanNode, Shape};
use super::predicate::Predicate;
use super::transform::RowMutator;

/// A query over the rows of a base SQL fragment, typed by the row type `R` it
/// materializes into.
///
/// Every refinement wraps the current tree, so the plan reads in the order it was built:
///
/// ```
/// use query_engine_plan::plan::{field, literal, QueryPlan};
///
/// let plan = QueryPlan::<()>::new("SELECT * FROM `orders`")
///     .filter(field("Total").greater_than(literal(100)))
///     .sort_by(field("CreatedAt"))
///     .take(10);
/// assert_eq!(
///     plan.tree().to_string(),
///     "source.filter((Total > 100)).sort_by(CreatedAt ASC).take(10)"
/// );
/// ```
pub struct QueryPlan<R> {
    base_sql: String,
    tree: PlanNode,
    fields: RecordInfo,
    column_mappings: ColumnMappings,
    ensure_all_columns_mapped: bool,
    additional_commands: Vec<CommandLocale>,
    parameters: IndexMap<String, Literal>,
    mutators: Vec<RowMutator<R>>,
}

impl<R> QueryPlan<R> {
    pub fn new(base_sql: impl Into<String>) -> Self {
        QueryPlan {
            base_sql: base_sql.into(),
            tree: PlanNode::Source,
            fields: RecordInfo::empty(),
            column_mappings: ColumnMappings::empty(),
            ensure_all_columns_mapped: false,
            additional_commands: Vec::new(),
            parameters: IndexMap::new(),
            mutators: Vec::new(),
        }
    }

    /// Start a plan from a configured native query.
    pub fn from_native_query(info: &NativeQueryInfo) -> Result<Self, String> {
        let mut plan = QueryPlan::new(info.sql.sql()?).with_fields(info.fields.clone());
        plan.column_mappings = info.column_mappings.clone();
        plan.ensure_all_columns_mapped = info.ensure_all_columns_mapped;
        plan.additional_commands = info.additional_commands.clone();
        Ok(plan)
    }

    /// Replace the whole tree, for plans that were built elsewhere.
    #[must_use]
    pub fn with_tree(mut self, tree: PlanNode) -> Self {
        self.tree = tree;
        self
    }

    /// Declare the fields of the rows returned by the base SQL.
    #[must_use]
    pub fn with_fields(mut self, fields: RecordInfo) -> Self {
        self.fields = fields;
        self
    }

    fn wrap(mut self, node: impl FnOnce(Box<PlanNode>) -> PlanNode) -> Self {
        let source = std::mem::take(&mut self.tree);
        self.tree = node(Box::new(source));
        self
    }

    #[must_use]
    pub fn filter(self, predicate: Predicate) -> Self {
        self.wrap(|source| PlanNode::Filter { predicate, source })
    }

    #[must_use]
    pub fn sort_by(self, key: Predicate) -> Self {
        self.wrap(|source| PlanNode::SortBy {
            key,
            direction: OrderDirection::Asc,
            source,
        })
    }

    #[must_use]
    pub fn sort_by_descending(self, key: Predicate) -> Self {
        self.wrap(|source| PlanNode::SortBy {
            key,
            direction: OrderDirection::Desc,
            source,
        })
    }

    #[must_use]
    pub fn then_sort_by(self, key: Predicate) -> Self {
        self.wrap(|source| PlanNode::ThenSortBy {
            key,
            direction: OrderDirection::Asc,
            source,
        })
    }

    #[must_use]
    pub fn then_sort_by_descending(self, key: Predicate) -> Self {
        self.wrap(|source| PlanNode::ThenSortBy {
            key,
            direction: OrderDirection::Desc,
            source,
        })
    }

    #[must_use]
    pub fn skip(self, count: u64) -> Self {
        self.wrap(|source| PlanNode::Skip { count, source })
    }

    #[must_use]
    pub fn take(self, count: u64) -> Self {
        self.wrap(|source| PlanNode::Take { count, source })
    }

    #[must_use]
    pub fn project(self, shape: Shape) -> Self {
        self.wrap(|source| PlanNode::Project {
            shape,
            mutator: None,
            source,
        })
    }

    /// Register a function run over every fetched row, after the rows of earlier
    /// registrations have been through theirs.
    #[must_use]
    pub fn register_row_mutator<F>(mut self, mutator: F) -> Self
    where
        F: Fn(&mut R) + Send + Sync + 'static,
    {
        let id = MutatorId(self.mutators.len());
        self.mutators.push(Arc::new(mutator));
        self.wrap(|source| PlanNode::Project {
            shape: Shape::Row,
            mutator: Some(id),
            source,
        })
    }

    /// Read a field from another column. Replaces an earlier mapping of the same field.
    #[must_use]
    pub fn rename_column(mut self, field: impl Into<String>, column: impl Into<String>) -> Self {
        self.column_mappings
            .insert(field, ColumnMapping::Column(column.into()));
        self
    }

    /// Read a field from a SQL fragment, emitted verbatim.
    #[must_use]
    pub fn map_column_raw(mut self, field: impl Into<String>, sql: impl Into<String>) -> Self {
        self.column_mappings.insert(field, ColumnMapping::Raw(sql.into()));
        self
    }

    /// Re-select every mapped column explicitly and filter with WHERE.
    #[must_use]
    pub fn ensure_all_columns_mapped(mut self) -> Self {
        self.ensure_all_columns_mapped = true;
        self
    }

    #[must_use]
    pub fn insert_command(mut self, region: CommandRegion, sql: impl Into<String>) -> Self {
        self.additional_commands.push(CommandLocale::new(region, sql));
        self
    }

    /// Bind a parameter referenced by the base SQL, such as `@CustomerId`. The `@` may
    /// be left out. Names are compared ignoring case, as MySQL compares variable names,
    /// so binding `@customerid` afterwards replaces the value.
    #[must_use]
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<Literal>) -> Self {
        let name = name.into();
        let name = if name.starts_with('@') {
            name
        } else {
            format!("@{name}")
        };
        self.parameters.retain(|bound, _| !bound.eq_ignore_ascii_case(&name));
        self.parameters.insert(name, value.into());
        self
    }

    pub fn base_sql(&self) -> &str {
        &self.base_sql
    }

    pub fn tree(&self) -> &PlanNode {
        &self.tree
    }

    pub fn fields(&self) -> &RecordInfo {
        &self.fields
    }

    pub fn column_mappings(&self) -> &ColumnMappings {
        &self.column_mappings
    }

    pub fn all_columns_mapped(&self) -> bool {
        self.ensure_all_columns_mapped
    }

    pub fn additional_commands(&self) -> &[CommandLocale] {
        &self.additional_commands
    }

    pub fn parameters(&self) -> &IndexMap<String, Literal> {
        &self.parameters
    }

    pub fn mutator(&self, id: MutatorId) -> Option<&RowMutator<R>> {
        self.mutators.get(id.0)
    }
}

impl<R> Clone for QueryPlan<R> {
    fn clone(&self) -> Self {
        QueryPlan {
            base_sql: self.base_sql.clone(),
            tree: self.tree.clone(),
            fields: self.fields.clone(),
            column_mappings: self.column_mappings.clone(),
            ensure_all_columns_mapped: self.ensure_all_columns_mapped,
            additional_commands: self.additional_commands.clone(),
            parameters: self.parameters.clone(),
            mutators: self.mutators.clone(),
        }
    }
}

impl<R> fmt::Debug for QueryPlan<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryPlan")
            .field("base_sql", &self.base_sql)
            .field("tree", &self.tree)
            .field("column_mappings", &self.column_mappings)
            .field("ensure_all_columns_mapped", &self.ensure_all_columns_mapped)
            .field("additional_commands", &self.additional_commands)
            .field("parameters", &self.parameters)
            .field("mutators", &self.mutators.len())
            .finish_non_exhaustive()
    }
}

impl<R> fmt::Display for QueryPlan<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::predicate::{field, literal};

    #[test]
    fn parameters_are_replaced_ignoring_case() {
        let plan = QueryPlan::<()>::new("SELECT * FROM t WHERE Age >= @MinimumAge")
            .with_parameter("MinimumAge", 18)
            .with_parameter("@minimumage", 21);
        let parameters: Vec<(&String, &Literal)> = plan.parameters().iter().collect();
        assert_eq!(
            parameters,
            vec![(&"@minimumage".to_string(), &Literal::Int(21))]
        );
    }

    #[test]
    fn builder_wraps_outside_in() {
        let plan = QueryPlan::<()>::new("SELECT 1")
            .filter(field("Id").equals(literal(1)))
            .sort_by(field("Name"))
            .then_sort_by_descending(field("Id"))
            .skip(10)
            .take(100);

        similar_asserts::assert_eq!(
            plan.to_string(),
            "source.filter((Id == 1)).sort_by(Name ASC).then_sort_by(Id DESC).skip(10).take(100)"
        );
        assert!(matches!(plan.tree(), PlanNode::Take { count: 100, .. }));
    }

    #[test]
    fn mutators_are_referenced_by_projection_nodes() {
        let plan = QueryPlan::<String>::new("SELECT 1")
            .register_row_mutator(|row: &mut String| row.push('!'));
        match plan.tree() {
            PlanNode::Project {
                shape: Shape::Row,
                mutator: Some(id),
                ..
            } => {
                let mutator = plan.mutator(*id).unwrap();
                let mut row = String::from("hi");
                mutator(&mut row);
                assert_eq!(row, "hi!");
            }
            other => panic!("unexpected tree {other:?}"),
        }
    }

    #[test]
    fn renames_overwrite() {
        let plan = QueryPlan::<()>::new("SELECT 1")
            .rename_column("Name", "a")
            .rename_column("Name", "b");
        assert_eq!(
            plan.column_mappings().get("Name"),
            Some(&ColumnMapping::Column("b".into()))
        );
    }
}
