//! Helpers for processing a query plan and building SQL.

use indexmap::IndexSet;
use query_engine_metadata::metadata::{ColumnMapping, ColumnMappings, RecordInfo};
use query_engine_plan::plan::{ItemTransform, QueryPlan};
use query_engine_sql::sql;

use super::error::Error;

/// Which clause filters are appended as, and how columns are selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblyMode {
    /// The base SQL selects every column; filters go into HAVING.
    Having,
    /// Every column is re-selected through its mapping; filters go into WHERE.
    AllColumnsMapped,
}

impl AssemblyMode {
    pub fn filter_clause(self) -> sql::ast::FilterClause {
        match self {
            AssemblyMode::Having => sql::ast::FilterClause::Having,
            AssemblyMode::AllColumnsMapped => sql::ast::FilterClause::Where,
        }
    }
}

/// A logical field resolved to the SQL that reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedColumn {
    pub reference: sql::ast::ColumnReference,
    /// Whether the column is a raw fragment, which is never quoted.
    pub mapped: bool,
}

impl ResolvedColumn {
    /// The SQL text of the column.
    pub fn text(&self) -> String {
        let mut sql = sql::string::SQL::new();
        self.reference.to_sql(&mut sql);
        sql.sql
    }
}

/// Maps logical field names to physical columns, following the renames of a plan.
/// It is never modified during translation, so one resolver can serve many translations.
#[derive(Debug, Clone, Copy)]
pub struct ColumnNameResolver<'a> {
    mappings: &'a ColumnMappings,
}

impl<'a> ColumnNameResolver<'a> {
    pub fn new(mappings: &'a ColumnMappings) -> ColumnNameResolver<'a> {
        ColumnNameResolver { mappings }
    }

    pub fn resolve(&self, field: &str) -> ResolvedColumn {
        match self.mappings.get(field) {
            None => ResolvedColumn {
                reference: sql::ast::ColumnReference::Column(sql::ast::ColumnName(
                    field.to_string(),
                )),
                mapped: false,
            },
            Some(ColumnMapping::Column(column)) => ResolvedColumn {
                reference: sql::ast::ColumnReference::Column(sql::ast::ColumnName(
                    column.clone(),
                )),
                mapped: false,
            },
            Some(ColumnMapping::Raw(fragment)) => ResolvedColumn {
                reference: sql::ast::ColumnReference::Mapped(sql::ast::RawSql(fragment.clone())),
                mapped: true,
            },
        }
    }

    /// Resolve a field straight to its SQL text.
    pub fn resolve_text(&self, field: &str) -> String {
        self.resolve(field).text()
    }

    pub fn mappings(&self) -> &'a ColumnMappings {
        self.mappings
    }
}

/// Static information from the plan.
#[derive(Debug, Clone, Copy)]
pub struct Env<'a> {
    pub resolver: ColumnNameResolver<'a>,
    fields: &'a RecordInfo,
    pub mode: AssemblyMode,
}

impl<'a> Env<'a> {
    pub fn new(
        resolver: ColumnNameResolver<'a>,
        fields: &'a RecordInfo,
        mode: AssemblyMode,
    ) -> Env<'a> {
        Env {
            resolver,
            fields,
            mode,
        }
    }

    /// Create a new Env from a plan.
    pub fn for_plan<R>(plan: &'a QueryPlan<R>) -> Env<'a> {
        let mode = if plan.all_columns_mapped() {
            AssemblyMode::AllColumnsMapped
        } else {
            AssemblyMode::Having
        };
        Env::new(
            ColumnNameResolver::new(plan.column_mappings()),
            plan.fields(),
            mode,
        )
    }

    /// Check that a field exists. Rows without declared fields accept any field.
    fn check_field(&self, field: &str) -> Result<(), Error> {
        if !self.fields.is_declared()
            || self.fields.lookup(field).is_some()
            || self.resolver.mappings().get(field).is_some()
        {
            Ok(())
        } else {
            Err(Error::FieldNotFound(field.to_string()))
        }
    }

    /// Resolve a field to the column reference used to read it.
    pub fn column(&self, field: &str) -> Result<sql::ast::ColumnReference, Error> {
        self.check_field(field)?;
        Ok(self.resolver.resolve(field).reference)
    }

    /// Whether the field maps onto a single selectable column.
    pub fn is_simple_field(&self, field: &str) -> Result<bool, Error> {
        self.check_field(field)?;
        match self.fields.lookup(field) {
            Some(info) => Ok(info.r#type.is_simple()),
            None => Ok(true),
        }
    }

    pub fn fields(&self) -> &'a RecordInfo {
        self.fields
    }
}

/// Stateful information changed throughout one translation.
#[derive(Debug)]
pub struct State<R> {
    selected_columns: IndexSet<String>,
    projection_translated: bool,
    item_transform: ItemTransform<R>,
}

impl<R> Default for State<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> State<R> {
    /// Build a new state.
    pub fn new() -> State<R> {
        State {
            selected_columns: IndexSet::new(),
            projection_translated: false,
            item_transform: ItemTransform::identity(),
        }
    }

    /// Record that the columns were narrowed. Only one projection may do so.
    pub fn begin_projection(&mut self) -> Result<(), Error> {
        if self.projection_translated {
            return Err(Error::SelectTranslatedTwice);
        }
        self.projection_translated = true;
        Ok(())
    }

    pub fn select_column(&mut self, field: &str) {
        self.selected_columns.insert(field.to_string());
    }

    pub fn item_transform_mut(&mut self) -> &mut ItemTransform<R> {
        &mut self.item_transform
    }

    /// Take the selected columns and the item transform.
    pub fn finish(self) -> (Vec<String>, ItemTransform<R>) {
        (
            self.selected_columns.into_iter().collect(),
            self.item_transform,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use query_engine_metadata::metadata::{FieldInfo, ScalarType};

    #[test]
    fn resolver_quotes_plain_names_only() {
        let mut mappings = ColumnMappings::empty();
        mappings.insert("Name", ColumnMapping::Column("new_name".into()));
        mappings.insert("Qualified", ColumnMapping::Column("p.name".into()));
        mappings.insert("Full", ColumnMapping::Raw("CONCAT(a, b)".into()));
        let resolver = ColumnNameResolver::new(&mappings);

        assert_eq!(resolver.resolve_text("Id"), "`Id`");
        assert_eq!(resolver.resolve_text("Name"), "`new_name`");
        assert_eq!(resolver.resolve_text("Qualified"), "p.name");
        assert_eq!(resolver.resolve_text("Full"), "CONCAT(a, b)");
        assert!(resolver.resolve("Full").mapped);
        assert!(!resolver.resolve("Name").mapped);
    }

    #[test]
    fn resolving_twice_changes_nothing() {
        let mappings = ColumnMappings::empty();
        let resolver = ColumnNameResolver::new(&mappings);
        for name in ["Name", "`Name`", "db.Name"] {
            let once = resolver.resolve_text(name);
            assert_eq!(resolver.resolve_text(&once), once);
        }
    }

    #[test]
    fn declared_rows_reject_unknown_fields() {
        let mappings = ColumnMappings::empty();
        let fields = RecordInfo::empty()
            .with_field("Id", FieldInfo::new(ScalarType::Integer))
            .with_field("Address", FieldInfo::new(ScalarType::Object));
        let env = Env::new(
            ColumnNameResolver::new(&mappings),
            &fields,
            AssemblyMode::Having,
        );

        assert_eq!(env.is_simple_field("Id"), Ok(true));
        assert_eq!(env.is_simple_field("Address"), Ok(false));
        assert_eq!(
            env.column("Missing"),
            Err(Error::FieldNotFound("Missing".to_string()))
        );
    }

    #[test]
    fn projections_are_translated_once() {
        let mut state = State::<()>::new();
        assert_eq!(state.begin_projection(), Ok(()));
        assert_eq!(state.begin_projection(), Err(Error::SelectTranslatedTwice));
    }
}
