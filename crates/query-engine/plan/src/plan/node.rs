//! The plan tree.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::predicate::Predicate;

/// A node of the plan tree. Each operation wraps the plan it refines, so the outermost
/// node is the operation that was specified last.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlanNode {
    /// The rows of the base SQL fragment.
    #[default]
    Source,
    Filter {
        predicate: Predicate,
        source: Box<PlanNode>,
    },
    SortBy {
        key: Predicate,
        direction: OrderDirection,
        source: Box<PlanNode>,
    },
    ThenSortBy {
        key: Predicate,
        direction: OrderDirection,
        source: Box<PlanNode>,
    },
    Skip {
        count: u64,
        source: Box<PlanNode>,
    },
    Take {
        count: u64,
        source: Box<PlanNode>,
    },
    Project {
        shape: Shape,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mutator: Option<MutatorId>,
        source: Box<PlanNode>,
    },
}

impl PlanNode {
    /// The plan this node refines, `None` for the source.
    pub fn source(&self) -> Option<&PlanNode> {
        match self {
            PlanNode::Source => None,
            PlanNode::Filter { source, .. }
            | PlanNode::SortBy { source, .. }
            | PlanNode::ThenSortBy { source, .. }
            | PlanNode::Skip { source, .. }
            | PlanNode::Take { source, .. }
            | PlanNode::Project { source, .. } => Some(source),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderDirection {
    Asc,
    Desc,
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderDirection::Asc => write!(f, "ASC"),
            OrderDirection::Desc => write!(f, "DESC"),
        }
    }
}

/// What a projection keeps of each row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    /// The whole row. Used when only a row mutator is registered.
    Row,
    /// A single field.
    Field { name: String },
    /// Several members. Members that are not simple fields are not columns.
    Composite { members: Vec<Predicate> },
}

impl Shape {
    pub fn field(name: impl Into<String>) -> Shape {
        Shape::Field { name: name.into() }
    }

    pub fn fields<I>(names: I) -> Shape
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Shape::Composite {
            members: names.into_iter().map(super::predicate::field).collect(),
        }
    }
}

/// Index of a row mutator registered on a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MutatorId(pub usize);

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Row => write!(f, "row"),
            Shape::Field { name } => write!(f, "{name}"),
            Shape::Composite { members } => {
                write!(f, "{{ ")?;
                for (index, member) in members.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{member}")?;
                }
                write!(f, " }}")
            }
        }
    }
}

impl fmt::Display for PlanNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanNode::Source => write!(f, "source"),
            PlanNode::Filter { predicate, source } => write!(f, "{source}.filter({predicate})"),
            PlanNode::SortBy {
                key,
                direction,
                source,
            } => write!(f, "{source}.sort_by({key} {direction})"),
            PlanNode::ThenSortBy {
                key,
                direction,
                source,
            } => write!(f, "{source}.then_sort_by({key} {direction})"),
            PlanNode::Skip { count, source } => write!(f, "{source}.skip({count})"),
            PlanNode::Take { count, source } => write!(f, "{source}.take({count})"),
            PlanNode::Project {
                shape,
                mutator: None,
                source,
            } => write!(f, "{source}.project({shape})"),
            PlanNode::Project {
                shape,
                mutator: Some(MutatorId(id)),
                source,
            } => write!(f, "{source}.project({shape}, mutator #{id})"),
        }
    }
}
