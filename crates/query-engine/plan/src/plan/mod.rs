//! The plan tree, its predicates, and the fluent builder used to construct it.

pub mod node;
pub mod predicate;
pub mod query;
pub mod transform;

pub use node::{MutatorId, OrderDirection, PlanNode, Shape};
pub use predicate::{field, literal, null, BinaryOperator, Predicate, UnaryOperator};
pub use query::QueryPlan;
pub use transform::{ItemTransform, RowMutator};
