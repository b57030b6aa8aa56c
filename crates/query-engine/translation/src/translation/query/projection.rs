//! Translate projections: which columns a plan narrows to, and the row mutators it
//! applies after fetching.

use query_engine_plan::plan::{MutatorId, QueryPlan, Shape};

use super::node::Node;
use super::simplify::simplify;
use crate::translation::error::Error;
use crate::translation::helpers::{Env, State};

/// Record the columns selected by a projection and the mutator registered with it.
///
/// Only members that are simple fields are columns. A whole-row shape narrows nothing.
pub fn translate_projection<R>(
    env: &Env,
    plan: &QueryPlan<R>,
    state: &mut State<R>,
    shape: &Shape,
    mutator: Option<MutatorId>,
) -> Result<(), Error> {
    if let Some(id) = mutator {
        let mutator = plan.mutator(id).ok_or(Error::MutatorNotFound(id.0))?;
        state.item_transform_mut().push(mutator.clone());
    }

    match shape {
        Shape::Row => {}
        Shape::Field { name } => {
            state.begin_projection()?;
            select_if_simple(env, state, name)?;
        }
        Shape::Composite { members } => {
            state.begin_projection()?;
            for member in members {
                match simplify(env, member) {
                    Node::Field(name) => select_if_simple(env, state, &name)?,
                    other => tracing::debug!("Projection member '{}' is not a column", other),
                }
            }
        }
    }
    Ok(())
}

fn select_if_simple<R>(env: &Env, state: &mut State<R>, field: &str) -> Result<(), Error> {
    if env.is_simple_field(field)? {
        state.select_column(field);
    }
    Ok(())
}
