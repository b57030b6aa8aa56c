//! Query plans: a tree of composable operations over a caller authored base SQL fragment.

pub mod plan;
