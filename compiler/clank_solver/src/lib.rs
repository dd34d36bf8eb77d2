//! Refinement-predicate solver for the Clank compiler.
//!
//! The public surface is [`solve`]: given a [`Predicate`] goal and a
//! [`RefinementContext`] of known facts, it answers discharged, refuted
//! (with a definite counterexample), or unknown (optionally with a
//! candidate counterexample). See `solve.rs` for the pipeline.
//!
//! [`Predicate`]: clank_types::refine::Predicate

mod bounds;
mod context;
mod simplify;
mod solve;

pub use bounds::{atomic_bound, AtomicBound};
pub use context::{Fact, RefinementContext};
pub use simplify::{simplify, simplify_term, substitute_definitions};
pub use solve::{solve, solve_with_config, Counterexample, SolveResult, SolverConfig};
