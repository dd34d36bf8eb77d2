//! Diagnostics and agent-consumable error reporting for the Clank compiler.
//!
//! Every user-visible failure is a [`Diagnostic`] value: an error code from
//! the closed [`ErrorCode`] set, a rendered message, a structured payload
//! for machine consumers, hints, related locations, and repair back-links.
//! Goals the checker cannot discharge become [`Obligation`]s with a frozen
//! context snapshot; `?` holes become [`TypeHole`]s.

mod code;
mod collector;
mod diagnostic;
mod emitter;
mod ids;
mod obligation;
mod suggest;

pub use code::ErrorCode;
pub use collector::{DiagnosticCollector, DiagnosticConfig};
pub use diagnostic::{
    Confidence, Counterexample, Diagnostic, Hint, HintStrategy, MissingPattern, Related, Severity,
    Structured,
};
pub use emitter::TextEmitter;
pub use ids::{DiagnosticId, HoleId, ObligationId, RepairId};
pub use obligation::{
    ContextBinding, Obligation, ObligationContext, ObligationKind, SolverStatus, TypeHole,
};
pub use suggest::{find_similar, find_similar_with_limits, levenshtein, longest_common_prefix};
