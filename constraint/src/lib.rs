//! Constraint Engine
//!
//! Loads declarative rule files and evaluates them against a scene store,
//! producing diagnostics. Each constraint scopes itself with a query
//! engine predicate and checks the matched entities per its kind.
//! Evaluation is exhaustive: one failing constraint never halts the rest.

mod checker;
mod def;
mod diagnostic;

pub use checker::*;
pub use def::*;
pub use diagnostic::*;
