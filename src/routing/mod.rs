//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Rule Compilation (at startup or reload):
//!     RuleTableBuilder declarations (fluent calls or config file)
//!     → pattern.rs (compile globs, compute specificity)
//!     → Sort by specificity, then declaration order
//!     → Freeze as immutable RuleTable
//!
//! Incoming Request (method, context-stripped path)
//!     → matcher.rs (evaluate method + pattern)
//!     → Return: matched Rule with path variables, or no match
//! ```
//!
//! # Design Decisions
//! - Rules compiled once, immutable at runtime
//! - Literal patterns outrank `*`, which outrank `**`
//! - Deterministic: same input always matches same rule
//! - First match wins

pub mod matcher;
pub mod pattern;
pub mod rule;
pub mod table;

pub use matcher::{match_rule, RouteMatch};
pub use pattern::{PathPattern, PathVars};
pub use rule::{HandlerRef, OutcomeSpec, Rule, RuleMode};
pub use table::{RuleDeclaration, RuleTable, RuleTableBuilder};
