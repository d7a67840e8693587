//! Outcome subsystem.
//!
//! # Data Flow
//! ```text
//! Handler pipeline
//!     → descriptor.rs (Outcome: descriptor, raw value, or failure)
//!     → resolver.rs (rule mode, rule-local failure table, global failure table)
//!         → failure.rs (ancestry walk over the declared failure hierarchy)
//!     → Return: ResponseDescriptor (kind + payload + status) or unhandled failure
//! ```

pub mod descriptor;
pub mod failure;
pub mod resolver;

pub use descriptor::{DescriptorKind, Outcome, Payload, RedirectTarget, ResponseDescriptor};
pub use failure::{Failure, FailureForward, FailureHierarchy, FailureKind, FailureTable};
pub use resolver::{FailurePrecedence, OutcomeResolver};
