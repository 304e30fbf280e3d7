//! Hook event kinds and the per-kind field schema registry.
//!
//! The 11 lifecycle events an agent can fire are a closed set, so the kind
//! is an enum and every per-kind lookup is a `match` -- there is no
//! string-keyed registry and no "unknown kind" fallback to reach.

pub mod event;
pub mod kind;
pub mod schema;
pub mod validate;

pub use event::{BaseFields, HookEvent};
pub use kind::{CaptureMode, FiringPolicy, HookKind};
pub use schema::{FieldShape, FieldSpec, spec_for};
pub use validate::{FieldOutcome, ValidationReport, validate};
