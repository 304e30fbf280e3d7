//! Core library for the remora hook verification harness.
//!
//! remora drives an external LLM coding agent through the same scenario
//! twice -- once with an in-process hook callback registered for the
//! invocation ("programmatic" mode), once with a declarative settings file
//! that the agent reads itself ("declarative" mode) -- then validates the
//! captured hook artifacts against a per-kind schema and compares the two
//! runs field by field.
//!
//! # Architecture
//!
//! ```text
//! suite::run_suite
//!     |
//!     v                         (per hook kind)
//! suite::run_kind -- Pending -> ProgrammaticRunning -> DeclarativeRunning
//!     |                               |                      |
//!     |          driver::run_programmatic      driver::run_declarative
//!     |                               |                      |
//!     |                 ArtifactStore::write       SettingsGuard + diff
//!     |                               \                      /
//!     |                                v                    v
//!     |                     hook::validate          hook::validate
//!     |                                \                  /
//!     |                                 v                v
//!     |                              compare::compare -> Compared
//!     |                                                     |
//!     +-----------------------------------------------------+--> Reported
//! ```

pub mod agent;
pub mod compare;
pub mod driver;
pub mod hook;
pub mod scenario;
pub mod session;
pub mod store;
pub mod suite;

pub use hook::{CaptureMode, FiringPolicy, HookKind};
pub use scenario::Scenario;
pub use store::ArtifactStore;
