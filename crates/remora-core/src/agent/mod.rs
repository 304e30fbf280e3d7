//! Agent adapter interface for external LLM coding agents.
//!
//! The harness treats the agent as an opaque streaming client: given a
//! prompt and options it produces an ordered asynchronous sequence of
//! typed [`AgentMessage`]s and, as a side effect, may invoke the hook
//! callbacks registered with the invocation. Callback firings and the
//! message stream are independently observable.
//!
//! # Architecture
//!
//! ```text
//! Driver
//!   |
//!   |  spawn(QueryRequest { prompt, hooks, setting_sources, ... })
//!   v
//! Arc<dyn Agent> ----> AgentHandle { id, agent_name }
//!   |
//!   |  messages(handle) --> Stream<AgentMessage>
//!   |                          (hook callbacks fire while draining)
//! ```

pub mod claude_code;
pub mod trait_def;
pub mod types;

pub use claude_code::ClaudeCodeAdapter;
pub use trait_def::Agent;
pub use types::{AgentHandle, AgentMessage, HookCallback, HookSubscription, QueryRequest, SettingSource};
