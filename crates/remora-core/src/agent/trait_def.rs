//! The `Agent` trait -- the adapter interface for external agent runtimes.
//!
//! Each concrete adapter (the Claude Code CLI, the in-process stub used in
//! tests) implements this trait. The trait is object-safe so the driver
//! can hold an `Arc<dyn Agent>`.

use std::pin::Pin;

use anyhow::Result;
use async_trait::async_trait;
use futures::Stream;

use super::types::{AgentHandle, AgentMessage, QueryRequest};

/// Adapter interface for invoking an external agent.
///
/// The harness only ever drains a run to completion: there is no
/// interruption or resumption surface, so the contract is spawn-then-stream.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Human-readable adapter name (e.g. "claude-code").
    fn name(&self) -> &str;

    /// Start one agent run for the given request.
    ///
    /// The adapter takes ownership of the request: hook subscriptions stay
    /// registered for the lifetime of this run only.
    async fn spawn(&self, request: QueryRequest) -> Result<AgentHandle>;

    /// The run's message stream.
    ///
    /// Yields messages until the run ends, emitting
    /// [`AgentMessage::Completed`] last. Registered hook callbacks fire as
    /// a side effect of draining this stream.
    fn messages(&self, handle: &AgentHandle) -> Pin<Box<dyn Stream<Item = AgentMessage> + Send>>;
}

// Compile-time assertion: Agent must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn Agent) {}
};

#[cfg(test)]
mod tests {
    use super::*;

    struct NoopAgent;

    #[async_trait]
    impl Agent for NoopAgent {
        fn name(&self) -> &str {
            "noop"
        }

        async fn spawn(&self, _request: QueryRequest) -> Result<AgentHandle> {
            Ok(AgentHandle {
                id: 0,
                agent_name: "noop".to_string(),
            })
        }

        fn messages(
            &self,
            _handle: &AgentHandle,
        ) -> Pin<Box<dyn Stream<Item = AgentMessage> + Send>> {
            Box::pin(futures::stream::iter([AgentMessage::Completed]))
        }
    }

    #[test]
    fn agent_is_object_safe() {
        let agent: Box<dyn Agent> = Box::new(NoopAgent);
        assert_eq!(agent.name(), "noop");
    }

    #[tokio::test]
    async fn noop_agent_spawn_and_drain() {
        use futures::StreamExt;

        let agent: Box<dyn Agent> = Box::new(NoopAgent);
        let handle = agent
            .spawn(QueryRequest::new("hello", "/tmp"))
            .await
            .unwrap();
        let messages: Vec<AgentMessage> = agent.messages(&handle).collect().await;
        assert_eq!(messages, vec![AgentMessage::Completed]);
    }
}
