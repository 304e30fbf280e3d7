//! Static test scenarios, one per hook kind.
//!
//! Each scenario is the fixed (prompt, turn-budget, tool allow-list) tuple
//! used to attempt to trigger its hook. Prompts that exercise tools keep
//! the allow-list down to exactly the tools the scenario needs.

use crate::hook::HookKind;

/// Configuration driving one harness run for one hook kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scenario {
    pub kind: HookKind,
    pub description: &'static str,
    pub prompt: &'static str,
    pub max_turns: u32,
    pub allowed_tools: &'static [&'static str],
}

impl Scenario {
    /// All scenarios, in suite order.
    pub fn all() -> impl Iterator<Item = Scenario> {
        HookKind::ALL.into_iter().map(scenario_for)
    }
}

/// The standard scenario for one hook kind.
pub fn scenario_for(kind: HookKind) -> Scenario {
    match kind {
        HookKind::SessionStart => Scenario {
            kind,
            description: "SessionStart fires automatically at session initialization",
            prompt: "What is 2 + 2?",
            max_turns: 1,
            allowed_tools: &[],
        },
        HookKind::SessionEnd => Scenario {
            kind,
            description: "SessionEnd fires automatically at session completion",
            prompt: "What is 2 + 2?",
            max_turns: 1,
            allowed_tools: &[],
        },
        HookKind::PreToolUse => Scenario {
            kind,
            description: "Triggers PreToolUse when the Read tool is invoked",
            prompt: "Read the file Hooks.md and tell me what hook events are listed.",
            max_turns: 3,
            allowed_tools: &["Read"],
        },
        HookKind::PostToolUse => Scenario {
            kind,
            description: "Triggers PostToolUse after the Read tool completes",
            prompt: "Read the file Hooks.md and tell me what hook events are listed.",
            max_turns: 3,
            allowed_tools: &["Read"],
        },
        HookKind::PermissionRequest => Scenario {
            kind,
            description: "PermissionRequest fires when a tool requires permission approval",
            prompt: "Run the command 'ls -la' using the Bash tool to list files in the current directory.",
            max_turns: 3,
            allowed_tools: &["Bash"],
        },
        HookKind::Notification => Scenario {
            kind,
            description: "Notification fires when the agent sends notifications (may not trigger in all scenarios)",
            prompt: "What is 2 + 2?",
            max_turns: 1,
            allowed_tools: &[],
        },
        HookKind::UserPromptSubmit => Scenario {
            kind,
            description: "UserPromptSubmit fires for every user prompt submission",
            prompt: "What is the capital of France?",
            max_turns: 1,
            allowed_tools: &[],
        },
        HookKind::Stop => Scenario {
            kind,
            description: "Stop fires on interruption (requires manual SIGINT, cannot be staged automatically)",
            prompt: "What is 2 + 2?",
            max_turns: 1,
            allowed_tools: &[],
        },
        HookKind::SubagentStart => Scenario {
            kind,
            description: "SubagentStart fires when the Task tool launches a subagent",
            prompt: "Use the Task tool to quickly search for any markdown files in this directory.",
            max_turns: 5,
            allowed_tools: &["Task", "Glob", "Grep"],
        },
        HookKind::SubagentStop => Scenario {
            kind,
            description: "SubagentStop fires when a Task tool subagent completes",
            prompt: "Use the Task tool to quickly search for any markdown files in this directory.",
            max_turns: 5,
            allowed_tools: &["Task", "Glob", "Grep"],
        },
        HookKind::PreCompact => Scenario {
            kind,
            description: "PreCompact fires before context compaction (hard to trigger in short runs)",
            prompt: "What is 2 + 2?",
            max_turns: 1,
            allowed_tools: &[],
        },
    }
}
