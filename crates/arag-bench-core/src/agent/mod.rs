//! Bounded, tool-using agent loop.
//!
//! Each cycle asks the generation provider for its next move, parses the
//! reply (see [`parse_response`]), and either runs one retrieval tool,
//! feeds back a correction, or stops with an answer. At most `max_steps`
//! cycles run; when the bound is hit the loop answers with the
//! controller's last non-empty thought and marks the metrics exhausted.

pub mod prompts;
pub mod state;

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::llm::{GenerationProvider, Message};
use crate::metrics::Metrics;
use crate::models::{AgentAnswer, AgentStep};
use crate::tools::{RetrievalTools, ToolCall};

pub use state::{AgentState, StateEvent};

/// What the controller asked for in one response.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Tool(ToolCall),
    Final(String),
    /// A `TOOL_CALL:` line that did not parse, or an empty response.
    Invalid(String),
}

/// One parsed controller response.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerTurn {
    pub thought: String,
    pub action: Action,
}

/// Parse a controller response.
///
/// Recognized line prefixes are `THOUGHT:`, `TOOL_CALL:` and
/// `FINAL_ANSWER:`. Unprefixed lines are treated as part of the thought.
/// Everything from `FINAL_ANSWER:` on is the answer. A response with no
/// tool call but some text is an implicit final answer.
pub fn parse_response(response: &str) -> ControllerTurn {
    let mut thought_lines: Vec<&str> = Vec::new();
    let mut action: Option<Action> = None;

    let mut lines = response.lines();
    while let Some(line) = lines.next() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("THOUGHT:") {
            thought_lines.push(rest.trim());
        } else if let Some(rest) = line.strip_prefix("TOOL_CALL:") {
            action = Some(match serde_json::from_str::<ToolCall>(rest.trim()) {
                Ok(call) => Action::Tool(call),
                Err(e) => Action::Invalid(e.to_string()),
            });
            break;
        } else if let Some(rest) = line.strip_prefix("FINAL_ANSWER:") {
            let mut answer = vec![rest.trim()];
            answer.extend(lines.by_ref());
            let answer = answer.join("\n").trim().to_string();
            if !answer.is_empty() {
                action = Some(Action::Final(answer));
            }
            break;
        } else if !line.is_empty() {
            thought_lines.push(line);
        }
    }

    let thought = thought_lines
        .into_iter()
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let action = match action {
        Some(a) => a,
        None if !thought.is_empty() => Action::Final(thought.clone()),
        None => Action::Invalid("empty response".to_string()),
    };

    ControllerTurn { thought, action }
}

pub fn exhausted_fallback(max_steps: usize) -> String {
    format!("Could not complete an answer within {} steps.", max_steps)
}

#[derive(Clone)]
pub struct AgentLoop {
    tools: RetrievalTools,
    generator: Arc<dyn GenerationProvider>,
    max_steps: usize,
}

impl AgentLoop {
    pub fn new(
        tools: RetrievalTools,
        generator: Arc<dyn GenerationProvider>,
        max_steps: usize,
    ) -> Self {
        Self {
            tools,
            generator,
            max_steps,
        }
    }

    pub fn tools(&self) -> &RetrievalTools {
        &self.tools
    }

    pub async fn run(&self, query: &str) -> Result<AgentAnswer> {
        let started = Instant::now();
        let mut state = AgentState::Thinking;
        let mut messages = vec![
            Message::system(prompts::SYSTEM_PROMPT),
            Message::user(prompts::question_prompt(query)),
        ];
        let mut trace: Vec<AgentStep> = Vec::new();
        let mut counted: Vec<String> = Vec::new();
        let mut last_thought: Option<String> = None;
        let mut answer: Option<String> = None;

        info!(max_steps = self.max_steps, "agent loop started");

        for cycle in 1..=self.max_steps {
            let response = self.generator.generate(&messages).await?;
            let turn = parse_response(&response);
            if !turn.thought.is_empty() {
                last_thought = Some(turn.thought.clone());
            }
            messages.push(Message::assistant(response));

            match turn.action {
                Action::Tool(call) => {
                    state = state.transition(StateEvent::ToolSelected)?;
                    debug!(cycle, tool = call.name(), arg = call.argument(), "tool selected");

                    let observation = self.tools.invoke(&call).await?;
                    state = state.transition(StateEvent::ToolReturned)?;

                    counted.push(
                        serde_json::to_string(&call).unwrap_or_else(|_| call.to_string()),
                    );
                    counted.push(observation.clone());
                    messages.push(Message::user(prompts::observation_prompt(&observation)));
                    trace.push(AgentStep { call, observation });

                    let event = if cycle < self.max_steps {
                        StateEvent::Continue
                    } else {
                        StateEvent::StepLimit
                    };
                    state = state.transition(event)?;
                }
                Action::Final(text) => {
                    state = state.transition(StateEvent::Finish)?;
                    answer = Some(text);
                    break;
                }
                Action::Invalid(reason) => {
                    warn!(cycle, reason = %reason, "controller produced an invalid tool call");
                    messages.push(Message::user(prompts::invalid_call_prompt(&reason)));
                    state = state.transition(StateEvent::Rejected)?;
                }
            }
        }

        let exhausted = answer.is_none();
        let answer = match answer {
            Some(a) => a,
            None => {
                if !state.is_terminal() {
                    state = state.transition(StateEvent::StepLimit)?;
                }
                warn!(max_steps = self.max_steps, "agent loop hit its step bound");
                last_thought.unwrap_or_else(|| exhausted_fallback(self.max_steps))
            }
        };
        debug_assert!(state.is_terminal());

        counted.push(answer.clone());
        let counted_refs: Vec<&str> = counted.iter().map(String::as_str).collect();
        let metrics = Metrics::agentic(trace.len(), started.elapsed(), &counted_refs, exhausted);

        info!(
            steps = metrics.steps,
            latency = metrics.latency,
            tokens = metrics.tokens,
            exhausted,
            "agent loop answered"
        );

        Ok(AgentAnswer {
            answer,
            metrics,
            trace,
        })
    }
}
