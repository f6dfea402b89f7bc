//! One conversational turn against the task tools.
//!
//! # Algorithm
//! 1. Send the system instruction and the user's line to the LLM
//! 2. Report any text segment to the observer as it arrives
//! 3. For each requested tool: report it, pass it through the guard, execute
//!    allowed calls and feed every result (or denial) back
//! 4. Repeat until the LLM answers without tool calls or `max_iterations`
//!
//! Nothing carries over between turns; tasks live in the store.

use std::sync::Arc;

use serde_json::Value;

use super::guard::{check_tool, ToolDecision};
use crate::llm::{ChatMessage, LlmClient, Role, TokenUsage, ToolCall};
use crate::tools::ToolRegistry;

/// Something worth showing the user while a turn is in progress.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnEvent<'a> {
    /// A text segment from the assistant.
    Text(&'a str),
    /// The assistant invoked a tool.
    ToolUse { name: &'a str, arguments: &'a Value },
    /// A tool call was refused by the guard.
    ToolDenied { name: &'a str, reason: &'a str },
}

/// Receives [`TurnEvent`]s as they happen.
pub trait TurnObserver: Send {
    fn on_event(&mut self, event: TurnEvent<'_>);
}

/// What a finished turn produced.
#[derive(Debug, Clone, Default)]
pub struct TurnSummary {
    /// Final assistant text, if the model produced one.
    pub reply: Option<String>,
    pub usage: TokenUsage,
    pub iterations: usize,
    pub tool_calls: usize,
    /// The loop stopped at `max_iterations` while the model still wanted tools.
    pub hit_iteration_limit: bool,
    /// The last reply ended on the output token limit rather than a natural stop.
    pub truncated: bool,
}

pub struct TaskAgent {
    llm: Arc<dyn LlmClient>,
    tools: ToolRegistry,
    model: String,
    max_iterations: usize,
}

impl TaskAgent {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        tools: ToolRegistry,
        model: impl Into<String>,
        max_iterations: usize,
    ) -> Self {
        Self {
            llm,
            tools,
            model: model.into(),
            max_iterations: max_iterations.max(1),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// System instruction restricting the assistant to task management.
    pub fn system_prompt(&self) -> String {
        let tool_descriptions = self
            .tools
            .list_tools()
            .iter()
            .map(|t| format!("- {}: {}", t.name, t.description))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"You are a task management assistant.
Interpret the user's message and use the tools below to act on their tasks.
Answer briefly.

Available tools:
{tool_descriptions}

You cannot help with anything other than managing tasks."#
        )
    }

    /// Run one user turn to completion.
    pub async fn run_turn(
        &self,
        input: &str,
        observer: &mut dyn TurnObserver,
    ) -> anyhow::Result<TurnSummary> {
        let mut messages = vec![
            ChatMessage::new(Role::System, self.system_prompt()),
            ChatMessage::new(Role::User, input),
        ];
        let tool_schemas = self.tools.get_tool_schemas();
        let mut summary = TurnSummary::default();

        for iteration in 0..self.max_iterations {
            tracing::debug!("Agent iteration {}", iteration + 1);
            summary.iterations = iteration + 1;

            let response = self
                .llm
                .chat_completion(&self.model, &messages, Some(&tool_schemas))
                .await?;

            if let Some(usage) = response.usage {
                summary.usage = summary.usage.add(&usage);
            }
            summary.truncated = response.is_truncated();
            if summary.truncated {
                tracing::warn!("Reply from {} was cut off at the token limit", self.model);
            }
            if let Some(text) = response.content.as_deref() {
                observer.on_event(TurnEvent::Text(text));
            }

            let tool_calls = match response.tool_calls {
                Some(calls) if !calls.is_empty() => calls,
                _ => {
                    summary.reply = response.content;
                    return Ok(summary);
                }
            };

            messages.push(ChatMessage::assistant_tool_calls(
                response.content,
                tool_calls.clone(),
            ));

            for call in &tool_calls {
                summary.tool_calls += 1;
                let result = self.dispatch(call, observer).await;
                messages.push(ChatMessage::tool_result(call.id.clone(), result));
            }
        }

        tracing::warn!(
            "Turn stopped after {} iterations with tool calls still pending",
            self.max_iterations
        );
        summary.hit_iteration_limit = true;
        Ok(summary)
    }

    /// Guard, execute and stringify one tool call. Never fails the turn.
    async fn dispatch(&self, call: &ToolCall, observer: &mut dyn TurnObserver) -> String {
        let name = call.function.name.as_str();
        let arguments = call.function.parsed_arguments();
        observer.on_event(TurnEvent::ToolUse {
            name,
            arguments: &arguments,
        });

        if let ToolDecision::Deny { reason } = check_tool(name) {
            tracing::warn!("Denied tool call '{}'", name);
            observer.on_event(TurnEvent::ToolDenied {
                name,
                reason: &reason,
            });
            return format!("Denied: {}", reason);
        }

        match self.tools.execute(name, arguments).await {
            Ok(output) => {
                tracing::debug!("Tool '{}' returned {} bytes", name, output.len());
                output
            }
            Err(e) => {
                tracing::warn!("Tool '{}' failed: {}", name, e);
                format!("Error: {}", e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ChatResponse, FunctionCall, ToolDefinition};
    use crate::store::InMemoryTaskStore;
    use crate::task::{TaskService, TaskStatus};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned responses and records what it was sent.
    struct ScriptedLlm {
        responses: Mutex<VecDeque<ChatResponse>>,
        requests: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl ScriptedLlm {
        fn new(responses: Vec<ChatResponse>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LlmClient for ScriptedLlm {
        async fn chat_completion(
            &self,
            _model: &str,
            messages: &[ChatMessage],
            tools: Option<&[ToolDefinition]>,
        ) -> anyhow::Result<ChatResponse> {
            assert_eq!(tools.map(|t| t.len()), Some(3));
            self.requests.lock().unwrap().push(messages.to_vec());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| anyhow::anyhow!("script exhausted"))
        }
    }

    #[derive(Default)]
    struct Recorder {
        texts: Vec<String>,
        tools: Vec<String>,
        denied: Vec<String>,
    }

    impl TurnObserver for Recorder {
        fn on_event(&mut self, event: TurnEvent<'_>) {
            match event {
                TurnEvent::Text(t) => self.texts.push(t.to_string()),
                TurnEvent::ToolUse { name, .. } => self.tools.push(name.to_string()),
                TurnEvent::ToolDenied { name, .. } => self.denied.push(name.to_string()),
            }
        }
    }

    fn call(id: &str, name: &str, arguments: &str) -> ToolCall {
        ToolCall {
            id: id.to_string(),
            call_type: "function".to_string(),
            function: FunctionCall {
                name: name.to_string(),
                arguments: arguments.to_string(),
            },
        }
    }

    fn tool_response(calls: Vec<ToolCall>) -> ChatResponse {
        ChatResponse {
            tool_calls: Some(calls),
            usage: Some(TokenUsage::new(10, 2)),
            ..Default::default()
        }
    }

    fn text_response(text: &str) -> ChatResponse {
        ChatResponse {
            content: Some(text.to_string()),
            usage: Some(TokenUsage::new(20, 5)),
            ..Default::default()
        }
    }

    fn agent(
        llm: Arc<ScriptedLlm>,
        service: Arc<TaskService>,
        max_iterations: usize,
    ) -> TaskAgent {
        TaskAgent::new(
            llm,
            ToolRegistry::for_tasks(service),
            "test-model",
            max_iterations,
        )
    }

    #[tokio::test]
    async fn tool_calls_reach_the_store_and_results_feed_back() {
        let service = Arc::new(TaskService::new(Arc::new(InMemoryTaskStore::new())));
        let llm = Arc::new(ScriptedLlm::new(vec![
            tool_response(vec![call("c1", "add_task", r#"{"title":"Buy milk"}"#)]),
            text_response("Added Buy milk."),
        ]));
        let agent = agent(Arc::clone(&llm), Arc::clone(&service), 5);

        let mut recorder = Recorder::default();
        let summary = agent.run_turn("add buy milk", &mut recorder).await.unwrap();

        assert_eq!(summary.reply.as_deref(), Some("Added Buy milk."));
        assert_eq!(summary.iterations, 2);
        assert_eq!(summary.tool_calls, 1);
        assert_eq!(summary.usage, TokenUsage::new(30, 7));
        assert_eq!(recorder.tools, vec!["add_task"]);
        assert_eq!(recorder.texts, vec!["Added Buy milk."]);

        let tasks = service.list(Some("todo")).await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "Buy milk");

        let requests = llm.requests.lock().unwrap();
        let second = &requests[1];
        let tool_msg = second.last().unwrap();
        assert_eq!(tool_msg.role, Role::Tool);
        assert_eq!(tool_msg.tool_call_id.as_deref(), Some("c1"));
        assert_eq!(tool_msg.content.as_deref(), Some("Added task: Buy milk"));
    }

    #[tokio::test]
    async fn disallowed_tools_are_denied_and_the_turn_continues() {
        let service = Arc::new(TaskService::new(Arc::new(InMemoryTaskStore::new())));
        let llm = Arc::new(ScriptedLlm::new(vec![
            tool_response(vec![call("c1", "run_command", r#"{"cmd":"rm -rf /"}"#)]),
            text_response("I can only manage tasks."),
        ]));
        let agent = agent(Arc::clone(&llm), service, 5);

        let mut recorder = Recorder::default();
        let summary = agent
            .run_turn("wipe the disk", &mut recorder)
            .await
            .unwrap();

        assert_eq!(recorder.denied, vec!["run_command"]);
        assert_eq!(summary.reply.as_deref(), Some("I can only manage tasks."));

        let requests = llm.requests.lock().unwrap();
        let fed_back = requests[1].last().unwrap().content.clone().unwrap();
        assert!(fed_back.starts_with("Denied: run_command is not permitted"));
    }

    #[tokio::test]
    async fn complete_by_fuzzy_query_through_the_loop() {
        let service = Arc::new(TaskService::new(Arc::new(InMemoryTaskStore::new())));
        let task = service.add("Buy milk").await.unwrap();
        let llm = Arc::new(ScriptedLlm::new(vec![
            tool_response(vec![call("c1", "complete_task", r#"{"query":"milk"}"#)]),
            text_response("Marked it done."),
        ]));
        let agent = agent(llm, Arc::clone(&service), 5);

        agent
            .run_turn("I bought the milk", &mut Recorder::default())
            .await
            .unwrap();
        assert_eq!(
            service.require(&task.id).await.unwrap().status,
            TaskStatus::Done
        );
    }

    #[tokio::test]
    async fn iteration_limit_stops_runaway_tool_use() {
        let service = Arc::new(TaskService::new(Arc::new(InMemoryTaskStore::new())));
        let llm = Arc::new(ScriptedLlm::new(vec![
            tool_response(vec![call("c1", "list_tasks", "{}")]),
            tool_response(vec![call("c2", "list_tasks", "{}")]),
        ]));
        let agent = agent(llm, service, 2);

        let summary = agent
            .run_turn("loop", &mut Recorder::default())
            .await
            .unwrap();
        assert!(summary.hit_iteration_limit);
        assert!(summary.reply.is_none());
        assert_eq!(summary.tool_calls, 2);
    }

    #[tokio::test]
    async fn length_finish_marks_the_reply_truncated() {
        let service = Arc::new(TaskService::new(Arc::new(InMemoryTaskStore::new())));
        let llm = Arc::new(ScriptedLlm::new(vec![
            tool_response(vec![call("c1", "list_tasks", "{}")]),
            ChatResponse {
                content: Some("Here are your tas".to_string()),
                finish_reason: Some("length".to_string()),
                ..Default::default()
            },
        ]));
        let agent = agent(llm, service, 5);

        let summary = agent
            .run_turn("list", &mut Recorder::default())
            .await
            .unwrap();
        assert!(summary.truncated);
        assert_eq!(summary.reply.as_deref(), Some("Here are your tas"));
    }

    #[tokio::test]
    async fn natural_stop_is_not_truncated() {
        let service = Arc::new(TaskService::new(Arc::new(InMemoryTaskStore::new())));
        let llm = Arc::new(ScriptedLlm::new(vec![ChatResponse {
            content: Some("Hello.".to_string()),
            finish_reason: Some("stop".to_string()),
            ..Default::default()
        }]));
        let agent = agent(llm, service, 5);

        let summary = agent
            .run_turn("hi", &mut Recorder::default())
            .await
            .unwrap();
        assert!(!summary.truncated);
    }

    #[tokio::test]
    async fn llm_failures_propagate() {
        let service = Arc::new(TaskService::new(Arc::new(InMemoryTaskStore::new())));
        let llm = Arc::new(ScriptedLlm::new(vec![]));
        let agent = agent(llm, service, 3);
        assert!(agent
            .run_turn("hi", &mut Recorder::default())
            .await
            .is_err());
    }

    #[test]
    fn system_prompt_lists_only_task_tools() {
        let service = Arc::new(TaskService::new(Arc::new(InMemoryTaskStore::new())));
        let agent = agent(Arc::new(ScriptedLlm::new(vec![])), service, 1);
        let prompt = agent.system_prompt();
        assert!(prompt.contains("- add_task:"));
        assert!(prompt.contains("- list_tasks:"));
        assert!(prompt.contains("- complete_task:"));
    }
}
