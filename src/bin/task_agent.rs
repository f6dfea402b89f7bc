//! task-agent - interactive chat over the task database.
//!
//! Reads one line at a time from stdin and runs it as a single turn against
//! the LLM, which may only use the task tools.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use todo_app::agent::console::is_exit_command;
use todo_app::agent::{Console, TaskAgent};
use todo_app::config::Config;
use todo_app::llm::OpenRouterClient;
use todo_app::store::SqliteTaskStore;
use todo_app::task::TaskService;
use todo_app::tools::ToolRegistry;

#[tokio::main]
async fn main() {
    // Logs go to stderr so they don't interleave with the conversation.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "todo_app=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut console = Console::stdout();
    if let Err(e) = run(&mut console).await {
        let message = format!("{:#}", e);
        if let Err(io_err) = Console::stderr().error(&message) {
            tracing::error!("{} (could not write to stderr: {})", message, io_err);
        }
        std::process::exit(1);
    }
}

async fn run(console: &mut Console<std::io::Stdout>) -> anyhow::Result<()> {
    let config = Config::from_env()?;
    let api_key = config.require_api_key()?;

    let store = SqliteTaskStore::new(&config.database_path).await?;
    let service = Arc::new(TaskService::new(Arc::new(store)));
    let agent = TaskAgent::new(
        Arc::new(OpenRouterClient::new(api_key)),
        ToolRegistry::for_tasks(service),
        config.default_model.clone(),
        config.max_iterations,
    );

    console.banner(agent.model())?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        console.prompt()?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                console.notice("\nInterrupted. Goodbye!")?;
                return Ok(());
            }
        };

        // EOF
        let Some(line) = line else {
            console.notice("\nGoodbye!")?;
            return Ok(());
        };

        let input = line.trim();
        if is_exit_command(input) {
            console.notice("Goodbye!")?;
            return Ok(());
        }
        if input.is_empty() {
            continue;
        }

        let finished = tokio::select! {
            summary = agent.run_turn(input, &mut *console) => Some(summary?),
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(summary) = finished else {
            console.notice("\nInterrupted. Goodbye!")?;
            return Ok(());
        };
        console.finish_turn(&summary)?;
    }
}
