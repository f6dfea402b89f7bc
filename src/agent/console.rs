//! Terminal rendering for the chat front-end.

use std::io::{self, Write};

use crossterm::style::{style, Color, Stylize};
use serde_json::Value;

use super::session::{TurnEvent, TurnObserver, TurnSummary};
use crate::llm::TokenUsage;

/// Lines that end the conversation (case-insensitive).
pub const EXIT_COMMANDS: [&str; 3] = ["quit", "exit", "q"];

pub fn is_exit_command(input: &str) -> bool {
    let input = input.trim();
    EXIT_COMMANDS.iter().any(|c| c.eq_ignore_ascii_case(input))
}

/// Render tool arguments as `key=value` pairs.
pub fn format_arguments(arguments: &Value) -> String {
    match arguments {
        Value::Object(map) if map.is_empty() => String::new(),
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| match v {
                Value::String(s) => format!("{}={}", k, s),
                other => format!("{}={}", k, other),
            })
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

/// Writes styled output for one session.
pub struct Console<W: Write> {
    out: W,
    color: bool,
}

fn color_enabled() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

impl Console<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout(), color_enabled())
    }
}

impl Console<io::Stderr> {
    /// For fatal errors, so piped stdout only carries the conversation.
    pub fn stderr() -> Self {
        Self::new(io::stderr(), color_enabled())
    }
}

impl<W: Write> Console<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn paint(&self, text: &str, color: Color, bold: bool) -> String {
        if !self.color {
            return text.to_string();
        }
        let styled = style(text).with(color);
        if bold {
            styled.bold().to_string()
        } else {
            styled.to_string()
        }
    }

    fn dim(&self, text: &str) -> String {
        if self.color {
            style(text).dim().to_string()
        } else {
            text.to_string()
        }
    }

    /// Boxed block with a colored header line.
    fn panel(&mut self, title: &str, color: Color, body: &str) -> io::Result<()> {
        let edge = self.paint("│", color, false);
        writeln!(
            self.out,
            "{} {}",
            self.paint("╭─", color, false),
            self.paint(title, color, true)
        )?;
        for line in body.lines() {
            writeln!(self.out, "{} {}", edge, line)?;
        }
        writeln!(self.out, "{}", self.paint("╰─", color, false))?;
        self.out.flush()
    }

    pub fn banner(&mut self, model: &str) -> io::Result<()> {
        let body = format!(
            "Manage your tasks in plain language.\n\
             Model: {}\n\
             Type 'quit' or press Ctrl-C to leave.",
            model
        );
        self.panel("Task Assistant", Color::Cyan, &body)?;
        writeln!(self.out)
    }

    pub fn prompt(&mut self) -> io::Result<()> {
        write!(self.out, "{}", self.paint("you> ", Color::Green, true))?;
        self.out.flush()
    }

    pub fn assistant_text(&mut self, text: &str) -> io::Result<()> {
        self.panel("Assistant", Color::Blue, text)
    }

    pub fn tool_use(&mut self, name: &str, arguments: &Value) -> io::Result<()> {
        let args = format_arguments(arguments);
        let line = if args.is_empty() {
            format!("{} {}", self.paint("⚙", Color::Magenta, false), name)
        } else {
            format!(
                "{} {} {}",
                self.paint("⚙", Color::Magenta, false),
                name,
                self.dim(&format!("({})", args))
            )
        };
        writeln!(self.out, "{}", line)?;
        self.out.flush()
    }

    pub fn tool_denied(&mut self, name: &str, reason: &str) -> io::Result<()> {
        self.panel(&format!("Blocked: {}", name), Color::Yellow, reason)
    }

    pub fn usage(&mut self, usage: &TokenUsage) -> io::Result<()> {
        let line = format!(
            "tokens: {} in / {} out",
            usage.prompt_tokens, usage.completion_tokens
        );
        writeln!(self.out, "{}", self.dim(&line))?;
        writeln!(self.out)
    }

    /// Close out a turn: usage line, plus a note if the loop was cut short.
    pub fn finish_turn(&mut self, summary: &TurnSummary) -> io::Result<()> {
        if summary.hit_iteration_limit {
            let note = self.paint(
                "Stopped: too many tool calls in one turn.",
                Color::Yellow,
                false,
            );
            writeln!(self.out, "{}", note)?;
        }
        if summary.truncated {
            let note = self.paint(
                "Reply was cut off at the model's output limit.",
                Color::Yellow,
                false,
            );
            writeln!(self.out, "{}", note)?;
        }
        self.usage(&summary.usage)
    }

    pub fn notice(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{}", self.dim(text))?;
        self.out.flush()
    }

    pub fn error(&mut self, message: &str) -> io::Result<()> {
        writeln!(
            self.out,
            "{} {}",
            self.paint("Error:", Color::Red, true),
            message
        )?;
        self.out.flush()
    }
}

impl<W: Write + Send> TurnObserver for Console<W> {
    fn on_event(&mut self, event: TurnEvent<'_>) {
        let result = match event {
            TurnEvent::Text(text) => self.assistant_text(text),
            TurnEvent::ToolUse { name, arguments } => self.tool_use(name, arguments),
            TurnEvent::ToolDenied { name, reason } => self.tool_denied(name, reason),
        };
        if let Err(e) = result {
            tracing::warn!("Failed to write to terminal: {}", e);
        }
    }
}
