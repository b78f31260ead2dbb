//! Shared CLI helpers — answer, transcript, and tool listing output.

use colored::Colorize;

use toolrun_agent::{SessionFailure, ToolRegistry};
use toolrun_core::types::{Message, Role, Usage};
use toolrun_core::utils::truncate_string;

/// Longest message body shown in a transcript.
const TRANSCRIPT_PREVIEW: usize = 400;

/// Print the final answer to stdout.
pub fn print_answer(answer: &str) {
    println!();
    println!("{}", "toolrun".cyan().bold());
    if answer.is_empty() {
        println!("{}", "(no answer)".dimmed());
    } else {
        println!("{answer}");
    }
    println!();
}

pub fn print_usage(turns: usize, usage: &Usage) {
    eprintln!(
        "{}",
        format!(
            "{turns} tool call(s), {} tokens ({} prompt + {} completion)",
            usage.total_tokens, usage.prompt_tokens, usage.completion_tokens
        )
        .dimmed()
    );
}

/// Print a failed session: the error, then what was said before it.
pub fn print_failure(failure: &SessionFailure) {
    eprintln!();
    eprintln!("{} {}", "✗".red().bold(), failure.to_string().red());
    eprintln!();
    eprintln!("{}", "Transcript:".bold());
    for line in transcript_lines(&failure.messages) {
        eprintln!("  {line}");
    }
    eprintln!();
}

/// One line per message, e.g. `function(calculator): 4`.
pub fn transcript_lines(messages: &[Message]) -> Vec<String> {
    messages
        .iter()
        .map(|m| {
            let label = match (m.role(), m.name()) {
                (Role::Function, Some(name)) => format!("function({name})"),
                (role, _) => role.to_string(),
            };
            let body = match (m.content(), m.function_call()) {
                (_, Some(call)) => format!("→ {}({})", call.name, call.arguments),
                (Some(text), None) => truncate_string(&text.replace('\n', " "), TRANSCRIPT_PREVIEW),
                (None, None) => String::new(),
            };
            format!("{label}: {body}")
        })
        .collect()
}

/// Print every registered tool with its parameters.
pub fn print_tools(tools: &ToolRegistry) {
    println!();
    for name in tools.names() {
        let Ok(tool) = tools.resolve(name) else {
            continue;
        };
        println!("  {}  {}", name.cyan().bold(), tool.description().dimmed());
        for p in tool.parameters() {
            let required = if p.required { "required" } else { "optional" };
            let mut line = format!("{} ({}, {required})", p.name, p.param_type.as_str());
            if !p.allowed.is_empty() {
                line.push_str(&format!(" one of [{}]", p.allowed.join(", ")));
            }
            println!("      {line}  {}", p.description.dimmed());
        }
    }
    println!();
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
