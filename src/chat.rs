//! Interactive terminal chat over the same agent the server uses.
//!
//! This is the debug counterpart of `serve`: type a message, see which tools
//! the model called, read the reply. The conversation is kept for the whole
//! session; `/reset` starts over, `exit` or Ctrl-D leaves.

use colored::*;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::agent::{Agent, AgentEventType, AgentReply};

pub async fn run(agent: &Agent, display_name: &str) -> anyhow::Result<()> {
    print_banner(agent, display_name);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    let mut history = Vec::new();

    loop {
        stdout.write_all(format!("{} ", ">".cyan().bold()).as_bytes()).await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };
        let message = line.trim();

        match message {
            "" => continue,
            "exit" | "quit" | "/exit" | "/quit" => break,
            "/reset" => {
                history.clear();
                println!("{} conversation cleared", "System:".yellow().bold());
                continue;
            }
            _ => {}
        }

        let checkpoint = history.len();
        match agent.run_in(&mut history, message).await {
            Ok(reply) => print_reply(display_name, &reply),
            Err(e) => {
                // Drop the partial turn so the next message starts clean.
                history.truncate(checkpoint);
                eprintln!("{} {}", "Error:".red().bold(), e);
            }
        }
    }

    Ok(())
}

fn print_banner(agent: &Agent, display_name: &str) {
    println!("{}", format!("  {} ({})", display_name, agent.model()).bright_blue().bold());
    let tools = agent.tools();
    if tools.is_empty() {
        println!("  no tools registered");
    } else {
        for tool in tools {
            println!("  {} {}", "tool".dimmed(), tool.name);
        }
    }
    println!("  {}\n", "/reset clears the conversation, exit quits".dimmed());
}

fn print_reply(display_name: &str, reply: &AgentReply) {
    for event in &reply.events {
        let tool = event.tool.as_deref().unwrap_or_default();
        match event.event_type {
            AgentEventType::ToolCall => {
                println!("{} {}({})", "Tool:".magenta().bold(), tool, event.content);
            }
            AgentEventType::ToolResult => {
                println!("{} {}", "  ->".dimmed(), event.content.to_string().dimmed());
            }
            AgentEventType::ToolError => {
                println!("{} {}", "Tool Error:".red().bold(), event.content);
            }
            AgentEventType::Response => {}
        }
    }
    println!("{} {}\n", format!("{}:", display_name).green().bold(), reply.text);
}
