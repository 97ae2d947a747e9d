//! Chat command - Talk to the assistant.
//!
//! With a message argument one exchange is run; without one, lines are read
//! from stdin until EOF or `exit`; `clear` starts the conversation over.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use codecraft_assist::{AssistantReply, ChatAssistant, EditorContext, IntentInterpreter};

use super::tree::print_tree;
use super::Session;

#[derive(Args)]
pub struct ChatArgs {
    /// Message to send; omit for an interactive session
    message: Option<String>,

    /// File treated as open in the editor
    #[arg(short, long)]
    file: Option<String>,
}

pub async fn execute(args: ChatArgs, session: &Session) -> Result<()> {
    let mut assistant = ChatAssistant::offline(IntentInterpreter::new(session.ops.clone()));
    let mut context = EditorContext::new(session.settings.current_directory.clone());

    if let Some(file) = &args.file {
        let code = session
            .fs
            .try_read_file(file)
            .await
            .with_context(|| format!("Failed to open {}", file))?;
        context = context.with_file(file.clone(), code);
    }

    if let Some(message) = args.message {
        if let Some(reply) = assistant.send(&message, &context).await {
            show_reply(session, &reply).await?;
        }
        return Ok(());
    }

    if let Some(welcome) = assistant.history().first() {
        println!("🤖 {}", welcome.content);
    }
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        match line.trim() {
            "exit" => break,
            "clear" => {
                assistant.clear();
                println!("🧹 Conversation cleared");
                continue;
            }
            _ => {}
        }
        if let Some(reply) = assistant.send(&line, &context).await {
            show_reply(session, &reply).await?;
            // Keep the open file's text current for the next message.
            if reply.refresh_tree && !context.current_file.is_empty() {
                context.code = session.fs.read_file(&context.current_file).await.unwrap_or_default();
            }
        }
    }
    info!("Chat ended after {} messages", assistant.history().len());
    Ok(())
}

async fn show_reply(session: &Session, reply: &AssistantReply) -> Result<()> {
    if session.json {
        println!("{}", serde_json::to_string_pretty(&reply.message)?);
    } else {
        println!("🤖 {}", reply.message.content);
    }
    if !reply.refresh_tree {
        return Ok(());
    }

    session.report_events()?;
    match session.fs.refresh().await {
        Ok(tree) => print_tree(session, &tree)?,
        Err(e) => warn!("Could not refresh the project tree: {}", e),
    }
    Ok(())
}
