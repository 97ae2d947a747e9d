//! Chat assistant.
//!
//! Every user message goes to the [`IntentInterpreter`] first. Only when the
//! interpreter neither performed anything nor had anything to say is the
//! conversation handed to a [`ConversationalResponder`].

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::error::AssistResult;
use crate::interpreter::IntentInterpreter;
use crate::types::{ChatMessage, EditorContext};

/// First message of every conversation.
pub const WELCOME_MESSAGE: &str = "Hello! I'm your coding assistant. I can help with code completion, explanations, debugging, and file operations. Try asking me to create, update, or delete files!";

/// Shown when the responder fails.
pub const RESPONDER_ERROR_MESSAGE: &str =
    "Sorry, I encountered an error while processing your request.";

/// General-purpose answer generator used for non-file messages.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConversationalResponder: Send + Sync {
    /// Answer the last message of `history`.
    async fn respond(&self, history: &[ChatMessage], context: &EditorContext) -> AssistResult<String>;
}

/// Responder that works without a model: it explains what it can do.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineResponder;

#[async_trait]
impl ConversationalResponder for OfflineResponder {
    async fn respond(&self, _history: &[ChatMessage], context: &EditorContext) -> AssistResult<String> {
        let mut text = String::from(
            "I can only work with files in this session. Try one of these:\n\
             - create file called example.js with content: console.log(\"hi\")\n\
             - update the file with content: <new content>\n\
             - delete file called example.js\n\
             - create folder called components",
        );
        if !context.current_file.is_empty() {
            text.push_str(&format!("\n\nThe open file is {}.", context.current_file));
        }
        Ok(text)
    }
}

/// Instruction prompt for responders backed by a language model.
pub fn build_system_prompt(current_file: &str, code: &str) -> String {
    let mut prompt = String::from(
        "You are an AI coding assistant in the CodeCraft IDE.\n\
         You help developers write, debug, and improve their code.\n",
    );
    if !current_file.is_empty() {
        prompt.push_str(&format!(
            "\nThe user is currently working on the file: {}\n",
            current_file
        ));
    }
    if !code.is_empty() {
        prompt.push_str(&format!(
            "\nHere is the code the user is working on:\n```\n{}\n```\n",
            code
        ));
    }
    prompt.push_str(
        "\nYou can help with:\n\
         1. Explaining code\n\
         2. Finding and fixing errors\n\
         3. Suggesting improvements\n\
         4. Generating code snippets\n\
         5. Answering programming questions\n\
         \n\
         You can also help with file operations by responding to requests like:\n\
         - \"Create a new file called example.js with content...\"\n\
         - \"Update this file with the following code...\"\n\
         - \"Delete the file called example.js\"\n\
         \n\
         Please be concise, helpful, and provide code examples when appropriate.",
    );
    prompt
}

/// Reply to one user message.
#[derive(Debug, Clone)]
pub struct AssistantReply {
    pub message: ChatMessage,
    /// A file operation was performed; the caller should reload its tree.
    pub refresh_tree: bool,
}

/// Conversation state plus the routing between interpreter and responder.
pub struct ChatAssistant {
    interpreter: IntentInterpreter,
    responder: Arc<dyn ConversationalResponder>,
    history: Vec<ChatMessage>,
}

impl ChatAssistant {
    pub fn new(interpreter: IntentInterpreter, responder: Arc<dyn ConversationalResponder>) -> Self {
        Self {
            interpreter,
            responder,
            history: vec![ChatMessage::assistant(WELCOME_MESSAGE)],
        }
    }

    /// Assistant with the bundled [`OfflineResponder`].
    pub fn offline(interpreter: IntentInterpreter) -> Self {
        Self::new(interpreter, Arc::new(OfflineResponder))
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// Handle one user message. Blank input is ignored.
    pub async fn send(&mut self, input: &str, context: &EditorContext) -> Option<AssistantReply> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }
        self.history.push(ChatMessage::user(input));

        let outcome = self
            .interpreter
            .process_message(input, &context.current_file, &context.current_directory)
            .await;

        let reply = if outcome.operation_performed {
            AssistantReply {
                message: ChatMessage::file_operation(outcome.response),
                refresh_tree: true,
            }
        } else if !outcome.response.is_empty() {
            AssistantReply {
                message: ChatMessage::assistant(outcome.response),
                refresh_tree: false,
            }
        } else {
            debug!("Falling back to conversational responder");
            let content = match self.responder.respond(&self.history, context).await {
                Ok(text) => text,
                Err(e) => {
                    warn!("Responder failed: {}", e);
                    RESPONDER_ERROR_MESSAGE.to_string()
                }
            };
            AssistantReply {
                message: ChatMessage::assistant(content),
                refresh_tree: false,
            }
        };

        if reply.refresh_tree {
            info!("Chat message performed a file operation");
        }
        self.history.push(reply.message.clone());
        Some(reply)
    }

    /// Drop the conversation, keeping only a fresh welcome message.
    pub fn clear(&mut self) {
        self.history = vec![ChatMessage::assistant(WELCOME_MESSAGE)];
    }
}
