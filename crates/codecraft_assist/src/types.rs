//! Core types for the chat assistant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Message role in a conversation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// A single chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique message ID (UUID)
    pub id: String,
    /// Role of the message sender
    pub role: MessageRole,
    /// Message content
    pub content: String,
    /// Set when the message acknowledges a performed file operation
    #[serde(rename = "isFileOperation", default)]
    pub is_file_operation: bool,
    /// When the message was created
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            is_file_operation: false,
            created_at: Utc::now(),
        }
    }

    /// Create a new user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// Create a new assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    /// Assistant acknowledgement of a file operation
    pub fn file_operation(content: impl Into<String>) -> Self {
        Self {
            is_file_operation: true,
            ..Self::assistant(content)
        }
    }
}

/// What the editor is showing when a message is sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditorContext {
    /// Path of the open file, empty when none
    #[serde(rename = "currentFile", default)]
    pub current_file: String,
    /// Directory new entries are created in
    #[serde(rename = "currentDirectory", default)]
    pub current_directory: String,
    /// Text of the open file
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub code: String,
}

impl EditorContext {
    pub fn new(current_directory: impl Into<String>) -> Self {
        Self {
            current_directory: current_directory.into(),
            ..Self::default()
        }
    }

    pub fn with_file(mut self, current_file: impl Into<String>, code: impl Into<String>) -> Self {
        self.current_file = current_file.into();
        self.code = code.into();
        self
    }
}
