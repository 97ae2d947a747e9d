//! # codecraft_assist - Chat assistant for CodeCraft
//!
//! Turns free-text chat messages into file operations:
//! - `intent`: keyword classification in a fixed priority order
//! - `extract`: regex parameter extraction (names, content, delete targets)
//! - `interpreter`: runs the classified operation and phrases the answer
//! - `assistant`: conversation history with a conversational fallback
//!
//! ## Flow
//!
//! ```text
//! chat text ──► IntentInterpreter ──► FileOperationsService ──► FileSystemManager
//!                    │
//!                    └─ empty, nothing performed ──► ConversationalResponder
//! ```

pub mod assistant;
pub mod error;
pub mod extract;
pub mod intent;
pub mod interpreter;
pub mod types;

pub use assistant::{
    build_system_prompt, AssistantReply, ChatAssistant, ConversationalResponder, OfflineResponder,
    WELCOME_MESSAGE,
};
pub use error::{AssistError, AssistResult, Parameter};
pub use intent::{classify, Intent, IntentParams};
pub use interpreter::{IntentInterpreter, IntentResponse};
pub use types::{ChatMessage, EditorContext, MessageRole};
