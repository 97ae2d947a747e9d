//! Natural-language file operations.
//!
//! [`IntentInterpreter::process_message`] classifies one chat message, pulls
//! its parameters, runs the matching file operation and answers with a short
//! acknowledgement. It never fails: every problem becomes an explanation with
//! `operation_performed == false`. An empty response with nothing performed
//! means the message was not a file request at all.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use codecraft_fs::{path, FileOperationsService};

use crate::error::{AssistError, AssistResult, Parameter};
use crate::intent::{self, Intent, IntentParams};

/// Outcome of interpreting one message.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IntentResponse {
    pub response: String,
    pub operation_performed: bool,
}

impl IntentResponse {
    /// Nothing to do; the caller should answer conversationally.
    pub fn unhandled() -> Self {
        Self::default()
    }

    pub fn performed(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            operation_performed: true,
        }
    }

    pub fn declined(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            operation_performed: false,
        }
    }

    /// True when the message was not recognised as a file request.
    pub fn is_unhandled(&self) -> bool {
        !self.operation_performed && self.response.is_empty()
    }
}

/// Turns chat messages into calls on the file operations service.
#[derive(Clone)]
pub struct IntentInterpreter {
    operations: FileOperationsService,
}

impl IntentInterpreter {
    pub fn new(operations: FileOperationsService) -> Self {
        Self { operations }
    }

    /// Interpret `message` against the open file and current directory.
    ///
    /// `current_file` may be empty (no file open); an empty
    /// `current_directory` means the root.
    pub async fn process_message(
        &self,
        message: &str,
        current_file: &str,
        current_directory: &str,
    ) -> IntentResponse {
        let Some(rule) = intent::matching_rule(message) else {
            debug!("No file intent in message");
            return IntentResponse::unhandled();
        };
        let directory = if current_directory.trim().is_empty() {
            path::ROOT
        } else {
            current_directory
        };
        debug!("Classified message as {}", rule.intent);

        // Update targets the open file, so check for one before extracting.
        if rule.intent == Intent::UpdateFile && current_file.trim().is_empty() {
            return explain(rule.intent, &AssistError::NoOpenFile);
        }

        let params = match (rule.extract)(message) {
            Ok(params) => params,
            Err(e) => return explain(rule.intent, &e),
        };

        match self.execute(params, current_file, directory).await {
            Ok(response) => {
                info!("Performed {} from chat", rule.intent);
                IntentResponse::performed(response)
            }
            Err(e) => {
                warn!("Chat {} failed: {}", rule.intent, e);
                explain(rule.intent, &e)
            }
        }
    }

    async fn execute(
        &self,
        params: IntentParams,
        current_file: &str,
        directory: &str,
    ) -> AssistResult<String> {
        match params {
            IntentParams::CreateFile { filename, content } => {
                if self.operations.create_file(directory, &filename, &content).await {
                    Ok(format!("I've created the file \"{}\" for you.", filename))
                } else {
                    Err(AssistError::OperationFailed(filename))
                }
            }
            IntentParams::UpdateFile { content } => {
                if self.operations.update_file(current_file, &content).await {
                    Ok(format!("I've updated the file \"{}\" for you.", current_file))
                } else {
                    Err(AssistError::OperationFailed(current_file.to_string()))
                }
            }
            IntentParams::DeleteFile { target } => {
                let full_path = resolve_target(directory, &target);
                if self.operations.delete_file(&full_path).await {
                    Ok(format!("I've deleted the file \"{}\" for you.", target))
                } else {
                    Err(AssistError::OperationFailed(target))
                }
            }
            IntentParams::CreateDirectory { name } => {
                if self.operations.create_directory(directory, &name).await {
                    Ok(format!("I've created the directory \"{}\" for you.", name))
                } else {
                    Err(AssistError::OperationFailed(name))
                }
            }
        }
    }
}

/// Absolute targets stay as typed; anything else is under `directory`.
fn resolve_target(directory: &str, target: &str) -> String {
    if target.starts_with('/') {
        path::normalize(target)
    } else {
        path::join(directory, target)
    }
}

/// User-facing explanation for a failed request.
fn explain(intent: Intent, err: &AssistError) -> IntentResponse {
    let text = match (intent, err) {
        (Intent::CreateFile, AssistError::MissingParameter(_)) => {
            "I'd like to create a file for you, but I need a filename. Can you specify what to name the file?".to_string()
        }
        (Intent::CreateFile, AssistError::OperationFailed(name)) => format!(
            "I couldn't create the file \"{}\". Please check if the file already exists or if you have the necessary permissions.",
            name
        ),
        (Intent::UpdateFile, AssistError::NoOpenFile) => {
            "I'd like to update a file for you, but no file is currently open. Please open a file first.".to_string()
        }
        (Intent::UpdateFile, AssistError::MissingParameter(Parameter::Content)) => {
            "I'd like to update the file for you, but I need the new content. Can you specify what content to use?".to_string()
        }
        (Intent::UpdateFile, AssistError::OperationFailed(name)) => format!(
            "I couldn't update the file \"{}\". Please check if the file exists or if you have the necessary permissions.",
            name
        ),
        (Intent::DeleteFile, AssistError::MissingParameter(_)) => {
            "I'd like to delete a file for you, but I need a filename. Can you specify which file to delete?".to_string()
        }
        (Intent::DeleteFile, AssistError::OperationFailed(name)) => format!(
            "I couldn't delete the file \"{}\". Please check if the file exists or if you have the necessary permissions.",
            name
        ),
        (Intent::CreateDirectory, AssistError::MissingParameter(_)) => {
            "I'd like to create a directory for you, but I need a name. Can you specify what to name the directory?".to_string()
        }
        (Intent::CreateDirectory, AssistError::OperationFailed(name)) => format!(
            "I couldn't create the directory \"{}\". Please check if the directory already exists or if you have the necessary permissions.",
            name
        ),
        (_, other) => format!("I couldn't complete that request: {}", other),
    };
    IntentResponse::declined(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use codecraft_fs::{FileSystemManager, MemoryProvider, RecordingListener};

    async fn interpreter(provider: &MemoryProvider) -> (IntentInterpreter, Arc<RecordingListener>) {
        let fs = Arc::new(FileSystemManager::new(Arc::new(provider.clone())));
        fs.open_project().await.unwrap();
        let recorder = Arc::new(RecordingListener::new());
        let ops = FileOperationsService::new(fs, recorder.clone());
        (IntentInterpreter::new(ops), recorder)
    }

    #[tokio::test]
    async fn test_create_in_current_directory() {
        let provider = MemoryProvider::default().with_directory("/src");
        let (interpreter, recorder) = interpreter(&provider).await;

        let reply = interpreter
            .process_message("Create file named Main.rs with content: fn main() {}", "", "/src")
            .await;

        assert!(reply.operation_performed);
        assert_eq!(reply.response, "I've created the file \"Main.rs\" for you.");
        assert_eq!(provider.content("/src/Main.rs").as_deref(), Some("fn main() {}"));
        assert_eq!(recorder.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_filename_asks_for_one() {
        let (interpreter, recorder) = interpreter(&MemoryProvider::default()).await;

        let reply = interpreter.process_message("please create file", "", "/").await;

        assert!(!reply.operation_performed);
        assert!(reply.response.contains("I need a filename"));
        assert!(recorder.is_empty());
    }

    #[tokio::test]
    async fn test_missing_delete_target_asks_for_one() {
        let provider = MemoryProvider::default().with_file("/keep.js", "");
        let (interpreter, recorder) = interpreter(&provider).await;

        let reply = interpreter.process_message("please delete file", "", "/").await;

        assert!(!reply.operation_performed);
        assert!(reply
            .response
            .contains("I need a filename. Can you specify which file to delete?"));
        assert!(provider.exists("/keep.js"));
        assert!(recorder.is_empty());
    }

    #[tokio::test]
    async fn test_missing_directory_name_asks_for_one() {
        let (interpreter, recorder) = interpreter(&MemoryProvider::default()).await;

        let reply = interpreter.process_message("create folder", "", "/").await;

        assert!(!reply.operation_performed);
        assert!(reply
            .response
            .contains("I need a name. Can you specify what to name the directory?"));
        assert!(recorder.is_empty());
    }

    #[tokio::test]
    async fn test_update_without_open_file() {
        let (interpreter, _) = interpreter(&MemoryProvider::default()).await;

        let reply = interpreter
            .process_message("update the code with content: x", "", "/")
            .await;

        assert!(!reply.operation_performed);
        assert!(reply.response.contains("no file is currently open"));
    }

    #[tokio::test]
    async fn test_update_requires_content() {
        let provider = MemoryProvider::default().with_file("/a.js", "old");
        let (interpreter, _) = interpreter(&provider).await;

        let reply = interpreter
            .process_message("change this file please", "/a.js", "/")
            .await;

        assert!(!reply.operation_performed);
        assert!(reply.response.contains("I need the new content"));
        assert_eq!(provider.content("/a.js").as_deref(), Some("old"));
    }

    #[tokio::test]
    async fn test_update_replaces_open_file() {
        let provider = MemoryProvider::default().with_file("/a.js", "old");
        let (interpreter, _) = interpreter(&provider).await;

        let reply = interpreter
            .process_message("Update the code with content:\n```js\nlet a = 2;\n```", "/a.js", "/")
            .await;

        assert!(reply.operation_performed);
        assert_eq!(provider.content("/a.js").as_deref(), Some("let a = 2;\n"));
    }

    #[tokio::test]
    async fn test_relative_delete_uses_current_directory() {
        let provider = MemoryProvider::default()
            .with_file("/lib/old.js", "")
            .with_file("/old.js", "");
        let (interpreter, _) = interpreter(&provider).await;

        let reply = interpreter
            .process_message("delete file old.js", "", "/lib")
            .await;

        assert!(reply.operation_performed);
        assert!(!provider.exists("/lib/old.js"));
        assert!(provider.exists("/old.js"));
    }

    #[tokio::test]
    async fn test_create_directory_defaults_to_root() {
        let provider = MemoryProvider::default();
        let (interpreter, _) = interpreter(&provider).await;

        let reply = interpreter
            .process_message("new folder called assets", "", "")
            .await;

        assert!(reply.operation_performed);
        assert!(provider.exists("/assets"));
    }

    #[test]
    fn test_resolve_target() {
        assert_eq!(resolve_target("/src", "a.js"), "/src/a.js");
        assert_eq!(resolve_target("/src", "/a.js"), "/a.js");
        assert_eq!(resolve_target("/", "lib/a.js"), "/lib/a.js");
    }
}
