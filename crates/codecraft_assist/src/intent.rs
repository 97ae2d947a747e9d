//! Intent classification for chat messages.
//!
//! Classification is a keyword test over the lower-cased text, walked in a
//! fixed priority order. The predicates are plain substring tests and can
//! overlap ("update ... create file" satisfies two of them); the first rule in
//! [`RULES`] that matches decides.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AssistError, AssistResult, Parameter};
use crate::extract;

/// Purpose of a chat message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Intent {
    CreateFile,
    UpdateFile,
    DeleteFile,
    CreateDirectory,
    None,
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateFile => write!(f, "create-file"),
            Self::UpdateFile => write!(f, "update-file"),
            Self::DeleteFile => write!(f, "delete-file"),
            Self::CreateDirectory => write!(f, "create-directory"),
            Self::None => write!(f, "none"),
        }
    }
}

/// Parameters pulled out of a message for one intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntentParams {
    CreateFile { filename: String, content: String },
    UpdateFile { content: String },
    DeleteFile { target: String },
    CreateDirectory { name: String },
}

/// One row of the classification table.
pub struct IntentRule {
    pub intent: Intent,
    /// Keyword test over the lower-cased message.
    pub matches: fn(&str) -> bool,
    /// Parameter extraction over the original message.
    pub extract: fn(&str) -> AssistResult<IntentParams>,
}

/// Classification table in priority order.
pub const RULES: &[IntentRule] = &[
    IntentRule {
        intent: Intent::CreateFile,
        matches: is_create_file,
        extract: create_file_params,
    },
    IntentRule {
        intent: Intent::UpdateFile,
        matches: is_update_file,
        extract: update_file_params,
    },
    IntentRule {
        intent: Intent::DeleteFile,
        matches: is_delete_file,
        extract: delete_file_params,
    },
    IntentRule {
        intent: Intent::CreateDirectory,
        matches: is_create_directory,
        extract: create_directory_params,
    },
];

/// Classify a message; `Intent::None` when no rule matches.
pub fn classify(message: &str) -> Intent {
    matching_rule(message)
        .map(|rule| rule.intent)
        .unwrap_or(Intent::None)
}

/// First rule whose predicate accepts the message.
pub fn matching_rule(message: &str) -> Option<&'static IntentRule> {
    let lowered = message.to_lowercase();
    RULES.iter().find(|rule| (rule.matches)(&lowered))
}

fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| text.contains(needle))
}

pub fn is_create_file(text: &str) -> bool {
    contains_any(text, &["create file", "new file", "make a file"])
}

pub fn is_update_file(text: &str) -> bool {
    contains_any(text, &["update", "modify", "change"]) && contains_any(text, &["file", "code"])
}

pub fn is_delete_file(text: &str) -> bool {
    contains_any(text, &["delete file", "remove file"])
}

pub fn is_create_directory(text: &str) -> bool {
    contains_any(
        text,
        &["create directory", "create folder", "new directory", "new folder"],
    )
}

fn create_file_params(message: &str) -> AssistResult<IntentParams> {
    let filename =
        extract::extract_filename(message).ok_or(AssistError::MissingParameter(Parameter::Filename))?;
    // Content is optional for a new file.
    let content = extract::extract_content(message).unwrap_or_default();
    Ok(IntentParams::CreateFile { filename, content })
}

fn update_file_params(message: &str) -> AssistResult<IntentParams> {
    let content =
        extract::extract_content(message).ok_or(AssistError::MissingParameter(Parameter::Content))?;
    Ok(IntentParams::UpdateFile { content })
}

fn delete_file_params(message: &str) -> AssistResult<IntentParams> {
    let target = extract::extract_delete_target(message)
        .ok_or(AssistError::MissingParameter(Parameter::Filename))?;
    Ok(IntentParams::DeleteFile { target })
}

fn create_directory_params(message: &str) -> AssistResult<IntentParams> {
    let name = extract::extract_directory_name(message)
        .ok_or(AssistError::MissingParameter(Parameter::DirectoryName))?;
    Ok(IntentParams::CreateDirectory { name })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_classification() {
        assert_eq!(classify("Create file called a.js"), Intent::CreateFile);
        assert_eq!(classify("please modify the code"), Intent::UpdateFile);
        assert_eq!(classify("remove file old.txt"), Intent::DeleteFile);
        assert_eq!(classify("New Folder called assets"), Intent::CreateDirectory);
        assert_eq!(classify("hello, how are you"), Intent::None);
    }

    #[test]
    fn test_create_file_outranks_update() {
        let message = "update the file with new content and create file called x";
        assert_eq!(classify(message), Intent::CreateFile);
    }

    #[test]
    fn test_update_outranks_delete() {
        assert_eq!(classify("change the code, then delete file a.txt"), Intent::UpdateFile);
    }

    #[test]
    fn test_delete_outranks_create_directory() {
        assert_eq!(
            classify("delete file a.txt and create folder b"),
            Intent::DeleteFile
        );
    }

    #[test]
    fn test_update_needs_both_keyword_groups() {
        assert_eq!(classify("update me on the weather"), Intent::None);
        assert_eq!(classify("change the file with content: x"), Intent::UpdateFile);
    }

    #[test]
    fn test_rule_table_order() {
        let order: Vec<Intent> = RULES.iter().map(|r| r.intent).collect();
        assert_eq!(
            order,
            vec![
                Intent::CreateFile,
                Intent::UpdateFile,
                Intent::DeleteFile,
                Intent::CreateDirectory,
            ]
        );
    }

    #[test]
    fn test_create_file_params_default_to_empty_content() {
        assert_eq!(
            create_file_params("new file called empty.txt").unwrap(),
            IntentParams::CreateFile {
                filename: "empty.txt".to_string(),
                content: String::new(),
            }
        );
    }

    #[test]
    fn test_update_params_require_content() {
        assert!(matches!(
            update_file_params("update the file"),
            Err(AssistError::MissingParameter(Parameter::Content))
        ));
    }
}
