//! Parameter extraction for file-operation requests.
//!
//! Each extractor is a pure function from the message text to an optional
//! value. Patterns are case-insensitive and run on the original text, so
//! names and content keep the case the user typed.

use regex::Regex;

/// Name of the file to create: `create|new|make [a] file [called|named] NAME`.
pub fn extract_filename(message: &str) -> Option<String> {
    let re = Regex::new(
        r#"(?i)(?:create|new|make)(?:\s+a)?\s+file(?:\s+called|\s+named)?\s+["']?([a-zA-Z0-9_.\-]+)["']?"#,
    )
    .ok()?;
    capture(&re, message)
}

/// Everything after `with [the] content [of][:]`, with code fences removed.
pub fn extract_content(message: &str) -> Option<String> {
    let re = Regex::new(r"(?is)with(?:\s+the)?\s+content(?:\s+of)?:?\s+(.*)").ok()?;
    let raw = re.captures(message)?.get(1)?.as_str();
    Some(strip_code_fence(raw.trim()))
}

/// Path of the file to delete: `delete|remove [the] file [called|named] PATH`.
pub fn extract_delete_target(message: &str) -> Option<String> {
    let re = Regex::new(
        r#"(?i)(?:delete|remove)(?:\s+the)?\s+file(?:\s+called|\s+named)?\s+["']?([a-zA-Z0-9_./\-]+)["']?"#,
    )
    .ok()?;
    capture(&re, message)
}

/// Name of the directory to create: `create|new [a] directory|folder [called|named] NAME`.
pub fn extract_directory_name(message: &str) -> Option<String> {
    let re = Regex::new(
        r#"(?i)(?:create|new)(?:\s+a)?\s+(?:directory|folder)(?:\s+called|\s+named)?\s+["']?([a-zA-Z0-9_.\-]+)["']?"#,
    )
    .ok()?;
    capture(&re, message)
}

/// Remove an opening fence line (with an optional language tag) at the very
/// start and a closing fence at the very end. Fences inside are kept.
pub fn strip_code_fence(content: &str) -> String {
    match Regex::new(r"\A```[\w+\-]*[ \t]*\r?\n|```\z") {
        Ok(re) => re.replace_all(content, "").into_owned(),
        Err(_) => content.to_string(),
    }
}

fn capture(re: &Regex, message: &str) -> Option<String> {
    re.captures(message)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_variants() {
        assert_eq!(
            extract_filename("create file called test.js").as_deref(),
            Some("test.js")
        );
        assert_eq!(
            extract_filename("Please make a file named 'Notes.md'").as_deref(),
            Some("Notes.md")
        );
        assert_eq!(
            extract_filename("create a new file utils_v2.py").as_deref(),
            Some("utils_v2.py")
        );
        assert_eq!(extract_filename("create file"), None);
    }

    #[test]
    fn test_content_after_colon() {
        assert_eq!(
            extract_content("create file called a.js with content: console.log(1)").as_deref(),
            Some("console.log(1)")
        );
        assert_eq!(
            extract_content("update it with the content of   hello").as_deref(),
            Some("hello")
        );
        assert_eq!(extract_content("update the code please"), None);
    }

    #[test]
    fn test_content_spans_lines_and_strips_fences() {
        let message = "create file x.rs with content:\n```rust\nfn main() {}\n```";
        assert_eq!(extract_content(message).as_deref(), Some("fn main() {}\n"));
    }

    #[test]
    fn test_delete_target_allows_separators() {
        assert_eq!(
            extract_delete_target("delete the file src/old.js").as_deref(),
            Some("src/old.js")
        );
        assert_eq!(
            extract_delete_target("remove file named \"/tmp.txt\"").as_deref(),
            Some("/tmp.txt")
        );
        assert_eq!(extract_delete_target("delete file"), None);
    }

    #[test]
    fn test_directory_name() {
        assert_eq!(
            extract_directory_name("create a folder called components").as_deref(),
            Some("components")
        );
        assert_eq!(
            extract_directory_name("new directory named api-v1").as_deref(),
            Some("api-v1")
        );
        assert_eq!(extract_directory_name("create folder"), None);
    }

    #[test]
    fn test_strip_code_fence_leaves_plain_text() {
        assert_eq!(strip_code_fence("plain"), "plain");
        assert_eq!(strip_code_fence("```\nbody\n```"), "body\n");
    }

    #[test]
    fn test_strip_code_fence_only_touches_the_edges() {
        let nested = "```md\nintro\n```\ninner\n```\noutro\n```";
        assert_eq!(strip_code_fence(nested), "intro\n```\ninner\n```\noutro\n");
        assert_eq!(strip_code_fence("```js\r\nlet a = 1;\r\n```"), "let a = 1;\r\n");
    }
}
