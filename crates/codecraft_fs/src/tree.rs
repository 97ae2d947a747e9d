//! File tree produced by a directory scan.

use serde::{Deserialize, Serialize};

use crate::handle::{EntryKind, Handle};
use crate::path;

/// One node of a scanned tree.
///
/// Directory nodes always carry `children` after a scan; file nodes never do.
/// Children keep the provider's enumeration order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileTreeNode {
    pub name: String,
    pub kind: EntryKind,
    #[serde(skip)]
    pub handle: Option<Handle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<FileTreeNode>>,
}

impl FileTreeNode {
    pub fn file(name: impl Into<String>, handle: Handle) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::File,
            handle: Some(handle),
            children: None,
        }
    }

    pub fn directory(name: impl Into<String>, handle: Handle, children: Vec<FileTreeNode>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Directory,
            handle: Some(handle),
            children: Some(children),
        }
    }

    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    /// Immediate children (empty for files).
    pub fn children(&self) -> &[FileTreeNode] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// Find a descendant by a path relative to this node.
    pub fn find(&self, relative: &str) -> Option<&FileTreeNode> {
        let mut node = self;
        for segment in path::segments(relative) {
            node = node.children().iter().find(|c| c.name == segment)?;
        }
        Some(node)
    }

    /// Total number of descendants, not counting this node.
    pub fn count(&self) -> usize {
        self.children()
            .iter()
            .map(|c| 1 + c.count())
            .sum()
    }

    /// Every descendant path below `base`, depth-first in enumeration order.
    pub fn paths(&self, base: &str) -> Vec<(String, EntryKind)> {
        let mut out = Vec::new();
        self.collect_paths(base, &mut out);
        out
    }

    fn collect_paths(&self, base: &str, out: &mut Vec<(String, EntryKind)>) {
        for child in self.children() {
            let child_path = path::join(base, &child.name);
            out.push((child_path.clone(), child.kind));
            child.collect_paths(&child_path, out);
        }
    }

    /// Render the tree as indented text, one entry per line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(0, &mut out);
        out
    }

    fn render_into(&self, depth: usize, out: &mut String) {
        let marker = if self.is_directory() { "/" } else { "" };
        out.push_str(&format!("{}{}{}\n", "  ".repeat(depth), self.name, marker));
        for child in self.children() {
            child.render_into(depth + 1, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::manager::FileSystemManager;
    use crate::memory::MemoryProvider;

    async fn scan(provider: MemoryProvider) -> super::FileTreeNode {
        let fs = FileSystemManager::new(Arc::new(provider));
        fs.open_project().await.unwrap()
    }

    #[tokio::test]
    async fn test_json_shape_skips_handles() {
        let tree = scan(MemoryProvider::new("app").with_file("/main.js", "").with_directory("/lib")).await;

        let json = serde_json::to_value(&tree).unwrap();
        assert_eq!(json["name"], "app");
        assert_eq!(json["kind"], "directory");
        assert_eq!(json["children"][0]["kind"], "file");
        assert!(json["children"][0].get("children").is_none());
        assert!(json["children"][0].get("handle").is_none());
        assert_eq!(json["children"][1]["children"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_find_count_and_paths() {
        let tree = scan(
            MemoryProvider::default()
                .with_file("/src/a.rs", "")
                .with_file("/src/nested/b.rs", ""),
        )
        .await;

        assert_eq!(tree.count(), 4);
        assert!(tree.find("src/nested/b.rs").is_some());
        assert!(tree.find("src/missing").is_none());
        let paths: Vec<String> = tree.paths("/").into_iter().map(|(p, _)| p).collect();
        assert_eq!(paths, vec!["/src", "/src/a.rs", "/src/nested", "/src/nested/b.rs"]);
        assert_eq!(tree.render(), "project/\n  src/\n    a.rs\n    nested/\n      b.rs\n");
    }
}
