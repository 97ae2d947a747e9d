//! Tree command - Print the project tree.

use anyhow::Result;
use clap::Args;

use codecraft_fs::FileTreeNode;

use super::Session;

#[derive(Args)]
pub struct TreeArgs {
    /// Only print the subtree below this path
    #[arg(default_value = "/")]
    path: String,
}

pub async fn execute(args: TreeArgs, session: &Session, tree: &FileTreeNode) -> Result<()> {
    let relative = args.path.trim_start_matches('/');
    let Some(node) = tree.find(relative) else {
        return Err(codecraft_fs::FsError::NotFound(args.path).into());
    };
    print_tree(session, node)
}

/// Print a tree as text or JSON.
pub fn print_tree(session: &Session, node: &FileTreeNode) -> Result<()> {
    if session.json {
        println!("{}", serde_json::to_string_pretty(node)?);
    } else {
        print!("{}", node.render());
        println!("({} entries)", node.count());
    }
    Ok(())
}
