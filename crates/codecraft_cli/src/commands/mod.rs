//! CLI command definitions.
//!
//! Every command runs against one project root opened for the duration of
//! the invocation. Mutations go through the file operations service, so the
//! change events it records are what the command reports.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use codecraft_fs::{
    AccessMode, ChangeEvent, FileOperationsService, FileSystemManager, FileTreeNode,
    LocalProvider, RecordingListener,
};

use crate::config::{CliConfig, Settings};

pub mod chat;
pub mod files;
pub mod tree;

/// CodeCraft - project files and chat-driven file operations
#[derive(Parser)]
#[command(name = "codecraft")]
#[command(version, about = "CodeCraft - project files and chat-driven file operations")]
#[command(long_about = r#"
CodeCraft opens a project directory and works on it through the same file
layer the editor uses: browse the tree, read and write files, or describe a
change in plain words and let the assistant perform it.

COMMANDS:
  tree    → Print the project tree
  cat     → Print a file
  write   → Replace the content of a file
  touch   → Create a file
  mkdir   → Create a directory
  rm      → Delete a file or directory
  mv      → Rename a file
  chat    → Talk to the assistant (one message, or interactive)

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  3 - Permission denied
  4 - Not found
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Project directory to open
    #[arg(long, global = true, env = "CODECRAFT_ROOT")]
    pub root: Option<PathBuf>,

    /// Current directory inside the project (for chat requests)
    #[arg(long, global = true, env = "CODECRAFT_CWD")]
    pub cwd: Option<String>,

    /// Open the project without write access (`--read-only=false` overrides the settings file)
    #[arg(
        long,
        global = true,
        env = "CODECRAFT_READ_ONLY",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_parser = clap::builder::BoolishValueParser::new()
    )]
    pub read_only: Option<bool>,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the project tree
    Tree(tree::TreeArgs),

    /// Print the content of a file
    Cat(files::CatArgs),

    /// Replace the content of an existing file
    Write(files::WriteArgs),

    /// Create a file (overwrites an existing one)
    Touch(files::TouchArgs),

    /// Create a directory
    Mkdir(files::MkdirArgs),

    /// Delete a file, or a directory with --dir
    Rm(files::RmArgs),

    /// Rename a file within its directory
    Mv(files::MvArgs),

    /// Send a message to the assistant, or start an interactive chat
    Chat(chat::ChatArgs),
}

/// An opened project plus the services commands work through.
pub struct Session {
    pub fs: Arc<FileSystemManager>,
    pub ops: FileOperationsService,
    pub events: Arc<RecordingListener>,
    pub settings: Settings,
    pub json: bool,
}

impl Session {
    /// Resolve configuration and open the project root.
    pub async fn open(cli: &Cli) -> Result<(Self, FileTreeNode)> {
        let root = match &cli.root {
            Some(root) => root.clone(),
            None => std::env::current_dir().context("Failed to determine current directory")?,
        };
        let settings = CliConfig::load(&root)?.resolve(cli.cwd.clone(), cli.read_only);
        let mode = if settings.read_only {
            AccessMode::Read
        } else {
            AccessMode::ReadWrite
        };

        let provider = LocalProvider::new(&root);
        info!("Opening project {} ({:?})", provider.root_path().display(), mode);
        let fs = Arc::new(FileSystemManager::with_access_mode(Arc::new(provider), mode));
        let tree = fs
            .open_project()
            .await
            .with_context(|| format!("Failed to open project: {}", root.display()))?;

        let events = Arc::new(RecordingListener::new());
        let ops = FileOperationsService::new(fs.clone(), events.clone());
        Ok((
            Self {
                fs,
                ops,
                events,
                settings,
                json: cli.json,
            },
            tree,
        ))
    }

    /// Print and drain the change events recorded so far.
    pub fn report_events(&self) -> Result<Vec<ChangeEvent>> {
        let events = self.events.take();
        if self.json {
            println!("{}", serde_json::to_string_pretty(&events)?);
        } else {
            for event in &events {
                println!("   ✅ {}", event.describe());
            }
        }
        Ok(events)
    }
}
