//! CodeCraft CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments
//! - 3: Permission denied
//! - 4: Not found

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use codecraft_fs::FsError;

mod commands;
mod config;

use commands::{Cli, Commands, Session};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const PERMISSION_DENIED: u8 = 3;
    pub const NOT_FOUND: u8 = 4;
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "codecraft=debug" } else { "codecraft=info" };
    let mut filter = EnvFilter::from_default_env();
    for directive in [level, "warn"] {
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }
    let log_result = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    if log_result.is_err() {
        // Logging already initialized, continue
    }

    match run(cli).await {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("❌ Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let (session, tree) = Session::open(&cli).await?;

    match cli.command {
        Commands::Tree(args) => commands::tree::execute(args, &session, &tree).await,
        Commands::Cat(args) => commands::files::cat(args, &session).await,
        Commands::Write(args) => commands::files::write(args, &session).await,
        Commands::Touch(args) => commands::files::touch(args, &session).await,
        Commands::Mkdir(args) => commands::files::mkdir(args, &session).await,
        Commands::Rm(args) => commands::files::rm(args, &session).await,
        Commands::Mv(args) => commands::files::mv(args, &session).await,
        Commands::Chat(args) => commands::chat::execute(args, &session).await,
    }
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    let fs_error = e.chain().find_map(|cause| cause.downcast_ref::<FsError>());
    match fs_error {
        Some(FsError::PermissionDenied(_)) | Some(FsError::UserCancelled) => {
            ExitCodes::PERMISSION_DENIED
        }
        Some(FsError::NotFound(_)) | Some(FsError::RootNotOpen) => ExitCodes::NOT_FOUND,
        Some(FsError::InvalidName(_)) | Some(FsError::UnsupportedOperation(_)) => {
            ExitCodes::INVALID_ARGS
        }
        Some(_) => ExitCodes::GENERAL_ERROR,
        None => {
            let msg = e.to_string().to_lowercase();
            if msg.contains("argument") || msg.contains("invalid settings") {
                ExitCodes::INVALID_ARGS
            } else {
                ExitCodes::GENERAL_ERROR
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_categorize_filesystem_errors() {
        let denied = anyhow::Error::from(FsError::PermissionDenied("/x".into()));
        assert_eq!(categorize_error(&denied), ExitCodes::PERMISSION_DENIED);

        let missing: anyhow::Result<()> = Err(FsError::NotFound("/x".into()).into());
        let missing = missing.context("Failed to open project").unwrap_err();
        assert_eq!(categorize_error(&missing), ExitCodes::NOT_FOUND);

        let bad_name = anyhow::Error::from(FsError::InvalidName("..".into()));
        assert_eq!(categorize_error(&bad_name), ExitCodes::INVALID_ARGS);
    }

    #[test]
    fn test_categorize_other_errors() {
        assert_eq!(
            categorize_error(&anyhow::anyhow!("Failed to delete /x")),
            ExitCodes::GENERAL_ERROR
        );
    }

    #[test]
    fn test_read_only_flag_forms() {
        let plain = Cli::try_parse_from(["codecraft", "--read-only", "tree"]).unwrap();
        assert_eq!(plain.read_only, Some(true));

        let off = Cli::try_parse_from(["codecraft", "tree", "--read-only=false"]).unwrap();
        assert_eq!(off.read_only, Some(false));
    }
}
