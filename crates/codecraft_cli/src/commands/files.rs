//! File commands - cat, write, touch, mkdir, rm, mv.
//!
//! Targets are resolved before the mutation so a missing path or a
//! read-only session is reported with its own exit code. The mutation itself
//! goes through the operations service.

use anyhow::{bail, Result};
use clap::Args;
use tracing::info;

use codecraft_fs::{path, FsError};

use super::Session;

#[derive(Args)]
pub struct CatArgs {
    /// File to print
    path: String,
}

#[derive(Args)]
pub struct WriteArgs {
    /// File to overwrite
    path: String,

    /// New content
    content: String,
}

#[derive(Args)]
pub struct TouchArgs {
    /// Directory to create the file in
    dir: String,

    /// File name
    name: String,

    /// Initial content
    #[arg(short, long, default_value = "")]
    content: String,
}

#[derive(Args)]
pub struct MkdirArgs {
    /// Parent directory
    parent: String,

    /// Directory name
    name: String,
}

#[derive(Args)]
pub struct RmArgs {
    /// Entry to delete
    path: String,

    /// Delete a directory and everything below it
    #[arg(long)]
    dir: bool,
}

#[derive(Args)]
pub struct MvArgs {
    /// File to rename
    path: String,

    /// New name within the same directory
    new_name: String,
}

pub async fn cat(args: CatArgs, session: &Session) -> Result<()> {
    let content = session.fs.try_read_file(&args.path).await?;
    if session.json {
        let out = serde_json::json!({ "path": path::normalize(&args.path), "content": content });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print!("{}", content);
    }
    Ok(())
}

pub async fn write(args: WriteArgs, session: &Session) -> Result<()> {
    ensure_writable(session)?;
    session.fs.try_resolve_file(&args.path).await?;

    if !session.ops.update_file(&args.path, &args.content).await {
        bail!("Failed to write {}", args.path);
    }
    session.report_events()?;
    Ok(())
}

pub async fn touch(args: TouchArgs, session: &Session) -> Result<()> {
    ensure_writable(session)?;
    path::validate_name(&args.name)?;
    session.fs.try_resolve_directory(&args.dir).await?;

    if !session.ops.create_file(&args.dir, &args.name, &args.content).await {
        bail!("Failed to create {}", path::join(&args.dir, &args.name));
    }
    session.report_events()?;
    Ok(())
}

pub async fn mkdir(args: MkdirArgs, session: &Session) -> Result<()> {
    ensure_writable(session)?;
    path::validate_name(&args.name)?;
    session.fs.try_resolve_directory(&args.parent).await?;

    if !session.ops.create_directory(&args.parent, &args.name).await {
        bail!("Failed to create {}", path::join(&args.parent, &args.name));
    }
    session.report_events()?;
    Ok(())
}

pub async fn rm(args: RmArgs, session: &Session) -> Result<()> {
    ensure_writable(session)?;
    let deleted = if args.dir {
        if path::is_root(&args.path) {
            return Err(FsError::UnsupportedOperation("deleting the project root".to_string()).into());
        }
        session.fs.try_resolve_directory(&args.path).await?;
        session.ops.delete_directory(&args.path).await
    } else {
        session.fs.try_resolve_file(&args.path).await?;
        session.ops.delete_file(&args.path).await
    };

    if !deleted {
        bail!("Failed to delete {}", args.path);
    }
    info!("Deleted {}", args.path);
    session.report_events()?;
    Ok(())
}

pub async fn mv(args: MvArgs, session: &Session) -> Result<()> {
    ensure_writable(session)?;
    path::validate_name(&args.new_name)?;
    if session.fs.resolve_directory(&args.path).await.is_some() {
        return Err(FsError::UnsupportedOperation(format!(
            "renaming directory {}",
            args.path
        ))
        .into());
    }
    session.fs.try_resolve_file(&args.path).await?;

    if !session.ops.rename(&args.path, &args.new_name).await {
        bail!("Failed to rename {} to {}", args.path, args.new_name);
    }
    session.report_events()?;
    Ok(())
}

fn ensure_writable(session: &Session) -> Result<()> {
    if !session.fs.access_mode().is_writable() {
        return Err(FsError::PermissionDenied("project is open read-only".to_string()).into());
    }
    Ok(())
}
