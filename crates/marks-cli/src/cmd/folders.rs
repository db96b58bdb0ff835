//! `marks folders`: folder records in tree order.

use std::io::{self, Write};

use clap::Args;
use marks_core::FolderRecord;

use crate::cmd::Session;
use crate::output::render_mode;

/// Arguments for `marks folders`.
#[derive(Args, Debug, Default)]
pub struct FoldersArgs {}

pub fn run_folders(_args: &FoldersArgs, session: &Session) -> anyhow::Result<()> {
    let folders = session.load()?.folders;
    render_mode(session.output, &folders, render_text, render_pretty)
}

fn render_text(folders: &Vec<FolderRecord>, w: &mut dyn Write) -> io::Result<()> {
    for f in folders {
        writeln!(
            w,
            "{}\t{}\t{}\t{}",
            f.id,
            f.parent_id.as_deref().unwrap_or(""),
            f.depth,
            f.name
        )?;
    }
    Ok(())
}

/// Indented outline; pre-order makes indentation alone show the nesting.
fn render_pretty(folders: &Vec<FolderRecord>, w: &mut dyn Write) -> io::Result<()> {
    for f in folders {
        writeln!(w, "{:indent$}{} ({})", "", f.name, f.id, indent = f.depth * 2)?;
    }
    Ok(())
}
