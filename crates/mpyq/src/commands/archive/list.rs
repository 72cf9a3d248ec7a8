use clap::Args;
use miette::{Context, Result};
use mpyq_archive::MpqArchive;
use std::path::PathBuf;
use tracing::warn;

use crate::commands::format_entry;

#[derive(Args)]
pub struct ListArgs {
    /// An input MPYQ file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// Only print entry names
    #[arg(long, default_value_t = false)]
    names_only: bool,
}

impl ListArgs {
    pub fn handle(&self) -> Result<()> {
        let mpq = MpqArchive::open(&self.file)
            .context(format!("path: {}", &self.file.display()))?;
        if !mpq.is_valid() {
            warn!("{} does not carry the MPYQ magic", self.file.display());
        }

        for entry in mpq.entries() {
            if self.names_only {
                println!("{}", entry.key);
            } else {
                println!("{}", format_entry(&entry));
            }
        }
        Ok(())
    }
}
