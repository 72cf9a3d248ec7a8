use clap::Args;
use miette::{Context, Result};
use mpyq_archive::ExtractMode;
use std::path::PathBuf;
use tracing::info;

use super::SourceArgs;

#[derive(Args)]
pub struct UnpackArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// A target directory
    #[arg(short, long, value_name = "DIR")]
    output: PathBuf,

    /// Only write the newest version of each file instead of extracting archive by archive
    #[arg(long, default_value_t = false)]
    resolved: bool,
}

impl UnpackArgs {
    pub fn handle(&self) -> Result<()> {
        let fs = self.source.load()?;

        let mode = if self.resolved {
            ExtractMode::Resolved
        } else {
            ExtractMode::PerArchive
        };

        let written = fs
            .extract_all(&self.output, mode)
            .context(format!("unpacking into {}", self.output.display()))?;
        info!("wrote {written} files to {}", self.output.display());
        Ok(())
    }
}
