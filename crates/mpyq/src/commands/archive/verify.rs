use clap::Args;
use miette::{bail, Context, Result};
use mpyq_archive::MpqArchive;
use std::path::PathBuf;

use crate::commands::report_mismatches;

#[derive(Args)]
pub struct VerifyArgs {
    /// An input MPYQ file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,
}

impl VerifyArgs {
    pub fn handle(&self) -> Result<()> {
        let mpq = MpqArchive::open(&self.file)
            .context(format!("path: {}", &self.file.display()))?;
        if !mpq.is_valid() {
            bail!("{} is not an MPYQ archive", self.file.display());
        }

        let mismatches = mpq.verify_all()?;
        report_mismatches(mpq.len(), &mismatches)
    }
}
