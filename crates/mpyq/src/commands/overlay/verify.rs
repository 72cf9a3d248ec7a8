use clap::Args;
use miette::Result;

use super::SourceArgs;
use crate::commands::report_mismatches;

#[derive(Args)]
pub struct VerifyArgs {
    #[command(flatten)]
    source: SourceArgs,
}

impl VerifyArgs {
    pub fn handle(&self) -> Result<()> {
        let fs = self.source.load()?;
        let mismatches = fs.verify()?;
        report_mismatches(fs.len(), &mismatches)
    }
}
